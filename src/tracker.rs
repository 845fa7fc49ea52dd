//! The tracker: orchestrates transactions, messages, and block scanning.
//!
//! State mutation is serialized through the store locks and every update
//! runs to completion before the next event is processed. Chain I/O never
//! happens while a lock is held: each operation snapshots the record it
//! needs, performs its chain calls, then re-checks the record before
//! applying the result (a record removed in the meantime is a benign
//! no-op).

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use eyre::{eyre, Result, WrapErr};
use serde::Serialize;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::chain::{ChainError, ChainRegistry, RawTx};
use crate::indexer::{IndexerRecord, XCallScanClient};
use crate::messages::{self, StatusChange, XMessageStore};
use crate::metrics;
use crate::persist::JsonStore;
use crate::scanner::XCallEventStore;
use crate::transactions::XTransactionStore;
use crate::types::{
    Transaction, TransactionStatus, XCallEventMap, XCallEventType, XChainId, XMessage,
    XMessageStatus, XTransaction, XTransactionInput, XTransactionStatus,
};

/// Persisted message table schema. A version bump resets the table.
pub const XMESSAGE_STORE_NAME: &str = "xmessage-store";
pub const XMESSAGE_STORE_VERSION: u32 = 1;

/// Tracker tuning knobs.
#[derive(Debug)]
pub struct TrackerOptions {
    /// Cadence of the per-chain block scan (height poll + one block).
    pub scan_interval: Duration,
    /// Cadence of the message refresh pass (receipt + event polling).
    pub refresh_interval: Duration,
    /// Stall hardening: fail a non-terminal hop after this many destination
    /// chain-height advances without a status change. Disabled when `None`.
    pub stall_timeout_advances: Option<u64>,
    /// Durable storage for the message table. In-memory only when `None`.
    pub persistence: Option<JsonStore>,
    /// External indexing service for hops with `use_external_tracker`.
    pub indexer: Option<XCallScanClient>,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_millis(1000),
            refresh_interval: Duration::from_millis(2000),
            stall_timeout_advances: None,
            persistence: None,
            indexer: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StallTracker {
    last_status: XMessageStatus,
    last_height: u64,
    advances: u64,
}

/// The cross-chain call tracking engine.
pub struct XCallTracker {
    chains: ChainRegistry,
    events: RwLock<XCallEventStore>,
    messages: RwLock<XMessageStore>,
    transactions: RwLock<XTransactionStore>,
    options: TrackerOptions,
    stall: Mutex<HashMap<String, StallTracker>>,
}

impl XCallTracker {
    pub fn new(chains: ChainRegistry, options: TrackerOptions) -> Self {
        let persisted = options
            .persistence
            .as_ref()
            .map(|store| {
                let messages: BTreeMap<String, XMessage> = store.load();
                if !messages.is_empty() {
                    info!(count = messages.len(), "Restored persisted XMessages");
                }
                messages
            })
            .unwrap_or_default();

        Self {
            chains,
            events: RwLock::new(XCallEventStore::new()),
            messages: RwLock::new(XMessageStore::from_messages(persisted)),
            transactions: RwLock::new(XTransactionStore::new()),
            options,
            stall: Mutex::new(HashMap::new()),
        }
    }

    // ------------------------------------------------------------------
    // XTransaction orchestration
    // ------------------------------------------------------------------

    /// Submit a user action on its source chain and start tracking it.
    ///
    /// Only one transaction may be in flight: starting another while
    /// `current_id` is set is rejected.
    pub async fn execute_transfer(&self, input: XTransactionInput) -> Result<XTransaction> {
        if let Some(current) = self.transactions.read().await.current_id() {
            return Err(eyre!(
                "transaction {} is still in flight; reset before starting a new one",
                current
            ));
        }

        let source = self.chains.get(&input.from)?;
        let primary_destination = input.primary_destination().clone();
        let secondary_required = input.secondary_message_required();

        let primary_height = self
            .chains
            .get(&primary_destination)?
            .get_block_height()
            .await
            .wrap_err("Failed to fetch primary destination height")?;
        let final_height = if secondary_required {
            self.chains
                .get(&input.to)?
                .get_block_height()
                .await
                .wrap_err("Failed to fetch final destination height")?
        } else {
            primary_height
        };

        let hash = source
            .submit(&input.payload)
            .await
            .wrap_err("Failed to submit source transaction")?;

        let id = XMessage::message_id(&input.from, &hash);
        let transaction = XTransaction {
            id: id.clone(),
            transaction_type: input.transaction_type,
            source_chain_id: input.from.clone(),
            final_destination_chain_id: input.to.clone(),
            final_destination_chain_initial_block_height: final_height,
            secondary_message_required: secondary_required,
            status: XTransactionStatus::Pending,
            created_at: chrono::Utc::now(),
        };
        let message = XMessage {
            id: id.clone(),
            x_transaction_id: id.clone(),
            source_chain_id: input.from.clone(),
            destination_chain_id: primary_destination.clone(),
            source_transaction: Transaction::pending(&hash, input.from.clone()),
            destination_transaction: None,
            events: XCallEventMap::new(),
            status: XMessageStatus::Requested,
            destination_chain_initial_block_height: primary_height,
            is_primary: true,
            use_external_tracker: input.use_external_tracker,
            source_transaction_hash: None,
            destination_transaction_hash: None,
        };

        self.transactions
            .write()
            .await
            .insert_active(transaction.clone())?;
        self.messages.write().await.add(message);
        if !input.use_external_tracker {
            self.events
                .write()
                .await
                .enable_scanner(&id, &primary_destination, primary_height);
        }
        self.persist_messages().await;

        info!(
            %id,
            transaction_type = %input.transaction_type,
            from = %input.from,
            to = %input.to,
            secondary_required,
            "XTransaction started"
        );
        Ok(transaction)
    }

    /// Swaps follow the same submission path as transfers.
    pub async fn execute_swap(&self, input: XTransactionInput) -> Result<XTransaction> {
        self.execute_transfer(input).await
    }

    pub async fn get_transaction(&self, id: &str) -> Option<XTransaction> {
        self.transactions.read().await.get(id).cloned()
    }

    pub async fn current_transaction(&self) -> Option<XTransaction> {
        self.transactions.read().await.current().cloned()
    }

    /// Clear the current transaction so a new one may start. Historical
    /// records and in-flight chain calls are unaffected.
    pub async fn reset(&self) {
        self.transactions.write().await.reset();
    }

    async fn success(&self, id: &str) {
        if self.transactions.write().await.success(id) {
            metrics::record_transaction_finalized("success");
        }
    }

    async fn fail(&self, id: &str) {
        if self.transactions.write().await.fail(id) {
            metrics::record_transaction_finalized("failure");
        }
    }

    // ------------------------------------------------------------------
    // XMessage updates
    // ------------------------------------------------------------------

    pub async fn get_message(&self, id: &str) -> Option<XMessage> {
        self.messages.read().await.get(id).cloned()
    }

    pub async fn message_status_description(&self, id: &str) -> Option<String> {
        self.messages
            .read()
            .await
            .get(id)
            .map(messages::status_description)
    }

    /// Apply a newly polled source-chain receipt to a hop.
    pub async fn update_source_transaction(&self, id: &str, raw_tx: &RawTx) -> Result<()> {
        let Some(message) = self.get_message(id).await else {
            return Ok(()); // stale reference
        };
        let client = self.chains.get(&message.source_chain_id)?;
        let status = client.derive_tx_status(raw_tx);
        let logs = client.get_tx_event_logs(raw_tx);

        let change = self
            .messages
            .write()
            .await
            .apply_source_receipt(id, status, logs);
        self.after_change(id, change).await
    }

    /// Merge newly discovered destination events into a hop. When a
    /// CallExecuted event appears, the destination receipt is fetched and
    /// classified before the status is recomputed.
    pub async fn update_message_events(&self, id: &str, events: XCallEventMap) -> Result<()> {
        let Some(message) = self.get_message(id).await else {
            return Ok(()); // stale reference
        };

        let executed = events
            .get(&XCallEventType::CallExecuted)
            .or_else(|| message.events.get(&XCallEventType::CallExecuted));

        let mut destination_transaction = None;
        if let Some(executed) = executed {
            if message.destination_transaction.is_none() {
                let client = self.chains.get(&message.destination_chain_id)?;
                match client.get_tx_receipt(&executed.tx_hash).await {
                    Ok(Some(raw)) => {
                        destination_transaction = Some(Transaction {
                            hash: executed.tx_hash.clone(),
                            x_chain_id: message.destination_chain_id.clone(),
                            status: client.derive_tx_status(&raw),
                            raw_event_logs: client.get_tx_event_logs(&raw),
                            timestamp: chrono::Utc::now(),
                        });
                    }
                    Ok(None) => {
                        // Receipt not visible yet: apply nothing this round,
                        // the next poll re-delivers the same events.
                        debug!(id, tx_hash = %executed.tx_hash, "Destination receipt not found yet");
                        return Ok(());
                    }
                    Err(ChainError::Transient(e)) => {
                        debug!(id, error = %e, "Transient error fetching destination receipt, will retry");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let change = self
            .messages
            .write()
            .await
            .apply_events(id, events, destination_transaction);
        self.after_change(id, change).await
    }

    /// Alternate path for chains tracked by the external indexing service.
    pub async fn update_from_external_tracker(
        &self,
        id: &str,
        record: &IndexerRecord,
    ) -> Result<()> {
        let change = self.messages.write().await.apply_external_record(id, record);
        self.after_change(id, change).await
    }

    /// Shared tail of every message update: persist on change and deliver
    /// the terminal notification exactly once (edge-triggered).
    async fn after_change(&self, id: &str, change: Option<StatusChange>) -> Result<()> {
        let Some(change) = change else {
            return Ok(()); // stale reference
        };
        // Persist even without a status change: merged events must survive
        // a restart.
        self.persist_messages().await;
        if !change.changed() {
            return Ok(());
        }

        info!(id, old = %change.old, new = %change.new, "XMessage status changed");

        if change.entered_terminal() {
            metrics::record_message_finalized(change.new.as_str());
            self.events.write().await.disable_scanner(id);
            let Some(message) = self.get_message(id).await else {
                return Ok(());
            };
            self.on_message_update(&message).await?;
        }
        Ok(())
    }

    /// React to a hop reaching a terminal status: finalize the owning
    /// transaction or spawn the secondary hop.
    async fn on_message_update(&self, message: &XMessage) -> Result<()> {
        let Some(transaction) = self.get_transaction(&message.x_transaction_id).await else {
            return Ok(()); // transaction already cleaned up
        };

        match message.status {
            XMessageStatus::CallExecuted => {
                if message.is_primary && transaction.secondary_message_required {
                    self.create_secondary_message(&transaction, message).await?;
                } else {
                    self.success(&transaction.id).await;
                }
            }
            XMessageStatus::Failed | XMessageStatus::Rollbacked => {
                self.fail(&transaction.id).await;
            }
            _ => {}
        }
        Ok(())
    }

    /// Build the second hop from an executed primary hop, sourcing it from
    /// the primary's destination transaction.
    async fn create_secondary_message(
        &self,
        transaction: &XTransaction,
        primary: &XMessage,
    ) -> Result<()> {
        let secondary = if primary.use_external_tracker {
            let dest_hash = primary.destination_transaction_hash.clone().ok_or_else(|| {
                eyre!(
                    "invariant violation: executed primary hop {} has no destination transaction hash",
                    primary.id
                )
            })?;
            // The indexer reported the hop executed; it only hands us the
            // hash, so the new source transaction is rebuilt from it.
            let source_transaction = primary.destination_transaction.clone().unwrap_or(Transaction {
                hash: dest_hash.clone(),
                x_chain_id: primary.destination_chain_id.clone(),
                status: TransactionStatus::Success,
                raw_event_logs: Vec::new(),
                timestamp: chrono::Utc::now(),
            });
            messages::secondary_message(
                &transaction.id,
                &transaction.final_destination_chain_id,
                transaction.final_destination_chain_initial_block_height,
                primary,
                source_transaction,
                Some(dest_hash),
            )
        } else {
            let source_transaction = primary.destination_transaction.clone().ok_or_else(|| {
                eyre!(
                    "invariant violation: executed primary hop {} has no destination transaction",
                    primary.id
                )
            })?;
            messages::secondary_message(
                &transaction.id,
                &transaction.final_destination_chain_id,
                transaction.final_destination_chain_initial_block_height,
                primary,
                source_transaction,
                None,
            )
        };

        let secondary_id = secondary.id.clone();
        let use_external = secondary.use_external_tracker;
        if !self.messages.write().await.add(secondary) {
            return Ok(()); // already created
        }
        if !use_external {
            self.events.write().await.enable_scanner(
                &secondary_id,
                &transaction.final_destination_chain_id,
                transaction.final_destination_chain_initial_block_height,
            );
        }
        self.persist_messages().await;
        info!(
            transaction = %transaction.id,
            secondary = %secondary_id,
            "Secondary XMessage created"
        );
        Ok(())
    }

    async fn persist_messages(&self) {
        let Some(store) = &self.options.persistence else {
            return;
        };
        let snapshot = self.messages.read().await.all().clone();
        if let Err(e) = store.save(&snapshot) {
            error!(error = %e, "Failed to persist XMessage store");
        }
    }

    // ------------------------------------------------------------------
    // Event scanner passthroughs
    // ------------------------------------------------------------------

    pub async fn enable_scanner(&self, subscriber: &str, chain_id: &XChainId, start_height: u64) {
        self.events
            .write()
            .await
            .enable_scanner(subscriber, chain_id, start_height);
    }

    pub async fn disable_scanner(&self, subscriber: &str) {
        self.events.write().await.disable_scanner(subscriber);
    }

    pub async fn disable_all_scanners(&self) {
        self.events.write().await.disable_all();
    }

    pub async fn destination_events(&self, chain_id: &XChainId, sn: u64) -> XCallEventMap {
        self.events.read().await.destination_events(chain_id, sn)
    }

    // ------------------------------------------------------------------
    // Polling loops
    // ------------------------------------------------------------------

    /// Run the scan and refresh loops until a shutdown signal arrives.
    pub async fn run(&self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        let mut scan = tokio::time::interval(self.options.scan_interval);
        let mut refresh = tokio::time::interval(self.options.refresh_interval);
        scan.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            scan_interval_ms = self.options.scan_interval.as_millis() as u64,
            refresh_interval_ms = self.options.refresh_interval.as_millis() as u64,
            "Tracker loops starting"
        );

        loop {
            tokio::select! {
                _ = scan.tick() => self.scan_tick().await,
                _ = refresh.tick() => self.refresh_tick().await,
                _ = shutdown.recv() => {
                    info!("Shutdown signal received, stopping tracker");
                    return Ok(());
                }
            }
        }
    }

    /// One scan pass: for every chain with an enabled scanner, refresh the
    /// chain height, fetch the cursor block if it is not cached yet, then
    /// advance the cursor (never beyond the chain height). Transient chain
    /// errors are logged and retried on the next tick.
    pub async fn scan_tick(&self) {
        let chains = self.events.read().await.enabled_chains();
        futures::future::join_all(chains.iter().map(|chain| self.scan_chain(chain))).await;
    }

    async fn scan_chain(&self, chain_id: &XChainId) {
        let client = match self.chains.get(chain_id) {
            Ok(client) => client,
            Err(e) => {
                error!(%chain_id, error = %e, "No chain client for enabled scanner");
                return;
            }
        };

        match client.get_block_height().await {
            Ok(height) => {
                self.events.write().await.set_chain_height(chain_id, height);
            }
            Err(e) => {
                debug!(%chain_id, error = %e, "Failed to update chain height, will retry");
                metrics::record_error(chain_id.as_str(), "chain_height");
            }
        }

        let target = self.events.read().await.next_unscanned(chain_id);
        if let Some(height) = target {
            match client.get_events_in_block(height).await {
                Ok(events) => {
                    let found = events.len();
                    if found > 0 {
                        info!(%chain_id, height, found, "xCall events discovered");
                    }
                    self.events
                        .write()
                        .await
                        .record_block(chain_id, height, events);
                    metrics::record_block_scanned(chain_id.as_str(), found);
                }
                Err(e) => {
                    warn!(%chain_id, height, error = %e, "Block scan failed, will retry");
                    metrics::record_error(chain_id.as_str(), "scan_block");
                    return; // retry the same block next tick
                }
            }
        }

        let mut events = self.events.write().await;
        events.increment_cursor(chain_id);
        if let Some(state) = events.scanner(chain_id) {
            metrics::record_scan_position(chain_id.as_str(), state.cursor, state.chain_height);
        }
    }

    /// One refresh pass over every non-terminal hop: poll the pending
    /// source receipt, pull destination events from the cache (or the
    /// external indexer), and apply the stall timeout if configured.
    pub async fn refresh_tick(&self) {
        let pending = self.messages.read().await.non_terminal();
        for message in pending {
            if let Err(e) = self.refresh_message(&message).await {
                // Invariant violations land here; they indicate a logic bug
                // and must not be silently swallowed.
                error!(id = %message.id, error = %e, "Failed to refresh XMessage");
            }
        }
    }

    async fn refresh_message(&self, message: &XMessage) -> Result<()> {
        if message.use_external_tracker {
            self.refresh_from_indexer(message).await;
        } else {
            self.refresh_from_chain(message).await?;
        }

        if let Some(max_advances) = self.options.stall_timeout_advances {
            self.check_stall(&message.id, max_advances).await?;
        }
        Ok(())
    }

    async fn refresh_from_indexer(&self, message: &XMessage) {
        let Some(indexer) = &self.options.indexer else {
            warn!(id = %message.id, "Hop requires the external indexer but none is configured");
            return;
        };
        match indexer.find_message(message.tracking_hash()).await {
            Ok(Some(record)) => {
                if let Err(e) = self.update_from_external_tracker(&message.id, &record).await {
                    error!(id = %message.id, error = %e, "Failed to apply indexer record");
                }
            }
            Ok(None) => {}
            Err(e) => {
                debug!(id = %message.id, error = %e, "Indexer poll failed, will retry");
                metrics::record_error(message.source_chain_id.as_str(), "indexer");
            }
        }
    }

    async fn refresh_from_chain(&self, message: &XMessage) -> Result<()> {
        // A hop that is still in flight keeps its destination scanner alive.
        {
            let mut events = self.events.write().await;
            if !events.is_scanner_enabled(&message.id) {
                events.enable_scanner(
                    &message.id,
                    &message.destination_chain_id,
                    message.destination_chain_initial_block_height,
                );
            }
        }

        if message.source_transaction.status == TransactionStatus::Pending {
            let client = self.chains.get(&message.source_chain_id)?;
            match client.get_tx_receipt(&message.source_transaction.hash).await {
                Ok(Some(raw)) => self.update_source_transaction(&message.id, &raw).await?,
                Ok(None) => {}
                Err(e) => {
                    debug!(id = %message.id, error = %e, "Receipt poll failed, will retry");
                    metrics::record_error(message.source_chain_id.as_str(), "receipt");
                }
            }
        }

        // Re-read: the receipt may have just advanced the status.
        let Some(message) = self.get_message(&message.id).await else {
            return Ok(());
        };

        match message.status {
            // A secondary hop starts as Requested with an already-finalized
            // source transaction, so Requested takes the same path.
            XMessageStatus::Requested | XMessageStatus::AwaitingCallMessageSent => {
                let client = self.chains.get(&message.source_chain_id)?;
                match client
                    .get_call_message_sent_event(&message.source_transaction)
                    .await
                {
                    Ok(Some(event)) => {
                        let mut events = XCallEventMap::new();
                        events.insert(XCallEventType::CallMessageSent, event);
                        self.update_message_events(&message.id, events).await?;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!(id = %message.id, error = %e, "CallMessageSent lookup failed, will retry");
                        metrics::record_error(message.source_chain_id.as_str(), "call_message_sent");
                    }
                }
            }
            XMessageStatus::CallMessageSent | XMessageStatus::CallMessage => {
                let sn = message
                    .events
                    .get(&XCallEventType::CallMessageSent)
                    .and_then(|e| e.sn);
                if let Some(sn) = sn {
                    let discovered = self
                        .events
                        .read()
                        .await
                        .destination_events(&message.destination_chain_id, sn);
                    if !discovered.is_empty() {
                        self.update_message_events(&message.id, discovered).await?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Fail a hop that has watched the destination chain advance
    /// `max_advances` blocks without any status progress.
    async fn check_stall(&self, id: &str, max_advances: u64) -> Result<()> {
        let Some(message) = self.get_message(id).await else {
            self.stall.lock().await.remove(id);
            return Ok(());
        };
        if message.status.is_terminal() {
            self.stall.lock().await.remove(id);
            return Ok(());
        }

        let height = self
            .events
            .read()
            .await
            .scanner(&message.destination_chain_id)
            .map(|s| s.chain_height)
            .unwrap_or(0);

        let stalled = {
            let mut stall = self.stall.lock().await;
            let entry = stall.entry(id.to_string()).or_insert(StallTracker {
                last_status: message.status,
                last_height: height,
                advances: 0,
            });
            if entry.last_status != message.status {
                entry.last_status = message.status;
                entry.advances = 0;
                entry.last_height = height;
                false
            } else if height > entry.last_height {
                entry.advances += height - entry.last_height;
                entry.last_height = height;
                entry.advances >= max_advances
            } else {
                false
            }
        };

        if stalled {
            warn!(id, max_advances, "XMessage stalled, forcing failure");
            let change = self.messages.write().await.force_fail(id);
            self.after_change(id, change).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection for the status API
    // ------------------------------------------------------------------

    pub async fn snapshot(&self) -> TrackerSnapshot {
        let messages = self.messages.read().await;
        let transactions = self.transactions.read().await;
        let events = self.events.read().await;

        let scanners = events
            .enabled_chains()
            .into_iter()
            .filter_map(|chain| {
                events.scanner(&chain).map(|s| ScannerInfo {
                    cursor: s.cursor,
                    chain_height: s.chain_height,
                    cached_blocks: events.cached_block_count(&chain),
                    chain_id: chain.to_string(),
                })
            })
            .collect();

        TrackerSnapshot {
            messages_total: messages.len(),
            message_status_counts: to_owned_counts(messages.status_counts()),
            transactions_total: transactions.len(),
            transaction_status_counts: to_owned_counts(transactions.status_counts()),
            current_transaction: transactions.current().map(|t| CurrentTransaction {
                id: t.id.clone(),
                transaction_type: t.transaction_type.to_string(),
                status: t.status.to_string(),
            }),
            scanners,
        }
    }

    pub async fn pending_messages(&self) -> Vec<MessageInfo> {
        self.messages
            .read()
            .await
            .non_terminal()
            .iter()
            .map(|m| MessageInfo {
                id: m.id.clone(),
                status: m.status.to_string(),
                description: messages::status_description(m),
                source_chain_id: m.source_chain_id.to_string(),
                destination_chain_id: m.destination_chain_id.to_string(),
                is_primary: m.is_primary,
            })
            .collect()
    }
}

fn to_owned_counts(counts: BTreeMap<&'static str, usize>) -> BTreeMap<String, usize> {
    counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Point-in-time view of the tracker for the status API.
#[derive(Debug, Serialize)]
pub struct TrackerSnapshot {
    pub messages_total: usize,
    pub message_status_counts: BTreeMap<String, usize>,
    pub transactions_total: usize,
    pub transaction_status_counts: BTreeMap<String, usize>,
    pub current_transaction: Option<CurrentTransaction>,
    pub scanners: Vec<ScannerInfo>,
}

#[derive(Debug, Serialize)]
pub struct CurrentTransaction {
    pub id: String,
    pub transaction_type: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ScannerInfo {
    pub chain_id: String,
    pub cursor: u64,
    pub chain_height: u64,
    pub cached_blocks: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageInfo {
    pub id: String,
    pub status: String,
    pub description: String,
    pub source_chain_id: String,
    pub destination_chain_id: String,
    pub is_primary: bool,
}
