//! XMessage table and status derivation.
//!
//! A message's status is never set directly: it is recomputed from the full
//! accumulated state (source transaction, event map, destination
//! transaction) on every update, so re-applying an already-seen event is
//! idempotent and a stale delivery can never regress the status. The only
//! exception is the external-tracker path, which maps the indexing
//! service's status vocabulary onto the same enum.

use std::collections::BTreeMap;

use crate::indexer::IndexerRecord;
use crate::types::{
    Transaction, TransactionStatus, XCallEventMap, XCallEventType, XChainId, XMessage,
    XMessageStatus, CALL_EXECUTED_SUCCESS_CODE,
};

/// Derive a hop's status from its accumulated state.
pub fn derive_status(
    source_transaction: Option<&Transaction>,
    events: &XCallEventMap,
    destination_transaction: Option<&Transaction>,
) -> XMessageStatus {
    let Some(source) = source_transaction else {
        return XMessageStatus::Failed;
    };

    match source.status {
        TransactionStatus::Pending => XMessageStatus::Requested,
        TransactionStatus::Failure => XMessageStatus::Failed,
        TransactionStatus::Success => {
            if let Some(executed) = events.get(&XCallEventType::CallExecuted) {
                let reverted = executed.code != Some(CALL_EXECUTED_SUCCESS_CODE)
                    || !destination_transaction
                        .is_some_and(|tx| tx.status == TransactionStatus::Success);
                if reverted {
                    XMessageStatus::Failed
                } else {
                    XMessageStatus::CallExecuted
                }
            } else if events.contains_key(&XCallEventType::CallMessage) {
                XMessageStatus::CallMessage
            } else if events.contains_key(&XCallEventType::CallMessageSent) {
                XMessageStatus::CallMessageSent
            } else {
                XMessageStatus::AwaitingCallMessageSent
            }
        }
    }
}

/// A status recomputation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub old: XMessageStatus,
    pub new: XMessageStatus,
}

impl StatusChange {
    pub fn changed(&self) -> bool {
        self.old != self.new
    }

    /// True exactly when this update crossed into a terminal state.
    /// Terminal notifications are edge-triggered on this.
    pub fn entered_terminal(&self) -> bool {
        self.changed() && self.new.is_terminal()
    }
}

/// The message table. All mutation goes through these operations.
#[derive(Debug, Default)]
pub struct XMessageStore {
    messages: BTreeMap<String, XMessage>,
}

impl XMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: BTreeMap<String, XMessage>) -> Self {
        Self { messages }
    }

    /// Idempotent create: an existing id is left untouched.
    pub fn add(&mut self, message: XMessage) -> bool {
        if self.messages.contains_key(&message.id) {
            return false;
        }
        tracing::debug!(
            id = %message.id,
            source = %message.source_chain_id,
            destination = %message.destination_chain_id,
            is_primary = message.is_primary,
            "XMessage added"
        );
        self.messages.insert(message.id.clone(), message);
        true
    }

    pub fn get(&self, id: &str) -> Option<&XMessage> {
        self.messages.get(id)
    }

    /// The primary or secondary hop of a transaction.
    pub fn get_of(&self, x_transaction_id: &str, is_primary: bool) -> Option<&XMessage> {
        self.messages
            .values()
            .find(|m| m.is_primary == is_primary && m.x_transaction_id == x_transaction_id)
    }

    pub fn remove(&mut self, id: &str) -> Option<XMessage> {
        self.messages.remove(id)
    }

    pub fn messages(&self) -> impl Iterator<Item = &XMessage> {
        self.messages.values()
    }

    pub fn all(&self) -> &BTreeMap<String, XMessage> {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Snapshot of hops that still need tracking.
    pub fn non_terminal(&self) -> Vec<XMessage> {
        self.messages
            .values()
            .filter(|m| !m.status.is_terminal())
            .cloned()
            .collect()
    }

    pub fn status_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for message in self.messages.values() {
            *counts.entry(message.status.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Apply a newly polled source receipt: replace the source transaction's
    /// status/logs and recompute. Unknown ids are benign no-ops.
    pub fn apply_source_receipt(
        &mut self,
        id: &str,
        status: TransactionStatus,
        raw_event_logs: Vec<serde_json::Value>,
    ) -> Option<StatusChange> {
        let message = self.messages.get_mut(id)?;

        message.source_transaction.status = status;
        message.source_transaction.raw_event_logs = raw_event_logs;

        let change = StatusChange {
            old: message.status,
            new: derive_status(
                Some(&message.source_transaction),
                &message.events,
                message.destination_transaction.as_ref(),
            ),
        };
        message.status = change.new;
        Some(change)
    }

    /// Merge newly discovered destination events (and the destination
    /// transaction, once CallExecuted has been classified) and recompute.
    pub fn apply_events(
        &mut self,
        id: &str,
        events: XCallEventMap,
        destination_transaction: Option<Transaction>,
    ) -> Option<StatusChange> {
        let message = self.messages.get_mut(id)?;

        message.events.extend(events);
        if destination_transaction.is_some() {
            message.destination_transaction = destination_transaction;
        }

        let change = StatusChange {
            old: message.status,
            new: derive_status(
                Some(&message.source_transaction),
                &message.events,
                message.destination_transaction.as_ref(),
            ),
        };
        message.status = change.new;
        Some(change)
    }

    /// Alternate path for externally tracked hops: the indexing service's
    /// vocabulary maps onto the same status enum.
    pub fn apply_external_record(
        &mut self,
        id: &str,
        record: &IndexerRecord,
    ) -> Option<StatusChange> {
        let message = self.messages.get_mut(id)?;

        let change = StatusChange {
            old: message.status,
            new: record.status.as_message_status(),
        };
        message.status = change.new;
        if record.dest_tx_hash.is_some() {
            message.destination_transaction_hash = record.dest_tx_hash.clone();
        }
        Some(change)
    }

    /// Stall-timeout hardening: force a hop that stopped making progress
    /// into FAILED. No-op on terminal hops.
    pub fn force_fail(&mut self, id: &str) -> Option<StatusChange> {
        let message = self.messages.get_mut(id)?;
        if message.status.is_terminal() {
            return None;
        }
        let change = StatusChange {
            old: message.status,
            new: XMessageStatus::Failed,
        };
        message.status = change.new;
        Some(change)
    }
}

/// Human-readable progress line for a hop (consumed by UI collaborators).
pub fn status_description(message: &XMessage) -> String {
    match message.status {
        XMessageStatus::Requested | XMessageStatus::AwaitingCallMessageSent => {
            format!("Awaiting confirmation on {}...", message.source_chain_id)
        }
        XMessageStatus::CallMessageSent | XMessageStatus::CallMessage => {
            format!(
                "Finalising transaction on {}...",
                message.destination_chain_id
            )
        }
        XMessageStatus::CallExecuted => "Complete.".to_string(),
        XMessageStatus::Failed => "Transfer failed.".to_string(),
        XMessageStatus::Rollbacked => "Transfer rolled back.".to_string(),
    }
}

/// Build the secondary hop from an executed primary hop. The primary's
/// destination transaction becomes the new source.
pub fn secondary_message(
    x_transaction_id: &str,
    final_destination_chain_id: &XChainId,
    final_destination_initial_height: u64,
    primary: &XMessage,
    source_transaction: Transaction,
    source_transaction_hash: Option<String>,
) -> XMessage {
    let source_chain_id = primary.destination_chain_id.clone();
    let id = XMessage::message_id(
        &source_chain_id,
        source_transaction_hash
            .as_deref()
            .unwrap_or(&source_transaction.hash),
    );
    XMessage {
        id,
        x_transaction_id: x_transaction_id.to_string(),
        source_chain_id,
        destination_chain_id: final_destination_chain_id.clone(),
        source_transaction,
        destination_transaction: None,
        events: XCallEventMap::new(),
        status: XMessageStatus::Requested,
        destination_chain_initial_block_height: final_destination_initial_height,
        is_primary: false,
        use_external_tracker: primary.use_external_tracker,
        source_transaction_hash,
        destination_transaction_hash: None,
    }
}
