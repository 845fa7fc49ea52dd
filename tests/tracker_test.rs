//! Integration tests for the tracking engine.
//!
//! A programmable in-memory chain stands in for real RPC endpoints so the
//! scan and refresh loops can be driven tick by tick, deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use xcall_tracker::chain::{ChainClient, ChainError, ChainRegistry, RawTx};
use xcall_tracker::indexer::{IndexerRecord, IndexerStatus};
use xcall_tracker::persist::JsonStore;
use xcall_tracker::tracker::{
    TrackerOptions, XCallTracker, XMESSAGE_STORE_NAME, XMESSAGE_STORE_VERSION,
};
use xcall_tracker::types::{
    Transaction, TransactionStatus, XCallEvent, XCallEventMap, XCallEventType, XChainId,
    XMessageStatus, XTransactionInput, XTransactionStatus,
};

#[derive(Default)]
struct MockState {
    height: u64,
    receipts: HashMap<String, RawTx>,
    blocks: HashMap<u64, Vec<XCallEvent>>,
    sent_events: HashMap<String, XCallEvent>,
    block_fetches: HashMap<u64, u32>,
}

/// A chain whose height, receipts and per-block events are set by the test.
struct MockChain {
    chain_id: XChainId,
    submit_hash: String,
    state: Mutex<MockState>,
}

impl MockChain {
    fn new(chain_id: &str, submit_hash: &str) -> Arc<Self> {
        Arc::new(Self {
            chain_id: XChainId::from(chain_id),
            submit_hash: submit_hash.to_string(),
            state: Mutex::new(MockState::default()),
        })
    }

    fn set_height(&self, height: u64) {
        self.state.lock().unwrap().height = height;
    }

    fn set_receipt(&self, hash: &str, status: &str) {
        self.state
            .lock()
            .unwrap()
            .receipts
            .insert(hash.to_string(), json!({ "status": status, "logs": [] }));
    }

    fn set_block_events(&self, height: u64, events: Vec<XCallEvent>) {
        self.state.lock().unwrap().blocks.insert(height, events);
    }

    fn set_sent_event(&self, tx_hash: &str, sn: u64) {
        let event = XCallEvent {
            event_type: XCallEventType::CallMessageSent,
            x_chain_id: self.chain_id.clone(),
            sn: Some(sn),
            req_id: None,
            code: None,
            tx_hash: tx_hash.to_string(),
            block_height: 1,
        };
        self.state
            .lock()
            .unwrap()
            .sent_events
            .insert(tx_hash.to_string(), event);
    }

    fn fetches_of(&self, height: u64) -> u32 {
        self.state
            .lock()
            .unwrap()
            .block_fetches
            .get(&height)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn chain_id(&self) -> &XChainId {
        &self.chain_id
    }

    async fn submit(&self, _payload: &serde_json::Value) -> Result<String, ChainError> {
        Ok(self.submit_hash.clone())
    }

    async fn get_tx_receipt(&self, hash: &str) -> Result<Option<RawTx>, ChainError> {
        Ok(self.state.lock().unwrap().receipts.get(hash).cloned())
    }

    fn derive_tx_status(&self, raw_tx: &RawTx) -> TransactionStatus {
        match raw_tx["status"].as_str() {
            Some("success") => TransactionStatus::Success,
            Some("failure") => TransactionStatus::Failure,
            _ => TransactionStatus::Pending,
        }
    }

    fn get_tx_event_logs(&self, raw_tx: &RawTx) -> Vec<serde_json::Value> {
        raw_tx["logs"].as_array().cloned().unwrap_or_default()
    }

    async fn get_block_height(&self) -> Result<u64, ChainError> {
        Ok(self.state.lock().unwrap().height)
    }

    async fn get_events_in_block(&self, height: u64) -> Result<Vec<XCallEvent>, ChainError> {
        let mut state = self.state.lock().unwrap();
        *state.block_fetches.entry(height).or_insert(0) += 1;
        Ok(state.blocks.get(&height).cloned().unwrap_or_default())
    }

    async fn get_call_message_sent_event(
        &self,
        transaction: &Transaction,
    ) -> Result<Option<XCallEvent>, ChainError> {
        if transaction.status != TransactionStatus::Success {
            return Ok(None);
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .sent_events
            .get(&transaction.hash)
            .cloned())
    }
}

fn call_message(chain: &str, sn: u64, req_id: u64, height: u64) -> XCallEvent {
    XCallEvent {
        event_type: XCallEventType::CallMessage,
        x_chain_id: XChainId::from(chain),
        sn: Some(sn),
        req_id: Some(req_id),
        code: None,
        tx_hash: format!("0xmsg{}", sn),
        block_height: height,
    }
}

fn call_executed(chain: &str, req_id: u64, code: i64, tx_hash: &str, height: u64) -> XCallEvent {
    XCallEvent {
        event_type: XCallEventType::CallExecuted,
        x_chain_id: XChainId::from(chain),
        sn: None,
        req_id: Some(req_id),
        code: Some(code),
        tx_hash: tx_hash.to_string(),
        block_height: height,
    }
}

fn bridge_input(from: &str, to: &str) -> XTransactionInput {
    XTransactionInput {
        transaction_type: xcall_tracker::types::XTransactionType::Bridge,
        from: XChainId::from(from),
        to: XChainId::from(to),
        via: None,
        payload: json!("0xsigned"),
        use_external_tracker: false,
    }
}

fn swap_input(from: &str, to: &str, via: &str) -> XTransactionInput {
    XTransactionInput {
        transaction_type: xcall_tracker::types::XTransactionType::Swap,
        from: XChainId::from(from),
        to: XChainId::from(to),
        via: Some(XChainId::from(via)),
        payload: json!("0xsigned"),
        use_external_tracker: false,
    }
}

fn tracker_with(chains: Vec<Arc<MockChain>>) -> XCallTracker {
    tracker_with_options(chains, TrackerOptions::default())
}

fn tracker_with_options(chains: Vec<Arc<MockChain>>, options: TrackerOptions) -> XCallTracker {
    let mut registry = ChainRegistry::new();
    for chain in chains {
        registry.register(chain);
    }
    XCallTracker::new(registry, options)
}

fn indexer_record(
    status: IndexerStatus,
    src_tx_hash: &str,
    dest_tx_hash: Option<&str>,
) -> IndexerRecord {
    IndexerRecord {
        status,
        src_tx_hash: Some(src_tx_hash.to_string()),
        dest_tx_hash: dest_tx_hash.map(|h| h.to_string()),
    }
}

#[tokio::test]
async fn single_hop_bridge_runs_to_success() {
    let src = MockChain::new("0x1.icon", "0xsrc1");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    dst.set_height(100);

    let tracker = tracker_with(vec![src.clone(), dst.clone()]);
    let xtx = tracker
        .execute_transfer(bridge_input("0x1.icon", "archway-1"))
        .await
        .unwrap();
    assert_eq!(xtx.id, "0x1.icon/0xsrc1");
    assert!(!xtx.secondary_message_required);

    // No receipt yet: the hop stays in Requested.
    tracker.refresh_tick().await;
    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::Requested);

    // Source confirms and its receipt carries the CallMessageSent event.
    src.set_receipt("0xsrc1", "success");
    src.set_sent_event("0xsrc1", 5);
    tracker.refresh_tick().await;
    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::CallMessageSent);

    // CallMessage lands in destination block 101.
    dst.set_height(101);
    dst.set_block_events(101, vec![call_message("archway-1", 5, 9, 101)]);
    tracker.scan_tick().await; // scans 100 (empty), cursor -> 101
    tracker.scan_tick().await; // scans 101
    tracker.refresh_tick().await;
    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::CallMessage);

    // CallExecuted lands in block 102 but its receipt is not visible yet:
    // the status must hold until the receipt can be classified.
    dst.set_height(102);
    dst.set_block_events(102, vec![call_executed("archway-1", 9, 1, "0xexec", 102)]);
    tracker.scan_tick().await;
    tracker.scan_tick().await;
    tracker.refresh_tick().await;
    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::CallMessage);

    dst.set_receipt("0xexec", "success");
    tracker.refresh_tick().await;
    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::CallExecuted);
    assert!(message.destination_transaction.is_some());

    let xtx = tracker.get_transaction(&xtx.id).await.unwrap();
    assert_eq!(xtx.status, XTransactionStatus::Success);

    // Further ticks are no-ops on a terminal transaction.
    tracker.refresh_tick().await;
    let xtx = tracker.get_transaction(&xtx.id).await.unwrap();
    assert_eq!(xtx.status, XTransactionStatus::Success);
}

#[tokio::test]
async fn blocks_are_scanned_at_most_once() {
    let src = MockChain::new("0x1.icon", "0xsrc1");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    dst.set_height(100);

    let tracker = tracker_with(vec![src, dst.clone()]);
    tracker
        .execute_transfer(bridge_input("0x1.icon", "archway-1"))
        .await
        .unwrap();

    // Chain height holds at 100: the cursor must not pass it and block 100
    // must be fetched exactly once.
    tracker.scan_tick().await;
    tracker.scan_tick().await;
    tracker.scan_tick().await;
    assert_eq!(dst.fetches_of(100), 1);
    assert_eq!(dst.fetches_of(101), 0);

    dst.set_height(101);
    tracker.scan_tick().await; // cursor advances to 101
    tracker.scan_tick().await; // fetches 101
    assert_eq!(dst.fetches_of(100), 1);
    assert_eq!(dst.fetches_of(101), 1);
}

#[tokio::test]
async fn two_hop_swap_creates_one_secondary_and_succeeds_at_the_end() {
    let src = MockChain::new("0xa4b1.arbitrum", "0xsrc1");
    let hub = MockChain::new("0x1.icon", "unused");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    hub.set_height(200);
    dst.set_height(300);

    let tracker = tracker_with(vec![src.clone(), hub.clone(), dst.clone()]);
    let xtx = tracker
        .execute_swap(swap_input("0xa4b1.arbitrum", "archway-1", "0x1.icon"))
        .await
        .unwrap();
    assert!(xtx.secondary_message_required);
    assert_eq!(xtx.final_destination_chain_initial_block_height, 300);

    // Drive the primary hop (src -> hub) to CallExecuted.
    src.set_receipt("0xsrc1", "success");
    src.set_sent_event("0xsrc1", 21);
    tracker.refresh_tick().await;

    hub.set_height(201);
    hub.set_block_events(201, vec![call_message("0x1.icon", 21, 7, 201)]);
    tracker.scan_tick().await;
    tracker.scan_tick().await;
    tracker.refresh_tick().await;

    hub.set_height(202);
    hub.set_block_events(202, vec![call_executed("0x1.icon", 7, 1, "0xhop", 202)]);
    hub.set_receipt("0xhop", "success");
    tracker.scan_tick().await;
    tracker.scan_tick().await;
    tracker.refresh_tick().await;

    let primary = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(primary.status, XMessageStatus::CallExecuted);

    // The transaction is not done: a secondary hop (hub -> dst) now exists,
    // sourced from the hub transaction that executed the call.
    let xtx_mid = tracker.get_transaction(&xtx.id).await.unwrap();
    assert_eq!(xtx_mid.status, XTransactionStatus::Pending);
    let secondary = tracker.get_message("0x1.icon/0xhop").await.unwrap();
    assert!(!secondary.is_primary);
    assert_eq!(secondary.status, XMessageStatus::Requested);
    assert_eq!(secondary.destination_chain_initial_block_height, 300);

    // Drive the secondary hop to CallExecuted on the final destination.
    hub.set_sent_event("0xhop", 22);
    tracker.refresh_tick().await;
    let secondary = tracker.get_message("0x1.icon/0xhop").await.unwrap();
    assert_eq!(secondary.status, XMessageStatus::CallMessageSent);

    dst.set_height(301);
    dst.set_block_events(
        301,
        vec![
            call_message("archway-1", 22, 8, 301),
            call_executed("archway-1", 8, 1, "0xfin", 301),
        ],
    );
    dst.set_receipt("0xfin", "success");
    tracker.scan_tick().await;
    tracker.scan_tick().await;
    tracker.refresh_tick().await;

    let secondary = tracker.get_message("0x1.icon/0xhop").await.unwrap();
    assert_eq!(secondary.status, XMessageStatus::CallExecuted);
    let xtx_done = tracker.get_transaction(&xtx.id).await.unwrap();
    assert_eq!(xtx_done.status, XTransactionStatus::Success);

    // Exactly one secondary was created: the terminal edge fired once.
    tracker.refresh_tick().await;
    assert!(tracker.get_message("0x1.icon/0xhop").await.is_some());
    assert!(tracker.get_message(&xtx.id).await.unwrap().is_primary);
}

#[tokio::test]
async fn failed_source_transaction_fails_the_whole_swap() {
    let src = MockChain::new("0xa4b1.arbitrum", "0xsrc1");
    let hub = MockChain::new("0x1.icon", "unused");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    hub.set_height(200);
    dst.set_height(300);

    let tracker = tracker_with(vec![src.clone(), hub, dst]);
    let xtx = tracker
        .execute_swap(swap_input("0xa4b1.arbitrum", "archway-1", "0x1.icon"))
        .await
        .unwrap();

    src.set_receipt("0xsrc1", "failure");
    tracker.refresh_tick().await;

    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::Failed);
    let xtx_done = tracker.get_transaction(&xtx.id).await.unwrap();
    assert_eq!(xtx_done.status, XTransactionStatus::Failure);

    // No secondary hop after a failure, and repeated ticks change nothing.
    tracker.refresh_tick().await;
    assert!(tracker.get_message("0x1.icon/0xhop").await.is_none());
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Failure
    );
}

#[tokio::test]
async fn reverted_call_execution_fails_the_message() {
    let src = MockChain::new("0x1.icon", "0xsrc1");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    dst.set_height(100);

    let tracker = tracker_with(vec![src.clone(), dst.clone()]);
    let xtx = tracker
        .execute_transfer(bridge_input("0x1.icon", "archway-1"))
        .await
        .unwrap();

    src.set_receipt("0xsrc1", "success");
    src.set_sent_event("0xsrc1", 5);
    tracker.refresh_tick().await;

    // CallExecuted with a non-success code: the hop must fail even though
    // the destination transaction itself succeeded.
    dst.set_height(101);
    dst.set_block_events(
        101,
        vec![
            call_message("archway-1", 5, 9, 101),
            call_executed("archway-1", 9, 0, "0xexec", 101),
        ],
    );
    dst.set_receipt("0xexec", "success");
    tracker.scan_tick().await;
    tracker.scan_tick().await;
    tracker.refresh_tick().await;

    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::Failed);
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Failure
    );
}

#[tokio::test]
async fn only_one_transaction_in_flight() {
    let src = MockChain::new("0x1.icon", "0xsrc1");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    dst.set_height(100);

    let tracker = tracker_with(vec![src.clone(), dst]);
    let xtx = tracker
        .execute_transfer(bridge_input("0x1.icon", "archway-1"))
        .await
        .unwrap();

    // A second submission is rejected while the first is current, even once
    // it has finalized, until reset() clears it.
    assert!(tracker
        .execute_transfer(bridge_input("0x1.icon", "archway-1"))
        .await
        .is_err());

    src.set_receipt("0xsrc1", "failure");
    tracker.refresh_tick().await;
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Failure
    );
    assert!(tracker
        .execute_transfer(bridge_input("0x1.icon", "archway-1"))
        .await
        .is_err());

    tracker.reset().await;
    // History survives the reset.
    assert!(tracker.get_transaction(&xtx.id).await.is_some());
}

#[tokio::test]
async fn indexer_rollback_fails_the_transaction_once() {
    let src = MockChain::new("0x38.bsc", "0xsrc1");
    let dst = MockChain::new("0x1.icon", "unused");
    src.set_height(10);
    dst.set_height(100);

    let tracker = tracker_with(vec![src, dst]);
    let mut input = bridge_input("0x38.bsc", "0x1.icon");
    input.use_external_tracker = true;
    let xtx = tracker.execute_transfer(input).await.unwrap();

    // Externally tracked hops never start a local scanner.
    assert!(tracker.snapshot().await.scanners.is_empty());

    let pending = indexer_record(IndexerStatus::Pending, "0xsrc1", None);
    tracker
        .update_from_external_tracker(&xtx.id, &pending)
        .await
        .unwrap();
    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::CallMessageSent);
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Pending
    );

    let rollback = indexer_record(IndexerStatus::Rollbacked, "0xsrc1", None);
    tracker
        .update_from_external_tracker(&xtx.id, &rollback)
        .await
        .unwrap();
    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::Rollbacked);
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Failure
    );

    // A re-delivered rollback record is a no-op, not a second edge.
    tracker
        .update_from_external_tracker(&xtx.id, &rollback)
        .await
        .unwrap();
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Failure
    );
}

#[tokio::test]
async fn indexer_executed_primary_spawns_secondary_from_dest_hash() {
    let src = MockChain::new("0x38.bsc", "0xsrc1");
    let hub = MockChain::new("0x1.icon", "unused");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    hub.set_height(200);
    dst.set_height(300);

    let tracker = tracker_with(vec![src, hub, dst]);
    let mut input = swap_input("0x38.bsc", "archway-1", "0x1.icon");
    input.use_external_tracker = true;
    let xtx = tracker.execute_swap(input).await.unwrap();

    let executed = indexer_record(IndexerStatus::Executed, "0xsrc1", Some("0xhub1"));
    tracker
        .update_from_external_tracker(&xtx.id, &executed)
        .await
        .unwrap();

    let primary = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(primary.status, XMessageStatus::CallExecuted);
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Pending
    );

    // The secondary hop's source transaction is rebuilt from the reported
    // destination hash, and it stays on the indexer path (no scanner).
    let secondary = tracker.get_message("0x1.icon/0xhub1").await.unwrap();
    assert!(!secondary.is_primary);
    assert!(secondary.use_external_tracker);
    assert_eq!(secondary.status, XMessageStatus::Requested);
    assert_eq!(secondary.source_transaction.hash, "0xhub1");
    assert_eq!(secondary.source_transaction.status, TransactionStatus::Success);
    assert_eq!(secondary.tracking_hash(), "0xhub1");
    assert!(tracker.snapshot().await.scanners.is_empty());

    let finished = indexer_record(IndexerStatus::Executed, "0xhub1", Some("0xfin"));
    tracker
        .update_from_external_tracker("0x1.icon/0xhub1", &finished)
        .await
        .unwrap();
    assert_eq!(
        tracker.get_message("0x1.icon/0xhub1").await.unwrap().status,
        XMessageStatus::CallExecuted
    );
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Success
    );
}

#[tokio::test]
async fn indexer_executed_without_dest_hash_is_a_loud_error() {
    let src = MockChain::new("0x38.bsc", "0xsrc1");
    let hub = MockChain::new("0x1.icon", "unused");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    hub.set_height(200);
    dst.set_height(300);

    let tracker = tracker_with(vec![src, hub, dst]);
    let mut input = swap_input("0x38.bsc", "archway-1", "0x1.icon");
    input.use_external_tracker = true;
    let xtx = tracker.execute_swap(input).await.unwrap();

    // Executed with no destination hash: the secondary hop cannot be
    // sourced, which is an invariant violation, not a silent skip.
    let executed = indexer_record(IndexerStatus::Executed, "0xsrc1", None);
    let err = tracker
        .update_from_external_tracker(&xtx.id, &executed)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("destination transaction hash"));

    assert!(tracker.get_message("0x1.icon/0xhub1").await.is_none());
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Pending
    );
}

#[tokio::test]
async fn stalled_message_is_failed_after_configured_advances() {
    let src = MockChain::new("0x1.icon", "0xsrc1");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    dst.set_height(100);

    let tracker = tracker_with_options(
        vec![src.clone(), dst.clone()],
        TrackerOptions {
            stall_timeout_advances: Some(3),
            ..Default::default()
        },
    );
    let xtx = tracker
        .execute_transfer(bridge_input("0x1.icon", "archway-1"))
        .await
        .unwrap();

    src.set_receipt("0xsrc1", "success");
    src.set_sent_event("0xsrc1", 5);
    tracker.refresh_tick().await;
    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::CallMessageSent);

    // The destination chain advances past the threshold with no events.
    dst.set_height(104);
    tracker.scan_tick().await;
    tracker.refresh_tick().await;

    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::Failed);
    assert_eq!(
        tracker.get_transaction(&xtx.id).await.unwrap().status,
        XTransactionStatus::Failure
    );
}

#[tokio::test]
async fn merged_events_survive_restart() {
    let path = std::env::temp_dir().join(format!(
        "xcall-tracker-it-merged-{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let src = MockChain::new("0x1.icon", "0xsrc1");
    let dst = MockChain::new("archway-1", "unused");
    src.set_height(10);
    dst.set_height(100);

    let tracker = tracker_with_options(
        vec![src, dst],
        TrackerOptions {
            persistence: Some(JsonStore::new(
                &path,
                XMESSAGE_STORE_NAME,
                XMESSAGE_STORE_VERSION,
            )),
            ..Default::default()
        },
    );
    let xtx = tracker
        .execute_transfer(bridge_input("0x1.icon", "archway-1"))
        .await
        .unwrap();

    // An event merged while the source receipt is still pending does not
    // change the status, but must still be durable.
    let mut events = XCallEventMap::new();
    events.insert(
        XCallEventType::CallMessageSent,
        XCallEvent {
            event_type: XCallEventType::CallMessageSent,
            x_chain_id: XChainId::from("0x1.icon"),
            sn: Some(5),
            req_id: None,
            code: None,
            tx_hash: "0xsrc1".to_string(),
            block_height: 10,
        },
    );
    tracker.update_message_events(&xtx.id, events).await.unwrap();
    let message = tracker.get_message(&xtx.id).await.unwrap();
    assert_eq!(message.status, XMessageStatus::Requested);

    // A fresh process restores the merged event map.
    let restarted = tracker_with_options(
        vec![
            MockChain::new("0x1.icon", "unused"),
            MockChain::new("archway-1", "unused"),
        ],
        TrackerOptions {
            persistence: Some(JsonStore::new(
                &path,
                XMESSAGE_STORE_NAME,
                XMESSAGE_STORE_VERSION,
            )),
            ..Default::default()
        },
    );
    let restored = restarted.get_message(&xtx.id).await.unwrap();
    assert_eq!(restored.status, XMessageStatus::Requested);
    assert!(restored.events.contains_key(&XCallEventType::CallMessageSent));

    let _ = std::fs::remove_file(&path);
}
