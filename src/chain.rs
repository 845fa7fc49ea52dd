//! Chain client capability contract.
//!
//! The tracker never branches on chain type: every supported chain provides
//! one `ChainClient` implementation and the core only consumes this trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use eyre::{eyre, Result};
use thiserror::Error;

use crate::types::{Transaction, TransactionStatus, XCallEvent, XChainId};

/// Opaque chain-native receipt.
pub type RawTx = serde_json::Value;

/// Errors surfaced by chain clients.
///
/// `Transient` errors are contained inside the polling loops (logged and
/// retried on the next tick); they never terminate a message or transaction.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("transient chain I/O error: {0}")]
    Transient(String),
    #[error("chain RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed chain response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ChainError {
    fn from(e: reqwest::Error) -> Self {
        ChainError::Transient(e.to_string())
    }
}

/// Per-chain capability set consumed by the tracker.
///
/// All calls are idempotent and safely retryable; the polling loops will
/// call them again after a transient failure.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn chain_id(&self) -> &XChainId;

    /// Submit a pre-signed transaction payload, returning its hash.
    async fn submit(&self, payload: &serde_json::Value) -> Result<String, ChainError>;

    /// Fetch a receipt; `None` while the transaction is still unknown.
    async fn get_tx_receipt(&self, hash: &str) -> Result<Option<RawTx>, ChainError>;

    /// Classify a raw receipt into a lifecycle status.
    fn derive_tx_status(&self, raw_tx: &RawTx) -> TransactionStatus;

    /// Extract the opaque event logs from a raw receipt.
    fn get_tx_event_logs(&self, raw_tx: &RawTx) -> Vec<serde_json::Value>;

    async fn get_block_height(&self) -> Result<u64, ChainError>;

    /// All xCall events emitted in one block.
    async fn get_events_in_block(&self, height: u64) -> Result<Vec<XCallEvent>, ChainError>;

    /// The CallMessageSent event emitted by a finalized source transaction,
    /// if any.
    async fn get_call_message_sent_event(
        &self,
        transaction: &Transaction,
    ) -> Result<Option<XCallEvent>, ChainError>;
}

/// Registry of chain clients keyed by chain id.
#[derive(Clone, Default)]
pub struct ChainRegistry {
    clients: HashMap<XChainId, Arc<dyn ChainClient>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, client: Arc<dyn ChainClient>) {
        self.clients.insert(client.chain_id().clone(), client);
    }

    pub fn get(&self, chain_id: &XChainId) -> Result<Arc<dyn ChainClient>> {
        self.clients
            .get(chain_id)
            .cloned()
            .ok_or_else(|| eyre!("no chain client registered for {}", chain_id))
    }

    pub fn chain_ids(&self) -> Vec<XChainId> {
        self.clients.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
