//! Common types for cross-chain xCall tracking
//!
//! The tracker models one user action as an `XTransaction` made of one or
//! two `XMessage` hops. Each hop combines a source-chain `Transaction` with
//! the `XCallEvent`s discovered on the destination chain.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persist::{bigint, bigint_opt};

/// Identifier of one supported chain (e.g. "0x1.icon", "0xa4b1.arbitrum").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct XChainId(pub String);

impl XChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for XChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for XChainId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status of a chain-native transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failure,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failure => "failure",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chain-native transaction envelope.
///
/// Mutable while pending (receipt polling updates status and logs),
/// immutable once it reaches success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub x_chain_id: XChainId,
    pub status: TransactionStatus,
    /// Opaque, chain-specific event logs extracted from the receipt.
    #[serde(default)]
    pub raw_event_logs: Vec<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn pending(hash: impl Into<String>, x_chain_id: XChainId) -> Self {
        Self {
            hash: hash.into(),
            x_chain_id,
            status: TransactionStatus::Pending,
            raw_event_logs: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}

/// Kind of a cross-chain call event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum XCallEventType {
    CallMessageSent,
    CallMessage,
    CallExecuted,
}

impl XCallEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            XCallEventType::CallMessageSent => "CallMessageSent",
            XCallEventType::CallMessage => "CallMessage",
            XCallEventType::CallExecuted => "CallExecuted",
        }
    }
}

impl fmt::Display for XCallEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Execution code reported by a CallExecuted event that indicates success.
pub const CALL_EXECUTED_SUCCESS_CODE: i64 = 1;

/// A typed cross-chain call event discovered on a chain at a given height.
///
/// `sn` correlates origin and destination events of one logical call;
/// CallExecuted events carry no `sn` and are correlated through `req_id`
/// instead. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XCallEvent {
    pub event_type: XCallEventType,
    pub x_chain_id: XChainId,
    #[serde(with = "bigint_opt", default)]
    pub sn: Option<u64>,
    #[serde(with = "bigint_opt", default)]
    pub req_id: Option<u64>,
    /// Execution code from CallExecuted (1 = success).
    #[serde(default)]
    pub code: Option<i64>,
    pub tx_hash: String,
    #[serde(with = "bigint")]
    pub block_height: u64,
}

/// Accumulated events of one hop, keyed by event kind.
pub type XCallEventMap = BTreeMap<XCallEventType, XCallEvent>;

/// Status of one directed hop of a cross-chain call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum XMessageStatus {
    Requested,
    AwaitingCallMessageSent,
    CallMessageSent,
    CallMessage,
    CallExecuted,
    Failed,
    Rollbacked,
}

impl XMessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            XMessageStatus::Requested => "REQUESTED",
            XMessageStatus::AwaitingCallMessageSent => "AWAITING_CALL_MESSAGE_SENT",
            XMessageStatus::CallMessageSent => "CALL_MESSAGE_SENT",
            XMessageStatus::CallMessage => "CALL_MESSAGE",
            XMessageStatus::CallExecuted => "CALL_EXECUTED",
            XMessageStatus::Failed => "FAILED",
            XMessageStatus::Rollbacked => "ROLLBACKED",
        }
    }

    /// CallExecuted, Failed and Rollbacked are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            XMessageStatus::CallExecuted | XMessageStatus::Failed | XMessageStatus::Rollbacked
        )
    }
}

impl fmt::Display for XMessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One directed hop (source chain -> destination chain) of a cross-chain
/// operation. Mutated only by the message store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XMessage {
    /// Derived from source chain + source tx hash: `"<chain>/<hash>"`.
    pub id: String,
    pub x_transaction_id: String,
    pub source_chain_id: XChainId,
    pub destination_chain_id: XChainId,
    pub source_transaction: Transaction,
    /// Populated only after CallExecuted is observed.
    #[serde(default)]
    pub destination_transaction: Option<Transaction>,
    #[serde(default)]
    pub events: XCallEventMap,
    pub status: XMessageStatus,
    /// Scan start on the destination chain.
    #[serde(with = "bigint")]
    pub destination_chain_initial_block_height: u64,
    pub is_primary: bool,
    /// Tracked through the external indexing service instead of local block
    /// scanning (chains whose relay progress is not locally observable).
    #[serde(default)]
    pub use_external_tracker: bool,
    /// Hash to poll the external indexing service with; defaults to the
    /// source transaction hash.
    #[serde(default)]
    pub source_transaction_hash: Option<String>,
    /// Destination tx hash reported by the external indexing service.
    #[serde(default)]
    pub destination_transaction_hash: Option<String>,
}

impl XMessage {
    pub fn message_id(chain: &XChainId, tx_hash: &str) -> String {
        format!("{}/{}", chain, tx_hash)
    }

    /// Hash used when polling the external indexing service.
    pub fn tracking_hash(&self) -> &str {
        self.source_transaction_hash
            .as_deref()
            .unwrap_or(&self.source_transaction.hash)
    }
}

/// Kind of user-initiated multi-chain operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XTransactionType {
    Bridge,
    Swap,
    DepositCollateral,
    WithdrawCollateral,
    AddLiquidity,
}

impl XTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            XTransactionType::Bridge => "bridge",
            XTransactionType::Swap => "swap",
            XTransactionType::DepositCollateral => "deposit_collateral",
            XTransactionType::WithdrawCollateral => "withdraw_collateral",
            XTransactionType::AddLiquidity => "add_liquidity",
        }
    }
}

impl fmt::Display for XTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall status of a user-initiated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XTransactionStatus {
    Pending,
    Success,
    Failure,
}

impl XTransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            XTransactionStatus::Pending => "pending",
            XTransactionStatus::Success => "success",
            XTransactionStatus::Failure => "failure",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, XTransactionStatus::Pending)
    }
}

impl fmt::Display for XTransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One user-initiated multi-chain operation, fulfilled by one or two hops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XTransaction {
    pub id: String,
    pub transaction_type: XTransactionType,
    pub source_chain_id: XChainId,
    /// Where the operation ultimately lands; differs from the primary hop's
    /// destination when a secondary hop is required.
    pub final_destination_chain_id: XChainId,
    #[serde(with = "bigint")]
    pub final_destination_chain_initial_block_height: u64,
    pub secondary_message_required: bool,
    pub status: XTransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for starting a new cross-chain operation.
#[derive(Debug, Clone)]
pub struct XTransactionInput {
    pub transaction_type: XTransactionType,
    pub from: XChainId,
    pub to: XChainId,
    /// Intermediate hub chain for two-hop routes. When set (and different
    /// from `to`), the primary hop targets `via` and a secondary hop
    /// `via -> to` is created once the primary executes.
    pub via: Option<XChainId>,
    /// Opaque, pre-signed submission payload for the source chain.
    pub payload: serde_json::Value,
    /// Track this operation through the external indexing service.
    pub use_external_tracker: bool,
}

impl XTransactionInput {
    /// Destination chain of the primary hop.
    pub fn primary_destination(&self) -> &XChainId {
        match &self.via {
            Some(via) if *via != self.to => via,
            _ => &self.to,
        }
    }

    pub fn secondary_message_required(&self) -> bool {
        matches!(&self.via, Some(via) if *via != self.to)
    }
}
