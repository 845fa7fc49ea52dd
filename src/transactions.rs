//! XTransaction table and the single-flight invariant.
//!
//! Exactly one transaction may be current at a time. Terminal transitions
//! are idempotent and driven exclusively by message terminal-state
//! callbacks, never set directly by callers.

use std::collections::BTreeMap;

use eyre::{eyre, Result};

use crate::types::{XTransaction, XTransactionStatus};

#[derive(Debug, Default)]
pub struct XTransactionStore {
    transactions: BTreeMap<String, XTransaction>,
    current_id: Option<String>,
}

impl XTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new transaction and mark it current. Rejected while another
    /// transaction is still current (single-flight).
    pub fn insert_active(&mut self, transaction: XTransaction) -> Result<()> {
        if let Some(current) = &self.current_id {
            return Err(eyre!(
                "transaction {} is still in flight; reset before starting a new one",
                current
            ));
        }
        self.current_id = Some(transaction.id.clone());
        self.transactions
            .insert(transaction.id.clone(), transaction);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&XTransaction> {
        self.transactions.get(id)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn current(&self) -> Option<&XTransaction> {
        self.current_id
            .as_deref()
            .and_then(|id| self.transactions.get(id))
    }

    /// Terminal success. Returns true on the transition edge; repeated calls
    /// and calls on already-terminal transactions are no-ops.
    pub fn success(&mut self, id: &str) -> bool {
        self.finalize(id, XTransactionStatus::Success)
    }

    /// Terminal failure, same idempotence as `success`.
    pub fn fail(&mut self, id: &str) -> bool {
        self.finalize(id, XTransactionStatus::Failure)
    }

    fn finalize(&mut self, id: &str, status: XTransactionStatus) -> bool {
        let Some(transaction) = self.transactions.get_mut(id) else {
            return false;
        };
        if transaction.status.is_terminal() {
            return false;
        }
        transaction.status = status;
        tracing::info!(id, status = %status, "XTransaction finalized");
        true
    }

    /// Clear the current id so a new transaction may start. Historical
    /// records are kept.
    pub fn reset(&mut self) {
        self.current_id = None;
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn status_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for transaction in self.transactions.values() {
            *counts.entry(transaction.status.as_str()).or_insert(0) += 1;
        }
        counts
    }
}
