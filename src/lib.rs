//! xCall Tracker - Library interface
//!
//! Re-exports internal modules for use in integration tests.

pub mod api;
pub mod chain;
pub mod chains;
pub mod config;
pub mod indexer;
pub mod messages;
pub mod metrics;
pub mod persist;
pub mod scanner;
pub mod tracker;
pub mod transactions;
pub mod types;
