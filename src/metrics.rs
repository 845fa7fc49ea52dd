//! Prometheus metrics for the xCall tracker.
//!
//! Exposed on the /metrics endpoint for scraping.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Gauge, GaugeVec,
};

lazy_static! {
    // Block scanning
    pub static ref BLOCKS_SCANNED: CounterVec = register_counter_vec!(
        "xcall_blocks_scanned_total",
        "Total number of destination blocks scanned",
        &["chain"]
    ).unwrap();

    pub static ref CHAIN_HEIGHT: GaugeVec = register_gauge_vec!(
        "xcall_chain_height",
        "Last observed chain height",
        &["chain"]
    ).unwrap();

    pub static ref SCAN_CURSOR: GaugeVec = register_gauge_vec!(
        "xcall_scan_cursor",
        "Current scan cursor per chain",
        &["chain"]
    ).unwrap();

    pub static ref EVENTS_DISCOVERED: CounterVec = register_counter_vec!(
        "xcall_events_discovered_total",
        "Total number of xCall events discovered",
        &["chain"]
    ).unwrap();

    // Message / transaction outcomes
    pub static ref MESSAGES_FINALIZED: CounterVec = register_counter_vec!(
        "xcall_messages_finalized_total",
        "Messages that reached a terminal status",
        &["status"]
    ).unwrap();

    pub static ref TRANSACTIONS_FINALIZED: CounterVec = register_counter_vec!(
        "xcall_transactions_finalized_total",
        "Transactions that reached a terminal status",
        &["status"]
    ).unwrap();

    // Errors
    pub static ref ERRORS: CounterVec = register_counter_vec!(
        "xcall_errors_total",
        "Total number of errors",
        &["chain", "type"]
    ).unwrap();

    // Health
    pub static ref UP: Gauge = register_gauge!(
        "xcall_up",
        "Whether the tracker is up and running"
    ).unwrap();
}

/// Record a destination block scanned
pub fn record_block_scanned(chain: &str, events_found: usize) {
    BLOCKS_SCANNED.with_label_values(&[chain]).inc();
    if events_found > 0 {
        EVENTS_DISCOVERED
            .with_label_values(&[chain])
            .inc_by(events_found as f64);
    }
}

/// Record the latest observed chain height and scan cursor
pub fn record_scan_position(chain: &str, cursor: u64, chain_height: u64) {
    SCAN_CURSOR.with_label_values(&[chain]).set(cursor as f64);
    CHAIN_HEIGHT
        .with_label_values(&[chain])
        .set(chain_height as f64);
}

/// Record a message reaching a terminal status
pub fn record_message_finalized(status: &str) {
    MESSAGES_FINALIZED.with_label_values(&[status]).inc();
}

/// Record a transaction reaching a terminal status
pub fn record_transaction_finalized(status: &str) {
    TRANSACTIONS_FINALIZED.with_label_values(&[status]).inc();
}

/// Record an error
pub fn record_error(chain: &str, error_type: &str) {
    ERRORS.with_label_values(&[chain, error_type]).inc();
}
