//! Client for the external xCall indexing service.
//!
//! Some chains' relay progress is reported by a hosted indexer rather than
//! locally scanned events. The tracker polls it by source transaction hash
//! and maps its status vocabulary onto `XMessageStatus`.

use eyre::{Result, WrapErr};
use serde::Deserialize;

use crate::types::XMessageStatus;

/// Relay status vocabulary of the indexing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexerStatus {
    Pending,
    Delivered,
    Executed,
    Rollbacked,
}

impl IndexerStatus {
    pub fn as_message_status(self) -> XMessageStatus {
        match self {
            IndexerStatus::Pending => XMessageStatus::CallMessageSent,
            IndexerStatus::Delivered => XMessageStatus::CallMessage,
            IndexerStatus::Executed => XMessageStatus::CallExecuted,
            IndexerStatus::Rollbacked => XMessageStatus::Rollbacked,
        }
    }
}

/// One message record as reported by the indexing service.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerRecord {
    pub status: IndexerStatus,
    #[serde(default)]
    pub src_tx_hash: Option<String>,
    #[serde(default)]
    pub dest_tx_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<IndexerRecord>,
}

/// HTTP client for the indexing service.
#[derive(Debug, Clone)]
pub struct XCallScanClient {
    base_url: String,
    client: reqwest::Client,
}

impl XCallScanClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .wrap_err("Failed to build indexer HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Look up the message originating from `src_tx_hash`, if the indexer
    /// has picked it up yet.
    pub async fn find_message(&self, src_tx_hash: &str) -> Result<Option<IndexerRecord>> {
        let url = format!("{}/api/search?value={}", self.base_url, src_tx_hash);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .wrap_err("Indexer request failed")?
            .error_for_status()
            .wrap_err("Indexer returned an error status")?
            .json::<SearchResponse>()
            .await
            .wrap_err("Failed to decode indexer response")?;

        Ok(response
            .data
            .into_iter()
            .find(|m| m.src_tx_hash.as_deref() == Some(src_tx_hash)))
    }
}
