//! Environment-based configuration.
//!
//! Chains are declared with indexed variables:
//!   CHAINS_COUNT=2
//!   CHAIN_1_ID=0x1.icon  CHAIN_1_KIND=icon  CHAIN_1_RPC_URL=...  CHAIN_1_XCALL_ADDRESS=...
//!   CHAIN_2_ID=...
//! plus global tuning knobs (all optional, see field docs).

use std::time::Duration;

use eyre::{eyre, Result};

use crate::chains::ChainKind;
use crate::types::XChainId;

/// Configuration for a single tracked chain
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub id: XChainId,
    pub kind: ChainKind,
    pub rpc_url: String,
    /// xCall contract address on this chain.
    pub xcall_address: String,
}

/// Tracker configuration
#[derive(Clone)]
pub struct Config {
    pub chains: Vec<ChainConfig>,
    /// Block-scan cadence (SCAN_INTERVAL_MS, default 1000).
    pub scan_interval: Duration,
    /// Message refresh cadence (REFRESH_INTERVAL_MS, default 2000).
    pub refresh_interval: Duration,
    /// Fail a hop after this many destination-height advances without
    /// progress (STALL_TIMEOUT_ADVANCES, disabled when unset or 0).
    pub stall_timeout_advances: Option<u64>,
    /// External indexing service base URL (XCALLSCAN_BASE_URL, optional).
    pub xcallscan_base_url: Option<String>,
    /// Message table file (XMESSAGE_STORE_PATH, in-memory only when unset).
    pub store_path: Option<String>,
    /// Status API bind address (API_BIND, default "0.0.0.0:9090").
    pub api_bind: String,
}

// RPC URLs can embed API keys, keep them out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "chains",
                &self
                    .chains
                    .iter()
                    .map(|c| format!("{} ({})", c.id, c.kind))
                    .collect::<Vec<_>>(),
            )
            .field("scan_interval", &self.scan_interval)
            .field("refresh_interval", &self.refresh_interval)
            .field("stall_timeout_advances", &self.stall_timeout_advances)
            .field("xcallscan_base_url", &self.xcallscan_base_url)
            .field("store_path", &self.store_path)
            .field("api_bind", &self.api_bind)
            .finish()
    }
}

impl Config {
    /// Load configuration from the environment (and .env if present).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let count: usize = std::env::var("CHAINS_COUNT")
            .map_err(|_| eyre!("Missing CHAINS_COUNT"))?
            .parse()
            .map_err(|_| eyre!("Invalid CHAINS_COUNT"))?;

        let mut chains = Vec::with_capacity(count);
        for i in 1..=count {
            let prefix = format!("CHAIN_{}", i);

            let id = std::env::var(format!("{}_ID", prefix))
                .map_err(|_| eyre!("Missing {}_ID", prefix))?;
            let kind: ChainKind = std::env::var(format!("{}_KIND", prefix))
                .map_err(|_| eyre!("Missing {}_KIND", prefix))?
                .parse()?;
            let rpc_url = std::env::var(format!("{}_RPC_URL", prefix))
                .map_err(|_| eyre!("Missing {}_RPC_URL", prefix))?;
            let xcall_address = std::env::var(format!("{}_XCALL_ADDRESS", prefix))
                .map_err(|_| eyre!("Missing {}_XCALL_ADDRESS", prefix))?;

            chains.push(ChainConfig {
                id: XChainId::new(id),
                kind,
                rpc_url,
                xcall_address,
            });
        }

        let scan_interval_ms: u64 = env_parsed("SCAN_INTERVAL_MS")?.unwrap_or(1000);
        let refresh_interval_ms: u64 = env_parsed("REFRESH_INTERVAL_MS")?.unwrap_or(2000);
        let stall_timeout_advances =
            env_parsed::<u64>("STALL_TIMEOUT_ADVANCES")?.filter(|&n| n > 0);

        let config = Self {
            chains,
            scan_interval: Duration::from_millis(scan_interval_ms),
            refresh_interval: Duration::from_millis(refresh_interval_ms),
            stall_timeout_advances,
            xcallscan_base_url: std::env::var("XCALLSCAN_BASE_URL").ok(),
            store_path: std::env::var("XMESSAGE_STORE_PATH").ok(),
            api_bind: std::env::var("API_BIND").unwrap_or_else(|_| "0.0.0.0:9090".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.chains.is_empty() {
            return Err(eyre!("At least one chain must be configured"));
        }

        let mut seen = std::collections::HashSet::new();
        for chain in &self.chains {
            if !seen.insert(&chain.id) {
                return Err(eyre!("Duplicate chain id: {}", chain.id));
            }
            if !chain.rpc_url.starts_with("http://") && !chain.rpc_url.starts_with("https://") {
                return Err(eyre!("Invalid RPC URL for chain {}", chain.id));
            }
            match chain.kind {
                ChainKind::Evm => {
                    if chain.xcall_address.len() != 42 || !chain.xcall_address.starts_with("0x") {
                        return Err(eyre!(
                            "Invalid xCall address for EVM chain {}: {}",
                            chain.id,
                            chain.xcall_address
                        ));
                    }
                }
                ChainKind::Icon => {
                    if chain.xcall_address.len() != 42 || !chain.xcall_address.starts_with("cx") {
                        return Err(eyre!(
                            "Invalid xCall address for ICON chain {}: {}",
                            chain.id,
                            chain.xcall_address
                        ));
                    }
                }
            }
        }

        if self.scan_interval.is_zero() || self.refresh_interval.is_zero() {
            return Err(eyre!("Scan and refresh intervals must be non-zero"));
        }

        if let Some(url) = &self.xcallscan_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(eyre!("Invalid XCALLSCAN_BASE_URL"));
            }
        }

        Ok(())
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(s) => s
            .parse()
            .map(Some)
            .map_err(|_| eyre!("Invalid {}: {}", name, s)),
        Err(_) => Ok(None),
    }
}
