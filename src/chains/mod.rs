//! Chain client implementations.
//!
//! Each supported chain family gets its own module implementing
//! `ChainClient` over raw JSON-RPC.

pub mod evm;
pub mod icon;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use eyre::Result;
use serde::Deserialize;

use crate::chain::{ChainClient, ChainError};
use crate::types::XChainId;

/// Supported chain families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    Evm,
    Icon,
}

impl FromStr for ChainKind {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "evm" => Ok(ChainKind::Evm),
            "icon" => Ok(ChainKind::Icon),
            other => Err(eyre::eyre!("unknown chain kind: {}", other)),
        }
    }
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainKind::Evm => write!(f, "evm"),
            ChainKind::Icon => write!(f, "icon"),
        }
    }
}

/// Build the client for one configured chain.
pub fn build_client(
    kind: ChainKind,
    chain_id: XChainId,
    rpc_url: String,
    xcall_address: String,
) -> Result<Arc<dyn ChainClient>> {
    Ok(match kind {
        ChainKind::Evm => Arc::new(evm::EvmChainClient::new(chain_id, rpc_url, xcall_address)?),
        ChainKind::Icon => Arc::new(icon::IconChainClient::new(chain_id, rpc_url, xcall_address)?),
    })
}

/// JSON-RPC response wrapper
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
pub(crate) struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Parse a 0x-prefixed hex quantity (ICON negative quantities included).
pub(crate) fn hex_to_u64(s: &str) -> Result<u64, ChainError> {
    let trimmed = s.trim_start_matches("0x");
    u64::from_str_radix(trimmed, 16)
        .map_err(|e| ChainError::Malformed(format!("bad hex quantity {}: {}", s, e)))
}

pub(crate) fn hex_to_i64(s: &str) -> Result<i64, ChainError> {
    if let Some(rest) = s.strip_prefix('-') {
        Ok(-(hex_to_u64(rest)? as i64))
    } else {
        Ok(hex_to_u64(s)? as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(hex_to_u64("0x0").unwrap(), 0);
        assert_eq!(hex_to_u64("0x1a").unwrap(), 26);
        assert_eq!(
            hex_to_u64("0x000000000000000000000000000000000000000000000000000000000000002a")
                .unwrap(),
            42
        );
        assert!(hex_to_u64("0xzz").is_err());

        assert_eq!(hex_to_i64("0x1").unwrap(), 1);
        assert_eq!(hex_to_i64("-0x2").unwrap(), -2);
    }

    #[test]
    fn test_chain_kind_parsing() {
        assert_eq!("evm".parse::<ChainKind>().unwrap(), ChainKind::Evm);
        assert_eq!("ICON".parse::<ChainKind>().unwrap(), ChainKind::Icon);
        assert!("solana".parse::<ChainKind>().is_err());
    }
}
