//! ICON chain client: icx_* JSON-RPC over HTTP.
//!
//! ICON reports events as typed `eventLogs` entries on the transaction
//! result, with the signature and indexed parameters in `indexed` and the
//! remaining parameters in `data`. Scanning a block means fetching the
//! result of every transaction it confirmed.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::chain::{ChainClient, ChainError, RawTx};
use crate::chains::{hex_to_i64, hex_to_u64, RpcResponse};
use crate::types::{Transaction, TransactionStatus, XCallEvent, XCallEventType, XChainId};

const CALL_MESSAGE_SENT_SIG: &str = "CallMessageSent(Address,str,int)";
const CALL_MESSAGE_SIG: &str = "CallMessage(str,str,int,int,bytes)";
const CALL_EXECUTED_SIG: &str = "CallExecuted(int,int,str)";

pub struct IconChainClient {
    chain_id: XChainId,
    rpc_url: String,
    xcall_address: String,
    client: Client,
}

impl IconChainClient {
    pub fn new(
        chain_id: XChainId,
        rpc_url: String,
        xcall_address: String,
    ) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            chain_id,
            rpc_url,
            xcall_address,
            client,
        })
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, ChainError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .json::<RpcResponse<T>>()
            .await?;

        if let Some(error) = response.error {
            return Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result)
    }

    /// Decode one `eventLogs` entry, if it is an xCall event from our
    /// contract. `tx_hash` and `block_height` come from the enclosing result.
    fn decode_event_log(
        &self,
        log: &serde_json::Value,
        tx_hash: &str,
        block_height: u64,
    ) -> Result<Option<XCallEvent>, ChainError> {
        if log["scoreAddress"].as_str() != Some(self.xcall_address.as_str()) {
            return Ok(None);
        }
        let indexed: Vec<&str> = log["indexed"]
            .as_array()
            .map(|v| v.iter().filter_map(|x| x.as_str()).collect())
            .unwrap_or_default();
        let data: Vec<&str> = log["data"]
            .as_array()
            .map(|v| v.iter().filter_map(|x| x.as_str()).collect())
            .unwrap_or_default();
        let Some(signature) = indexed.first() else {
            return Ok(None);
        };

        let event = match *signature {
            CALL_MESSAGE_SENT_SIG => XCallEvent {
                event_type: XCallEventType::CallMessageSent,
                x_chain_id: self.chain_id.clone(),
                sn: Some(indexed_quantity(&indexed, 3)?),
                req_id: None,
                code: None,
                tx_hash: tx_hash.to_string(),
                block_height,
            },
            CALL_MESSAGE_SIG => XCallEvent {
                event_type: XCallEventType::CallMessage,
                x_chain_id: self.chain_id.clone(),
                sn: Some(indexed_quantity(&indexed, 3)?),
                req_id: Some(indexed_quantity(&data, 0)?),
                code: None,
                tx_hash: tx_hash.to_string(),
                block_height,
            },
            CALL_EXECUTED_SIG => XCallEvent {
                event_type: XCallEventType::CallExecuted,
                x_chain_id: self.chain_id.clone(),
                sn: None,
                req_id: Some(indexed_quantity(&indexed, 1)?),
                code: Some(hex_to_i64(data.first().copied().unwrap_or("0x0"))?),
                tx_hash: tx_hash.to_string(),
                block_height,
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    fn decode_result_events(&self, result: &serde_json::Value) -> Result<Vec<XCallEvent>, ChainError> {
        let tx_hash = result["txHash"].as_str().unwrap_or_default();
        let block_height = result["blockHeight"]
            .as_str()
            .map(hex_to_u64)
            .transpose()?
            .unwrap_or(0);

        let mut events = Vec::new();
        for log in result["eventLogs"].as_array().into_iter().flatten() {
            if let Some(event) = self.decode_event_log(log, tx_hash, block_height)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}

fn indexed_quantity(fields: &[&str], index: usize) -> Result<u64, ChainError> {
    let field = fields
        .get(index)
        .ok_or_else(|| ChainError::Malformed(format!("event log missing field {}", index)))?;
    hex_to_u64(field)
}

/// A pending or still-executing transaction has no result yet.
fn is_pending_error(message: &str) -> bool {
    message.contains("Pending") || message.contains("Executing") || message.contains("not found")
}

#[async_trait]
impl ChainClient for IconChainClient {
    fn chain_id(&self) -> &XChainId {
        &self.chain_id
    }

    async fn submit(&self, payload: &serde_json::Value) -> Result<String, ChainError> {
        self.rpc::<String>("icx_sendTransaction", payload.clone())
            .await?
            .ok_or_else(|| ChainError::Malformed("icx_sendTransaction returned no hash".into()))
    }

    async fn get_tx_receipt(&self, hash: &str) -> Result<Option<RawTx>, ChainError> {
        match self
            .rpc("icx_getTransactionResult", serde_json::json!({"txHash": hash}))
            .await
        {
            Ok(result) => Ok(result),
            Err(ChainError::Rpc { message, .. }) if is_pending_error(&message) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn derive_tx_status(&self, raw_tx: &RawTx) -> TransactionStatus {
        match raw_tx["status"].as_str() {
            Some("0x1") => TransactionStatus::Success,
            Some(_) => TransactionStatus::Failure,
            None => TransactionStatus::Pending,
        }
    }

    fn get_tx_event_logs(&self, raw_tx: &RawTx) -> Vec<serde_json::Value> {
        raw_tx["eventLogs"].as_array().cloned().unwrap_or_default()
    }

    async fn get_block_height(&self) -> Result<u64, ChainError> {
        let block = self
            .rpc::<serde_json::Value>("icx_getLastBlock", serde_json::json!({}))
            .await?
            .ok_or_else(|| ChainError::Malformed("icx_getLastBlock returned no result".into()))?;
        block["height"]
            .as_u64()
            .ok_or_else(|| ChainError::Malformed("block without height".into()))
    }

    async fn get_events_in_block(&self, height: u64) -> Result<Vec<XCallEvent>, ChainError> {
        let block = self
            .rpc::<serde_json::Value>(
                "icx_getBlockByHeight",
                serde_json::json!({"height": format!("0x{:x}", height)}),
            )
            .await?
            .ok_or_else(|| ChainError::Malformed("icx_getBlockByHeight returned no result".into()))?;

        let mut events = Vec::new();
        for tx in block["confirmed_transaction_list"]
            .as_array()
            .into_iter()
            .flatten()
        {
            let Some(hash) = tx["txHash"].as_str() else {
                continue;
            };
            // Results are only requested for confirmed transactions, so a
            // pending error here means the node is behind; surface it and
            // let the scan retry this block.
            let Some(result) = self.get_tx_receipt(hash).await? else {
                return Err(ChainError::Transient(format!(
                    "result for confirmed transaction {} not available yet",
                    hash
                )));
            };
            events.extend(self.decode_result_events(&result)?);
        }
        Ok(events)
    }

    async fn get_call_message_sent_event(
        &self,
        transaction: &Transaction,
    ) -> Result<Option<XCallEvent>, ChainError> {
        for log in &transaction.raw_event_logs {
            if let Some(event) = self.decode_event_log(log, &transaction.hash, 0)? {
                if event.event_type == XCallEventType::CallMessageSent {
                    return Ok(Some(event));
                }
            }
        }
        Ok(None)
    }
}
