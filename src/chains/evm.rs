//! EVM chain client: raw JSON-RPC over HTTP.
//!
//! xCall events are read with `eth_getLogs` filtered to the xCall contract
//! address and matched by topic0. `sn` and `req_id` land in indexed topics
//! or in the ABI-encoded data words depending on the event.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tiny_keccak::{Hasher, Keccak};

use crate::chain::{ChainClient, ChainError, RawTx};
use crate::chains::{hex_to_u64, RpcResponse};
use crate::types::{Transaction, TransactionStatus, XCallEvent, XCallEventType, XChainId};

const CALL_MESSAGE_SENT_SIG: &str = "CallMessageSent(address,string,uint256)";
const CALL_MESSAGE_SIG: &str = "CallMessage(string,string,uint256,uint256,bytes)";
const CALL_EXECUTED_SIG: &str = "CallExecuted(uint256,int256,string)";

fn event_topic(signature: &str) -> String {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(signature.as_bytes());
    hasher.finalize(&mut output);
    format!("0x{}", hex::encode(output))
}

pub struct EvmChainClient {
    chain_id: XChainId,
    rpc_url: String,
    xcall_address: String,
    client: Client,
    topic_call_message_sent: String,
    topic_call_message: String,
    topic_call_executed: String,
}

impl EvmChainClient {
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
            xcall_address: xcall_address.to_ascii_lowercase(),
            client,
            topic_call_message_sent: event_topic(CALL_MESSAGE_SENT_SIG),
            topic_call_message: event_topic(CALL_MESSAGE_SIG),
            topic_call_executed: event_topic(CALL_EXECUTED_SIG),
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

    /// Decode one `eth_getLogs` entry into a typed event, if it is one of
    /// the xCall events we track.
    fn decode_log(&self, log: &serde_json::Value) -> Result<Option<XCallEvent>, ChainError> {
        let topics: Vec<&str> = log["topics"]
            .as_array()
            .map(|t| t.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        let Some(topic0) = topics.first() else {
            return Ok(None);
        };

        let tx_hash = log["transactionHash"]
            .as_str()
            .ok_or_else(|| ChainError::Malformed("log without transactionHash".into()))?
            .to_string();
        let block_height = hex_to_u64(
            log["blockNumber"]
                .as_str()
                .ok_or_else(|| ChainError::Malformed("log without blockNumber".into()))?,
        )?;
        let data = log["data"].as_str().unwrap_or("0x");

        let event = if *topic0 == self.topic_call_message_sent {
            XCallEvent {
                event_type: XCallEventType::CallMessageSent,
                x_chain_id: self.chain_id.clone(),
                sn: Some(topic_quantity(&topics, 3)?),
                req_id: None,
                code: None,
                tx_hash,
                block_height,
            }
        } else if *topic0 == self.topic_call_message {
            XCallEvent {
                event_type: XCallEventType::CallMessage,
                x_chain_id: self.chain_id.clone(),
                sn: Some(topic_quantity(&topics, 3)?),
                req_id: Some(data_word_u64(data, 0)?),
                code: None,
                tx_hash,
                block_height,
            }
        } else if *topic0 == self.topic_call_executed {
            XCallEvent {
                event_type: XCallEventType::CallExecuted,
                x_chain_id: self.chain_id.clone(),
                sn: None,
                req_id: Some(topic_quantity(&topics, 1)?),
                code: Some(data_word_u64(data, 0)? as i64),
                tx_hash,
                block_height,
            }
        } else {
            return Ok(None);
        };
        Ok(Some(event))
    }
}

fn topic_quantity(topics: &[&str], index: usize) -> Result<u64, ChainError> {
    let topic = topics
        .get(index)
        .ok_or_else(|| ChainError::Malformed(format!("log missing topic {}", index)))?;
    hex_to_u64(topic)
}

/// The `index`-th 32-byte word of ABI-encoded event data, as a u64.
fn data_word_u64(data: &str, index: usize) -> Result<u64, ChainError> {
    let hex = data.trim_start_matches("0x");
    let start = index * 64;
    let word = hex
        .get(start..start + 64)
        .ok_or_else(|| ChainError::Malformed(format!("event data missing word {}", index)))?;
    hex_to_u64(word)
}

#[async_trait]
impl ChainClient for EvmChainClient {
    fn chain_id(&self) -> &XChainId {
        &self.chain_id
    }

    async fn submit(&self, payload: &serde_json::Value) -> Result<String, ChainError> {
        let raw = payload
            .as_str()
            .ok_or_else(|| ChainError::Malformed("EVM payload must be a raw tx hex string".into()))?;
        self.rpc::<String>("eth_sendRawTransaction", serde_json::json!([raw]))
            .await?
            .ok_or_else(|| ChainError::Malformed("eth_sendRawTransaction returned no hash".into()))
    }

    async fn get_tx_receipt(&self, hash: &str) -> Result<Option<RawTx>, ChainError> {
        self.rpc("eth_getTransactionReceipt", serde_json::json!([hash]))
            .await
    }

    fn derive_tx_status(&self, raw_tx: &RawTx) -> TransactionStatus {
        match raw_tx["status"].as_str() {
            Some("0x1") => TransactionStatus::Success,
            Some("0x0") => TransactionStatus::Failure,
            _ => TransactionStatus::Pending,
        }
    }

    fn get_tx_event_logs(&self, raw_tx: &RawTx) -> Vec<serde_json::Value> {
        raw_tx["logs"].as_array().cloned().unwrap_or_default()
    }

    async fn get_block_height(&self) -> Result<u64, ChainError> {
        let hex = self
            .rpc::<String>("eth_blockNumber", serde_json::json!([]))
            .await?
            .ok_or_else(|| ChainError::Malformed("eth_blockNumber returned no result".into()))?;
        hex_to_u64(&hex)
    }

    async fn get_events_in_block(&self, height: u64) -> Result<Vec<XCallEvent>, ChainError> {
        let block = format!("0x{:x}", height);
        let filter = serde_json::json!([{
            "fromBlock": block,
            "toBlock": block,
            "address": self.xcall_address,
            "topics": [[
                self.topic_call_message_sent,
                self.topic_call_message,
                self.topic_call_executed,
            ]],
        }]);

        let logs = self
            .rpc::<Vec<serde_json::Value>>("eth_getLogs", filter)
            .await?
            .unwrap_or_default();

        let mut events = Vec::new();
        for log in &logs {
            if let Some(event) = self.decode_log(log)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    async fn get_call_message_sent_event(
        &self,
        transaction: &Transaction,
    ) -> Result<Option<XCallEvent>, ChainError> {
        // The receipt's logs were captured when the source transaction
        // finalized, no further RPC needed.
        for log in &transaction.raw_event_logs {
            let address = log["address"].as_str().unwrap_or("").to_ascii_lowercase();
            if address != self.xcall_address {
                continue;
            }
            if let Some(event) = self.decode_log(log)? {
                if event.event_type == XCallEventType::CallMessageSent {
                    return Ok(Some(event));
                }
            }
        }
        Ok(None)
    }
}
