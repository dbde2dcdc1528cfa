//! JSON-RPC client for the chain node.
//!
//! A small wrapper over `reqwest` that speaks the handful of `eth_*` methods
//! the credential service needs. Every call is a single POST; node-side
//! errors (`{"error": ...}`) are surfaced as `anyhow` errors carrying the
//! node's message.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use ethers_core::types::{Address, Bytes, H256, U256};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::blockchain::models::TxReceipt;

#[derive(Clone, Debug)]
pub struct RpcClient {
    http: Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Sends one JSON-RPC request and returns its `result` member.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!(method, id, "JSON-RPC request");

        let resp = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("{} request to chain node failed", method))?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let v: Value = serde_json::from_str(&body).map_err(|_| {
            anyhow!("{} returned a non-JSON response (status {}): {}", method, status, body)
        })?;

        if let Some(err) = v.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| err.to_string());
            return Err(anyhow!("RPC error from {}: {}", method, message));
        }
        Ok(v.get("result").cloned().unwrap_or(Value::Null))
    }

    /// `eth_call` against the latest block, returning the raw return data.
    pub async fn call(&self, to: Address, data: &Bytes) -> Result<Bytes> {
        let result = self
            .request(
                "eth_call",
                json!([{ "to": to, "data": data }, "latest"]),
            )
            .await?;
        hex_bytes(&result).context("eth_call result is not hex data")
    }

    pub async fn gas_price(&self) -> Result<U256> {
        let result = self.request("eth_gasPrice", json!([])).await?;
        hex_quantity(&result).context("Failed to get gasPrice")
    }

    /// Pending transaction count, used as the next nonce.
    pub async fn transaction_count(&self, address: Address) -> Result<U256> {
        let result = self
            .request("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        hex_quantity(&result).context("Failed to get nonce from RPC response")
    }

    pub async fn send_raw_transaction(&self, raw: &Bytes) -> Result<H256> {
        let result = self
            .request("eth_sendRawTransaction", json!([raw]))
            .await?;
        serde_json::from_value(result)
            .context("Failed to extract transaction hash from response")
    }

    /// Returns `None` while the transaction is not yet mined.
    pub async fn transaction_receipt(&self, tx_hash: H256) -> Result<Option<TxReceipt>> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        serde_json::from_value(result).context("Malformed transaction receipt")
    }
}

fn hex_str(v: &Value) -> Result<&str> {
    let s = v
        .as_str()
        .ok_or_else(|| anyhow!("expected hex string, got {}", v))?;
    Ok(s.strip_prefix("0x").unwrap_or(s))
}

fn hex_quantity(v: &Value) -> Result<U256> {
    Ok(U256::from_str_radix(hex_str(v)?, 16)?)
}

fn hex_bytes(v: &Value) -> Result<Bytes> {
    Ok(Bytes::from(hex::decode(hex_str(v)?)?))
}
