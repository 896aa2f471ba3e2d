//! Minimal JSON-RPC 2.0 client for the Ethereum endpoints this crate needs:
//! read-only `eth_call`s against a public node plus the handful of wallet
//! provider methods used during submission.

use crate::error::{Result, SkyhopError};
use alloy_primitives::{Address, B256};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Mined-transaction receipt, reduced to what submission needs.
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    /// `Some(false)` means the transaction reverted.
    pub status: Option<bool>,
    pub block_number: Option<u64>,
}

pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!("JSON-RPC {} -> {}", method, self.url);
        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(SkyhopError::rpc(format!(
                "{} failed: {} (code {})",
                method, err.message, err.code
            )));
        }

        response
            .result
            .ok_or_else(|| SkyhopError::rpc(format!("{} returned no result", method)))
    }

    pub async fn eth_chain_id(&self) -> Result<u64> {
        let result = self.request("eth_chainId", json!([])).await?;
        decode_quantity(expect_str(&result)?)
    }

    /// Read-only contract call against the latest block.
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>> {
        let params = json!([
            { "to": to.to_string(), "data": encode_hex(data) },
            "latest",
        ]);
        let result = self.request("eth_call", params).await?;
        decode_hex_bytes(expect_str(&result)?)
    }

    /// Accounts managed by this provider (wallet endpoints only).
    pub async fn eth_accounts(&self) -> Result<Vec<Address>> {
        let result = self.request("eth_accounts", json!([])).await?;
        let accounts = result
            .as_array()
            .ok_or_else(|| SkyhopError::rpc("eth_accounts returned a non-array"))?;

        accounts
            .iter()
            .map(|v| {
                let s = expect_str(v)?;
                Address::from_str(s).map_err(|_| SkyhopError::InvalidAddress(s.to_string()))
            })
            .collect()
    }

    /// Provider-signed transaction; key material never leaves the wallet.
    pub async fn eth_send_transaction(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<B256> {
        let params = json!([{
            "from": from.to_string(),
            "to": to.to_string(),
            "data": encode_hex(data),
        }]);
        let result = self.request("eth_sendTransaction", params).await?;
        let s = expect_str(&result)?;
        B256::from_str(s).map_err(|_| SkyhopError::rpc(format!("malformed tx hash: {}", s)))
    }

    pub async fn eth_get_transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        Ok(Some(parse_receipt(&result)?))
    }

    pub async fn wallet_switch_chain(&self, chain_id: u64) -> Result<()> {
        self.request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": format!("0x{:x}", chain_id) }]),
        )
        .await?;
        Ok(())
    }
}

fn expect_str(value: &Value) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| SkyhopError::rpc(format!("expected a string result, got: {}", value)))
}

fn encode_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

pub(crate) fn decode_hex_bytes(s: &str) -> Result<Vec<u8>> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| SkyhopError::rpc(format!("malformed hex '{}': {}", s, e)))
}

pub(crate) fn decode_quantity(s: &str) -> Result<u64> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(stripped, 16)
        .map_err(|e| SkyhopError::rpc(format!("malformed quantity '{}': {}", s, e)))
}

fn parse_receipt(value: &Value) -> Result<TransactionReceipt> {
    let status = match value.get("status").and_then(|v| v.as_str()) {
        Some(s) => Some(decode_quantity(s)? == 1),
        None => None,
    };
    let block_number = match value.get("blockNumber").and_then(|v| v.as_str()) {
        Some(s) => Some(decode_quantity(s)?),
        None => None,
    };

    Ok(TransactionReceipt {
        status,
        block_number,
    })
}
