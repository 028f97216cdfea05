// JSON-RPC transport layer implementation
// This file implements the JSON-RPC client used for every Sui node call:
// execution, transaction lookup and dry runs
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use crate::metrics::{REQ_ERRORS, REQ_LATENCY};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct JsonRpc {
    http: Client,
    url: String,
}

impl JsonRpc {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, SwapError> {
        let _timer = REQ_LATENCY
            .with_label_values(&["jsonrpc", method])
            .start_timer();
        let result = self.call_inner(method, params).await;
        if result.is_err() {
            REQ_ERRORS.with_label_values(&["jsonrpc", method]).inc();
        }
        result
    }

    async fn call_inner<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, SwapError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let resp = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SwapError::Transport(format!("{method} send: {e}")))?;
        if !resp.status().is_success() {
            return Err(SwapError::Provider(format!("{method}: http {}", resp.status())));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| SwapError::Transport(format!("{method} json parse: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(SwapError::Provider(format!("{method}: {err}")));
        }
        serde_json::from_value(body["result"].clone())
            .map_err(|e| SwapError::Provider(format!("{method} decode result: {e}")))
    }

    pub async fn execute_tx_block(
        &self,
        tx_bcs: &[u8],
        signatures_b64: &[String],
    ) -> Result<ExecuteResp, SwapError> {
        self.call(
            "sui_executeTransactionBlock",
            json!([
                B64.encode(tx_bcs),
                signatures_b64,
                { "showEffects": true },
                "WaitForEffectsCert"
            ]),
        )
        .await
    }

    pub async fn get_transaction_block(&self, digest: &str) -> Result<ExecuteResp, SwapError> {
        self.call(
            "sui_getTransactionBlock",
            json!([digest, { "showEffects": true }]),
        )
        .await
    }

    pub async fn dry_run(&self, tx_bcs: &[u8]) -> Result<DryRunResp, SwapError> {
        self.call("sui_dryRunTransactionBlock", json!([B64.encode(tx_bcs)]))
            .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteResp {
    pub digest: Option<String>,
    pub checkpoint: Option<String>,
    pub effects: Option<Value>,
}

impl ExecuteResp {
    /// On-chain execution status from the effects, when they were returned.
    pub fn execution_status(&self) -> Option<ExecutionStatus> {
        let status = self.effects.as_ref()?.get("status")?;
        serde_json::from_value(status.clone()).ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DryRunResp {
    pub effects: DryRunEffects,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunEffects {
    pub status: ExecutionStatus,
    pub gas_used: GasUsed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasUsed {
    #[serde(deserialize_with = "de_u64")]
    pub computation_cost: u64,
    #[serde(deserialize_with = "de_u64")]
    pub storage_cost: u64,
    #[serde(deserialize_with = "de_u64")]
    pub storage_rebate: u64,
}

// Sui encodes 64-bit integers as decimal strings; accept plain numbers too.
pub(crate) fn parse_u64(raw: &Value) -> Option<u64> {
    match raw {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

pub(crate) fn de_u64<'de, D: serde::Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    let raw = Value::deserialize(de)?;
    parse_u64(&raw).ok_or_else(|| serde::de::Error::custom(format!("expected u64, got {raw}")))
}
