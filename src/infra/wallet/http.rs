// JSON-RPC over HTTP to a wallet or a node that signs for an unlocked account.

use super::{RpcError, WalletProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<JsonValue>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

pub struct HttpWallet {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpWallet {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl WalletProvider for HttpWallet {
    async fn request(&self, method: &str, params: JsonValue) -> Result<JsonValue, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(format!("{} to {} failed: {}", method, self.url, e)))?;

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::Transport(format!("{}: invalid JSON-RPC response: {}", method, e)))?;

        if let Some(err) = parsed.error {
            return Err(RpcError::rpc(err.code, err.message));
        }
        Ok(parsed.result.unwrap_or(JsonValue::Null))
    }
}
