//! Wallet / provider boundary.
//!
//! Everything goes through a single EIP-1193 style `request(method, params)` call so the same
//! workflow code runs against a JSON-RPC endpoint or the in-process wallet.

use crate::domain::Address;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

pub mod http;
pub mod memory;

pub use http::HttpWallet;
pub use memory::MemoryWallet;

/// "Unrecognized chain ID" returned by wallet_switchEthereumChain.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;
/// The user declined the request in the wallet.
pub const USER_REJECTED: i64 = 4001;
/// Contract execution reverted (eth_call / eth_estimateGas).
pub const EXECUTION_REVERTED: i64 = 3;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

impl RpcError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        RpcError::Rpc {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            RpcError::Rpc { code, .. } => Some(*code),
            RpcError::Transport(_) => None,
        }
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code() == Some(UNRECOGNIZED_CHAIN)
    }

    /// Nodes disagree on the code for reverts, so the message is checked too.
    pub fn is_revert(&self) -> bool {
        match self {
            RpcError::Rpc { code, message } => {
                *code == EXECUTION_REVERTED || message.to_lowercase().contains("revert")
            }
            RpcError::Transport(_) => false,
        }
    }
}

/// The connected wallet. Implementations must be cheap to call repeatedly: the workflow
/// re-reads the chain and account before every ledger call.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: JsonValue) -> Result<JsonValue, RpcError>;
}

/// Snapshot of the ambient wallet state (chain + signing account) taken right before a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletContext {
    pub chain_id: u64,
    pub account: Option<Address>,
}

impl WalletContext {
    /// Reads the active chain and the first connected account.
    pub async fn read(wallet: &dyn WalletProvider) -> anyhow::Result<Self> {
        let chain = wallet.request("eth_chainId", json!([])).await?;
        let chain_id = chain
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("eth_chainId returned a non-string value: {}", chain))
            .and_then(parse_hex_u64)?;

        let accounts = wallet.request("eth_accounts", json!([])).await?;
        let account = match accounts.as_array().and_then(|a| a.first()) {
            Some(JsonValue::String(s)) => Some(s.parse::<Address>()?),
            _ => None,
        };

        Ok(Self { chain_id, account })
    }

    /// The signer for write calls. Writes without a connected account are refused.
    pub fn signer(&self) -> anyhow::Result<Address> {
        self.account
            .ok_or_else(|| anyhow::anyhow!("no account connected"))
    }
}

pub fn parse_hex_u64(s: &str) -> anyhow::Result<u64> {
    let digits = s.trim().trim_start_matches("0x");
    u64::from_str_radix(digits, 16).map_err(|e| anyhow::anyhow!("invalid hex quantity '{}': {}", s, e))
}

pub fn chain_id_hex(chain_id: u64) -> String {
    format!("0x{:x}", chain_id)
}
