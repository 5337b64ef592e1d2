//! Centralized configuration (environment variables + defaults).

use crate::domain::Address;
use std::time::Duration;

/// Wait before the post-mint list refresh, so the ledger can propagate the new name.
pub const DEFAULT_MINT_REFRESH_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_WALLET_POLL_INTERVAL: Duration = Duration::from_millis(3000);

pub const DEFAULT_REGISTRY_CONTRACT: &str = "0x30bCD58beba88576B3b57ff9df4C9394baf66852";
pub const DEFAULT_REVERSE_CONTRACT: &str = "0x59E2917C7413d5EB30596AE5FaDDF7CD9921540f";

/// Which ledger/wallet pair the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    /// JSON-RPC wallet endpoint + deployed contracts.
    Rpc,
    /// In-process ledger and wallet (demos, local UI work).
    Memory,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn millis_or(key: &str, default: Duration) -> anyhow::Result<Duration> {
    match std::env::var(key) {
        Ok(v) => {
            let ms = v
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("{} must be a valid u64 (milliseconds), got '{}'", key, v))?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(default),
    }
}

/// Wallet/provider JSON-RPC URL.
pub fn wallet_rpc_url() -> String {
    env_or("WALLET_RPC_URL", "http://127.0.0.1:8545")
}

/// Primary registry contract (lookup, records, register, enumerate).
pub fn registry_contract() -> anyhow::Result<Address> {
    env_or("REGISTRY_CONTRACT_ADDRESS", DEFAULT_REGISTRY_CONTRACT)
        .parse::<Address>()
        .map_err(|e| anyhow::anyhow!("REGISTRY_CONTRACT_ADDRESS is invalid: {}", e))
}

/// Reverse-resolution contract (setReverse).
pub fn reverse_contract() -> anyhow::Result<Address> {
    env_or("REVERSE_CONTRACT_ADDRESS", DEFAULT_REVERSE_CONTRACT)
        .parse::<Address>()
        .map_err(|e| anyhow::anyhow!("REVERSE_CONTRACT_ADDRESS is invalid: {}", e))
}

pub fn mint_refresh_delay() -> anyhow::Result<Duration> {
    millis_or("MINT_REFRESH_DELAY_MS", DEFAULT_MINT_REFRESH_DELAY)
}

pub fn receipt_poll_interval() -> anyhow::Result<Duration> {
    millis_or("RECEIPT_POLL_INTERVAL_MS", DEFAULT_RECEIPT_POLL_INTERVAL)
}

pub fn wallet_poll_interval() -> anyhow::Result<Duration> {
    millis_or("WALLET_POLL_INTERVAL_MS", DEFAULT_WALLET_POLL_INTERVAL)
}

/// HTTP listen address for the API server.
pub fn api_bind_addr() -> String {
    env_or("API_BIND_ADDR", "0.0.0.0:3000")
}

pub fn ledger_backend() -> anyhow::Result<LedgerBackend> {
    match env_or("LEDGER_BACKEND", "rpc").trim().to_lowercase().as_str() {
        "rpc" => Ok(LedgerBackend::Rpc),
        "memory" => Ok(LedgerBackend::Memory),
        other => Err(anyhow::anyhow!(
            "LEDGER_BACKEND must be 'rpc' or 'memory', got '{}'",
            other
        )),
    }
}

/// Account the in-process wallet is connected with (memory backend only).
pub fn memory_wallet_account() -> anyhow::Result<Address> {
    env_or(
        "MEMORY_WALLET_ACCOUNT",
        "0x1111111111111111111111111111111111111111",
    )
    .parse::<Address>()
    .map_err(|e| anyhow::anyhow!("MEMORY_WALLET_ACCOUNT is invalid: {}", e))
}
