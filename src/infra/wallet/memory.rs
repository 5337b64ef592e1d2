//! In-process wallet. Answers the handful of methods the client needs and records every
//! request so callers can check what was asked of the wallet. Anything else (calls, receipts)
//! can be scripted per method.

use super::{chain_id_hex, parse_hex_u64, RpcError, WalletProvider, UNRECOGNIZED_CHAIN, USER_REJECTED};
use crate::domain::Address;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::Mutex;

struct WalletState {
    chain_id: u64,
    account: Option<Address>,
    known_chains: HashSet<u64>,
    reject_requests: bool,
    requests: Vec<String>,
    scripted: HashMap<String, VecDeque<Result<JsonValue, RpcError>>>,
}

pub struct MemoryWallet {
    state: Mutex<WalletState>,
}

impl MemoryWallet {
    /// A wallet connected to `account` on `chain_id`, which it also knows how to switch to.
    pub fn new(chain_id: u64, account: Option<Address>) -> Self {
        Self {
            state: Mutex::new(WalletState {
                chain_id,
                account,
                known_chains: HashSet::from([chain_id]),
                reject_requests: false,
                requests: Vec::new(),
                scripted: HashMap::new(),
            }),
        }
    }

    pub async fn set_account(&self, account: Option<Address>) {
        self.state.lock().await.account = account;
    }

    pub async fn set_chain(&self, chain_id: u64) {
        let mut state = self.state.lock().await;
        state.known_chains.insert(chain_id);
        state.chain_id = chain_id;
    }

    pub async fn add_known_chain(&self, chain_id: u64) {
        self.state.lock().await.known_chains.insert(chain_id);
    }

    /// Makes the wallet decline every switch/add prompt (user pressed "reject").
    pub async fn reject_requests(&self, reject: bool) {
        self.state.lock().await.reject_requests = reject;
    }

    pub async fn chain_id(&self) -> u64 {
        self.state.lock().await.chain_id
    }

    /// Queues a canned reply for `method`. Queued replies are used first, in order, before
    /// the wallet falls back to its own handling.
    pub async fn script(&self, method: &str, reply: Result<JsonValue, RpcError>) {
        self.state
            .lock()
            .await
            .scripted
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Methods requested so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.requests.clone()
    }
}

fn requested_chain(params: &JsonValue) -> Result<u64, RpcError> {
    let raw = params
        .get(0)
        .and_then(|p| p.get("chainId"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| RpcError::rpc(-32602, "missing chainId"))?;
    parse_hex_u64(raw).map_err(|e| RpcError::rpc(-32602, e.to_string()))
}

#[async_trait]
impl WalletProvider for MemoryWallet {
    async fn request(&self, method: &str, params: JsonValue) -> Result<JsonValue, RpcError> {
        let mut state = self.state.lock().await;
        state.requests.push(method.to_string());
        if let Some(reply) = state.scripted.get_mut(method).and_then(|q| q.pop_front()) {
            return reply;
        }

        match method {
            "eth_chainId" => Ok(JsonValue::String(chain_id_hex(state.chain_id))),
            "eth_accounts" => Ok(match state.account {
                Some(a) => json!([a.to_string()]),
                None => json!([]),
            }),
            "wallet_switchEthereumChain" => {
                let target = requested_chain(&params)?;
                if !state.known_chains.contains(&target) {
                    return Err(RpcError::rpc(
                        UNRECOGNIZED_CHAIN,
                        format!("Unrecognized chain ID \"{}\"", chain_id_hex(target)),
                    ));
                }
                if state.reject_requests {
                    return Err(RpcError::rpc(USER_REJECTED, "User rejected the request."));
                }
                state.chain_id = target;
                Ok(JsonValue::Null)
            }
            "wallet_addEthereumChain" => {
                let target = requested_chain(&params)?;
                if state.reject_requests {
                    return Err(RpcError::rpc(USER_REJECTED, "User rejected the request."));
                }
                state.known_chains.insert(target);
                state.chain_id = target;
                Ok(JsonValue::Null)
            }
            other => Err(RpcError::rpc(
                -32601,
                format!("method {} is not supported by the in-process wallet", other),
            )),
        }
    }
}
