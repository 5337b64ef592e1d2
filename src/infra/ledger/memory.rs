//! In-process ledger that follows the registry contract's rules.
//!
//! Writes are queued at submission and applied when the transaction is waited on, like a block
//! being mined. Fault switches let callers reproduce declined signatures, reverted
//! transactions, flaky reads and stalled confirmations.

use super::{LedgerGateway, PendingTx, TxStatus};
use crate::domain::{tier, Address, RecordField, RecordSet};
use crate::infra::wallet::{RpcError, WalletContext, USER_REJECTED};
use async_trait::async_trait;
use primitive_types::{H256, U256};
use std::collections::HashMap;
use tokio::sync::{watch, Mutex};

enum QueuedWrite {
    Register { name: String, owner: Address, value: U256 },
    SetRecords { name: String, sender: Address, records: RecordSet },
    SetReverse { name: String, sender: Address },
}

#[derive(Default)]
struct LedgerState {
    names: Vec<String>,
    records: HashMap<String, RecordSet>,
    reverse: HashMap<Address, String>,
    queued: HashMap<H256, QueuedWrite>,
    tx_counter: u64,
    submissions: usize,
    fail_submissions: bool,
    fail_next_mined: bool,
    fail_reads: bool,
    fail_details_for: Option<String>,
}

pub struct MemoryLedger {
    state: Mutex<LedgerState>,
    hold_confirmations: watch::Sender<bool>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn transport_error(what: &str) -> anyhow::Error {
    RpcError::Transport(format!("{}: connection reset", what)).into()
}

fn not_registered(name: &str) -> anyhow::Error {
    RpcError::rpc(3, format!("execution reverted: {} is not registered", name)).into()
}

impl MemoryLedger {
    pub fn new() -> Self {
        let (hold_confirmations, _) = watch::channel(false);
        Self {
            state: Mutex::new(LedgerState::default()),
            hold_confirmations,
        }
    }

    /// Registers `name` directly, bypassing payment.
    pub async fn seed(&self, name: &str, records: RecordSet) {
        let mut state = self.state.lock().await;
        if !state.records.contains_key(name) {
            state.names.push(name.to_string());
        }
        state.records.insert(name.to_string(), records);
    }

    pub async fn records_of(&self, name: &str) -> Option<RecordSet> {
        self.state.lock().await.records.get(name).cloned()
    }

    pub async fn reverse_of(&self, account: &Address) -> Option<String> {
        self.state.lock().await.reverse.get(account).cloned()
    }

    /// Number of write submissions that reached the ledger (accepted or declined).
    pub async fn submissions(&self) -> usize {
        self.state.lock().await.submissions
    }

    /// Every submission is declined, as if the user rejected the signature prompt.
    pub async fn fail_submissions(&self, fail: bool) {
        self.state.lock().await.fail_submissions = fail;
    }

    /// The next transaction to be mined ends with a failed status.
    pub async fn fail_next_mined(&self) {
        self.state.lock().await.fail_next_mined = true;
    }

    /// Lookups and enumeration fail with a transport error.
    pub async fn fail_reads(&self, fail: bool) {
        self.state.lock().await.fail_reads = fail;
    }

    /// Summary and owner reads for `name` fail with a transport error.
    pub async fn fail_details_for(&self, name: Option<&str>) {
        self.state.lock().await.fail_details_for = name.map(str::to_string);
    }

    /// While held, `wait` does not resolve.
    pub fn hold_confirmations(&self, hold: bool) {
        self.hold_confirmations.send_replace(hold);
    }

    async fn queue(&self, ctx: &WalletContext, write: impl FnOnce(Address) -> QueuedWrite) -> anyhow::Result<PendingTx> {
        let sender = ctx.signer()?;
        let mut state = self.state.lock().await;
        state.submissions += 1;
        if state.fail_submissions {
            return Err(RpcError::rpc(USER_REJECTED, "User denied transaction signature.").into());
        }
        state.tx_counter += 1;
        let hash = H256::from_low_u64_be(state.tx_counter);
        state.queued.insert(hash, write(sender));
        Ok(PendingTx { hash })
    }

    fn apply(state: &mut LedgerState, write: QueuedWrite) -> TxStatus {
        match write {
            QueuedWrite::Register { name, owner, value } => {
                let too_cheap = value < tier(name.chars().count()).wei();
                if state.records.contains_key(&name) || too_cheap {
                    return TxStatus::Failed;
                }
                state.names.push(name.clone());
                state.records.insert(name, RecordSet::unset(owner));
                TxStatus::Success
            }
            QueuedWrite::SetRecords { name, sender, records } => match state.records.get_mut(&name) {
                Some(current) if current.owner == sender => {
                    for field in RecordField::ALL {
                        current.set(field, records.get(field).to_string());
                    }
                    TxStatus::Success
                }
                _ => TxStatus::Failed,
            },
            QueuedWrite::SetReverse { name, sender } => match state.records.get(&name) {
                Some(current) if current.owner == sender => {
                    state.reverse.insert(sender, name);
                    TxStatus::Success
                }
                _ => TxStatus::Failed,
            },
        }
    }
}

#[async_trait]
impl LedgerGateway for MemoryLedger {
    async fn lookup_id(&self, _ctx: &WalletContext, name: &str) -> anyhow::Result<bool> {
        let state = self.state.lock().await;
        if state.fail_reads {
            return Err(transport_error("getId"));
        }
        Ok(state.records.contains_key(name))
    }

    async fn get_records(&self, _ctx: &WalletContext, name: &str) -> anyhow::Result<RecordSet> {
        let state = self.state.lock().await;
        if state.fail_reads {
            return Err(transport_error("getRecords"));
        }
        state.records.get(name).cloned().ok_or_else(|| not_registered(name))
    }

    async fn get_record(
        &self,
        _ctx: &WalletContext,
        name: &str,
        field: RecordField,
    ) -> anyhow::Result<String> {
        let state = self.state.lock().await;
        if state.fail_details_for.as_deref() == Some(name) {
            return Err(transport_error("getRecord"));
        }
        state
            .records
            .get(name)
            .map(|r| r.get(field).to_string())
            .ok_or_else(|| not_registered(name))
    }

    async fn get_address(&self, _ctx: &WalletContext, name: &str) -> anyhow::Result<Address> {
        let state = self.state.lock().await;
        if state.fail_details_for.as_deref() == Some(name) {
            return Err(transport_error("getAddress"));
        }
        state
            .records
            .get(name)
            .map(|r| r.owner)
            .ok_or_else(|| not_registered(name))
    }

    async fn enumerate_names(&self, _ctx: &WalletContext) -> anyhow::Result<Vec<String>> {
        let state = self.state.lock().await;
        if state.fail_reads {
            return Err(transport_error("getAllNames"));
        }
        Ok(state.names.clone())
    }

    async fn register(&self, ctx: &WalletContext, name: &str, price: U256) -> anyhow::Result<PendingTx> {
        self.queue(ctx, |owner| QueuedWrite::Register {
            name: name.to_string(),
            owner,
            value: price,
        })
        .await
    }

    async fn set_records(
        &self,
        ctx: &WalletContext,
        name: &str,
        records: &RecordSet,
    ) -> anyhow::Result<PendingTx> {
        self.queue(ctx, |sender| QueuedWrite::SetRecords {
            name: name.to_string(),
            sender,
            records: records.clone(),
        })
        .await
    }

    async fn set_reverse(&self, ctx: &WalletContext, name: &str) -> anyhow::Result<PendingTx> {
        self.queue(ctx, |sender| QueuedWrite::SetReverse {
            name: name.to_string(),
            sender,
        })
        .await
    }

    async fn wait(&self, tx: &PendingTx) -> anyhow::Result<TxStatus> {
        let mut hold = self.hold_confirmations.subscribe();
        let released = hold.wait_for(|held| !*held).await.is_ok();
        if !released {
            return Err(anyhow::anyhow!("ledger dropped while {} was pending", tx.hash_hex()));
        }

        let mut state = self.state.lock().await;
        let write = state
            .queued
            .remove(&tx.hash)
            .ok_or_else(|| anyhow::anyhow!("unknown transaction {}", tx.hash_hex()))?;
        if state.fail_next_mined {
            state.fail_next_mined = false;
            return Ok(TxStatus::Failed);
        }
        Ok(Self::apply(&mut state, write))
    }
}
