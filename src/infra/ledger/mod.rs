//! LedgerGateway: the capability set the client uses against the registry and reverse
//! contracts.
//!
//! Every call receives the wallet context read just before the call. Implementations must not
//! cache a signer or a contract binding between calls, because the account or chain can change
//! between any two awaits.

use crate::domain::{Address, RecordField, RecordSet};
use crate::infra::wallet::WalletContext;
use async_trait::async_trait;
use primitive_types::{H256, U256};

pub mod abi;
pub mod memory;
pub mod rpc;

pub use memory::MemoryLedger;
pub use rpc::RpcLedger;

/// A submitted write. Resolve it with [`LedgerGateway::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: H256,
}

impl PendingTx {
    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash.as_bytes()))
    }
}

/// Terminal status of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failed,
}

#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// `Ok(false)` when the name is not registered (the contract reverts). Other errors are
    /// transport failures.
    async fn lookup_id(&self, ctx: &WalletContext, name: &str) -> anyhow::Result<bool>;

    /// Only meaningful after `lookup_id` returned true.
    async fn get_records(&self, ctx: &WalletContext, name: &str) -> anyhow::Result<RecordSet>;

    async fn get_record(
        &self,
        ctx: &WalletContext,
        name: &str,
        field: RecordField,
    ) -> anyhow::Result<String>;

    async fn get_address(&self, ctx: &WalletContext, name: &str) -> anyhow::Result<Address>;

    /// All registered names, in the order the ledger returns them.
    async fn enumerate_names(&self, ctx: &WalletContext) -> anyhow::Result<Vec<String>>;

    /// Submits a paid registration. Errors here are submission-time failures (declined,
    /// insufficient funds, RPC).
    async fn register(&self, ctx: &WalletContext, name: &str, price: U256) -> anyhow::Result<PendingTx>;

    /// All five editable fields are written together.
    async fn set_records(
        &self,
        ctx: &WalletContext,
        name: &str,
        records: &RecordSet,
    ) -> anyhow::Result<PendingTx>;

    async fn set_reverse(&self, ctx: &WalletContext, name: &str) -> anyhow::Result<PendingTx>;

    /// Waits until the transaction is mined. No timeout: a stalled network never resolves.
    async fn wait(&self, tx: &PendingTx) -> anyhow::Result<TxStatus>;
}
