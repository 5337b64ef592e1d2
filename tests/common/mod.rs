//! Shared fixtures: an in-process ledger + wallet wired into a workflow.

#![allow(dead_code)]

use brock_name_service::app::{ResolutionWorkflow, WorkflowConfig};
use brock_name_service::infra::ledger::MemoryLedger;
use brock_name_service::infra::network::BITROCK_MAINNET;
use brock_name_service::infra::wallet::MemoryWallet;
use brock_name_service::{Address, RecordSet};
use std::sync::Arc;
use std::time::Duration;

pub const OWNER: &str = "0xaAbBcCdDeEfF00112233445566778899aAbBcCdD";
pub const STRANGER: &str = "0x000000000000000000000000000000000000dEaD";

pub const REFRESH_DELAY: Duration = Duration::from_millis(20);

pub fn owner() -> Address {
    OWNER.parse().unwrap()
}

pub fn stranger() -> Address {
    STRANGER.parse().unwrap()
}

pub fn brock_records() -> RecordSet {
    RecordSet {
        avatar: "ipfs://bafy/avatar.png".to_string(),
        social_handle: "@brock".to_string(),
        website: "https://brock.example".to_string(),
        email: "hi@brock.example".to_string(),
        description: "the original brock".to_string(),
        owner: owner(),
    }
}

pub struct Harness {
    pub ledger: Arc<MemoryLedger>,
    pub wallet: Arc<MemoryWallet>,
    pub workflow: Arc<ResolutionWorkflow>,
}

/// Wallet on the required network, connected as `account`.
pub fn harness(account: Option<Address>) -> Harness {
    harness_on_chain(BITROCK_MAINNET.chain_id, account)
}

pub fn harness_on_chain(chain_id: u64, account: Option<Address>) -> Harness {
    let ledger = Arc::new(MemoryLedger::new());
    let wallet = Arc::new(MemoryWallet::new(chain_id, account));
    let workflow = Arc::new(ResolutionWorkflow::new(
        ledger.clone(),
        wallet.clone(),
        WorkflowConfig {
            mint_refresh_delay: REFRESH_DELAY,
            network: BITROCK_MAINNET,
        },
    ));
    Harness {
        ledger,
        wallet,
        workflow,
    }
}

/// Polls until the workflow reports Busy (a write is in flight).
pub async fn wait_until_busy(workflow: &ResolutionWorkflow) {
    for _ in 0..200 {
        if workflow.is_busy().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("workflow never became busy");
}
