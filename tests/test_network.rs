//! Required-network guard and the wallet watcher.

mod common;

use brock_name_service::app::WalletWatcher;
use brock_name_service::infra::network::{network_name, NetworkGuard, SwitchOutcome, BITROCK_MAINNET};
use brock_name_service::infra::wallet::{MemoryWallet, WalletContext};
use common::{brock_records, harness_on_chain, owner};
use std::sync::Arc;
use std::time::Duration;

const MAINNET: u64 = 0x1;

fn guard_for(wallet: &Arc<MemoryWallet>) -> NetworkGuard {
    NetworkGuard::new(wallet.clone(), BITROCK_MAINNET)
}

#[test]
fn required_network_is_matched_through_the_name_table() {
    let wallet = Arc::new(MemoryWallet::new(MAINNET, None));
    let guard = guard_for(&wallet);

    assert_eq!(network_name(0x1c03), Some("Bitrock Mainnet"));
    assert!(guard.is_on_required_network(0x1c03));
    assert!(!guard.is_on_required_network(MAINNET));
    assert!(!guard.is_on_required_network(0xdead));
}

#[tokio::test]
async fn switch_to_known_network() {
    let wallet = Arc::new(MemoryWallet::new(MAINNET, Some(owner())));
    wallet.add_known_chain(BITROCK_MAINNET.chain_id).await;
    let guard = guard_for(&wallet);

    assert_eq!(guard.request_switch().await, SwitchOutcome::Switched);
    assert_eq!(wallet.chain_id().await, BITROCK_MAINNET.chain_id);
    assert!(!wallet
        .requests()
        .await
        .contains(&"wallet_addEthereumChain".to_string()));
}

#[tokio::test]
async fn unrecognized_chain_falls_back_to_add() {
    let wallet = Arc::new(MemoryWallet::new(MAINNET, Some(owner())));
    let guard = guard_for(&wallet);

    assert_eq!(guard.request_switch().await, SwitchOutcome::Added);
    assert_eq!(wallet.chain_id().await, BITROCK_MAINNET.chain_id);

    let requests = wallet.requests().await;
    let switch_at = requests.iter().position(|r| r == "wallet_switchEthereumChain");
    let add_at = requests.iter().position(|r| r == "wallet_addEthereumChain");
    assert!(switch_at.is_some() && add_at.is_some());
    assert!(switch_at < add_at);
}

#[tokio::test]
async fn declined_prompt_leaves_wallet_on_wrong_network() {
    let wallet = Arc::new(MemoryWallet::new(MAINNET, Some(owner())));
    wallet.reject_requests(true).await;
    let guard = guard_for(&wallet);

    assert_eq!(guard.request_switch().await, SwitchOutcome::StillOnWrongNetwork);
    assert_eq!(wallet.chain_id().await, MAINNET);
    assert!(!guard.check().await);
}

#[tokio::test]
async fn switch_needs_a_connected_account() {
    let wallet = Arc::new(MemoryWallet::new(MAINNET, None));
    let guard = guard_for(&wallet);

    assert_eq!(guard.request_switch().await, SwitchOutcome::NoAccount);
    assert_eq!(wallet.requests().await, vec!["eth_chainId", "eth_accounts"]);
}

#[tokio::test]
async fn wallet_context_is_read_fresh() {
    let wallet = MemoryWallet::new(BITROCK_MAINNET.chain_id, Some(owner()));
    let first = WalletContext::read(&wallet).await.unwrap();
    wallet.set_account(None).await;
    let second = WalletContext::read(&wallet).await.unwrap();

    assert_eq!(first.account, Some(owner()));
    assert_eq!(second.account, None);
    assert!(second.signer().is_err());
}

#[tokio::test]
async fn watcher_refreshes_only_on_required_network() {
    let h = harness_on_chain(MAINNET, Some(owner()));
    h.ledger.seed("brock", brock_records()).await;
    let guard = Arc::new(NetworkGuard::new(h.wallet.clone(), BITROCK_MAINNET));
    let watcher = WalletWatcher::new(
        h.wallet.clone(),
        guard,
        h.workflow.clone(),
        Duration::from_millis(10),
    );

    assert!(watcher.poll_once().await);
    assert!(h.workflow.minted().await.is_empty());

    // Nothing changed: no new session, no refresh.
    assert!(!watcher.poll_once().await);

    h.wallet.set_chain(BITROCK_MAINNET.chain_id).await;
    assert!(watcher.poll_once().await);
    let minted = h.workflow.minted().await;
    assert_eq!(minted.len(), 1);
    assert_eq!(minted[0].name, "brock");
    assert_eq!(minted[0].record, brock_records().description);
}
