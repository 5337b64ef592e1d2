//! Background task that notices account / chain changes on the wallet.
//!
//! A JSON-RPC wallet has no push events, so the context is polled. Each change starts a new
//! workflow session, and the minted list is refreshed when the wallet lands on the required
//! network.

use crate::app::workflow::ResolutionWorkflow;
use crate::infra::network::NetworkGuard;
use crate::infra::wallet::{WalletContext, WalletProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::interval;

pub struct WalletWatcher {
    wallet: Arc<dyn WalletProvider>,
    guard: Arc<NetworkGuard>,
    workflow: Arc<ResolutionWorkflow>,
    poll_interval: Duration,
    last_seen: Mutex<Option<WalletContext>>,
    shutdown: Arc<Notify>,
}

impl WalletWatcher {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        guard: Arc<NetworkGuard>,
        workflow: Arc<ResolutionWorkflow>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            wallet,
            guard,
            workflow,
            poll_interval,
            last_seen: Mutex::new(None),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Reads the wallet once and reacts if anything changed since the last poll. The first
    /// successful read counts as a change (the "connect" event).
    /// Returns true when a change was handled.
    pub async fn poll_once(&self) -> bool {
        let ctx = match WalletContext::read(self.wallet.as_ref()).await {
            Ok(ctx) => ctx,
            Err(e) => {
                eprintln!("> WalletWatcher: could not read wallet context: {}", e);
                return false;
            }
        };

        {
            let mut last_seen = self.last_seen.lock().await;
            if last_seen.as_ref() == Some(&ctx) {
                return false;
            }
            *last_seen = Some(ctx.clone());
        }

        match &ctx.account {
            Some(account) => println!(
                "> WalletWatcher: chain 0x{:x}, account {}",
                ctx.chain_id, account
            ),
            None => println!("> WalletWatcher: chain 0x{:x}, no account connected", ctx.chain_id),
        }
        self.workflow.on_wallet_changed().await;

        if self.guard.is_on_required_network(ctx.chain_id) {
            self.workflow.refresh_list().await;
        } else {
            println!(
                "> WalletWatcher: not on {}, minted list not refreshed",
                self.guard.required().chain_name
            );
        }
        true
    }

    pub fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval_timer = interval(self.poll_interval);
            let shutdown = self.shutdown.clone();

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        self.poll_once().await;
                    }
                    _ = shutdown.notified() => {
                        println!("> WalletWatcher: shutting down");
                        break;
                    }
                }
            }
        });
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}
