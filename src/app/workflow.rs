//! The resolution workflow.
//!
//! Takes a typed name, looks it up, and lands in one of three states: Idle, Editable (a record
//! set is loaded) or Mintable (the name is free and priced). Writes run under a Busy flag that
//! the caller must honour: while busy, every action is refused.
//!
//! The wallet context is re-read right before each ledger call. Every action remembers the
//! session it started in; a wallet change bumps the session and results that arrive for an
//! older session are dropped.
//!
//! No action returns an error. Failures are logged, state is restored, and the caller gets an
//! [`Outcome`].

use crate::app::minted::{self, MintedListCache};
use crate::domain::{Address, MintedEntry, Name, PriceTier, RecordField, RecordSet};
use crate::infra::ledger::{LedgerGateway, TxStatus};
use crate::infra::network::NetworkDescriptor;
use crate::infra::wallet::{WalletContext, WalletProvider};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use utoipa::ToSchema;

pub const MINT_FAILED_NOTICE: &str = "Transaction failed! Please try again";

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Wait before the list refresh that follows a successful mint.
    pub mint_refresh_delay: Duration,
    /// Used for explorer links in the logs.
    pub network: NetworkDescriptor,
}

/// The current resolution. At most one of records / price is ever populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Idle,
    Editable(RecordSet),
    Mintable(PriceTier),
}

/// Why an action was refused without touching the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Skip {
    InvalidName,
    Busy,
    WrongState,
    NotOwner,
    NoAccount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(Skip),
    /// State was restored; the reason has been logged.
    Failed(String),
    /// The wallet changed while the action was in flight; its result was dropped.
    Stale,
}

struct WorkflowState {
    typed_name: String,
    resolution: Resolution,
    busy: bool,
    notice: Option<String>,
    session: u64,
}

/// Serializable snapshot for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowView {
    pub typed_name: String,
    pub display_name: Option<String>,
    pub status: &'static str,
    pub busy: bool,
    pub records: Option<RecordSet>,
    pub price: Option<&'static str>,
    /// Whether the connected account may edit the loaded records.
    pub editable: bool,
    pub notice: Option<String>,
}

pub struct ResolutionWorkflow {
    gateway: Arc<dyn LedgerGateway>,
    wallet: Arc<dyn WalletProvider>,
    config: WorkflowConfig,
    state: Mutex<WorkflowState>,
    minted: Mutex<MintedListCache>,
}

fn failed(action: &str, e: anyhow::Error) -> Outcome {
    eprintln!("> Workflow: {} failed: {}", action, e);
    Outcome::Failed(e.to_string())
}

impl ResolutionWorkflow {
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        wallet: Arc<dyn WalletProvider>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            gateway,
            wallet,
            config,
            state: Mutex::new(WorkflowState {
                typed_name: String::new(),
                resolution: Resolution::Idle,
                busy: false,
                notice: None,
                session: 0,
            }),
            minted: Mutex::new(MintedListCache::default()),
        }
    }

    async fn context(&self) -> anyhow::Result<WalletContext> {
        WalletContext::read(self.wallet.as_ref()).await
    }

    /// Claims the Busy flag for a write that is valid from the current state.
    /// Returns the name, the loaded records (if any) and the session.
    async fn begin_write(
        &self,
        allowed: impl Fn(&Resolution) -> bool,
    ) -> Result<(Name, Resolution, u64), Skip> {
        let mut state = self.state.lock().await;
        if state.busy {
            return Err(Skip::Busy);
        }
        if !allowed(&state.resolution) {
            return Err(Skip::WrongState);
        }
        let name = Name::parse(&state.typed_name).ok_or(Skip::InvalidName)?;
        state.busy = true;
        state.notice = None;
        Ok((name, state.resolution.clone(), state.session))
    }

    /// Leaves Busy and applies `f`, unless the session moved on in the meantime.
    async fn finish(&self, session: u64, f: impl FnOnce(&mut WorkflowState)) -> bool {
        let mut state = self.state.lock().await;
        if state.session != session {
            return false;
        }
        state.busy = false;
        f(&mut state);
        true
    }

    /// Replaces the typed name and drops any resolution for the previous one.
    pub async fn input(&self, text: &str) {
        let mut state = self.state.lock().await;
        state.typed_name = text.to_string();
        state.resolution = Resolution::Idle;
        state.notice = None;
    }

    /// Looks `input` up on the ledger. Names outside 3..=12 characters are ignored without
    /// any state change, and so are lookups that fail.
    pub async fn search(&self, input: &str) -> Outcome {
        let Some(name) = Name::parse(input) else {
            return Outcome::Ignored(Skip::InvalidName);
        };

        let session = {
            let state = self.state.lock().await;
            if state.busy {
                return Outcome::Ignored(Skip::Busy);
            }
            state.session
        };

        // Typed name and resolution only move together, once the lookup has succeeded.
        let resolution = match self.resolve(&name).await {
            Ok(r) => r,
            Err(e) => return failed("search", e),
        };

        let mut state = self.state.lock().await;
        if state.session != session {
            return Outcome::Stale;
        }
        if state.busy {
            return Outcome::Ignored(Skip::Busy);
        }
        match &resolution {
            Resolution::Editable(_) => println!("> Workflow: {} is registered", name.display_name()),
            Resolution::Mintable(tier) => println!(
                "> Workflow: {} is available for {} {}",
                name.display_name(),
                tier.amount(),
                self.config.network.native_currency.symbol
            ),
            Resolution::Idle => {}
        }
        state.typed_name = name.to_string();
        state.resolution = resolution;
        Outcome::Applied
    }

    async fn resolve(&self, name: &Name) -> anyhow::Result<Resolution> {
        let ctx = self.context().await?;
        if self.gateway.lookup_id(&ctx, name.as_str()).await? {
            let ctx = self.context().await?;
            let records = self.gateway.get_records(&ctx, name.as_str()).await?;
            Ok(Resolution::Editable(records))
        } else {
            Ok(Resolution::Mintable(name.price_tier()))
        }
    }

    /// Edit-selection from the minted list: same as typing the name and searching.
    pub async fn select_minted(&self, name: &str) -> Outcome {
        self.search(name).await
    }

    /// Registers the typed name at its tier price. Only valid from Mintable.
    pub async fn mint(self: &Arc<Self>) -> Outcome {
        let (name, resolution, session) =
            match self.begin_write(|r| matches!(r, Resolution::Mintable(_))).await {
                Ok(v) => v,
                Err(skip) => return Outcome::Ignored(skip),
            };
        let tier = match resolution {
            Resolution::Mintable(tier) => tier,
            _ => name.price_tier(),
        };

        let ctx = match self.context().await {
            Ok(ctx) => ctx,
            Err(e) => {
                self.finish(session, |_| {}).await;
                return failed("mint", e);
            }
        };
        if ctx.account.is_none() {
            self.finish(session, |_| {}).await;
            return Outcome::Ignored(Skip::NoAccount);
        }

        println!(
            "> Workflow: minting {} for {} {}",
            name.display_name(),
            tier.amount(),
            self.config.network.native_currency.symbol
        );
        let tx = match self.gateway.register(&ctx, name.as_str(), tier.wei()).await {
            Ok(tx) => tx,
            Err(e) => {
                self.finish(session, |_| {}).await;
                return failed("mint submission", e);
            }
        };

        match self.gateway.wait(&tx).await {
            Ok(TxStatus::Success) => {
                let applied = self
                    .finish(session, |state| {
                        state.resolution = Resolution::Idle;
                        state.typed_name.clear();
                    })
                    .await;
                if !applied {
                    return Outcome::Stale;
                }
                println!(
                    "> Workflow: domain minted! {}",
                    self.config.network.tx_url(&tx.hash_hex())
                );
                self.schedule_refresh(self.config.mint_refresh_delay);
                Outcome::Applied
            }
            Ok(TxStatus::Failed) => {
                let applied = self
                    .finish(session, |state| {
                        state.notice = Some(MINT_FAILED_NOTICE.to_string());
                    })
                    .await;
                if !applied {
                    return Outcome::Stale;
                }
                eprintln!("> Workflow: mint transaction {} failed on-chain", tx.hash_hex());
                Outcome::Failed("transaction failed".to_string())
            }
            Err(e) => {
                self.finish(session, |_| {}).await;
                failed("mint confirmation", e)
            }
        }
    }

    /// Writes all five editable fields of the loaded record set. Only valid from Editable, and
    /// only for the owner: anyone else is refused before a transaction is submitted.
    pub async fn update(&self) -> Outcome {
        let (name, resolution, session) =
            match self.begin_write(|r| matches!(r, Resolution::Editable(_))).await {
                Ok(v) => v,
                Err(skip) => return Outcome::Ignored(skip),
            };
        let Resolution::Editable(records) = resolution else {
            self.finish(session, |_| {}).await;
            return Outcome::Ignored(Skip::WrongState);
        };

        let ctx = match self.context().await {
            Ok(ctx) => ctx,
            Err(e) => {
                self.finish(session, |_| {}).await;
                return failed("update", e);
            }
        };
        match ctx.account {
            None => {
                self.finish(session, |_| {}).await;
                return Outcome::Ignored(Skip::NoAccount);
            }
            Some(account) if account != records.owner => {
                self.finish(session, |_| {}).await;
                return Outcome::Ignored(Skip::NotOwner);
            }
            Some(_) => {}
        }

        let tx = match self.gateway.set_records(&ctx, name.as_str(), &records).await {
            Ok(tx) => tx,
            Err(e) => {
                self.finish(session, |_| {}).await;
                return failed("update submission", e);
            }
        };

        // Any completed wait counts as success here; the mined status is not inspected.
        if let Err(e) = self.gateway.wait(&tx).await {
            self.finish(session, |_| {}).await;
            return failed("update confirmation", e);
        }

        let applied = self
            .finish(session, |state| {
                state.resolution = Resolution::Idle;
                state.typed_name.clear();
            })
            .await;
        if !applied {
            return Outcome::Stale;
        }
        println!(
            "> Workflow: record set {}",
            self.config.network.tx_url(&tx.hash_hex())
        );
        self.refresh_list().await;
        Outcome::Applied
    }

    /// Points the connected account's reverse record at the loaded name. The resolution is left
    /// as it was.
    pub async fn set_reverse(&self) -> Outcome {
        let (name, _, session) =
            match self.begin_write(|r| matches!(r, Resolution::Editable(_))).await {
                Ok(v) => v,
                Err(skip) => return Outcome::Ignored(skip),
            };

        let ctx = match self.context().await {
            Ok(ctx) => ctx,
            Err(e) => {
                self.finish(session, |_| {}).await;
                return failed("set reverse", e);
            }
        };
        let tx = match self.gateway.set_reverse(&ctx, name.as_str()).await {
            Ok(tx) => tx,
            Err(e) => {
                self.finish(session, |_| {}).await;
                return failed("set reverse submission", e);
            }
        };
        let waited = self.gateway.wait(&tx).await;

        if !self.finish(session, |_| {}).await {
            return Outcome::Stale;
        }
        match waited {
            Ok(_) => {
                println!(
                    "> Workflow: reverse record set to {} {}",
                    name.display_name(),
                    self.config.network.tx_url(&tx.hash_hex())
                );
                Outcome::Applied
            }
            Err(e) => failed("set reverse confirmation", e),
        }
    }

    /// Applies an in-progress edit to the loaded record set. Refused unless the connected
    /// account owns it.
    pub async fn edit_field(&self, field: RecordField, value: String) -> Outcome {
        let account = match self.context().await {
            Ok(ctx) => ctx.account,
            Err(e) => return failed("edit", e),
        };
        let mut state = self.state.lock().await;
        if state.busy {
            return Outcome::Ignored(Skip::Busy);
        }
        let Resolution::Editable(records) = &mut state.resolution else {
            return Outcome::Ignored(Skip::WrongState);
        };
        if !records.is_editable_by(account.as_ref()) {
            return Outcome::Ignored(Skip::NotOwner);
        }
        records.set(field, value);
        Outcome::Applied
    }

    /// Whether the record editors accept input from `account`. All five fields share the owner
    /// rule; the owner address itself has no editor.
    pub async fn records_editable(&self, account: Option<&Address>) -> bool {
        let state = self.state.lock().await;
        match &state.resolution {
            Resolution::Editable(records) => records.is_editable_by(account),
            _ => false,
        }
    }

    /// Rebuilds the minted list from the ledger. The old snapshot stays in place on failure.
    pub async fn refresh_list(&self) -> Outcome {
        let session = self.state.lock().await.session;
        let ctx = match self.context().await {
            Ok(ctx) => ctx,
            Err(e) => return failed("refresh list", e),
        };
        let entries = match minted::fetch_snapshot(self.gateway.clone(), &ctx).await {
            Ok(entries) => entries,
            Err(e) => return failed("refresh list", e),
        };
        if self.state.lock().await.session != session {
            return Outcome::Stale;
        }
        println!("> Workflow: minted list refreshed ({} names)", entries.len());
        self.minted.lock().await.replace(entries);
        Outcome::Applied
    }

    /// Refreshes the list after `delay`, giving the ledger time to reflect a fresh write.
    pub fn schedule_refresh(self: &Arc<Self>, delay: Duration) {
        let workflow = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            workflow.refresh_list().await;
        });
    }

    /// Called when the wallet's chain or account changes. In-flight actions become stale and
    /// Busy is released.
    pub async fn on_wallet_changed(&self) {
        let mut state = self.state.lock().await;
        state.session += 1;
        state.busy = false;
        println!("> Workflow: wallet changed, session {}", state.session);
    }

    pub async fn dismiss_notice(&self) {
        self.state.lock().await.notice = None;
    }

    pub async fn resolution(&self) -> Resolution {
        self.state.lock().await.resolution.clone()
    }

    pub async fn typed_name(&self) -> String {
        self.state.lock().await.typed_name.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.busy
    }

    pub async fn notice(&self) -> Option<String> {
        self.state.lock().await.notice.clone()
    }

    pub async fn minted(&self) -> Vec<MintedEntry> {
        self.minted.lock().await.entries().to_vec()
    }

    pub async fn minted_snapshot(&self) -> MintedListCache {
        self.minted.lock().await.clone()
    }

    pub async fn view(&self, account: Option<&Address>) -> WorkflowView {
        let state = self.state.lock().await;
        let (status, records, price) = match &state.resolution {
            Resolution::Idle => ("idle", None, None),
            Resolution::Editable(r) => ("editable", Some(r.clone()), None),
            Resolution::Mintable(tier) => ("mintable", None, Some(tier.amount())),
        };
        WorkflowView {
            typed_name: state.typed_name.clone(),
            display_name: Name::parse(&state.typed_name).map(|n| n.display_name()),
            status,
            busy: state.busy,
            editable: records
                .as_ref()
                .is_some_and(|r: &RecordSet| r.is_editable_by(account)),
            records,
            price,
            notice: state.notice.clone(),
        }
    }
}
