//! Snapshot of every registered name with its summary record and owner.

use crate::domain::{Address, MintedEntry, RecordField};
use crate::infra::ledger::LedgerGateway;
use crate::infra::wallet::WalletContext;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Field shown next to each name in the list.
pub const SUMMARY_FIELD: RecordField = RecordField::Description;

/// Replaced wholesale on every refresh; never patched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MintedListCache {
    entries: Vec<MintedEntry>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl MintedListCache {
    pub fn entries(&self) -> &[MintedEntry] {
        &self.entries
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn replace(&mut self, entries: Vec<MintedEntry>) {
        self.entries = entries;
        self.refreshed_at = Some(Utc::now());
    }
}

/// Pairs enumerated names with their fetched details. The id is the 1-based position of the
/// name's first occurrence in `names`.
pub fn build_entries(names: &[String], details: Vec<(String, Address)>) -> Vec<MintedEntry> {
    names
        .iter()
        .zip(details)
        .map(|(name, (record, owner))| MintedEntry {
            id: names.iter().position(|n| n == name).unwrap_or(0) + 1,
            name: name.clone(),
            record,
            owner,
        })
        .collect()
}

/// Enumerates names, then fetches every name's summary and owner concurrently. Any single
/// failure fails the whole snapshot.
pub async fn fetch_snapshot(
    gateway: Arc<dyn LedgerGateway>,
    ctx: &WalletContext,
) -> anyhow::Result<Vec<MintedEntry>> {
    let names = gateway.enumerate_names(ctx).await?;

    let mut tasks = JoinSet::new();
    for (index, name) in names.iter().cloned().enumerate() {
        let gateway = gateway.clone();
        let ctx = ctx.clone();
        tasks.spawn(async move {
            let record = gateway.get_record(&ctx, &name, SUMMARY_FIELD).await?;
            let owner = gateway.get_address(&ctx, &name).await?;
            anyhow::Ok((index, record, owner))
        });
    }

    let mut details: Vec<Option<(String, Address)>> = vec![None; names.len()];
    while let Some(joined) = tasks.join_next().await {
        // Returning early drops the JoinSet, which aborts the remaining fetches.
        let (index, record, owner) = joined??;
        details[index] = Some((record, owner));
    }

    let details = details
        .into_iter()
        .map(|d| d.ok_or_else(|| anyhow::anyhow!("missing details in minted snapshot")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(build_entries(&names, details))
}
