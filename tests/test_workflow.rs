//! Resolution workflow against the in-process ledger: search, mint, update, reverse, refresh.

mod common;

use brock_name_service::app::workflow::MINT_FAILED_NOTICE;
use brock_name_service::domain::{tier, PriceTier};
use brock_name_service::{Outcome, RecordField, RecordSet, Resolution, Skip};
use common::{brock_records, harness, owner, stranger, wait_until_busy, REFRESH_DELAY};
use primitive_types::U256;

#[test]
fn price_tiers_follow_name_length() {
    assert_eq!(tier(3), PriceTier::ThreeChars);
    assert_eq!(tier(4), PriceTier::FourChars);
    for len in 5..=12 {
        assert_eq!(tier(len), PriceTier::Standard);
    }
    assert_eq!(tier(3).amount(), "0.5");
    assert_eq!(tier(4).amount(), "0.3");
    assert_eq!(tier(9).amount(), "0.1");
    assert_eq!(tier(3).wei(), U256::from(500_000_000_000_000_000u64));
    assert_eq!(tier(5).wei(), U256::from(100_000_000_000_000_000u64));
}

#[tokio::test]
async fn out_of_bounds_names_are_ignored_without_state_change() {
    let h = harness(Some(owner()));
    h.workflow.input("kept").await;

    for input in ["", "ab", "thirteenchars"] {
        assert_eq!(h.workflow.search(input).await, Outcome::Ignored(Skip::InvalidName));
    }

    assert_eq!(h.workflow.resolution().await, Resolution::Idle);
    assert_eq!(h.workflow.typed_name().await, "kept");
}

#[tokio::test]
async fn unregistered_name_becomes_mintable_at_tier_price() {
    let h = harness(Some(owner()));

    assert_eq!(h.workflow.search("abc").await, Outcome::Applied);

    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Mintable(PriceTier::ThreeChars)
    );
    let view = h.workflow.view(Some(&owner())).await;
    assert_eq!(view.status, "mintable");
    assert_eq!(view.price, Some("0.5"));
    assert!(view.records.is_none());
    assert_eq!(view.display_name.as_deref(), Some("abc.brock"));
}

#[tokio::test]
async fn registered_name_loads_exact_record_set() {
    let h = harness(Some(stranger()));
    h.ledger.seed("brock", brock_records()).await;

    assert_eq!(h.workflow.search("brock").await, Outcome::Applied);

    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Editable(brock_records())
    );
    let view = h.workflow.view(Some(&stranger())).await;
    assert_eq!(view.status, "editable");
    assert!(view.price.is_none());
    assert_eq!(view.records.map(|r| r.owner), Some(owner()));
}

#[tokio::test]
async fn editors_are_read_only_for_anyone_but_the_owner() {
    let h = harness(Some(stranger()));
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.search("brock").await;

    let upper_owner: brock_name_service::domain::Address = common::OWNER.to_uppercase().replacen("0X", "0x", 1).parse().unwrap();
    assert!(!h.workflow.records_editable(Some(&stranger())).await);
    assert!(!h.workflow.records_editable(None).await);
    assert!(h.workflow.records_editable(Some(&upper_owner)).await);

    // Stranger edits are refused and leave the records untouched.
    assert_eq!(
        h.workflow
            .edit_field(RecordField::Email, "spam@example.com".to_string())
            .await,
        Outcome::Ignored(Skip::NotOwner)
    );
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Editable(brock_records())
    );
}

#[tokio::test]
async fn mint_is_only_reachable_from_mintable() {
    let h = harness(Some(owner()));
    h.ledger.seed("brock", brock_records()).await;

    assert_eq!(h.workflow.mint().await, Outcome::Ignored(Skip::WrongState));

    h.workflow.search("brock").await;
    assert_eq!(h.workflow.mint().await, Outcome::Ignored(Skip::WrongState));
    assert_eq!(h.ledger.submissions().await, 0);
}

#[tokio::test]
async fn successful_mint_clears_state_and_refreshes_list() {
    let h = harness(Some(owner()));
    h.workflow.search("newname").await;

    assert_eq!(h.workflow.mint().await, Outcome::Applied);

    assert_eq!(h.workflow.resolution().await, Resolution::Idle);
    assert_eq!(h.workflow.typed_name().await, "");
    assert!(!h.workflow.is_busy().await);
    assert_eq!(h.ledger.records_of("newname").await, Some(RecordSet::unset(owner())));

    // The delayed refresh picks the new name up.
    tokio::time::sleep(REFRESH_DELAY * 10).await;
    let minted = h.workflow.minted().await;
    assert!(minted.iter().any(|e| e.name == "newname" && e.owner == owner()));

    assert_eq!(h.workflow.refresh_list().await, Outcome::Applied);
    assert_eq!(h.workflow.minted().await.len(), 1);
}

#[tokio::test]
async fn failed_mint_transaction_keeps_mintable_and_raises_notice() {
    let h = harness(Some(owner()));
    h.workflow.search("abcd").await;
    h.ledger.fail_next_mined().await;

    let outcome = h.workflow.mint().await;

    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Mintable(PriceTier::FourChars)
    );
    assert_eq!(h.workflow.typed_name().await, "abcd");
    assert_eq!(h.workflow.notice().await.as_deref(), Some(MINT_FAILED_NOTICE));
    assert!(!h.workflow.is_busy().await);
    assert_eq!(h.ledger.records_of("abcd").await, None);

    h.workflow.dismiss_notice().await;
    assert_eq!(h.workflow.notice().await, None);
}

#[tokio::test]
async fn declined_mint_reverts_without_notice() {
    let h = harness(Some(owner()));
    h.workflow.search("abcd").await;
    h.ledger.fail_submissions(true).await;

    assert!(matches!(h.workflow.mint().await, Outcome::Failed(_)));

    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Mintable(PriceTier::FourChars)
    );
    assert_eq!(h.workflow.notice().await, None);
    assert!(!h.workflow.is_busy().await);
}

#[tokio::test]
async fn update_by_non_owner_is_refused_before_submission() {
    let h = harness(Some(stranger()));
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.search("brock").await;

    assert_eq!(h.workflow.update().await, Outcome::Ignored(Skip::NotOwner));

    assert_eq!(h.ledger.submissions().await, 0);
    assert!(!h.workflow.is_busy().await);
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Editable(brock_records())
    );
}

#[tokio::test]
async fn owner_update_writes_all_fields_and_resets() {
    let h = harness(Some(owner()));
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.search("brock").await;

    assert_eq!(
        h.workflow
            .edit_field(RecordField::Description, "rewritten".to_string())
            .await,
        Outcome::Applied
    );
    assert_eq!(h.workflow.update().await, Outcome::Applied);

    let stored = h.ledger.records_of("brock").await.unwrap();
    assert_eq!(stored.description, "rewritten");
    assert_eq!(stored.website, brock_records().website);
    assert_eq!(h.workflow.resolution().await, Resolution::Idle);
    assert_eq!(h.workflow.typed_name().await, "");

    let minted = h.workflow.minted().await;
    assert_eq!(minted.len(), 1);
    assert_eq!(minted[0].record, "rewritten");
}

#[tokio::test]
async fn set_reverse_keeps_editable_state() {
    let h = harness(Some(owner()));
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.search("brock").await;

    assert_eq!(h.workflow.set_reverse().await, Outcome::Applied);

    assert_eq!(h.ledger.reverse_of(&owner()).await.as_deref(), Some("brock"));
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Editable(brock_records())
    );
    assert!(!h.workflow.is_busy().await);
}

#[tokio::test]
async fn transport_failure_on_search_leaves_state_unchanged() {
    let h = harness(Some(owner()));
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.search("brock").await;
    h.ledger.fail_reads(true).await;

    assert!(matches!(h.workflow.search("brock").await, Outcome::Failed(_)));
    assert!(matches!(h.workflow.search("other").await, Outcome::Failed(_)));
    assert!(matches!(h.workflow.select_minted("other").await, Outcome::Failed(_)));

    assert_eq!(h.workflow.typed_name().await, "brock");
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Editable(brock_records())
    );
}

#[tokio::test]
async fn update_counts_a_mined_failure_as_done() {
    let h = harness(Some(owner()));
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.search("brock").await;
    h.workflow
        .edit_field(RecordField::Website, "https://new.example".to_string())
        .await;
    h.ledger.fail_next_mined().await;

    assert_eq!(h.workflow.update().await, Outcome::Applied);

    assert_eq!(h.workflow.resolution().await, Resolution::Idle);
    assert_eq!(h.workflow.typed_name().await, "");
    assert_eq!(h.workflow.notice().await, None);
    // The ledger rejected the write; only the workflow moved on.
    assert_eq!(h.ledger.records_of("brock").await, Some(brock_records()));
}

#[tokio::test]
async fn failed_update_submission_returns_to_editable() {
    let h = harness(Some(owner()));
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.search("brock").await;
    h.ledger.fail_submissions(true).await;

    assert!(matches!(h.workflow.update().await, Outcome::Failed(_)));

    assert!(!h.workflow.is_busy().await);
    assert_eq!(h.workflow.typed_name().await, "brock");
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Editable(brock_records())
    );
}

#[tokio::test]
async fn failed_set_reverse_keeps_editable_and_clears_busy() {
    let h = harness(Some(owner()));
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.search("brock").await;
    h.ledger.fail_submissions(true).await;

    assert!(matches!(h.workflow.set_reverse().await, Outcome::Failed(_)));

    assert!(!h.workflow.is_busy().await);
    assert_eq!(h.ledger.reverse_of(&owner()).await, None);
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Editable(brock_records())
    );
}

#[tokio::test]
async fn update_without_connected_account_is_skipped() {
    let h = harness(None);
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.search("brock").await;

    assert_eq!(h.workflow.update().await, Outcome::Ignored(Skip::NoAccount));

    assert!(!h.workflow.is_busy().await);
    assert_eq!(h.ledger.submissions().await, 0);
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Editable(brock_records())
    );
}

#[tokio::test]
async fn busy_workflow_refuses_every_action() {
    let h = harness(Some(owner()));
    h.workflow.search("abc").await;
    h.ledger.hold_confirmations(true);

    let workflow = h.workflow.clone();
    let mint = tokio::spawn(async move { workflow.mint().await });
    wait_until_busy(&h.workflow).await;

    assert_eq!(h.workflow.search("brock").await, Outcome::Ignored(Skip::Busy));
    assert_eq!(h.workflow.mint().await, Outcome::Ignored(Skip::Busy));
    assert_eq!(h.workflow.update().await, Outcome::Ignored(Skip::Busy));
    assert_eq!(h.workflow.set_reverse().await, Outcome::Ignored(Skip::Busy));
    assert_eq!(h.ledger.submissions().await, 1);

    h.ledger.hold_confirmations(false);
    assert_eq!(mint.await.unwrap(), Outcome::Applied);
    assert!(!h.workflow.is_busy().await);
}

#[tokio::test]
async fn wallet_change_discards_in_flight_result() {
    let h = harness(Some(owner()));
    h.workflow.search("abc").await;
    h.ledger.hold_confirmations(true);

    let workflow = h.workflow.clone();
    let mint = tokio::spawn(async move { workflow.mint().await });
    wait_until_busy(&h.workflow).await;

    h.wallet.set_account(Some(stranger())).await;
    h.workflow.on_wallet_changed().await;
    assert!(!h.workflow.is_busy().await);

    h.ledger.hold_confirmations(false);
    assert_eq!(mint.await.unwrap(), Outcome::Stale);

    // The mint landed on the ledger, but the new session's state was not touched.
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Mintable(PriceTier::ThreeChars)
    );
    assert_eq!(h.workflow.typed_name().await, "abc");
}

#[tokio::test]
async fn partial_refresh_failure_keeps_previous_snapshot() {
    let h = harness(Some(owner()));
    for name in ["alpha", "bravo", "charlie"] {
        h.ledger.seed(name, brock_records()).await;
    }
    assert_eq!(h.workflow.refresh_list().await, Outcome::Applied);
    let before = h.workflow.minted().await;
    assert_eq!(before.len(), 3);
    assert_eq!(before.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2, 3]);

    h.ledger.seed("delta", brock_records()).await;
    h.ledger.fail_details_for(Some("bravo")).await;

    assert!(matches!(h.workflow.refresh_list().await, Outcome::Failed(_)));
    assert_eq!(h.workflow.minted().await, before);
}

#[tokio::test]
async fn selecting_a_minted_entry_reruns_search() {
    let h = harness(Some(owner()));
    h.ledger.seed("brock", brock_records()).await;
    h.workflow.input("something").await;

    assert_eq!(h.workflow.select_minted("brock").await, Outcome::Applied);

    assert_eq!(h.workflow.typed_name().await, "brock");
    assert_eq!(
        h.workflow.resolution().await,
        Resolution::Editable(brock_records())
    );
}

#[tokio::test]
async fn typing_clears_the_current_resolution() {
    let h = harness(Some(owner()));
    h.workflow.search("abc").await;

    h.workflow.input("abcd").await;

    assert_eq!(h.workflow.resolution().await, Resolution::Idle);
    assert_eq!(h.workflow.typed_name().await, "abcd");
}
