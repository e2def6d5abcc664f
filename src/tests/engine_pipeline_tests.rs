//! End-to-end engine tests against the deterministic mock ledger

use std::sync::Arc;

use solana_sdk::signature::Keypair;
use spl_associated_token_account::get_associated_token_address;

use crate::config::AirdropConfig;
use crate::engine::errors::AirdropError;
use crate::engine::AirdropEngine;
use crate::test_utils::{LedgerEvent, MockLedger};
use crate::types::TransferPair;

fn pairs(n: usize) -> Vec<TransferPair> {
    (0..n)
        .map(|_| {
            TransferPair::new(
                solana_sdk::pubkey::Pubkey::new_unique(),
                solana_sdk::pubkey::Pubkey::new_unique(),
            )
        })
        .collect()
}

fn engine_with(
    ledger: &Arc<MockLedger>,
    signer: &Arc<Keypair>,
    bundle_size: usize,
    concurrency: usize,
) -> AirdropEngine {
    let config = AirdropConfig {
        bundle_size,
        concurrency,
        ..AirdropConfig::default()
    };
    AirdropEngine::new(
        Arc::clone(ledger) as Arc<dyn crate::ledger::LedgerClient>,
        Arc::clone(signer),
        config,
    )
}

#[tokio::test]
async fn test_three_pairs_two_bundles_all_succeed() {
    let ledger = Arc::new(MockLedger::new());
    let signer = Arc::new(Keypair::new());
    let input = pairs(3);

    let report = engine_with(&ledger, &signer, 2, 5)
        .run(input.clone())
        .await
        .unwrap();

    assert_eq!(report.successes.len(), 2);
    assert!(report.failures.is_empty());
    assert_eq!(report.pair_count(), 3);

    // Every input pair shows up in exactly one success entry.
    let mut reported: Vec<TransferPair> = report
        .successes
        .iter()
        .flat_map(|s| s.pairs.iter().copied())
        .collect();
    reported.sort_by_key(|p| p.mint.to_bytes());
    let mut expected = input;
    expected.sort_by_key(|p| p.mint.to_bytes());
    assert_eq!(reported, expected);

    // No destination accounts existed, so every pair costs three
    // instructions: one bundle of two pairs, one of a single pair.
    let sent = ledger.sent_transactions().await;
    let mut instruction_counts: Vec<usize> =
        sent.iter().map(|tx| tx.message.instructions.len()).collect();
    instruction_counts.sort();
    assert_eq!(instruction_counts, vec![3, 6]);
}

#[tokio::test]
async fn test_preexisting_destination_skips_create_instruction() {
    let ledger = Arc::new(MockLedger::new());
    let signer = Arc::new(Keypair::new());
    let input = pairs(2);

    // Seed the second pair's destination token account as existing.
    ledger
        .add_existing_account(get_associated_token_address(
            &input[1].destination,
            &input[1].mint,
        ))
        .await;

    let report = engine_with(&ledger, &signer, 6, 1)
        .run(input)
        .await
        .unwrap();
    assert_eq!(report.successes.len(), 1);

    // 3 instructions for the first pair, 2 for the pre-provisioned one.
    let sent = ledger.sent_transactions().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message.instructions.len(), 5);
}

#[tokio::test]
async fn test_send_failure_is_isolated_to_its_bundle() {
    let ledger = Arc::new(MockLedger::new());
    let signer = Arc::new(Keypair::new());
    let input = pairs(4);

    // Bundles are [0,1] and [2,3]; poison the second bundle's send via
    // an account only its transaction references.
    ledger.fail_sends_touching(input[2].destination).await;

    let report = engine_with(&ledger, &signer, 2, 5)
        .run(input.clone())
        .await
        .unwrap();

    assert_eq!(report.successes.len(), 1);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert!(matches!(failure.error, AirdropError::Submission(_)));
    assert_eq!(failure.pairs, vec![input[2], input[3]]);
    assert_eq!(report.successes[0].pairs, vec![input[0], input[1]]);
}

#[tokio::test]
async fn test_resolution_failure_is_isolated_to_its_bundle() {
    let ledger = Arc::new(MockLedger::new());
    let signer = Arc::new(Keypair::new());
    let input = pairs(4);

    ledger
        .fail_existence_query_touching(get_associated_token_address(
            &input[0].destination,
            &input[0].mint,
        ))
        .await;

    let report = engine_with(&ledger, &signer, 2, 5)
        .run(input.clone())
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        AirdropError::Resolution(_)
    ));
    assert_eq!(report.failures[0].pairs, vec![input[0], input[1]]);
    assert_eq!(report.successes.len(), 1);
    assert_eq!(report.successes[0].pairs, vec![input[2], input[3]]);
}

#[tokio::test]
async fn test_serial_run_fetches_anchor_only_after_prior_confirmation() {
    let ledger = Arc::new(MockLedger::new());
    let signer = Arc::new(Keypair::new());

    let report = engine_with(&ledger, &signer, 2, 1)
        .run(pairs(4))
        .await
        .unwrap();
    assert_eq!(report.successes.len(), 2);

    // With one permit the two bundle pipelines must not interleave.
    let events = ledger.events().await;
    let shapes: Vec<&str> = events
        .iter()
        .map(|e| match e {
            LedgerEvent::ExistenceQuery { .. } => "exists",
            LedgerEvent::BlockhashFetch => "blockhash",
            LedgerEvent::Send => "send",
            LedgerEvent::Confirm { .. } => "confirm",
        })
        .collect();
    assert_eq!(
        shapes,
        vec![
            "exists", "blockhash", "send", "confirm", //
            "exists", "blockhash", "send", "confirm",
        ]
    );
}

#[tokio::test]
async fn test_expired_confirmation_reported_as_unknown_state() {
    let ledger = Arc::new(MockLedger::new());
    let signer = Arc::new(Keypair::new());
    ledger.expire_all_confirmations();

    let report = engine_with(&ledger, &signer, 6, 2)
        .run(pairs(2))
        .await
        .unwrap();

    assert!(report.successes.is_empty());
    assert_eq!(report.failures.len(), 1);
    match &report.failures[0].error {
        AirdropError::ConfirmationExpired { .. } => {}
        other => panic!("expected ConfirmationExpired, got {:?}", other),
    }
    assert!(report.failures[0].error.to_string().contains("unknown"));
}

#[tokio::test]
async fn test_configuration_error_aborts_before_any_network_call() {
    let ledger = Arc::new(MockLedger::new());
    let signer = Arc::new(Keypair::new());

    let err = engine_with(&ledger, &signer, 0, 5)
        .run(pairs(3))
        .await
        .unwrap_err();
    assert!(matches!(err, AirdropError::Configuration(_)));
    assert!(ledger.events().await.is_empty());
}

#[tokio::test]
async fn test_empty_input_completes_without_traffic() {
    let ledger = Arc::new(MockLedger::new());
    let signer = Arc::new(Keypair::new());

    let report = engine_with(&ledger, &signer, 6, 5)
        .run(Vec::new())
        .await
        .unwrap();
    assert!(report.all_succeeded());
    assert_eq!(report.pair_count(), 0);
    assert!(ledger.events().await.is_empty());
}
