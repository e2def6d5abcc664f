//! Per-bundle transaction submission
//!
//! Realizes one instruction list as a confirmed transaction: fetch a
//! fresh blockhash, sign, send, confirm. The blockhash is fetched per
//! bundle immediately before signing; anything fetched earlier could
//! expire while other bundles hold the pool's permits. Each step maps
//! to its own bundle-local error.

use std::sync::Arc;

use solana_sdk::{
    instruction::Instruction,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

use crate::engine::errors::AirdropError;
use crate::ledger::{ConfirmationStatus, LedgerClient};

/// Sign, send, and confirm one bundle's instructions as a single
/// atomic transaction. Returns the signature on confirmed success.
pub async fn submit_instructions(
    client: &dyn LedgerClient,
    signer: &Arc<Keypair>,
    instructions: &[Instruction],
) -> Result<Signature, AirdropError> {
    let anchor = client
        .latest_blockhash()
        .await
        .map_err(|e| AirdropError::Blockhash(format!("{:#}", e)))?;

    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&signer.pubkey()),
        &[signer.as_ref()],
        anchor.blockhash,
    );

    let signature = client
        .send_transaction(&transaction)
        .await
        .map_err(|e| AirdropError::Submission(format!("{:#}", e)))?;

    // Confirm against the same anchor the transaction was signed with.
    let status = client
        .confirm_transaction(&signature, anchor.last_valid_block_height)
        .await
        .map_err(|e| AirdropError::Confirmation {
            signature,
            reason: format!("{:#}", e),
        })?;

    match status {
        ConfirmationStatus::Confirmed => Ok(signature),
        ConfirmationStatus::Expired => Err(AirdropError::ConfirmationExpired {
            signature,
            last_valid_block_height: anchor.last_valid_block_height,
        }),
        ConfirmationStatus::Failed(reason) => {
            Err(AirdropError::Confirmation { signature, reason })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{LedgerEvent, MockLedger};
    use solana_sdk::pubkey::Pubkey;
    #[allow(deprecated)]
    use solana_sdk::system_instruction;

    fn sample_instruction(signer: &Keypair) -> Instruction {
        // Any single-signer instruction works for exercising the flow.
        #[allow(deprecated)]
        system_instruction::transfer(&signer.pubkey(), &Pubkey::new_unique(), 1)
    }

    #[tokio::test]
    async fn test_success_path_records_ordered_events() {
        let ledger = MockLedger::new();
        let signer = Arc::new(Keypair::new());
        let ix = sample_instruction(&signer);

        let signature = submit_instructions(&ledger, &signer, &[ix]).await.unwrap();

        let events = ledger.events().await;
        assert_eq!(
            events,
            vec![
                LedgerEvent::BlockhashFetch,
                LedgerEvent::Send,
                LedgerEvent::Confirm { signature },
            ]
        );
    }

    #[tokio::test]
    async fn test_send_rejection_is_submission_error() {
        let ledger = MockLedger::new();
        let signer = Arc::new(Keypair::new());
        ledger.fail_sends_touching(signer.pubkey()).await;

        let ix = sample_instruction(&signer);
        let err = submit_instructions(&ledger, &signer, &[ix]).await.unwrap_err();
        assert!(matches!(err, AirdropError::Submission(_)));
    }

    #[tokio::test]
    async fn test_expiry_is_reported_distinctly() {
        let ledger = MockLedger::new();
        ledger.expire_all_confirmations();
        let signer = Arc::new(Keypair::new());

        let ix = sample_instruction(&signer);
        let err = submit_instructions(&ledger, &signer, &[ix]).await.unwrap_err();
        assert!(matches!(err, AirdropError::ConfirmationExpired { .. }));
    }

    #[tokio::test]
    async fn test_on_ledger_failure_is_confirmation_error() {
        let ledger = MockLedger::new();
        ledger.fail_all_confirmations("custom program error").await;
        let signer = Arc::new(Keypair::new());

        let ix = sample_instruction(&signer);
        let err = submit_instructions(&ledger, &signer, &[ix]).await.unwrap_err();
        match err {
            AirdropError::Confirmation { reason, .. } => {
                assert!(reason.contains("custom program error"))
            }
            other => panic!("expected Confirmation error, got {:?}", other),
        }
    }
}
