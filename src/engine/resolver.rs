//! Per-bundle token account resolution
//!
//! Derives the source and destination associated token accounts for
//! every pair of a bundle and asks the ledger, in one batched query,
//! which destination accounts already exist. Resolution runs
//! immediately before instruction building so the answer reflects
//! ledger state at submission time, not at chunking time.

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use crate::engine::errors::AirdropError;
use crate::ledger::LedgerClient;
use crate::types::Bundle;

/// Resolved accounts for one bundle, index-aligned with its pairs.
#[derive(Debug, Clone)]
pub struct BundleAccounts {
    /// Source wallet's token account per pair
    pub source_accounts: Vec<Pubkey>,

    /// Destination wallet's token account per pair
    pub destination_accounts: Vec<Pubkey>,

    /// Whether the destination token account already exists, per pair
    pub destination_exists: Vec<bool>,
}

/// Resolve the token accounts for `bundle`, with one ledger round trip.
pub async fn resolve_bundle_accounts(
    client: &dyn LedgerClient,
    source_owner: &Pubkey,
    bundle: &Bundle,
) -> Result<BundleAccounts, AirdropError> {
    let source_accounts: Vec<Pubkey> = bundle
        .pairs
        .iter()
        .map(|pair| get_associated_token_address(source_owner, &pair.mint))
        .collect();

    let destination_accounts: Vec<Pubkey> = bundle
        .pairs
        .iter()
        .map(|pair| get_associated_token_address(&pair.destination, &pair.mint))
        .collect();

    let destination_exists = client
        .accounts_exist(&destination_accounts)
        .await
        .map_err(|e| AirdropError::Resolution(format!("{:#}", e)))?;

    // The existence check is order-preserving by contract; a length
    // mismatch means the client broke it.
    if destination_exists.len() != bundle.pairs.len() {
        return Err(AirdropError::Resolution(format!(
            "existence query returned {} entries for {} accounts",
            destination_exists.len(),
            bundle.pairs.len()
        )));
    }

    Ok(BundleAccounts {
        source_accounts,
        destination_accounts,
        destination_exists,
    })
}
