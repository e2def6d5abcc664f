//! Instruction planning for one bundle
//!
//! Pure: takes a bundle plus its resolved accounts and emits the flat
//! instruction list for a single transaction. Per pair, in pair order:
//!
//! 1. create the destination token account (only if it does not exist)
//! 2. transfer the token (amount exactly 1)
//! 3. close the source token account, reclaiming its rent
//!
//! Per-pair groups are concatenated in pair order, so a bundle of k
//! pairs yields between 2k and 3k instructions.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_associated_token_account::instruction::create_associated_token_account;

use crate::engine::errors::AirdropError;
use crate::engine::resolver::BundleAccounts;
use crate::types::Bundle;

/// Build the ordered instruction list for `bundle`.
///
/// `accounts` must come from resolving this same bundle; the two are
/// index-aligned.
pub fn plan_bundle_instructions(
    source_owner: &Pubkey,
    bundle: &Bundle,
    accounts: &BundleAccounts,
) -> Result<Vec<Instruction>, AirdropError> {
    let mut instructions = Vec::with_capacity(bundle.pairs.len() * 3);

    for (i, pair) in bundle.pairs.iter().enumerate() {
        if !accounts.destination_exists[i] {
            // The source wallet funds the new account's rent; the
            // close below reclaims the source account's own deposit.
            instructions.push(create_associated_token_account(
                source_owner,
                &pair.destination,
                &pair.mint,
                &spl_token::id(),
            ));
        }

        // Plain transfer rather than transfer_checked: the amount is
        // fixed at 1 and mint decimals are not known here.
        #[allow(deprecated)]
        let transfer_ix = spl_token::instruction::transfer(
            &spl_token::id(),
            &accounts.source_accounts[i],
            &accounts.destination_accounts[i],
            source_owner,
            &[],
            1,
        )
        .map_err(|e| AirdropError::instruction_failed(pair.mint, e.to_string()))?;
        instructions.push(transfer_ix);

        let close_ix = spl_token::instruction::close_account(
            &spl_token::id(),
            &accounts.source_accounts[i],
            source_owner,
            source_owner,
            &[],
        )
        .map_err(|e| AirdropError::instruction_failed(pair.mint, e.to_string()))?;
        instructions.push(close_ix);
    }

    Ok(instructions)
}
