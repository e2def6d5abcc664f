//! Source wallet inventory
//!
//! Enumerates the mints the source wallet currently holds with a
//! balance of exactly one, which is what "sendable NFT" means here.
//! Feeds the send-to-one-wallet flow; the engine itself never calls
//! this.

use std::collections::HashSet;
use std::str::FromStr;

use anyhow::{Context, Result};
use solana_account_decoder::UiAccountData;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::pubkey::Pubkey;

/// Fetch the mints held by `owner` with balance exactly 1, optionally
/// restricted to a whitelist. Order is whatever the RPC returns.
pub async fn wallet_mints(
    rpc: &RpcClient,
    owner: &Pubkey,
    whitelist: Option<&HashSet<Pubkey>>,
) -> Result<Vec<Pubkey>> {
    let accounts = rpc
        .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::id()))
        .await
        .context("failed to list token accounts for the source wallet")?;

    Ok(mints_from_accounts(&accounts, whitelist))
}

/// Extract single-unit mints from parsed token accounts.
fn mints_from_accounts(
    accounts: &[RpcKeyedAccount],
    whitelist: Option<&HashSet<Pubkey>>,
) -> Vec<Pubkey> {
    let mut mints = Vec::new();

    for keyed in accounts {
        let UiAccountData::Json(parsed) = &keyed.account.data else {
            continue;
        };
        let info = &parsed.parsed["info"];

        // A sendable NFT holding shows up as a whole balance of 1.
        if info["tokenAmount"]["uiAmount"].as_f64() != Some(1.0) {
            continue;
        }

        let Some(mint) = info["mint"].as_str().and_then(|s| Pubkey::from_str(s).ok()) else {
            continue;
        };

        if whitelist.map_or(true, |allowed| allowed.contains(&mint)) {
            mints.push(mint);
        }
    }

    mints
}

/// Load a mint whitelist from a JSON file of address strings.
///
/// The literal `ANY` means no restriction and returns `None`.
pub fn load_mint_whitelist(path_or_any: &str) -> Result<Option<HashSet<Pubkey>>> {
    if path_or_any == "ANY" {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path_or_any)
        .with_context(|| format!("failed to read whitelist file: {}", path_or_any))?;
    let raw: Vec<String> =
        serde_json::from_str(&content).context("whitelist must be a JSON array of addresses")?;

    let mut mints = HashSet::with_capacity(raw.len());
    for entry in raw {
        let mint = Pubkey::from_str(&entry)
            .with_context(|| format!("invalid mint address in whitelist: {}", entry))?;
        mints.insert(mint);
    }
    Ok(Some(mints))
}
