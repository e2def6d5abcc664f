//! Ledger client seam between the engine and Solana RPC
//!
//! The engine talks to the chain only through [`LedgerClient`], so the
//! RPC client is passed down explicitly (no ambient globals) and tests
//! can substitute a deterministic mock. The trait is the minimal
//! surface the pipeline needs: one batched existence query, an anchor
//! fetch, send, and confirm.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};

use crate::config::RpcSettings;

/// A recent blockhash plus the block height it stays valid through.
///
/// Fetched fresh per bundle immediately before signing; both halves are
/// reused for confirmation so expiry is judged against the same anchor
/// the transaction was signed with.
#[derive(Debug, Clone, Copy)]
pub struct BlockhashInfo {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Terminal confirmation outcome for one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Confirmed at the configured commitment before the horizon
    Confirmed,

    /// Block height passed `last_valid_block_height` first; final state unknown
    Expired,

    /// The transaction landed but its execution failed
    Failed(String),
}

/// Minimal ledger surface consumed by the engine.
///
/// Implementations must be safe for concurrent use from multiple tasks;
/// the engine shares one handle across all in-flight bundles.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Batched, order-preserving existence check: `result[i]` tells
    /// whether `addresses[i]` exists on-ledger.
    async fn accounts_exist(&self, addresses: &[Pubkey]) -> anyhow::Result<Vec<bool>>;

    /// Fetch a fresh blockhash and its validity horizon.
    async fn latest_blockhash(&self) -> anyhow::Result<BlockhashInfo>;

    /// Send a signed transaction, returning its signature.
    async fn send_transaction(&self, transaction: &Transaction) -> anyhow::Result<Signature>;

    /// Await a terminal confirmation outcome for `signature`, bounded by
    /// the validity horizon it was signed under.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        last_valid_block_height: u64,
    ) -> anyhow::Result<ConfirmationStatus>;
}

/// Production [`LedgerClient`] over the nonblocking Solana RPC client.
pub struct RpcLedger {
    client: Arc<RpcClient>,
    commitment: CommitmentConfig,
    confirm_poll: Duration,
}

impl RpcLedger {
    /// Connect using the given RPC settings.
    pub fn connect(settings: &RpcSettings) -> anyhow::Result<Self> {
        let endpoint = settings.endpoint()?;
        let commitment = parse_commitment(&settings.commitment)?;
        let client = Arc::new(RpcClient::new_with_commitment(endpoint, commitment));
        Ok(Self {
            client,
            commitment,
            confirm_poll: Duration::from_millis(settings.confirm_poll_ms),
        })
    }

    /// The underlying RPC client, for collaborators that need calls
    /// outside the engine's contract (wallet inventory).
    pub fn rpc(&self) -> &RpcClient {
        &self.client
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn accounts_exist(&self, addresses: &[Pubkey]) -> anyhow::Result<Vec<bool>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let accounts = self
            .client
            .get_multiple_accounts_with_commitment(addresses, self.commitment)
            .await
            .context("batched account lookup failed")?
            .value;
        Ok(accounts.iter().map(|account| account.is_some()).collect())
    }

    async fn latest_blockhash(&self) -> anyhow::Result<BlockhashInfo> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .context("failed to fetch latest blockhash")?;
        Ok(BlockhashInfo {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> anyhow::Result<Signature> {
        self.client
            .send_transaction(transaction)
            .await
            .context("transaction send was rejected")
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        last_valid_block_height: u64,
    ) -> anyhow::Result<ConfirmationStatus> {
        loop {
            let statuses = self
                .client
                .get_signature_statuses(&[*signature])
                .await
                .context("signature status query failed")?
                .value;

            if let Some(Some(status)) = statuses.first() {
                if let Some(err) = &status.err {
                    return Ok(ConfirmationStatus::Failed(err.to_string()));
                }
                if status.satisfies_commitment(self.commitment) {
                    return Ok(ConfirmationStatus::Confirmed);
                }
            }

            let block_height = self
                .client
                .get_block_height_with_commitment(self.commitment)
                .await
                .context("block height query failed")?;
            if block_height > last_valid_block_height {
                return Ok(ConfirmationStatus::Expired);
            }

            tokio::time::sleep(self.confirm_poll).await;
        }
    }
}

/// Parse a commitment level name as used in config files and flags
pub fn parse_commitment(name: &str) -> anyhow::Result<CommitmentConfig> {
    match name {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => anyhow::bail!(
            "unknown commitment '{}', expected processed, confirmed or finalized",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commitment() {
        assert_eq!(
            parse_commitment("processed").unwrap(),
            CommitmentConfig::processed()
        );
        assert_eq!(
            parse_commitment("finalized").unwrap(),
            CommitmentConfig::finalized()
        );
        assert!(parse_commitment("tentative").is_err());
    }

    #[test]
    fn test_connect_uses_cluster_default() {
        let ledger = RpcLedger::connect(&RpcSettings::default()).unwrap();
        assert_eq!(ledger.commitment(), CommitmentConfig::processed());
    }
}
