//! Core data types carried through the airdrop pipeline

use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::engine::errors::AirdropError;

/// A single transfer to perform: move the token of `mint` to `destination`.
///
/// The destination is the receiving wallet, not its token account; the
/// associated token account is derived at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPair {
    /// Mint of the token to move (supply 1, held by the source wallet)
    pub mint: Pubkey,

    /// Wallet that will receive the token
    pub destination: Pubkey,
}

impl TransferPair {
    pub fn new(mint: Pubkey, destination: Pubkey) -> Self {
        Self { mint, destination }
    }
}

/// An ordered group of transfer pairs submitted together as one
/// atomic transaction.
///
/// Bundles are created by the chunker and consumed exactly once; the
/// `index` records the bundle's position in chunk order so results can
/// be traced back even when completion order differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Position of this bundle in chunk order
    pub index: usize,

    /// The transfer pairs covered by this bundle, in input order
    pub pairs: Vec<TransferPair>,
}

impl Bundle {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Outcome of one bundle's pipeline run.
///
/// The originating bundle travels inside the result so failures can be
/// reported per pair without any shared bookkeeping between tasks.
#[derive(Debug)]
pub enum SubmissionResult {
    /// The bundle's transaction confirmed; all of its pairs moved
    Success {
        signature: Signature,
        bundle: Bundle,
    },

    /// The bundle's pipeline failed; none of its pairs are known to have moved
    Failure {
        error: AirdropError,
        bundle: Bundle,
    },
}

impl SubmissionResult {
    /// The bundle this result belongs to, regardless of outcome
    pub fn bundle(&self) -> &Bundle {
        match self {
            Self::Success { bundle, .. } | Self::Failure { bundle, .. } => bundle,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
