//! Error taxonomy for the airdrop engine
//!
//! Configuration errors are fatal and stop the run before any bundle is
//! submitted. Every other variant is bundle-local: it is captured at the
//! task boundary, converted into a `Failure` result for that bundle, and
//! never reaches sibling tasks.

use solana_sdk::signature::Signature;
use thiserror::Error;

/// Errors produced while running an airdrop.
#[derive(Error, Debug)]
pub enum AirdropError {
    /// Invalid engine configuration (bundle size, concurrency).
    ///
    /// Fatal: reported before any transaction is built or sent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The batched destination-account existence query failed.
    #[error("Account resolution failed: {0}")]
    Resolution(String),

    /// An SPL instruction constructor rejected its inputs.
    #[error("Instruction build error (mint={mint}): {reason}")]
    InstructionBuild {
        /// Mint of the pair whose instruction failed to build
        mint: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// Failed to fetch the recent blockhash anchoring this bundle.
    #[error("Blockhash error: {0}")]
    Blockhash(String),

    /// The network rejected the bundle's transaction at send time.
    #[error("Submission failed: {0}")]
    Submission(String),

    /// The transaction landed but failed on-ledger.
    #[error("Transaction {signature} failed on-ledger: {reason}")]
    Confirmation {
        signature: Signature,
        reason: String,
    },

    /// The blockhash expired before the transaction confirmed.
    ///
    /// The transaction may still have landed; its final state is unknown
    /// to this run and must be checked against the signature by hand.
    #[error(
        "Confirmation window expired for {signature} at block height {last_valid_block_height}; \
         final transaction state is unknown"
    )]
    ConfirmationExpired {
        signature: Signature,
        last_valid_block_height: u64,
    },

    /// Unexpected internal failure (a bundle task that died mid-flight).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AirdropError {
    /// Whether this error is confined to a single bundle's task.
    ///
    /// Returns `false` only for configuration errors, which abort the
    /// run before any work is scheduled.
    pub fn is_bundle_local(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }

    /// Error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config",
            Self::Resolution(_) => "resolution",
            Self::InstructionBuild { .. } => "instruction",
            Self::Blockhash(_) => "blockhash",
            Self::Submission(_) => "submission",
            Self::Confirmation { .. } => "confirmation",
            Self::ConfirmationExpired { .. } => "expired",
            Self::Internal(_) => "internal",
        }
    }

    /// Create an instruction build error for a specific mint
    pub fn instruction_failed(mint: impl ToString, reason: impl Into<String>) -> Self {
        Self::InstructionBuild {
            mint: mint.to_string(),
            reason: reason.into(),
        }
    }
}
