//! nft-airdrop - Batched SPL NFT distribution
//!
//! Moves singly-held tokens from one custodial wallet to many
//! destinations by submitting size-bounded instruction bundles as
//! atomic transactions, with bounded concurrency and per-bundle
//! failure isolation.

pub mod config;
pub mod engine;
pub mod inventory;
pub mod ledger;
pub mod recipients;
pub mod types;
pub mod wallet;

// Deterministic mock ledger; compiled for tests and the test_utils feature
pub mod test_utils;

#[cfg(test)]
mod tests;

// Re-export the surface a caller needs to run an airdrop
pub use config::{AirdropConfig, FailureMode, MAX_BUNDLE_SIZE};
pub use engine::report::AirdropReport;
pub use engine::AirdropEngine;
pub use ledger::{LedgerClient, RpcLedger};
pub use types::TransferPair;
pub use wallet::SourceWallet;
