//! Aggregation and rendering of per-bundle outcomes

use solana_sdk::signature::Signature;

use crate::engine::errors::AirdropError;
use crate::types::{SubmissionResult, TransferPair};

/// A confirmed bundle: its signature and the pairs it moved.
#[derive(Debug)]
pub struct BundleSuccess {
    pub signature: Signature,
    pub pairs: Vec<TransferPair>,
}

/// A failed bundle: what went wrong and which pairs were affected.
#[derive(Debug)]
pub struct BundleFailure {
    pub error: AirdropError,
    pub pairs: Vec<TransferPair>,
}

/// Final outcome of a run, split into successes and failures.
///
/// The run producing this report always completes; whether failures
/// make the process exit non-zero is the caller's policy.
#[derive(Debug, Default)]
pub struct AirdropReport {
    pub successes: Vec<BundleSuccess>,
    pub failures: Vec<BundleFailure>,
}

impl AirdropReport {
    /// Partition raw submission results into a report.
    pub fn from_results(results: Vec<SubmissionResult>) -> Self {
        let mut report = Self::default();
        for result in results {
            match result {
                SubmissionResult::Success { signature, bundle } => {
                    report.successes.push(BundleSuccess {
                        signature,
                        pairs: bundle.pairs,
                    });
                }
                SubmissionResult::Failure { error, bundle } => {
                    report.failures.push(BundleFailure {
                        error,
                        pairs: bundle.pairs,
                    });
                }
            }
        }
        report
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total pairs across all bundles, attempted or failed
    pub fn pair_count(&self) -> usize {
        self.successes.iter().map(|s| s.pairs.len()).sum::<usize>()
            + self.failures.iter().map(|f| f.pairs.len()).sum::<usize>()
    }

    /// Human-readable report, one block per bundle.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("Results:\n");
        for success in &self.successes {
            out.push('\n');
            out.push_str(&format!("Signature: {}\n", success.signature));
            for pair in &success.pairs {
                out.push_str(&render_pair(pair));
            }
        }

        out.push_str("\nErrors:\n");
        for failure in &self.failures {
            out.push('\n');
            out.push_str(&format!("{}\n", failure.error));
            for pair in &failure.pairs {
                out.push_str(&render_pair(pair));
            }
        }

        out
    }
}

fn render_pair(pair: &TransferPair) -> String {
    format!("Mint: {} => To: {}\n", pair.mint, pair.destination)
}
