//! The batched-transfer engine
//!
//! Orchestrates the full pipeline: validate configuration, chunk the
//! transfer pairs into bundles, run each bundle through resolution,
//! instruction building, and submission under a bounded worker pool,
//! then aggregate every outcome into a report.
//!
//! Failure isolation is the load-bearing contract here: a bundle's
//! error is converted to a `Failure` result at its own task boundary
//! and can neither abort sibling bundles nor the run. Only invalid
//! configuration stops the run, and it does so before any network
//! traffic.

pub mod chunker;
pub mod errors;
pub mod instructions;
pub mod pool;
pub mod report;
pub mod resolver;
pub mod submitter;

use std::sync::Arc;

use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use tracing::{info, warn};

use crate::config::AirdropConfig;
use crate::ledger::LedgerClient;
use crate::types::{Bundle, SubmissionResult, TransferPair};

use chunker::chunk_pairs;
use errors::AirdropError;
use instructions::plan_bundle_instructions;
use pool::BoundedPool;
use report::AirdropReport;
use resolver::resolve_bundle_accounts;
use submitter::submit_instructions;

/// The airdrop engine: one ledger client, one signing identity, one
/// configuration, shared by every bundle task.
pub struct AirdropEngine {
    client: Arc<dyn LedgerClient>,
    signer: Arc<Keypair>,
    config: AirdropConfig,
}

impl AirdropEngine {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        signer: Arc<Keypair>,
        config: AirdropConfig,
    ) -> Self {
        Self {
            client,
            signer,
            config,
        }
    }

    /// Run the airdrop over `pairs`.
    ///
    /// Returns `Err` only for configuration errors, before any bundle
    /// is attempted. Every bundle-level outcome, success or failure,
    /// lands inside the returned report.
    pub async fn run(&self, pairs: Vec<TransferPair>) -> Result<AirdropReport, AirdropError> {
        self.config.validate()?;

        if pairs.is_empty() {
            info!("No transfer pairs to send");
            return Ok(AirdropReport::default());
        }

        info!(
            pairs = pairs.len(),
            source = %self.signer.pubkey(),
            bundle_size = self.config.bundle_size,
            concurrency = self.config.concurrency,
            "Starting airdrop"
        );

        let bundles = chunk_pairs(&pairs, self.config.bundle_size);
        let pool = BoundedPool::new(self.config.concurrency);

        // Spawn in bundle order; completion order is up to the network.
        let mut handles = Vec::with_capacity(bundles.len());
        for bundle in bundles {
            let client = Arc::clone(&self.client);
            let signer = Arc::clone(&self.signer);
            // Kept outside the task so a died task can still be
            // attributed to its bundle in the report.
            let fallback = bundle.clone();
            let handle = pool.spawn(process_bundle(client, signer, bundle));
            handles.push((fallback, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (fallback, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(join_error) => {
                    warn!(bundle = fallback.index, error = %join_error, "Bundle task died");
                    results.push(SubmissionResult::Failure {
                        error: AirdropError::Internal(format!(
                            "bundle task died: {}",
                            join_error
                        )),
                        bundle: fallback,
                    });
                }
            }
        }

        let report = AirdropReport::from_results(results);
        info!(
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            "Airdrop finished"
        );
        Ok(report)
    }
}

/// Run one bundle's pipeline to a `SubmissionResult`, never an error.
async fn process_bundle(
    client: Arc<dyn LedgerClient>,
    signer: Arc<Keypair>,
    bundle: Bundle,
) -> SubmissionResult {
    match run_pipeline(client.as_ref(), &signer, &bundle).await {
        Ok(signature) => {
            info!(
                bundle = bundle.index,
                pairs = bundle.len(),
                signature = %signature,
                "Bundle confirmed"
            );
            SubmissionResult::Success { signature, bundle }
        }
        Err(error) => {
            warn!(
                bundle = bundle.index,
                pairs = bundle.len(),
                category = error.category(),
                error = %error,
                "Bundle failed"
            );
            SubmissionResult::Failure { error, bundle }
        }
    }
}

/// Resolve accounts fresh, plan instructions, submit and confirm.
async fn run_pipeline(
    client: &dyn LedgerClient,
    signer: &Arc<Keypair>,
    bundle: &Bundle,
) -> Result<Signature, AirdropError> {
    let source_owner = signer.pubkey();
    let accounts = resolve_bundle_accounts(client, &source_owner, bundle).await?;
    let instructions = plan_bundle_instructions(&source_owner, bundle, &accounts)?;
    submit_instructions(client, signer, &instructions).await
}
