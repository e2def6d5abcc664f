//! Test utilities
//!
//! A deterministic in-memory [`LedgerClient`] for exercising the engine
//! without a network. Only compiled for tests or when the `test_utils`
//! feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use tokio::sync::Mutex;

use crate::ledger::{BlockhashInfo, ConfirmationStatus, LedgerClient};

/// One observed ledger interaction, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    ExistenceQuery { count: usize },
    BlockhashFetch,
    Send,
    Confirm { signature: Signature },
}

/// Deterministic mock ledger.
///
/// Defaults to a chain where no destination accounts exist, every send
/// is accepted, and every confirmation succeeds. Tests opt into
/// failures per interaction. All calls are recorded in an event log so
/// tests can assert on call ordering across bundles.
pub struct MockLedger {
    existing_accounts: Mutex<HashSet<Pubkey>>,
    events: Mutex<Vec<LedgerEvent>>,
    sent: Mutex<Vec<Transaction>>,

    fail_existence_touching: Mutex<HashSet<Pubkey>>,
    fail_sends_touching: Mutex<HashSet<Pubkey>>,
    confirm_failure_reason: Mutex<Option<String>>,
    expire_confirmations: AtomicBool,

    signature_counter: AtomicU64,
    block_height: AtomicU64,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            existing_accounts: Mutex::new(HashSet::new()),
            events: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            fail_existence_touching: Mutex::new(HashSet::new()),
            fail_sends_touching: Mutex::new(HashSet::new()),
            confirm_failure_reason: Mutex::new(None),
            expire_confirmations: AtomicBool::new(false),
            signature_counter: AtomicU64::new(1),
            block_height: AtomicU64::new(100),
        }
    }

    /// Seed an account as already existing on-ledger.
    pub async fn add_existing_account(&self, address: Pubkey) {
        self.existing_accounts.lock().await.insert(address);
    }

    /// Make any existence query that includes `address` fail.
    pub async fn fail_existence_query_touching(&self, address: Pubkey) {
        self.fail_existence_touching.lock().await.insert(address);
    }

    /// Make any send whose transaction references `address` fail.
    ///
    /// Keying on a referenced account rather than a call index keeps
    /// the injection deterministic under concurrent submission.
    pub async fn fail_sends_touching(&self, address: Pubkey) {
        self.fail_sends_touching.lock().await.insert(address);
    }

    /// Report every confirmation as expired past its horizon.
    pub fn expire_all_confirmations(&self) {
        self.expire_confirmations.store(true, Ordering::SeqCst);
    }

    /// Report every confirmation as failed on-ledger with `reason`.
    pub async fn fail_all_confirmations(&self, reason: &str) {
        *self.confirm_failure_reason.lock().await = Some(reason.to_string());
    }

    /// Everything the mock has observed, in call order.
    pub async fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().await.clone()
    }

    /// All transactions accepted by `send_transaction`, in send order.
    pub async fn sent_transactions(&self) -> Vec<Transaction> {
        self.sent.lock().await.clone()
    }

    async fn record(&self, event: LedgerEvent) {
        self.events.lock().await.push(event);
    }

    fn next_signature(&self) -> Signature {
        let n = self.signature_counter.fetch_add(1, Ordering::SeqCst);
        let mut bytes = [0u8; 64];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        Signature::from(bytes)
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn accounts_exist(&self, addresses: &[Pubkey]) -> anyhow::Result<Vec<bool>> {
        self.record(LedgerEvent::ExistenceQuery {
            count: addresses.len(),
        })
        .await;

        let poisoned = self.fail_existence_touching.lock().await;
        if addresses.iter().any(|a| poisoned.contains(a)) {
            anyhow::bail!("mock: existence query failed");
        }
        drop(poisoned);

        let existing = self.existing_accounts.lock().await;
        Ok(addresses.iter().map(|a| existing.contains(a)).collect())
    }

    async fn latest_blockhash(&self) -> anyhow::Result<BlockhashInfo> {
        self.record(LedgerEvent::BlockhashFetch).await;
        Ok(BlockhashInfo {
            blockhash: Hash::new_unique(),
            last_valid_block_height: self.block_height.load(Ordering::SeqCst) + 150,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> anyhow::Result<Signature> {
        self.record(LedgerEvent::Send).await;

        let poisoned = self.fail_sends_touching.lock().await;
        if transaction
            .message
            .account_keys
            .iter()
            .any(|key| poisoned.contains(key))
        {
            anyhow::bail!("mock: send rejected");
        }
        drop(poisoned);

        self.sent.lock().await.push(transaction.clone());
        Ok(self.next_signature())
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        _last_valid_block_height: u64,
    ) -> anyhow::Result<ConfirmationStatus> {
        self.record(LedgerEvent::Confirm {
            signature: *signature,
        })
        .await;

        if self.expire_confirmations.load(Ordering::SeqCst) {
            return Ok(ConfirmationStatus::Expired);
        }
        if let Some(reason) = self.confirm_failure_reason.lock().await.clone() {
            return Ok(ConfirmationStatus::Failed(reason));
        }
        Ok(ConfirmationStatus::Confirmed)
    }
}
