//! Source wallet loading and signing handle

use anyhow::{Context, Result};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::sync::Arc;

/// The custodial wallet holding the tokens to send.
///
/// Wraps the keypair in an `Arc` so every in-flight bundle task can
/// sign with the same identity.
#[derive(Clone)]
pub struct SourceWallet {
    keypair: Arc<Keypair>,
}

impl SourceWallet {
    /// Load the wallet from a keypair file.
    ///
    /// Accepts either raw 64-byte keypair files or the JSON byte-array
    /// format written by the standard tooling.
    pub fn from_file(path: &str) -> Result<Self> {
        let keypair_bytes =
            std::fs::read(path).with_context(|| format!("Failed to read keypair file: {}", path))?;

        let keypair = if keypair_bytes.len() == 64 {
            // Raw bytes format - validate before conversion
            if keypair_bytes.iter().all(|&b| b == 0) {
                anyhow::bail!("Invalid keypair: all-zero key rejected");
            }
            Keypair::try_from(keypair_bytes.as_slice()).context("Invalid keypair bytes")?
        } else {
            // JSON format
            let json: Vec<u8> = serde_json::from_slice(&keypair_bytes)
                .context("Failed to parse keypair JSON")?;
            if json.len() != 64 {
                anyhow::bail!(
                    "Invalid keypair length: expected 64 bytes, got {}",
                    json.len()
                );
            }
            if json.iter().all(|&b| b == 0) {
                anyhow::bail!("Invalid keypair: all-zero key rejected");
            }
            Keypair::try_from(json.as_slice()).context("Invalid keypair from JSON")?
        };

        Ok(Self {
            keypair: Arc::new(keypair),
        })
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// The wallet's public key
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Shared keypair handle for signing across tasks
    pub fn keypair(&self) -> Arc<Keypair> {
        Arc::clone(&self.keypair)
    }
}
