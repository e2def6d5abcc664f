//! Configuration for the airdrop tool
//!
//! Engine knobs and RPC settings, loadable from a TOML file with
//! environment variable support. CLI flags override file values.

use serde::{Deserialize, Serialize};

use crate::engine::errors::AirdropError;

/// Hard cap on pairs per bundle.
///
/// Each pair contributes up to three instructions (create destination
/// account, transfer, close source account); six pairs is the most that
/// reliably fits a single transaction.
pub const MAX_BUNDLE_SIZE: usize = 6;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirdropConfig {
    /// Transfer pairs bundled per transaction
    #[serde(default = "default_bundle_size")]
    pub bundle_size: usize,

    /// Number of bundles submitted in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// How bundle failures affect the process exit status
    #[serde(default)]
    pub failure_mode: FailureMode,

    /// RPC settings
    #[serde(default)]
    pub rpc: RpcSettings,
}

/// Exit status policy when some bundles fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    /// Report failures but exit 0 (the run itself completed)
    #[default]
    BestEffort,

    /// Exit non-zero if any bundle failed
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSettings {
    /// RPC endpoint URL; takes precedence over `cluster`
    pub url: Option<String>,

    /// Named cluster used when no explicit URL is given
    #[serde(default = "default_cluster")]
    pub cluster: String,

    /// Commitment level for queries and confirmation
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Poll interval while awaiting confirmation, in milliseconds
    #[serde(default = "default_confirm_poll_ms")]
    pub confirm_poll_ms: u64,
}

// Default value functions
fn default_bundle_size() -> usize {
    MAX_BUNDLE_SIZE
}
fn default_concurrency() -> usize {
    5
}
fn default_cluster() -> String {
    "mainnet-beta".to_string()
}
fn default_commitment() -> String {
    "processed".to_string()
}
fn default_confirm_poll_ms() -> u64 {
    500
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            url: None,
            cluster: default_cluster(),
            commitment: default_commitment(),
            confirm_poll_ms: default_confirm_poll_ms(),
        }
    }
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            bundle_size: default_bundle_size(),
            concurrency: default_concurrency(),
            failure_mode: FailureMode::default(),
            rpc: RpcSettings::default(),
        }
    }
}

impl AirdropConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AirdropConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variables applied first
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }

    /// Validate engine knobs.
    ///
    /// Runs before any bundle is built; a bad value here aborts the
    /// whole run rather than failing bundles one by one.
    pub fn validate(&self) -> Result<(), AirdropError> {
        if self.bundle_size == 0 {
            return Err(AirdropError::Configuration(
                "bundle size must be at least 1".to_string(),
            ));
        }
        if self.bundle_size > MAX_BUNDLE_SIZE {
            return Err(AirdropError::Configuration(format!(
                "bundle size {} exceeds the per-transaction maximum of {}",
                self.bundle_size, MAX_BUNDLE_SIZE
            )));
        }
        if self.concurrency == 0 {
            return Err(AirdropError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl RpcSettings {
    /// The endpoint URL to connect to: explicit URL, else the named cluster
    pub fn endpoint(&self) -> anyhow::Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        cluster_url(&self.cluster)
    }
}

/// Map a named cluster to its public RPC URL
pub fn cluster_url(cluster: &str) -> anyhow::Result<String> {
    match cluster {
        "mainnet-beta" => Ok("https://api.mainnet-beta.solana.com".to_string()),
        "devnet" => Ok("https://api.devnet.solana.com".to_string()),
        "testnet" => Ok("https://api.testnet.solana.com".to_string()),
        other => anyhow::bail!("unknown cluster '{}', expected mainnet-beta, devnet or testnet", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AirdropConfig::default();
        assert_eq!(config.bundle_size, 6);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.failure_mode, FailureMode::BestEffort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_bundle_size_rejected() {
        let config = AirdropConfig {
            bundle_size: 0,
            ..AirdropConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AirdropError::Configuration(_)));
    }

    #[test]
    fn test_oversized_bundle_rejected() {
        let config = AirdropConfig {
            bundle_size: MAX_BUNDLE_SIZE + 1,
            ..AirdropConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = AirdropConfig {
            concurrency: 0,
            ..AirdropConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cluster_urls() {
        assert!(cluster_url("devnet").unwrap().contains("devnet"));
        assert!(cluster_url("nonsense").is_err());
    }

    #[test]
    fn test_explicit_url_wins() {
        let rpc = RpcSettings {
            url: Some("http://localhost:8899".to_string()),
            ..RpcSettings::default()
        };
        assert_eq!(rpc.endpoint().unwrap(), "http://localhost:8899");
    }

    #[test]
    fn test_toml_roundtrip() {
        let parsed: AirdropConfig = toml::from_str(
            r#"
            bundle_size = 4
            concurrency = 2
            failure_mode = "strict"

            [rpc]
            cluster = "devnet"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.bundle_size, 4);
        assert_eq!(parsed.concurrency, 2);
        assert_eq!(parsed.failure_mode, FailureMode::Strict);
        assert_eq!(parsed.rpc.cluster, "devnet");
        assert_eq!(parsed.rpc.confirm_poll_ms, 500);
    }
}
