//! nfts-airdrop CLI
//!
//! Sends NFTs held by one wallet to one or many destinations using the
//! batched-transfer engine. Two commands, mirroring the two ways a
//! drop is usually specified: "any N of my NFTs to this wallet" and
//! "this exact mint to this exact wallet, many times over".

use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nft_airdrop::config::{AirdropConfig, FailureMode};
use nft_airdrop::engine::AirdropEngine;
use nft_airdrop::ledger::RpcLedger;
use nft_airdrop::types::TransferPair;
use nft_airdrop::wallet::SourceWallet;
use nft_airdrop::{inventory, recipients};

#[derive(Parser, Debug)]
#[command(name = "nfts-airdrop", version, about = "CLI to send NFTs to multiple wallets")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by both send commands
#[derive(Args, Debug)]
struct CommonArgs {
    /// Cluster to target (mainnet-beta, devnet, testnet)
    #[arg(short, long)]
    env: Option<String>,

    /// Keypair for the wallet holding the NFTs to send
    #[arg(short, long)]
    keypair: String,

    /// RPC endpoint to use instead of the cluster default
    #[arg(short, long)]
    rpc: Option<String>,

    /// Mints bundled per transaction, max is 6
    #[arg(short, long)]
    bundle_size: Option<usize>,

    /// Number of parallel transactions (default 5)
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Optional TOML config file providing defaults for the above
    #[arg(long)]
    config: Option<String>,

    /// Exit non-zero if any bundle fails
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a number of the wallet's NFTs to a single destination
    SendToOneWallet {
        #[command(flatten)]
        common: CommonArgs,

        /// Wallet that will receive the NFTs
        #[arg(short, long)]
        destination: String,

        /// Amount of NFTs to send to the destination
        #[arg(short, long)]
        number: usize,

        /// Path to a JSON list of whitelisted mints, or ANY to pick
        /// from everything the wallet holds
        #[arg(short, long)]
        whitelist: String,
    },

    /// Send specific NFTs to specific destinations from a list file
    SendToManyWallets {
        #[command(flatten)]
        common: CommonArgs,

        /// CSV, TSV or JSON file of mint,destination entries
        #[arg(short, long)]
        list: PathBuf,

        /// Skip mints the wallet no longer holds (useful for retries)
        #[arg(short, long)]
        skip_missing_mints: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::SendToOneWallet {
            common,
            destination,
            number,
            whitelist,
        } => send_to_one_wallet(common, destination, number, whitelist).await,
        Command::SendToManyWallets {
            common,
            list,
            skip_missing_mints,
        } => send_to_many_wallets(common, list, skip_missing_mints).await,
    }
}

async fn send_to_one_wallet(
    common: CommonArgs,
    destination: String,
    number: usize,
    whitelist: String,
) -> Result<()> {
    let config = build_config(&common)?;
    let wallet = SourceWallet::from_file(&common.keypair).context("Failed to load wallet")?;
    let ledger = RpcLedger::connect(&config.rpc)?;
    let destination =
        Pubkey::from_str(&destination).context("invalid destination wallet address")?;

    let whitelist = inventory::load_mint_whitelist(&whitelist)?;
    let held = inventory::wallet_mints(ledger.rpc(), &wallet.pubkey(), whitelist.as_ref()).await?;
    if held.len() < number {
        warn!(
            requested = number,
            available = held.len(),
            "Wallet holds fewer matching NFTs than requested; sending what is there"
        );
    }

    let pairs: Vec<TransferPair> = held
        .into_iter()
        .take(number)
        .map(|mint| TransferPair::new(mint, destination))
        .collect();

    run_airdrop(config, wallet, ledger, pairs).await
}

async fn send_to_many_wallets(
    common: CommonArgs,
    list: PathBuf,
    skip_missing_mints: bool,
) -> Result<()> {
    let config = build_config(&common)?;
    let wallet = SourceWallet::from_file(&common.keypair).context("Failed to load wallet")?;
    let ledger = RpcLedger::connect(&config.rpc)?;

    let mut pairs = recipients::load_transfer_list(&list)?;

    if skip_missing_mints {
        let held: HashSet<Pubkey> = inventory::wallet_mints(ledger.rpc(), &wallet.pubkey(), None)
            .await?
            .into_iter()
            .collect();
        let before = pairs.len();
        pairs.retain(|pair| held.contains(&pair.mint));
        if pairs.len() < before {
            info!(
                skipped = before - pairs.len(),
                "Skipped entries whose mint is no longer in the wallet"
            );
        }
    }

    run_airdrop(config, wallet, ledger, pairs).await
}

/// File config (if any) under CLI flag overrides, then validated.
fn build_config(common: &CommonArgs) -> Result<AirdropConfig> {
    let mut config = match &common.config {
        Some(path) => AirdropConfig::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => AirdropConfig::default(),
    };

    if let Some(bundle_size) = common.bundle_size {
        config.bundle_size = bundle_size;
    }
    if let Some(concurrency) = common.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(env) = &common.env {
        config.rpc.cluster = env.clone();
    }
    if common.rpc.is_some() {
        config.rpc.url = common.rpc.clone();
    }
    if common.strict {
        config.failure_mode = FailureMode::Strict;
    }

    config.validate()?;
    Ok(config)
}

async fn run_airdrop(
    config: AirdropConfig,
    wallet: SourceWallet,
    ledger: RpcLedger,
    pairs: Vec<TransferPair>,
) -> Result<()> {
    info!(
        source = %wallet.pubkey(),
        pairs = pairs.len(),
        "🚀 Sending NFTs"
    );

    let failure_mode = config.failure_mode;
    let engine = AirdropEngine::new(Arc::new(ledger), wallet.keypair(), config);
    let report = engine.run(pairs).await?;

    println!("{}", report.render());

    if failure_mode == FailureMode::Strict && !report.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "nft_airdrop=debug,info"
    } else {
        "nft_airdrop=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
