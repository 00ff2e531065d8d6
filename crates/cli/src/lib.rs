//! The `spore` command line tool.
//!
//! Parses arguments, layers flags over an optional JSON configuration file,
//! and drives a [`MintOrchestrator`] against a node over JSON-RPC.

pub mod args;
pub mod report;

use anyhow::Context;
use args::{Cli, Command, MintArgs};
use spore_mint::{MintContext, MintOrchestrator, read_asset};
use spore_rpc::RpcClient;
use spore_signer::Secp256k1Signer;
use std::process::ExitCode;
use tracing::info;

/// Runs the parsed command.
///
/// A failed mint is reported on stdout with its resume point and exits
/// non-zero. Setup errors are returned.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    cli.command.operation().ensure_supported()?;
    match &cli.command {
        Command::Mint(args) => mint(&cli, args).await,
        Command::Transfer { .. } | Command::Melt { .. } => Ok(ExitCode::FAILURE),
    }
}

async fn mint(cli: &Cli, args: &MintArgs) -> anyhow::Result<ExitCode> {
    let config = args::resolve_config(cli, Some(args))?;
    let key = cli
        .private_key
        .as_deref()
        .context("no private key: pass --private-key or set SPORE_PRIVATE_KEY")?;
    let signer = Secp256k1Signer::from_hex(key).context("failed to load private key")?;
    let file = read_asset(&args.path)?;
    let client = RpcClient::new(&config.rpc_url, &config.indexer_url)
        .context("failed to create RPC client")?;

    info!(
        network = %config.network,
        path = %args.path.display(),
        size = file.len(),
        "minting"
    );

    let orchestrator = MintOrchestrator::new(MintContext {
        client,
        signer,
        config,
    })?;

    let outcome = match args.resume_point() {
        Some(point) => orchestrator.resume(file, point).await,
        None => orchestrator.mint(file).await,
    };

    match outcome {
        Ok(report) => {
            print!("{}", report::format_report(&report));
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            print!("{}", report::format_failure(&failure, &args.path));
            Ok(ExitCode::FAILURE)
        }
    }
}
