//! Command line arguments.

use alloy_primitives::B256;
use clap::{ArgAction, Args, Parser, Subcommand};
use spore_mint::{FeeRate, MintConfig, MintConfigFile, Operation, ResumePoint};
use spore_networks::NamedNetwork;
use std::path::PathBuf;

/// Mint files as segmented spores on a CKB network.
///
/// A file is stored as one root spore cell holding its content hash,
/// followed by segment cells bound to that spore, one transaction each.
#[derive(Parser, Debug)]
#[command(name = "spore", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a JSON configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Network to mint on.
    #[arg(long, global = true)]
    pub network: Option<NamedNetwork>,

    /// Node RPC endpoint.
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Indexer endpoint.
    #[arg(long, global = true)]
    pub indexer_url: Option<String>,

    /// Fee rate in shannons per 1000 bytes.
    #[arg(long, global = true)]
    pub fee_rate: Option<u64>,

    /// Hex secp256k1 key of the paying wallet.
    #[arg(long, env = "SPORE_PRIVATE_KEY", hide_env_values = true, global = true)]
    pub private_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mint a file as a segmented spore.
    Mint(MintArgs),

    /// Transfer a spore to another owner.
    Transfer {
        /// Spore id.
        spore_id: String,
        /// Address of the new owner.
        to: String,
    },

    /// Melt a spore and reclaim its capacity.
    Melt {
        /// Spore id.
        spore_id: String,
    },
}

impl Command {
    /// The operation this command requests.
    pub fn operation(&self) -> Operation {
        match self {
            Self::Mint(args) => Operation::Mint {
                path: args.path.clone(),
            },
            Self::Transfer { spore_id, to } => Operation::Transfer {
                spore_id: spore_id.clone(),
                to: to.clone(),
            },
            Self::Melt { spore_id } => Operation::Melt {
                spore_id: spore_id.clone(),
            },
        }
    }
}

/// Arguments of `spore mint`.
#[derive(Args, Debug)]
pub struct MintArgs {
    /// File to mint.
    pub path: PathBuf,

    /// Payload bytes per segment.
    #[arg(long)]
    pub segment_size: Option<usize>,

    /// MIME type recorded in the root spore.
    #[arg(long)]
    pub content_type: Option<String>,

    /// Type hash of an already minted root spore.
    #[arg(long, requires = "resume_from")]
    pub resume_type_hash: Option<B256>,

    /// First segment to mint when resuming.
    #[arg(long, requires = "resume_type_hash")]
    pub resume_from: Option<usize>,
}

impl MintArgs {
    /// The resume point, if both resume flags are given.
    pub fn resume_point(&self) -> Option<ResumePoint> {
        Some(ResumePoint {
            spore_type_hash: self.resume_type_hash?,
            next_segment: self.resume_from?,
        })
    }
}

/// Builds the run configuration: file values, then command line flags.
pub fn resolve_config(cli: &Cli, mint: Option<&MintArgs>) -> anyhow::Result<MintConfig> {
    let mut file = match &cli.config {
        Some(path) => MintConfigFile::load(path)?,
        None => MintConfigFile::default(),
    };

    if cli.network.is_some() {
        file.network = cli.network;
    }
    if let Some(url) = &cli.rpc_url {
        file.rpc_url = Some(url.clone());
    }
    if let Some(url) = &cli.indexer_url {
        file.indexer_url = Some(url.clone());
    }
    if let Some(rate) = cli.fee_rate {
        file.fee_rate = Some(FeeRate::new(rate));
    }
    if let Some(args) = mint {
        if args.segment_size.is_some() {
            file.segment_size = args.segment_size;
        }
        if let Some(content_type) = &args.content_type {
            file.content_type = Some(content_type.clone());
        }
    }

    let config = file.into_config();
    config.validate()?;
    Ok(config)
}
