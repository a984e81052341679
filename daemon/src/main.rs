//! Governance cache daemon: operator entry point for a cache node.
//!
//! Every subcommand opens the LMDB environment, runs one operation and
//! exits. Reply payloads go to stdout; logs go to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use govcache_governance::VoteTallyEngine;
use govcache_messages::{
    InventoryReply, LoadVoteResults, NewRecord, Payload, PluginCommand, TokenInventory,
    UpdateRecordMetadata, UpdateRecordStatus,
};
use govcache_node::{CacheConfig, CacheNode, LmdbEnvironment};
use govcache_types::Token;
use govcache_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "govcache-daemon", about = "Governance plugin cache daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "GOVCACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the LMDB environment.
    #[arg(long, env = "GOVCACHE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "GOVCACHE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "GOVCACHE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Print Prometheus metrics to stderr after the command.
    #[arg(long, env = "GOVCACHE_ENABLE_METRICS")]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create the plugin tables and stamp the cache version.
    Setup,

    /// Fail unless the plugin tables match this build.
    CheckVersion,

    /// Drop the plugin tables and rebuild them from an inventory payload.
    Build {
        /// Inventory reply JSON file, or "-" for stdin.
        #[arg(long)]
        inventory: PathBuf,
    },

    /// Run the version check and rebuild from the inventory if it fails.
    Ensure {
        /// Inventory reply JSON file, or "-" for stdin.
        #[arg(long)]
        inventory: Option<PathBuf>,
    },

    /// Store a new record version.
    NewRecord {
        /// New record JSON file, or "-" for stdin.
        #[arg(long)]
        payload: PathBuf,
    },

    /// Change the status of a stored record version.
    UpdateRecordStatus {
        /// Status update JSON file, or "-" for stdin.
        #[arg(long)]
        payload: PathBuf,
    },

    /// Replace the metadata of the latest version of a record.
    UpdateRecordMetadata {
        /// Metadata update JSON file, or "-" for stdin.
        #[arg(long)]
        payload: PathBuf,
    },

    /// Replace the record mirror with a record inventory.
    BuildRecords {
        /// Record inventory JSON file, or "-" for stdin.
        #[arg(long)]
        records: PathBuf,
    },

    /// Execute one plugin command and print its reply payload.
    Exec {
        /// Command name, e.g. "getcomments".
        #[arg(long)]
        command: String,

        /// Command payload JSON.
        #[arg(long, default_value = "{}")]
        payload: String,

        /// Reply payload JSON from the authoritative store. Required for
        /// write-through commands.
        #[arg(long, default_value = "")]
        reply: String,
    },

    /// Materialize results of every vote ended at or before the block.
    LoadVoteResults {
        #[arg(long)]
        best_block: u64,
    },

    /// Categorize proposals by voting stage.
    TokenInventory {
        #[arg(long)]
        best_block: u64,
    },

    /// Print the full plugin inventory.
    Inventory,

    /// Print the voting lifecycle stage of a proposal.
    VoteStatus {
        #[arg(long)]
        token: String,

        #[arg(long)]
        best_block: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            CacheConfig::from_toml_file(&path)
                .with_context(|| format!("failed to load config from {path}"))?
        }
        None => CacheConfig::default(),
    };

    let config = CacheConfig {
        data_dir: cli.data_dir.unwrap_or(file_config.data_dir),
        log_level: cli.log_level.unwrap_or(file_config.log_level),
        log_format: cli.log_format.unwrap_or(file_config.log_format),
        enable_metrics: cli.metrics || file_config.enable_metrics,
        ..file_config
    };

    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let enable_metrics = config.enable_metrics;
    let node = CacheNode::open(config)?;

    let result = run(&node, cli.command);

    if enable_metrics {
        eprint!("{}", node.metrics.encode());
    }
    result
}

fn run(node: &CacheNode<LmdbEnvironment>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Setup => {
            node.rebuild.setup()?;
        }
        Command::CheckVersion => {
            node.rebuild.check_version()?;
            println!("plugin tables are current");
        }
        Command::Build { inventory } => {
            let payload = read_payload(&inventory)?;
            node.rebuild.build_from_payload(&payload)?;
        }
        Command::Ensure { inventory } => {
            let inventory = match inventory {
                Some(path) => Some(InventoryReply::decode(&read_payload(&path)?)?),
                None => None,
            };
            node.ensure_current(inventory.as_ref())?;
        }
        Command::NewRecord { payload } => {
            node.records
                .new_record(&NewRecord::decode(&read_payload(&payload)?)?)?;
        }
        Command::UpdateRecordStatus { payload } => {
            node.records
                .update_record_status(&UpdateRecordStatus::decode(&read_payload(&payload)?)?)?;
        }
        Command::UpdateRecordMetadata { payload } => {
            node.records
                .update_record_metadata(&UpdateRecordMetadata::decode(&read_payload(&payload)?)?)?;
        }
        Command::BuildRecords { records } => {
            node.records.build_from_payload(&read_payload(&records)?)?;
        }
        Command::Exec {
            command,
            payload,
            reply,
        } => {
            let out = node.dispatcher.exec_named(&command, &payload, &reply)?;
            println!("{out}");
        }
        Command::LoadVoteResults { best_block } => {
            let out = node.dispatcher.exec(
                PluginCommand::LoadVoteResults,
                &LoadVoteResults { best_block }.encode(),
                "",
            )?;
            println!("{out}");
        }
        Command::TokenInventory { best_block } => {
            let out = node.dispatcher.exec(
                PluginCommand::TokenInventory,
                &TokenInventory { best_block }.encode(),
                "",
            )?;
            println!("{out}");
        }
        Command::Inventory => {
            println!("{}", node.dispatcher.inventory()?.encode());
        }
        Command::VoteStatus { token, best_block } => {
            let status = VoteTallyEngine::new().vote_status(
                node.store.as_ref(),
                &Token::new(token),
                best_block,
            )?;
            println!("{status}");
        }
    }
    Ok(())
}

fn read_payload(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("failed to read payload from stdin")?;
        return Ok(payload);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload from {}", path.display()))
}
