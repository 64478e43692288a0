//! # Orb CLI
//!
//! ```bash
//! # Decode an identifier
//! orb decode 0xff680223c6000000bcffffffb2ffffff28ffffff9eff00ff94ffffff8aff00ff
//!
//! # Pack a supply cap of 5 units shown as 500
//! orb pack-supply 5 2
//!
//! # Replay a lifecycle script
//! orb replay tools/orb-cli/scripts/drop.json --metrics
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orb_cli::{commands, script};
use orb_provenance::config::EngineConfig;
use orb_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Orb identity and provenance tool
#[derive(Parser, Debug)]
#[command(name = "orb")]
#[command(about = "Encode, validate and replay Orb token identifiers")]
#[command(version)]
struct Args {
    /// Debug-level logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a color map (inline JSON or a path to a JSON file)
    Encode {
        input: String,
        /// Recompute colorCount from the colors
        #[arg(long)]
        recount: bool,
    },
    /// Decode any identifier
    Decode { id: String },
    /// Validate an identifier, failing if it is invalid
    Validate { id: String },
    /// Print the metadata document for a valid identifier
    Metadata {
        id: String,
        /// Collection name (default: ORB_COLLECTION_NAME or "Orb")
        #[arg(long)]
        collection_name: Option<String>,
        /// Viewer IPFS hash (default: ORB_IPFS_HASH or "Qm")
        #[arg(long)]
        ipfs_hash: Option<String>,
    },
    /// Pack a supply cap
    PackSupply { supply: String, power: u8 },
    /// Unpack a packed supply cap
    UnpackSupply { packed: String },
    /// Pack a unit price
    PackPrice { base: String, decimals: u8 },
    /// Unpack a packed unit price
    UnpackPrice { packed: String },
    /// Replay a JSON script of lifecycle calls
    Replay {
        script: PathBuf,
        /// Print Prometheus metrics to stderr afterwards
        #[arg(long)]
        metrics: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if args.verbose {
        telemetry = telemetry.with_log_level("debug");
    }
    if args.json_logs {
        telemetry.json_logs = true;
    }
    let _telemetry = init_telemetry(telemetry).context("Failed to initialize telemetry")?;

    match args.command {
        Command::Encode { input, recount } => {
            let text = if input.trim_start().starts_with('{') {
                input
            } else {
                fs::read_to_string(&input)
                    .with_context(|| format!("Failed to read color map {input}"))?
            };
            print_json(&commands::encode_map(&text, recount)?)
        }
        Command::Decode { id } => print_json(&commands::decode_id(&id)?),
        Command::Validate { id } => print_json(&commands::validate_id(&id)?),
        Command::Metadata {
            id,
            collection_name,
            ipfs_hash,
        } => {
            let mut config = EngineConfig::from_env();
            if let Some(name) = collection_name {
                config.collection_name = name;
            }
            if let Some(hash) = ipfs_hash {
                config.ipfs_hash = hash;
            }
            print_json(&commands::metadata(&id, &config)?)
        }
        Command::PackSupply { supply, power } => print_json(&commands::pack_supply(&supply, power)?),
        Command::UnpackSupply { packed } => print_json(&commands::unpack_supply(&packed)?),
        Command::PackPrice { base, decimals } => print_json(&commands::pack_price(&base, decimals)?),
        Command::UnpackPrice { packed } => print_json(&commands::unpack_price(&packed)?),
        Command::Replay {
            script: path,
            metrics,
        } => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            let parsed = script::Script::from_json(&text)?;
            let replay = script::replay(&parsed);

            for step in &replay.steps {
                println!("{}", serde_json::to_string(step)?);
            }
            println!("{}", serde_json::to_string(&replay.summary)?);

            if metrics {
                eprintln!("{}", encode_metrics()?);
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
