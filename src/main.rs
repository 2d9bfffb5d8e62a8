//! Pool Tracker CLI
//!
//! Run with: cargo run -- refresh --pools pools.json
//!
//! Reads a JSON array of pool entities, refreshes every pool through the
//! tracker registered for its type and prints the refreshed pools as JSON.

use alloy_provider::ProviderBuilder;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use console::style;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pool_tracker::multicall::{CancelHandle, RpcCaller};
use pool_tracker::{refresh_pools, CallContext, Config, MulticallClient, Pool, TrackerRegistry};

#[derive(Parser)]
#[command(name = "pool-tracker", version, about = "Refresh AMM pool state via Multicall3")]
struct Cli {
    /// TOML config file (defaults to environment / .env)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh pools read from a JSON file
    Refresh {
        /// JSON array of pool entities
        #[arg(long)]
        pools: PathBuf,

        /// Read state at this block instead of latest
        #[arg(long)]
        block: Option<u64>,

        /// Write refreshed pools here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List supported protocol types
    Protocols,
}

fn print_banner() {
    eprintln!();
    eprintln!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    eprintln!("{}", style(" POOL TRACKER - Multicall3 state refresh").cyan().bold());
    eprintln!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    eprintln!();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your config file or .env");
        return Err(e);
    }
    Ok(config)
}

fn list_protocols(registry: &TrackerRegistry) {
    println!("{}", style("Supported protocols:").bold());
    for pool_type in registry.pool_types() {
        println!("  • {}", pool_type);
    }
}

async fn refresh(
    config: &Config,
    registry: &TrackerRegistry,
    pools_path: PathBuf,
    block: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let pools: Vec<Pool> = serde_json::from_str(&fs::read_to_string(&pools_path)?)?;
    info!("Loaded {} pools from {}", pools.len(), pools_path.display());

    let provider = ProviderBuilder::new().connect_http(config.rpc_url.parse()?);
    let client = Arc::new(
        MulticallClient::new(Arc::new(RpcCaller::new(provider)))
            .with_address(config.multicall_address),
    );

    let (cancel, signal) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight refreshes");
            cancel.cancel();
        }
    });

    let mut ctx = CallContext::latest()
        .with_timeout(config.request_timeout())
        .with_cancel(signal);
    if let Some(block) = block {
        ctx = ctx.at_block(block);
    }

    // group by source so each tracker is built once
    let mut groups: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    for (i, pool) in pools.iter().enumerate() {
        let dex_id = if pool.exchange.is_empty() {
            pool.pool_type.clone()
        } else {
            pool.exchange.clone()
        };
        groups
            .entry((dex_id, pool.pool_type.clone()))
            .or_default()
            .push(i);
    }

    let start = Instant::now();
    let mut refreshed: Vec<Option<Pool>> = vec![None; pools.len()];
    let (mut failed, mut skipped) = (0usize, 0usize);

    for ((dex_id, pool_type), indices) in groups {
        let tracker = match registry.build(config.dex(&dex_id, &pool_type), client.clone()) {
            Ok(tracker) => tracker,
            Err(e) => {
                warn!("[{}] Skipping {} pools: {}", dex_id, indices.len(), e);
                skipped += indices.len();
                continue;
            }
        };

        let batch: Vec<Pool> = indices.iter().map(|&i| pools[i].clone()).collect();
        let results = refresh_pools(tracker.as_ref(), &batch, &ctx).await;

        for (i, result) in indices.into_iter().zip(results) {
            match result {
                Ok(pool) => refreshed[i] = Some(pool),
                Err(e) => {
                    error!("[{}] {}", dex_id, e);
                    failed += 1;
                }
            }
        }
    }

    let ok: Vec<Pool> = refreshed.into_iter().flatten().collect();

    eprintln!();
    eprintln!(
        "{} {} refreshed, {} failed, {} skipped in {:?}",
        style("✓").green().bold(),
        style(ok.len()).green(),
        style(failed).red(),
        style(skipped).yellow(),
        start.elapsed()
    );

    let json = serde_json::to_string_pretty(&ok)?;
    match output {
        Some(path) => {
            fs::write(&path, json)?;
            info!("Wrote refreshed pools to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pool_tracker=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let registry = TrackerRegistry::with_defaults()?;

    match cli.command {
        Command::Protocols => list_protocols(&registry),
        Command::Refresh {
            pools,
            block,
            output,
        } => {
            print_banner();
            let config = load_config(cli.config.as_ref())?;
            eprintln!("{}", config);
            eprintln!();
            refresh(&config, &registry, pools, block, output).await?;
        }
    }

    Ok(())
}
