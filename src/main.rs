//! binlookup CLI: resolve card BINs to issuer attributes.
//!
//! Reads BINs from arguments or a file, resolves them as one batch
//! through the tiered cache and prints one JSON object per input on
//! stdout. Logs go to stderr so the output stays machine-readable.

use anyhow::{bail, Context, Result};
use binlookup::{BatchOptions, JsonFileSource, LookupService, LookupServiceConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "binlookup", version, about = "Resolve card BINs to issuer attributes")]
struct Args {
    /// BINs to resolve; full PANs and separators are accepted
    bins: Vec<String>,

    /// Read additional BINs from a file, one per line, '#' comments allowed
    #[arg(long, env = "BINLOOKUP_INPUT")]
    input: Option<PathBuf>,

    /// Path to the BIN dataset, a JSON object keyed by prefix
    #[arg(long, env = "BINLOOKUP_DATASET", default_value = "data/bindata.json")]
    dataset: PathBuf,

    /// BINs resolved concurrently per batch window
    #[arg(long, env = "BINLOOKUP_MAX_CONCURRENT", default_value_t = 10)]
    max_concurrent: usize,

    /// Per-BIN timeout in milliseconds
    #[arg(long, env = "BINLOOKUP_TIMEOUT_MS", default_value_t = 30_000)]
    timeout_ms: u64,

    /// Hot tier TTL in seconds
    #[arg(long, env = "BINLOOKUP_HOT_TTL_SECS", default_value_t = 300)]
    hot_ttl_secs: u64,

    /// Hot tier capacity in entries
    #[arg(long, env = "BINLOOKUP_HOT_CAPACITY", default_value_t = 500)]
    hot_capacity: usize,

    /// Warm tier TTL in seconds
    #[arg(long, env = "BINLOOKUP_WARM_TTL_SECS", default_value_t = 3_600)]
    warm_ttl_secs: u64,

    /// Warm tier capacity in entries
    #[arg(long, env = "BINLOOKUP_WARM_CAPACITY", default_value_t = 5_000)]
    warm_capacity: usize,

    /// Cold tier TTL in seconds
    #[arg(long, env = "BINLOOKUP_COLD_TTL_SECS", default_value_t = 86_400)]
    cold_ttl_secs: u64,

    /// Cold tier capacity in entries
    #[arg(long, env = "BINLOOKUP_COLD_CAPACITY", default_value_t = 50_000)]
    cold_capacity: usize,

    /// Seconds between background sweeps of expired entries, 0 disables
    #[arg(long, env = "BINLOOKUP_SWEEP_INTERVAL_SECS", default_value_t = 300)]
    sweep_interval_secs: u64,

    /// Print a cache stats snapshot after resolving
    #[arg(long)]
    stats: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

fn init_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn service_config(args: &Args) -> Result<LookupServiceConfig> {
    let mut config = LookupServiceConfig::default();
    config.cache.hot.ttl = Duration::from_secs(args.hot_ttl_secs);
    config.cache.hot.max_entries = args.hot_capacity;
    config.cache.warm.ttl = Duration::from_secs(args.warm_ttl_secs);
    config.cache.warm.max_entries = args.warm_capacity;
    config.cache.cold.ttl = Duration::from_secs(args.cold_ttl_secs);
    config.cache.cold.max_entries = args.cold_capacity;
    config.sweeper.enabled = args.sweep_interval_secs > 0;
    if config.sweeper.enabled {
        config.sweeper.interval = Duration::from_secs(args.sweep_interval_secs);
    }
    config.cache.validate()?;
    Ok(config)
}

async fn gather_inputs(args: &Args) -> Result<Vec<String>> {
    let mut inputs = args.bins.clone();
    if let Some(path) = &args.input {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading BIN list from {}", path.display()))?;
        inputs.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }
    Ok(inputs)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    info!(
        version = binlookup::VERSION,
        dataset = %args.dataset.display(),
        "binlookup starting"
    );

    let inputs = gather_inputs(&args).await?;
    if inputs.is_empty() {
        bail!("nothing to resolve: pass BINs as arguments or via --input");
    }

    let config = service_config(&args)?;
    let service = LookupService::with_config(config, Arc::new(JsonFileSource::new(&args.dataset)));

    let options = BatchOptions {
        max_concurrent: args.max_concurrent,
        per_item_timeout: Duration::from_millis(args.timeout_ms),
    };
    let outcomes = service.resolve_batch(&inputs, &options).await;

    let mut failed = 0usize;
    for (raw, outcome) in inputs.iter().zip(&outcomes) {
        match outcome {
            Ok(resolution) => println!("{}", serde_json::to_string(resolution)?),
            Err(err) => {
                failed += 1;
                println!(
                    "{}",
                    serde_json::json!({ "input": raw, "error": err.to_string() })
                );
            }
        }
    }

    if args.stats {
        let stats = service.stats();
        println!(
            "{}",
            serde_json::json!({
                "stats": stats,
                "hitRate": format!("{:.2}%", stats.hit_rate()),
            })
        );
    }

    info!(
        total = outcomes.len(),
        failed, "batch finished"
    );
    service.shutdown().await;
    Ok(())
}
