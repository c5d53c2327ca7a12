use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use alert_bridge::{
    access::AccessFilter,
    api::{ApiConfig, ApiState, spawn_api_server},
    cache::StateStore,
    config::{Config, read_config_file},
    forwarder,
    ingest::IngestionRouter,
    normalizer::NormalizerRegistry,
    util::get_config_path,
};
use anyhow::Context;
use clap::Parser;
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{
    filter, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[derive(Debug, Clone, Parser)]
#[command(about = "Receives alert pushes, relays them as passive checks and serves their state")]
struct Args {
    /// Config file [default: $BRIDGE_CONFIG or ./receiver.cfg.json]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    verbose: bool,

    /// Dump each request body into a new file in this directory
    #[arg(long)]
    dump_requests_dir: Option<PathBuf>,
}

fn init(args: &Args, config: &Config) -> anyhow::Result<()> {
    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_targets(vec![
        ("alert_bridge", level),
        ("tower_http", level),
    ]);

    let writer = if config.log_file.is_empty() {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("failed to open log file {}", config.log_file))?;
        BoxMakeWriter::new(Arc::new(file))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();

    if !config.log_file.is_empty() {
        info!("logging to {}", config.log_file);
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config_path = args.config.clone().unwrap_or_else(get_config_path);
    let config = read_config_file(&config_path)?;

    init(&args, &config)?;
    trace!("started with args: {args:?}");

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()?
        .block_on(run(args, config))
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let normalizers = NormalizerRegistry::with_defaults();
    config.validate(&normalizers)?;

    let forwarders = forwarder::from_config(&config)?;
    let names: Vec<&'static str> = forwarders.iter().map(|f| f.name()).collect();

    let cache = StateStore::new();
    let router = IngestionRouter::new(
        config.endpoints.clone(),
        normalizers,
        cache.clone(),
        forwarders,
    );
    if router.forwarding_enabled() {
        info!("forwarding passive checks via {}", names.join(", "));
    } else {
        info!("passive-check forwarding disabled");
    }
    let state = ApiState::new(router, AccessFilter::from_list(&config.authorized_ips))
        .with_dump_dir(args.dump_requests_dir);

    spawn_api_server(ApiConfig::from_config(&config), state).await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down with {} cached check(s)", cache.len().await);

    Ok(())
}
