//! HDDP host daemon - Main entry point
//!
//! Replays decoded HDDP replies into an in-memory host registry and reports
//! the resulting topology.

mod config;
mod replay;

use anyhow::Result;
use clap::Parser;
use hddp_core::Topology;
use hddp_hosts::{HostEvent, HostReconciler, InMemoryHostRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::replay::PacketSource;

#[derive(Parser, Debug)]
#[command(name = "hddp-hostd")]
#[command(about = "HDDP sensor host reconciler")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "hddp.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// JSON-lines packet file ("-" for stdin), overrides replay.path
    #[arg(short, long)]
    input: Option<String>,

    /// Print the topology as JSON once the replay finishes
    #[arg(long)]
    dump_topology: bool,

    /// Write a default configuration file to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("hddp-hostd v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        config::save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    let config = config::load_config(&args.config)?;
    let provider = config.provider_id();
    info!(
        provider = %provider,
        sensor_types = config.sensors.labels.len(),
        "Configuration loaded"
    );

    let registry = Arc::new(InMemoryHostRegistry::new());
    let reconciler = HostReconciler::new(registry.clone(), provider, config.sensors.labels.clone());

    // Log registry changes as they happen
    let mut rx = registry.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                HostEvent::HostAdded(record) => {
                    info!(address = %record.address(), location = %record.location(), "Host added");
                }
                HostEvent::HostMoved { record, previous } => {
                    info!(
                        address = %record.address(),
                        from = %previous,
                        to = %record.location(),
                        "Host moved"
                    );
                }
                HostEvent::HostUpdated(record) => {
                    debug!(address = %record.address(), "Host refreshed");
                }
            }
        }
    });

    let source = PacketSource::from_path(args.input.as_deref().or(config.replay.path.as_deref()));
    info!(source = %source, "Replaying discovery replies");
    let stats = replay::replay_source(&source, &reconciler).await?;

    info!(
        packets = stats.packets,
        failed = stats.failed,
        created = stats.created,
        moved = stats.moved,
        skipped = stats.skipped,
        hosts = registry.len(),
        "Replay finished"
    );

    if args.dump_topology {
        let topology = Topology::from_hosts(&registry.hosts());
        println!("{}", serde_json::to_string_pretty(&topology.to_graph())?);
    }

    Ok(())
}
