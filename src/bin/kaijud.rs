//! kaijud — Kaiju daemon.
//!
//! Keeps a cluster state cache refreshed until interrupted, or with `--once`
//! runs a single refresh and prints the resulting snapshot as JSON.

use std::collections::BTreeMap;

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kaiju::{ClusterStateManager, ClusterStateView, Config, Node, ResourceDescription};

/// Kaiju daemon — cached cluster metadata.
#[derive(Parser)]
#[command(name = "kaijud")]
#[command(version = kaiju::PKG_VERSION)]
#[command(about = "Cluster metadata cache daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Refresh once, print the snapshot as JSON and exit.
    #[arg(long)]
    once: bool,
}

/// JSON shape printed by `--once`.
#[derive(Serialize)]
struct SnapshotDump {
    nodes: Vec<Node>,
    resources: BTreeMap<String, ResourceDescription>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let manager =
        ClusterStateManager::with_admin_config(&config.admin_config(), config.refresh_config())?;

    if args.once {
        let outcome = manager.refresh().await;
        if !outcome.is_complete() {
            warn!(?outcome, "refresh was partial");
        }
        println!("{}", serde_json::to_string_pretty(&dump(&manager))?);
        manager.shutdown().await;
        return Ok(());
    }

    info!(
        version = kaiju::PKG_VERSION,
        bootstrap_servers = %config.cluster.bootstrap_servers,
        interval_secs = config.refresh.interval_secs,
        "kaijud starting"
    );
    manager.start()?;

    // Summaries trail the loop by one interval, so the first reports the
    // initial tick.
    let every = manager.config().interval;
    let mut summaries = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            _ = summaries.tick() => {
                let summary = manager.summary();
                info!(
                    nodes = summary.nodes,
                    resources = summary.resources,
                    "cluster state snapshot"
                );
            }
        }
    }

    let summary = manager.summary();
    info!(
        nodes = summary.nodes,
        resources = summary.resources,
        "interrupted, shutting down"
    );
    manager.shutdown().await;

    Ok(())
}

fn dump(manager: &ClusterStateManager) -> SnapshotDump {
    let resources = manager
        .cache()
        .resource_snapshot()
        .iter()
        .map(|(name, desc)| (name.clone(), desc.clone()))
        .collect();
    SnapshotDump {
        nodes: manager.all_nodes(),
        resources,
    }
}
