//! One refresh tick.
//!
//! A tick runs two fetch chains concurrently:
//!
//! - **nodes**: `describe_cluster`
//! - **resources**: `list_resources` → `describe_resources` for exactly the
//!   listed names
//!
//! Each chain writes its own collection as soon as it succeeds. A failed
//! chain is logged and leaves its collection untouched, so one chain failing
//! never holds back or rolls back the other.
//!
//! Ticks are serialized: a manual refresh issued while the background loop is
//! mid-tick waits for that tick to finish, so a collection only ever moves
//! forward to the result of a later tick.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::admin::{ClusterAdmin, ListResourcesOptions};
use crate::cache::ClusterStateCache;
use crate::telemetry;
use crate::types::ResourceDescription;
use crate::KaijuError;

/// Remote call a fetch chain was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStage {
    DescribeCluster,
    ListResources,
    DescribeResources,
}

impl FetchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStage::DescribeCluster => "describe_cluster",
            FetchStage::ListResources => "list_resources",
            FetchStage::DescribeResources => "describe_resources",
        }
    }
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one fetch chain did to its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The collection was replaced with `count` entries.
    Updated { count: usize },
    /// The chain failed; the collection kept its previous contents.
    Failed { stage: FetchStage, error: String },
}

impl StageOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, StageOutcome::Updated { .. })
    }
}

/// Result of one tick, per collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub nodes: StageOutcome,
    pub resources: StageOutcome,
}

impl RefreshOutcome {
    /// Both collections were updated.
    pub fn is_complete(&self) -> bool {
        self.nodes.is_updated() && self.resources.is_updated()
    }
}

/// Everything a tick needs; cloned into the background task.
#[derive(Clone)]
pub(crate) struct Refresher {
    pub(crate) cache: Arc<ClusterStateCache>,
    pub(crate) admin: Arc<dyn ClusterAdmin>,
    pub(crate) list_options: ListResourcesOptions,
    /// Held for the whole tick. Never taken by readers.
    pub(crate) tick: Arc<Mutex<()>>,
}

impl Refresher {
    /// Run both fetch chains and wait for them to settle.
    pub(crate) async fn refresh(&self) -> RefreshOutcome {
        let _tick = self.tick.lock().await;
        let start = Instant::now();
        info!(admin = self.admin.name(), "refreshing cluster state");

        let (nodes, resources) = tokio::join!(self.refresh_nodes(), self.refresh_resources());

        metrics::histogram!(telemetry::REFRESH_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        info!(
            nodes_updated = nodes.is_updated(),
            resources_updated = resources.is_updated(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "finished refreshing cluster state"
        );

        RefreshOutcome { nodes, resources }
    }

    async fn refresh_nodes(&self) -> StageOutcome {
        let outcome = match self.admin.describe_cluster().await {
            Ok(nodes) => {
                let count = nodes.len();
                self.cache.replace_nodes(nodes);
                debug!(count, "updated nodes");
                StageOutcome::Updated { count }
            }
            Err(e) => failed("nodes", FetchStage::DescribeCluster, e),
        };
        record("nodes", &outcome);
        outcome
    }

    async fn refresh_resources(&self) -> StageOutcome {
        let outcome = match self.fetch_resources().await {
            Ok(descriptions) => {
                let count = descriptions.len();
                self.cache.replace_resource_descriptions(descriptions);
                debug!(count, "updated resource descriptions");
                StageOutcome::Updated { count }
            }
            Err((stage, e)) => failed("resources", stage, e),
        };
        record("resources", &outcome);
        outcome
    }

    async fn fetch_resources(
        &self,
    ) -> std::result::Result<Vec<ResourceDescription>, (FetchStage, KaijuError)> {
        let listings = self
            .admin
            .list_resources(&self.list_options)
            .await
            .map_err(|e| (FetchStage::ListResources, e))?;
        debug!(count = listings.len(), "fetched resource listings");

        if listings.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<String> = listings.into_iter().map(|l| l.name).collect();
        let descriptions = self
            .admin
            .describe_resources(&names)
            .await
            .map_err(|e| (FetchStage::DescribeResources, e))?;
        Ok(descriptions.into_values().collect())
    }
}

fn failed(collection: &'static str, stage: FetchStage, e: KaijuError) -> StageOutcome {
    error!(
        collection,
        stage = %stage,
        transient = e.is_transient(),
        error = %e,
        "refresh failed, keeping last known state"
    );
    StageOutcome::Failed {
        stage,
        error: e.to_string(),
    }
}

fn record(collection: &'static str, outcome: &StageOutcome) {
    let status = if outcome.is_updated() { "ok" } else { "error" };
    metrics::counter!(telemetry::REFRESH_TOTAL,
        "collection" => collection,
        "status" => status,
    )
    .increment(1);
}
