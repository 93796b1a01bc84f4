//! Cluster state manager.
//!
//! Owns the [`ClusterStateCache`] and the [`ClusterAdmin`] handle, and drives
//! the periodic refresh loop. Query-side code depends on the manager only
//! through [`ClusterStateView`], which forwards to the cache.
//!
//! # Lifecycle
//!
//! - [`start()`](ClusterStateManager::start) spawns a single tokio task. It
//!   refreshes immediately, then once per [`RefreshConfig::interval`].
//! - [`shutdown()`](ClusterStateManager::shutdown) signals the task between
//!   ticks, waits up to [`RefreshConfig::shutdown_timeout`] for an in-flight
//!   tick, aborts the task if it is still running, then closes the admin
//!   client.
//!
//! A failing tick never ends the loop; the next tick is the retry. Each tick
//! runs in its own task, so a panic inside an admin client is logged as a
//! failed tick as well.

mod refresh;

pub use refresh::{FetchStage, RefreshOutcome, StageOutcome};

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

use crate::admin::{AdminConfig, ClusterAdmin, HttpClusterAdmin, ListResourcesOptions};
use crate::cache::ClusterStateCache;
use crate::traits::ClusterStateView;
use crate::types::{Node, NodeId, ResourceDescription};
use crate::{KaijuError, Result};

use refresh::Refresher;

/// Refresh loop settings.
///
/// ```rust
/// # use kaiju::RefreshConfig;
/// # use std::time::Duration;
/// let config = RefreshConfig::new()
///     .interval(Duration::from_secs(15))
///     .include_internal(false);
/// assert_eq!(config.interval, Duration::from_secs(15));
/// ```
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Pause between the end of one tick and the start of the next. Default: 60s.
    pub interval: Duration,
    /// How long shutdown waits for an in-flight tick. Default: 30s.
    pub shutdown_timeout: Duration,
    /// Whether internal resources are listed and cached. Default: true.
    pub include_internal: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(30),
            include_internal: true,
        }
    }
}

impl RefreshConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the refresh interval.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the shutdown grace period.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Include or exclude internal resources.
    pub fn include_internal(mut self, include: bool) -> Self {
        self.include_internal = include;
        self
    }
}

/// Entry counts of the cached collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub nodes: usize,
    pub resources: usize,
}

struct RefreshWorker {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

enum WorkerState {
    Idle,
    Running(RefreshWorker),
    Closed,
}

/// Keeps a [`ClusterStateCache`] in sync with the remote cluster.
pub struct ClusterStateManager {
    refresher: Refresher,
    config: RefreshConfig,
    worker: Mutex<WorkerState>,
}

impl ClusterStateManager {
    /// Create a manager around an existing admin client, with an empty cache.
    pub fn new(admin: Arc<dyn ClusterAdmin>, config: RefreshConfig) -> Self {
        let list_options = ListResourcesOptions::new().include_internal(config.include_internal);
        Self {
            refresher: Refresher {
                cache: Arc::new(ClusterStateCache::new()),
                admin,
                list_options,
                tick: Arc::new(tokio::sync::Mutex::new(())),
            },
            config,
            worker: Mutex::new(WorkerState::Idle),
        }
    }

    /// Connect to `bootstrap_servers` over HTTP with default settings.
    pub fn connect(bootstrap_servers: &str, client_id: &str) -> Result<Self> {
        Self::with_admin_config(
            &AdminConfig::new(bootstrap_servers, client_id),
            RefreshConfig::default(),
        )
    }

    /// Connect over HTTP with explicit admin and refresh settings.
    pub fn with_admin_config(admin: &AdminConfig, config: RefreshConfig) -> Result<Self> {
        let admin = HttpClusterAdmin::new(admin)?;
        Ok(Self::new(Arc::new(admin), config))
    }

    /// The underlying cache.
    pub fn cache(&self) -> &Arc<ClusterStateCache> {
        &self.refresher.cache
    }

    /// Refresh settings.
    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Run one tick now.
    ///
    /// If the background loop is mid-tick, waits for that tick to finish
    /// first.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.refresher.refresh().await
    }

    /// Spawn the background refresh loop on the current tokio runtime.
    ///
    /// Fails with [`KaijuError::AlreadyRunning`] if the loop is running and
    /// with [`KaijuError::ClientClosed`] after shutdown.
    pub fn start(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            KaijuError::Configuration(format!("refresh loop needs a tokio runtime: {e}"))
        })?;

        let mut worker = self.lock_worker();
        match *worker {
            WorkerState::Running(_) => return Err(KaijuError::AlreadyRunning),
            WorkerState::Closed => return Err(KaijuError::ClientClosed),
            WorkerState::Idle => {}
        }

        let (stop, stop_rx) = watch::channel(false);
        let handle = runtime.spawn(run_refresh_loop(
            self.refresher.clone(),
            self.config.interval,
            stop_rx,
        ));
        *worker = WorkerState::Running(RefreshWorker { stop, handle });
        Ok(())
    }

    /// Whether the background loop has been started, has not been shut down
    /// and its task is still alive.
    pub fn is_running(&self) -> bool {
        match &*self.lock_worker() {
            WorkerState::Running(worker) => !worker.handle.is_finished(),
            WorkerState::Idle | WorkerState::Closed => false,
        }
    }

    /// Current size of both cached collections.
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            nodes: self.refresher.cache.node_count(),
            resources: self.refresher.cache.resource_count(),
        }
    }

    /// Stop the refresh loop and close the admin client.
    ///
    /// Safe to call more than once; later calls do nothing.
    pub async fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.lock_worker(), WorkerState::Closed);
        match previous {
            WorkerState::Closed => return,
            WorkerState::Idle => {}
            WorkerState::Running(worker) => self.stop_worker(worker).await,
        }
        self.refresher.admin.close();
        info!("cluster state manager shut down");
    }

    async fn stop_worker(&self, worker: RefreshWorker) {
        let RefreshWorker { stop, mut handle } = worker;
        // The loop may already have exited if the receiver was dropped.
        let _ = stop.send(true);

        match tokio::time::timeout(self.config.shutdown_timeout, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "refresh task ended abnormally"),
            Err(_) => {
                warn!(
                    timeout_ms = self.config.shutdown_timeout.as_millis() as u64,
                    "refresh tick still in flight at shutdown, abandoning it"
                );
                handle.abort();
            }
        }
    }

    fn lock_worker(&self) -> MutexGuard<'_, WorkerState> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClusterStateView for ClusterStateManager {
    fn node_ids(&self) -> HashSet<NodeId> {
        self.refresher.cache.node_ids()
    }

    fn nodes_by_ids(&self, ids: &[NodeId]) -> Vec<Option<Node>> {
        self.refresher.cache.nodes_by_ids(ids)
    }

    fn resource_names(&self) -> HashSet<String> {
        self.refresher.cache.resource_names()
    }

    fn resource_descriptions(&self, names: &[String]) -> Vec<Option<ResourceDescription>> {
        self.refresher.cache.resource_descriptions(names)
    }

    fn all_nodes(&self) -> Vec<Node> {
        ClusterStateView::all_nodes(self.refresher.cache.as_ref())
    }
}

/// Tick, sleep, repeat until `stop` fires or its sender is dropped.
async fn run_refresh_loop(
    refresher: Refresher,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) {
    info!(interval_ms = interval.as_millis() as u64, "refresh loop started");
    loop {
        if *stop.borrow_and_update() {
            break;
        }
        run_tick(&refresher).await;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = stop.changed() => break,
        }
    }
    info!("refresh loop stopped");
}

/// Run one tick in its own task so a panicking admin client cannot take the
/// loop down. Dropping the set (on abort) aborts the tick too.
async fn run_tick(refresher: &Refresher) {
    let mut tick = JoinSet::new();
    let refresher = refresher.clone();
    tick.spawn(async move { refresher.refresh().await });

    if let Some(Err(e)) = tick.join_next().await {
        error!(error = %e, "refresh tick panicked, keeping last known state");
    }
}
