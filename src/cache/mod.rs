//! Cluster state cache.
//!
//! Holds two independent collections:
//!
//! - **nodes** — cluster members keyed on [`NodeId`]
//! - **resources** — resource descriptions keyed on resource name
//!
//! Each collection is an immutable `HashMap` published behind its own
//! `RwLock<Arc<..>>`. A replace builds the new map outside the lock and swaps
//! the `Arc` under a short write lock, so readers observe either the whole old
//! map or the whole new one. Readers clone the `Arc` and release the lock
//! before doing any work, and a writer of one collection never blocks readers
//! of the other.
//!
//! The cache knows nothing about where its data comes from; see
//! [`ClusterStateManager`](crate::ClusterStateManager) for the refresh side.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use crate::telemetry;
use crate::types::{Node, NodeId, ResourceDescription};

type NodeMap = HashMap<NodeId, Node>;
type ResourceMap = HashMap<String, ResourceDescription>;

/// Thread-safe store of the latest known cluster state.
#[derive(Debug, Default)]
pub struct ClusterStateCache {
    nodes: RwLock<Arc<NodeMap>>,
    resources: RwLock<Arc<ResourceMap>>,
}

impl ClusterStateCache {
    /// Create a cache with both collections empty.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Currently published node map.
    ///
    /// The returned map never changes; a later replace publishes a new one.
    pub fn node_snapshot(&self) -> Arc<NodeMap> {
        // Poisoning is ignored: the lock only ever holds a fully built map.
        let guard = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Ids of all cached nodes.
    pub fn node_ids(&self) -> HashSet<NodeId> {
        self.node_snapshot().keys().copied().collect()
    }

    /// Look up nodes by id, preserving input order, length and duplicates.
    ///
    /// Unknown ids yield `None`.
    pub fn nodes_by_ids(&self, ids: &[NodeId]) -> Vec<Option<Node>> {
        let nodes = self.node_snapshot();
        ids.iter().map(|id| nodes.get(id).cloned()).collect()
    }

    /// Number of cached nodes.
    pub fn node_count(&self) -> usize {
        self.node_snapshot().len()
    }

    /// Atomically replace the node collection.
    ///
    /// An empty input clears the collection. When ids repeat, the last one
    /// wins.
    pub fn replace_nodes(&self, nodes: impl IntoIterator<Item = Node>) {
        let map: NodeMap = nodes.into_iter().map(|n| (n.id, n)).collect();
        let count = map.len();
        *self.nodes.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(map);

        metrics::gauge!(telemetry::CACHED_ENTRIES, "collection" => "nodes").set(count as f64);
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Currently published resource description map.
    pub fn resource_snapshot(&self) -> Arc<ResourceMap> {
        let guard = self
            .resources
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Names of all cached resources.
    pub fn resource_names(&self) -> HashSet<String> {
        self.resource_snapshot().keys().cloned().collect()
    }

    /// Look up resource descriptions by name, preserving input order.
    ///
    /// Unknown names yield `None`.
    pub fn resource_descriptions<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Vec<Option<ResourceDescription>> {
        let resources = self.resource_snapshot();
        names
            .iter()
            .map(|name| resources.get(name.as_ref()).cloned())
            .collect()
    }

    /// Number of cached resource descriptions.
    pub fn resource_count(&self) -> usize {
        self.resource_snapshot().len()
    }

    /// Atomically replace the resource description collection.
    pub fn replace_resource_descriptions(
        &self,
        descriptions: impl IntoIterator<Item = ResourceDescription>,
    ) {
        let map: ResourceMap = descriptions
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        let count = map.len();
        *self
            .resources
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(map);

        metrics::gauge!(telemetry::CACHED_ENTRIES, "collection" => "resources")
            .set(count as f64);
    }
}
