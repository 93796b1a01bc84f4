//! Core ClusterStateView trait

use std::collections::HashSet;

use crate::{ClusterStateCache, Node, NodeId, ResourceDescription};

/// Read-only view of cached cluster state.
///
/// This is the only surface query front-ends depend on. Every method answers
/// from memory and never waits on the remote cluster; lookups of unknown
/// keys yield `None` in the corresponding position instead of failing.
pub trait ClusterStateView: Send + Sync {
    /// Ids of all known nodes.
    fn node_ids(&self) -> HashSet<NodeId>;

    /// Nodes for the given ids, in input order.
    fn nodes_by_ids(&self, ids: &[NodeId]) -> Vec<Option<Node>>;

    /// Names of all known resources.
    fn resource_names(&self) -> HashSet<String>;

    /// Descriptions for the given resource names, in input order.
    fn resource_descriptions(&self, names: &[String]) -> Vec<Option<ResourceDescription>>;

    /// All known nodes, ordered by id.
    fn all_nodes(&self) -> Vec<Node> {
        let mut ids: Vec<NodeId> = self.node_ids().into_iter().collect();
        ids.sort_unstable();
        self.nodes_by_ids(&ids).into_iter().flatten().collect()
    }
}

impl ClusterStateView for ClusterStateCache {
    fn node_ids(&self) -> HashSet<NodeId> {
        ClusterStateCache::node_ids(self)
    }

    fn nodes_by_ids(&self, ids: &[NodeId]) -> Vec<Option<Node>> {
        ClusterStateCache::nodes_by_ids(self, ids)
    }

    fn resource_names(&self) -> HashSet<String> {
        ClusterStateCache::resource_names(self)
    }

    fn resource_descriptions(&self, names: &[String]) -> Vec<Option<ResourceDescription>> {
        ClusterStateCache::resource_descriptions(self, names)
    }

    fn all_nodes(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self.node_snapshot().values().cloned().collect();
        nodes.sort_unstable_by_key(|n| n.id);
        nodes
    }
}
