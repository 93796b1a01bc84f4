//! Named cluster resources (topics) and their descriptions.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// A resource name as returned by the listing call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceListing {
    pub name: String,
    /// Whether the resource is internal to the cluster (e.g. offsets topics).
    #[serde(default)]
    pub internal: bool,
}

impl ResourceListing {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            internal: false,
        }
    }

    pub fn internal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            internal: true,
        }
    }
}

/// Layout of one partition of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionInfo {
    /// Partition index within the resource.
    pub partition: i32,
    /// Current leader, absent while the partition is offline.
    #[serde(default)]
    pub leader: Option<NodeId>,
    /// Assigned replicas, preferred leader first.
    #[serde(default)]
    pub replicas: Vec<NodeId>,
    /// Replicas currently in sync with the leader.
    #[serde(default)]
    pub isr: Vec<NodeId>,
}

/// Description of a named resource.
///
/// The cache treats the payload opaquely; only `name` is used as a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescription {
    pub name: String,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub partitions: Vec<PartitionInfo>,
}

impl ResourceDescription {
    /// Create a description with no partitions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            internal: false,
            partitions: Vec::new(),
        }
    }

    /// Mark as internal.
    pub fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// Append a partition.
    pub fn with_partition(mut self, partition: PartitionInfo) -> Self {
        self.partitions.push(partition);
        self
    }

    /// Partitions whose in-sync set is smaller than the replica set.
    pub fn under_replicated_partitions(&self) -> impl Iterator<Item = &PartitionInfo> {
        self.partitions
            .iter()
            .filter(|p| p.isr.len() < p.replicas.len())
    }
}
