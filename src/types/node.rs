//! Cluster member types.

use serde::{Deserialize, Serialize};

/// Identifier of a cluster member, unique within a snapshot.
pub type NodeId = i32;

/// A member of the remote cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier.
    pub id: NodeId,
    /// Advertised host name.
    pub host: String,
    /// Advertised port.
    pub port: u16,
    /// Rack label, if the cluster is rack-aware.
    #[serde(default)]
    pub rack: Option<String>,
}

impl Node {
    /// Create a node without a rack label.
    pub fn new(id: NodeId, host: impl Into<String>, port: u16) -> Self {
        Self {
            id,
            host: host.into(),
            port,
            rack: None,
        }
    }

    /// Set the rack label.
    pub fn with_rack(mut self, rack: impl Into<String>) -> Self {
        self.rack = Some(rack.into());
        self
    }

    /// `host:port` form of the node's address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
