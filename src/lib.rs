//! Kaiju - locally cached view of cluster metadata
//!
//! This crate keeps an in-memory snapshot of a remote cluster's members
//! (nodes) and named resources (topics and their partition layout), refreshed
//! in the background on a fixed interval. Reads are served from memory and
//! never wait on the cluster.
//!
//! # Example
//!
//! ```rust,no_run
//! use kaiju::{ClusterStateManager, ClusterStateView};
//!
//! #[tokio::main]
//! async fn main() -> kaiju::Result<()> {
//!     let manager = ClusterStateManager::connect("broker-1:8082,broker-2:8082", "kaiju")?;
//!     manager.start()?;
//!
//!     // ... later, from any thread:
//!     let nodes = manager.nodes_by_ids(&[1, 2, 3]);
//!     let topics = manager.resource_descriptions(&["orders".to_string()]);
//!     println!("{nodes:?} {topics:?}");
//!
//!     manager.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Consistency
//!
//! Nodes and resource descriptions are replaced independently, each
//! atomically. After a tick where one fetch failed, the two collections may
//! reflect different ticks; the failed one keeps its last known contents.

pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use admin::{AdminConfig, ClusterAdmin, HttpClusterAdmin, ListResourcesOptions};
pub use cache::ClusterStateCache;
pub use config::Config;
pub use error::{KaijuError, Result};
pub use manager::{
    ClusterStateManager, FetchStage, RefreshConfig, RefreshOutcome, SnapshotSummary, StageOutcome,
};
pub use traits::ClusterStateView;

pub use types::{Node, NodeId, PartitionInfo, ResourceDescription, ResourceListing};

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
