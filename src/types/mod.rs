//! Public types for cluster metadata.

mod node;
mod resource;

pub use node::{Node, NodeId};
pub use resource::{PartitionInfo, ResourceDescription, ResourceListing};
