//! Administrative client boundary.
//!
//! The refresh side of kaiju talks to the remote cluster only through the
//! [`ClusterAdmin`] trait. Implementations own their connections, timeouts
//! and endpoint failover; the manager just awaits the returned futures.
//!
//! [`HttpClusterAdmin`] is the shipped implementation, speaking JSON to an
//! HTTP admin endpoint. Tests and embedders can plug in their own.

mod http;

pub use http::{AdminConfig, CLIENT_ID_HEADER, HttpClusterAdmin};

use std::collections::HashMap;

use async_trait::async_trait;

use crate::Result;
use crate::types::{Node, ResourceDescription, ResourceListing};

/// Options for [`ClusterAdmin::list_resources`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResourcesOptions {
    /// Include cluster-internal resources. Default: false.
    pub include_internal: bool,
}

impl ListResourcesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include or exclude internal resources.
    pub fn include_internal(mut self, include: bool) -> Self {
        self.include_internal = include;
        self
    }
}

/// Client for the remote cluster's administrative API.
///
/// All calls may fail with a remote/communication error. Empty or null
/// collections in a response are returned as empty collections, never as an
/// error.
#[async_trait]
pub trait ClusterAdmin: Send + Sync {
    /// Client name for logging/debugging.
    fn name(&self) -> &str;

    /// List the current cluster members.
    async fn describe_cluster(&self) -> Result<Vec<Node>>;

    /// List resource names.
    async fn list_resources(
        &self,
        options: &ListResourcesOptions,
    ) -> Result<Vec<ResourceListing>>;

    /// Describe the named resources, keyed by name.
    async fn describe_resources(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, ResourceDescription>>;

    /// Release network resources. Later calls fail with
    /// [`ClientClosed`](crate::KaijuError::ClientClosed).
    fn close(&self) {}
}
