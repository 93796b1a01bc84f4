//! Telemetry metric name constants.
//!
//! Centralised metric names for kaiju. Consumers install their own
//! `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `kaiju_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `collection` — cached collection: "nodes" or "resources"
//! - `status` — outcome: "ok" or "error"

/// Refresh attempts per collection, one per tick.
///
/// Labels: `collection`, `status` ("ok" | "error").
pub const REFRESH_TOTAL: &str = "kaiju_refresh_total";

/// Wall-clock duration of a whole tick (both fetch chains) in seconds.
pub const REFRESH_DURATION_SECONDS: &str = "kaiju_refresh_duration_seconds";

/// Number of entries currently published in a collection.
///
/// Labels: `collection`.
pub const CACHED_ENTRIES: &str = "kaiju_cached_entries";
