//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `interface`: bound interface name (e.g. "UserMapper")
//! - `interceptor`: interceptor name
//! - `path`: routing path taken: "object", "default" or "unit"
//! - `status`: outcome: "ok" or "error"

/// Total calls routed through binding handles.
///
/// Labels: `interface`, `path`, `status` ("ok" | "error").
pub const ROUTE_TOTAL: &str = "huginn_route_total";

/// Routed call duration in seconds.
///
/// Labels: `interface`, `path`.
pub const ROUTE_DURATION_SECONDS: &str = "huginn_route_duration_seconds";

/// Method cache hits.
pub const METHOD_CACHE_HITS_TOTAL: &str = "huginn_method_cache_hits_total";

/// Method cache misses.
pub const METHOD_CACHE_MISSES_TOTAL: &str = "huginn_method_cache_misses_total";

/// Execution units constructed by the resolver on a cache miss.
///
/// Labels: `interface`.
pub const METHOD_RESOLUTIONS_TOTAL: &str = "huginn_method_resolutions_total";

/// Calls handed to an interceptor.
///
/// Labels: `interceptor`.
pub const INTERCEPTIONS_TOTAL: &str = "huginn_interceptions_total";

/// Wrap attempts.
///
/// Labels: `interceptor`, `outcome` ("wrapped" | "unchanged").
pub const WRAPS_TOTAL: &str = "huginn_wraps_total";
