//! Telemetry metric name constants.
//!
//! Centralised metric names for medhanit operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `medhanit_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `source` — where a lookup was answered from: "cache" or "provider"
//! - `classification` — validator verdict: "valid", "not_recognized",
//!   "data_error", "api_error"
//! - `kind` — fallback record kind: "data_error" or "api_error"

/// Total lookups answered through the gateway.
///
/// Labels: `source` ("cache" | "provider"), `classification`.
pub const LOOKUPS_TOTAL: &str = "medhanit_lookups_total";

/// Total medication cache hits.
pub const CACHE_HITS_TOTAL: &str = "medhanit_cache_hits_total";

/// Total medication cache misses.
pub const CACHE_MISSES_TOTAL: &str = "medhanit_cache_misses_total";

/// Total entries evicted by the capacity policy.
pub const CACHE_EVICTIONS_TOTAL: &str = "medhanit_cache_evictions_total";

/// Total requests denied by the admission window.
pub const RATE_LIMITED_TOTAL: &str = "medhanit_rate_limited_total";

/// Total fallback records synthesized.
///
/// Labels: `kind` ("data_error" | "api_error").
pub const FALLBACKS_TOTAL: &str = "medhanit_fallback_records_total";

/// Total interstitials shown by the ad sequencer.
pub const INTERSTITIALS_TOTAL: &str = "medhanit_interstitials_shown_total";
