//! Pagination composer and coercion of untrusted numeric query parameters
//!
//! Malformed numbers are never errors: they fall back to the documented
//! defaults, and every coerced value is non-negative.

use tracing::debug;

use crate::data::CoreError;
use crate::traits::CypherQuery;

pub const GRAPH_DEFAULT_LIMIT: u64 = 200;
pub const POEM_DEFAULT_LIMIT: u64 = 50;
pub const DEFAULT_SKIP: u64 = 0;
pub const DEFAULT_DEPTH: u32 = 1;
pub const RAW_DEFAULT_LIMIT: u64 = 20;
pub const RAW_MAX_LIMIT: u64 = 200;

/// Largest window bound that still binds as a signed 64-bit Cypher integer.
const MAX_BOUND: u64 = i64::MAX as u64;

/// An offset/limit window, already coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(skip: u64, limit: u64) -> Self {
        Self {
            skip: skip.min(MAX_BOUND),
            limit: limit.min(MAX_BOUND),
        }
    }

    pub fn coerce(limit: Option<&str>, skip: Option<&str>, default_limit: u64) -> Self {
        Self::new(
            coerce_count(skip, DEFAULT_SKIP),
            coerce_count(limit, default_limit),
        )
    }

    /// Window for the knowledge graph endpoint.
    pub fn for_graph(limit: Option<&str>, skip: Option<&str>) -> Self {
        Self::coerce(limit, skip, GRAPH_DEFAULT_LIMIT)
    }

    /// Window for the poem listing.
    pub fn for_poems(limit: Option<&str>, skip: Option<&str>) -> Self {
        Self::coerce(limit, skip, POEM_DEFAULT_LIMIT)
    }
}

/// Parses a non-negative count, flooring fractions.
///
/// Missing, blank, non-numeric, non-finite and negative input yield `default`.
pub fn coerce_count(raw: Option<&str>, default: u64) -> u64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => {
            // float-to-int casts saturate
            (value.floor() as u64).min(MAX_BOUND)
        }
        _ => {
            debug!("Ignoring non-numeric or negative count parameter {:?}", raw);
            default
        }
    }
}

/// Parses an integer the way a lenient form field would: `"3.9"` is 3.
fn parse_integer(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

/// Hop depth for node-centered queries: positive, at most `max_depth`.
pub fn coerce_depth(raw: Option<&str>, max_depth: u32) -> u32 {
    let max_depth = max_depth.max(1);
    match parse_integer(raw) {
        Some(depth) if depth >= 1 => {
            if depth > i64::from(max_depth) {
                debug!("Clamping depth {} to {}", depth, max_depth);
            }
            depth.min(i64::from(max_depth)) as u32
        }
        _ => DEFAULT_DEPTH,
    }
}

/// Result cap for node-centered queries; zero counts as missing.
pub fn coerce_node_limit(raw: Option<&str>) -> u64 {
    match coerce_count(raw, GRAPH_DEFAULT_LIMIT) {
        0 => GRAPH_DEFAULT_LIMIT,
        limit => limit,
    }
}

/// Parses the target of a node-centered request.
///
/// Unlike the numeric options this is strict: the whole string must be an
/// integer, so `"12x"` and `"1.5"` are rejected.
pub fn parse_node_id(raw: &str) -> Result<i64, CoreError> {
    raw.parse::<i64>().map_err(|_| {
        debug!("Rejecting non-numeric node id {:?}", raw);
        CoreError::InvalidInput("Invalid nodeId".to_string())
    })
}

/// Limit of the diagnostic poem listing, clamped to `1..=200`.
pub fn coerce_raw_limit(raw: Option<&str>) -> u64 {
    match parse_integer(raw) {
        None | Some(0) => RAW_DEFAULT_LIMIT,
        Some(limit) => limit.clamp(1, RAW_MAX_LIMIT as i64) as u64,
    }
}

impl CypherQuery {
    /// Bounds the query to `page`.
    ///
    /// The `SKIP`/`LIMIT` clause is appended once; paginating an already
    /// paginated query only rebinds the window parameters. Ordering is left to
    /// the base query.
    pub fn paginate(mut self, page: Page) -> Self {
        if !self.paginated {
            self.text.push_str(" SKIP $skip LIMIT $limit");
            self.paginated = true;
        }
        self.param("skip", page.skip).param("limit", page.limit)
    }
}
