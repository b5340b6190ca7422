//! Availability windows.
//!
//! Every node carries a window of two endpoints, each either a literal
//! timestamp or the wildcard `*`. Wildcards resolve to "now plus or
//! minus a small tolerance" freshly on every check, so an all-wildcard
//! window is the "always open" sentinel. Endpoints are stored as raw
//! strings: a malformed literal is tolerated at load time but makes the
//! node unconditionally unavailable when evaluated (fails closed).

use burrow_types::{Error, Result, TIMESTAMP_FORMAT};
use chrono::{Duration, Local, NaiveDateTime};

/// Wildcard endpoint meaning "no bound on this side".
pub const WILDCARD: &str = "*";

/// Slack applied when a wildcard endpoint is resolved against the clock.
const WILDCARD_TOLERANCE_MINUTES: i64 = 10;

/// Parse a literal timestamp in the canonical format.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| Error::InvalidTimestamp(raw.to_string()))
}

/// The current wall-clock time, in the local timezone.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// The time range during which a node may be traversed or read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub start: String,
    pub end: String,
}

impl Window {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self { start: start.into(), end: end.into() }
    }

    /// The "always open" sentinel: both endpoints wildcard.
    pub fn always() -> Self {
        Self::new(WILDCARD, WILDCARD)
    }

    pub fn is_always(&self) -> bool {
        self.start == WILDCARD && self.end == WILDCARD
    }

    /// Whether the window admits the current moment.
    ///
    /// Wildcards are re-resolved on every call; literal endpoints that
    /// fail to parse make the window closed.
    pub fn is_open(&self) -> bool {
        let now = now();
        let tolerance = Duration::minutes(WILDCARD_TOLERANCE_MINUTES);
        let Some(start) = resolve_endpoint(&self.start, now - tolerance) else {
            return false;
        };
        let Some(end) = resolve_endpoint(&self.end, now + tolerance) else {
            return false;
        };
        start <= now && now <= end
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::always()
    }
}

fn resolve_endpoint(raw: &str, wildcard_value: NaiveDateTime) -> Option<NaiveDateTime> {
    if raw == WILDCARD {
        return Some(wildcard_value);
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
}
