//! Microsecond-precision timestamp type
//!
//! Every derived "modified at" field holds one of these. Timestamps are
//! stored as microseconds since Unix epoch (1970-01-01 00:00:00 UTC), which
//! keeps them `Copy`, totally ordered and cheap to compare in window checks.
//!
//! ## Usage
//!
//! Never expose raw arithmetic. Use explicit constructors:
//!
//! ```
//! use modstamp_core::Timestamp;
//!
//! let now = Timestamp::now();
//! let from_secs = Timestamp::from_secs(1000);
//! let from_micros = Timestamp::from_micros(1_000_000_000);
//! assert!(from_secs < from_micros);
//! assert!(now > from_micros);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Microsecond-precision timestamp
///
/// ## Invariants
///
/// - Timestamps are always non-negative (u64)
/// - Timestamps are always in microseconds
/// - The zero timestamp represents Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Maximum representable timestamp
    pub const MAX: Timestamp = Timestamp(u64::MAX);

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a timestamp for the current moment
    ///
    /// Returns epoch if the system clock is before Unix epoch.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(duration.as_micros() as u64)
    }

    /// Create a timestamp from microseconds since epoch
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Create a timestamp from milliseconds since epoch
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis.saturating_mul(1_000))
    }

    /// Create a timestamp from seconds since epoch
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1_000_000))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get microseconds since Unix epoch
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Get milliseconds since Unix epoch (truncates)
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000
    }

    /// Get seconds since Unix epoch (truncates)
    #[inline]
    pub const fn as_secs(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Convert to a UTC `DateTime`
    ///
    /// Timestamps beyond chrono's representable range clamp to its maximum.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        i64::try_from(self.0)
            .ok()
            .and_then(|micros| Utc.timestamp_micros(micros).single())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Format as RFC 3339 with microsecond precision
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime()
            .to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
    }

    // =========================================================================
    // Duration Operations
    // =========================================================================

    /// Compute duration since an earlier timestamp
    ///
    /// Returns `None` if `earlier` is actually later than `self`.
    pub fn duration_since(&self, earlier: Timestamp) -> Option<Duration> {
        if self.0 >= earlier.0 {
            Some(Duration::from_micros(self.0 - earlier.0))
        } else {
            None
        }
    }

    /// Add a duration to this timestamp, saturating at `Timestamp::MAX`
    pub fn saturating_add(&self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_add(duration.as_micros() as u64))
    }

    /// Check if this timestamp falls inside `[start, end]`
    #[inline]
    pub fn is_within(&self, start: Timestamp, end: Timestamp) -> bool {
        start.0 <= self.0 && self.0 <= end.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::EPOCH
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

// ============================================================================
// From Implementations
// ============================================================================

impl From<u64> for Timestamp {
    /// Create from raw microseconds
    fn from(micros: u64) -> Self {
        Timestamp::from_micros(micros)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    /// Instants before the epoch clamp to `Timestamp::EPOCH`
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp(u64::try_from(dt.timestamp_micros()).unwrap_or(0))
    }
}

// ============================================================================
// Tests
// ============================================================================
