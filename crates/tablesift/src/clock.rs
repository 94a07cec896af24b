//! Clock abstraction for date-preset evaluation.
//!
//! Date buckets are relative to "now"; injecting the clock keeps filtering
//! and facet counts reproducible in tests.

use chrono::{DateTime, FixedOffset, Local};

/// Source of the evaluation instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant. Its offset defines calendar days.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Real clock in the local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parses an RFC 3339 instant.
    pub fn parse(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
