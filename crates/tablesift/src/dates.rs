//! Relative-date buckets for date-preset columns.
//!
//! A [`DateWindow`] is anchored at an evaluation instant and answers which
//! [`DatePreset`] buckets a value falls into. The buckets are not mutually
//! exclusive: `today` and `this_week` routinely overlap, and `7plus_days`
//! is disjoint from `today` only because of the arithmetic.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::value::Value;

const DAY_MS: i64 = 86_400_000;

/// Largest distance from the epoch a date may have: 100 million days.
const MAX_MS: i64 = 8_640_000_000_000_000;

/// A named relative-date bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatePreset {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "this_week")]
    ThisWeek,
    #[serde(rename = "7plus_days")]
    SevenPlusDays,
    /// No date, or a value that does not parse as one.
    #[serde(rename = "never")]
    Never,
}

impl DatePreset {
    pub const ALL: [DatePreset; 4] = [
        DatePreset::Today,
        DatePreset::ThisWeek,
        DatePreset::SevenPlusDays,
        DatePreset::Never,
    ];

    /// Returns the persisted key of this preset.
    pub fn as_str(self) -> &'static str {
        match self {
            DatePreset::Today => "today",
            DatePreset::ThisWeek => "this_week",
            DatePreset::SevenPlusDays => "7plus_days",
            DatePreset::Never => "never",
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            DatePreset::Today => "Today",
            DatePreset::ThisWeek => "This week",
            DatePreset::SevenPlusDays => "7+ days ago",
            DatePreset::Never => "Never",
        }
    }
}

impl fmt::Display for DatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatePreset {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatePreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| TableError::UnknownPreset(s.to_string()))
    }
}

/// The buckets a single value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buckets {
    pub today: bool,
    pub this_week: bool,
    pub seven_plus_days: bool,
    pub never: bool,
}

impl Buckets {
    pub fn contains(self, preset: DatePreset) -> bool {
        match preset {
            DatePreset::Today => self.today,
            DatePreset::ThisWeek => self.this_week,
            DatePreset::SevenPlusDays => self.seven_plus_days,
            DatePreset::Never => self.never,
        }
    }

    /// Iterates the presets this value satisfies.
    pub fn iter(self) -> impl Iterator<Item = DatePreset> {
        DatePreset::ALL
            .into_iter()
            .filter(move |preset| self.contains(*preset))
    }
}

/// Reference points for bucketing, computed once per evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    offset: FixedOffset,
    now_ms: i64,
    today_start_ms: i64,
    week_start_ms: i64,
}

impl DateWindow {
    /// Anchors the window at `now`. Weeks begin on Sunday.
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        let offset = *now.offset();
        let today = now.date_naive();
        let week_start = today - TimeDelta::days(i64::from(now.weekday().num_days_from_sunday()));

        DateWindow {
            offset,
            now_ms: now.timestamp_millis(),
            today_start_ms: start_of_day(today, offset),
            week_start_ms: start_of_day(week_start, offset),
        }
    }

    /// Interprets a value as milliseconds since epoch.
    ///
    /// Accepts timestamps, numbers (ms since epoch) and RFC 3339, naive
    /// date-time or plain date strings. Strings without an offset are read
    /// in the window's offset.
    pub fn parse(&self, value: &Value<'_>) -> Option<i64> {
        let ms = match value {
            Value::Timestamp(ts) => ts.as_millis(),
            Value::Number(n) => {
                let ms = n.to_f64();
                if !ms.is_finite() || ms.abs() > MAX_MS as f64 {
                    return None;
                }
                ms as i64
            }
            Value::String(s) => self.parse_str(s.trim())?,
            Value::Bool(_) | Value::None => return None,
        };
        in_range(ms).then_some(ms)
    }

    fn parse_str(&self, s: &str) -> Option<i64> {
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.timestamp_millis());
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Some(local_millis(naive, self.offset));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|date| start_of_day(date, self.offset))
    }

    /// Computes every bucket the value satisfies.
    pub fn buckets(&self, value: &Value<'_>) -> Buckets {
        let Some(ms) = self.parse(value) else {
            return Buckets {
                never: true,
                ..Buckets::default()
            };
        };

        let Some(age_ms) = self.now_ms.checked_sub(ms) else {
            return Buckets {
                never: true,
                ..Buckets::default()
            };
        };
        let age_days = age_ms.div_euclid(DAY_MS);
        Buckets {
            today: age_days == 0 || ms >= self.today_start_ms,
            this_week: ms >= self.week_start_ms,
            seven_plus_days: age_days >= 7,
            never: false,
        }
    }

    /// Returns `true` if the value falls into any selected preset.
    pub fn matches(&self, value: &Value<'_>, selected: &BTreeSet<DatePreset>) -> bool {
        let buckets = self.buckets(value);
        selected.iter().any(|preset| buckets.contains(*preset))
    }
}

fn in_range(ms: i64) -> bool {
    (-MAX_MS..=MAX_MS).contains(&ms) && DateTime::from_timestamp_millis(ms).is_some()
}

fn local_millis(naive: NaiveDateTime, offset: FixedOffset) -> i64 {
    let utc = naive - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    utc.and_utc().timestamp_millis()
}

fn start_of_day(date: NaiveDate, offset: FixedOffset) -> i64 {
    local_millis(date.and_time(NaiveTime::MIN), offset)
}
