//! Filter value model: what is currently filtered on one column.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::FilterKind;
use crate::dates::DatePreset;

/// Whether a boolean filter keeps records that have or lack a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Has,
    Lacks,
}

impl Presence {
    pub fn as_str(self) -> &'static str {
        match self {
            Presence::Has => "has",
            Presence::Lacks => "lacks",
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active constraint on one column, tagged by filter kind.
///
/// Neutral values (empty query, empty selection, no bounds) are never stored
/// by the engine; absence of an entry means "no filter".
///
/// ```
/// use tablesift::{FilterValue, FilterKind};
///
/// let status = FilterValue::one_of(["open"]);
/// assert_eq!(status.kind(), FilterKind::Enum);
///
/// assert!(FilterValue::range(None, None).is_neutral());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Case-insensitive substring query.
    Text { query: String },
    /// Accepted enum option values.
    Enum { selected: BTreeSet<String> },
    /// Inclusive bounds; currency columns use minor units.
    Range { min: Option<f64>, max: Option<f64> },
    /// Accepted date buckets, combined with OR.
    DatePreset { selected: BTreeSet<DatePreset> },
    Boolean { value: Presence },
}

impl FilterValue {
    pub fn text(query: impl Into<String>) -> Self {
        FilterValue::Text {
            query: query.into(),
        }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::Enum {
            selected: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        FilterValue::Range { min, max }
    }

    pub fn at_least(min: f64) -> Self {
        FilterValue::range(Some(min), None)
    }

    pub fn at_most(max: f64) -> Self {
        FilterValue::range(None, Some(max))
    }

    pub fn presets(presets: impl IntoIterator<Item = DatePreset>) -> Self {
        FilterValue::DatePreset {
            selected: presets.into_iter().collect(),
        }
    }

    pub fn has() -> Self {
        FilterValue::Boolean {
            value: Presence::Has,
        }
    }

    pub fn lacks() -> Self {
        FilterValue::Boolean {
            value: Presence::Lacks,
        }
    }

    /// Returns the filter kind this value belongs to.
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Text { .. } => FilterKind::Text,
            FilterValue::Enum { .. } => FilterKind::Enum,
            FilterValue::Range { .. } => FilterKind::Range,
            FilterValue::DatePreset { .. } => FilterKind::DatePreset,
            FilterValue::Boolean { .. } => FilterKind::Boolean,
        }
    }

    /// Returns `true` if this value constrains nothing.
    pub fn is_neutral(&self) -> bool {
        match self {
            FilterValue::Text { query } => query.is_empty(),
            FilterValue::Enum { selected } => selected.is_empty(),
            FilterValue::Range { min, max } => min.is_none() && max.is_none(),
            FilterValue::DatePreset { selected } => selected.is_empty(),
            FilterValue::Boolean { .. } => false,
        }
    }
}
