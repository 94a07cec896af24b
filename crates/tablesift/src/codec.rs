//! State codec: live filter/sort state to and from a flat JSON blob.
//!
//! This is the only place that knows persistence exists. Live filter values
//! hold sets; the stored form holds arrays. Decoding never fails: corrupt
//! input yields an empty snapshot, and individual malformed filter entries
//! are dropped while the rest are kept.
//!
//! Wire format:
//!
//! ```text
//! {
//!   "filters": [["status", {"type": "enum", "selected": ["open"]}],
//!               ["amount", {"type": "range", "min": 1000}]],
//!   "sortConfig": {"columnId": "amount", "direction": "desc"}
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::dates::DatePreset;
use crate::filter::{FilterValue, Presence};
use crate::ordering::SortConfig;

/// Serialized form of a [`FilterValue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum StoredFilter {
    Text {
        query: String,
    },
    Enum {
        selected: Vec<String>,
    },
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    DatePreset {
        selected: Vec<DatePreset>,
    },
    Boolean {
        value: Presence,
    },
}

impl From<&FilterValue> for StoredFilter {
    fn from(filter: &FilterValue) -> Self {
        match filter {
            FilterValue::Text { query } => StoredFilter::Text {
                query: query.clone(),
            },
            FilterValue::Enum { selected } => StoredFilter::Enum {
                selected: selected.iter().cloned().collect(),
            },
            FilterValue::Range { min, max } => StoredFilter::Range {
                min: *min,
                max: *max,
            },
            FilterValue::DatePreset { selected } => StoredFilter::DatePreset {
                selected: selected.iter().copied().collect(),
            },
            FilterValue::Boolean { value } => StoredFilter::Boolean { value: *value },
        }
    }
}

impl From<StoredFilter> for FilterValue {
    fn from(stored: StoredFilter) -> Self {
        match stored {
            StoredFilter::Text { query } => FilterValue::Text { query },
            StoredFilter::Enum { selected } => FilterValue::one_of(selected),
            StoredFilter::Range { min, max } => FilterValue::Range { min, max },
            StoredFilter::DatePreset { selected } => FilterValue::presets(selected),
            StoredFilter::Boolean { value } => FilterValue::Boolean { value },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    filters: Vec<(String, StoredFilter)>,
    sort_config: Option<SortConfig>,
}

/// A point-in-time copy of the engine's filters and sort.
///
/// Filters keep the order they were given in; the engine supplies them in
/// schema order so encoding is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub filters: Vec<(String, FilterValue)>,
    pub sort: Option<SortConfig>,
}

impl Snapshot {
    /// Encodes the snapshot as a JSON string.
    pub fn encode(&self) -> serde_json::Result<String> {
        let state = PersistedState {
            filters: self
                .filters
                .iter()
                .map(|(id, filter)| (id.clone(), StoredFilter::from(filter)))
                .collect(),
            sort_config: self.sort.clone(),
        };
        serde_json::to_string(&state)
    }

    /// Decodes a blob, recovering as much as possible.
    pub fn decode(blob: &str) -> Snapshot {
        let root: serde_json::Value = match serde_json::from_str(blob) {
            Ok(root) => root,
            Err(e) => {
                tracing::debug!(error = %e, "discarding unreadable persisted state");
                return Snapshot::default();
            }
        };

        let filters = match root.get("filters") {
            Some(serde_json::Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| {
                    match serde_json::from_value::<(String, StoredFilter)>(entry.clone()) {
                        Ok((id, stored)) => Some((id, FilterValue::from(stored))),
                        Err(e) => {
                            tracing::debug!(%entry, error = %e, "dropping malformed filter entry");
                            None
                        }
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        let sort = root
            .get("sortConfig")
            .filter(|value| !value.is_null())
            .and_then(|value| match serde_json::from_value::<SortConfig>(value.clone()) {
                Ok(sort) => Some(sort),
                Err(e) => {
                    tracing::debug!(error = %e, "dropping malformed sort config");
                    None
                }
            });

        Snapshot { filters, sort }
    }
}
