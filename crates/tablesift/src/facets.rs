//! Facet counts over the unfiltered collection.
//!
//! Counts always look at every record, never at the filtered view, so a
//! count next to an option reads as "records with this value" regardless of
//! what else is filtered.

use std::collections::BTreeMap;

use crate::column::Column;
use crate::dates::{DatePreset, DateWindow};

/// Tallies the stringified accessor result of every record.
///
/// Records whose key is empty (missing values, empty strings) are skipped.
pub fn value_counts<T>(records: &[T], column: &Column<T>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        let key = column.value(record).to_key();
        if !key.is_empty() {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

/// Counts records per date bucket.
///
/// Every preset the column declares starts at zero. A record increments
/// each bucket it satisfies, so `today` and `this_week` overlap; records
/// without a parseable date increment only `never`.
pub fn preset_counts<T>(
    records: &[T],
    column: &Column<T>,
    window: &DateWindow,
) -> BTreeMap<DatePreset, usize> {
    let mut counts: BTreeMap<DatePreset, usize> = column
        .date_presets()
        .iter()
        .map(|option| (option.value, 0))
        .collect();

    for record in records {
        for preset in window.buckets(&column.value(record)).iter() {
            if let Some(count) = counts.get_mut(&preset) {
                *count += 1;
            }
        }
    }
    counts
}
