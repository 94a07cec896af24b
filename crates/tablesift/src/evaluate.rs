//! Filter evaluation: does one record satisfy one column's filter.
//!
//! Evaluation is pure and per column. A record passes a set of filters when
//! it passes each of them; no column's result depends on another's.

use crate::column::Column;
use crate::dates::DateWindow;
use crate::filter::{FilterValue, Presence};
use crate::value::Value;

/// Evaluates filter values against accessor results.
///
/// Holds the [`DateWindow`] so date presets are bucketed against a single
/// instant for a whole pass.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    window: DateWindow,
}

impl Evaluator {
    pub fn new(window: DateWindow) -> Self {
        Evaluator { window }
    }

    /// Tests a record against a column's filter.
    pub fn matches<T>(&self, record: &T, column: &Column<T>, filter: &FilterValue) -> bool {
        self.matches_value(&column.value(record), filter)
    }

    /// Tests an accessor result against a filter.
    pub fn matches_value(&self, value: &Value<'_>, filter: &FilterValue) -> bool {
        match filter {
            FilterValue::Text { query } => match_text(value, query),
            FilterValue::Enum { selected } => selected.contains(&value.to_key()),
            FilterValue::Range { min, max } => match_range(value, *min, *max),
            FilterValue::DatePreset { selected } => self.window.matches(value, selected),
            FilterValue::Boolean { value: presence } => {
                value.is_truthy() == (*presence == Presence::Has)
            }
        }
    }
}

fn match_text(value: &Value<'_>, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    value
        .to_key()
        .to_lowercase()
        .contains(&query.to_lowercase())
}

fn match_range(value: &Value<'_>, min: Option<f64>, max: Option<f64>) -> bool {
    let Some(n) = value.as_number() else {
        return false;
    };
    let n = n.to_f64();
    min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::dates::DatePreset;

    fn evaluator() -> Evaluator {
        Evaluator::new(DateWindow::new(
            DateTime::parse_from_rfc3339("2024-05-15T12:00:00Z").unwrap(),
        ))
    }

    #[test]
    fn text_is_case_insensitive_substring() {
        let e = evaluator();
        let filter = FilterValue::text("ACME");
        assert!(e.matches_value(&Value::from("Acme Capital"), &filter));
        assert!(e.matches_value(&Value::from("the acme co"), &filter));
        assert!(!e.matches_value(&Value::from("Apex"), &filter));
        assert!(!e.matches_value(&Value::None, &filter));
    }

    #[test]
    fn text_matches_stringified_numbers() {
        let e = evaluator();
        assert!(e.matches_value(&Value::from(31500i64), &FilterValue::text("315")));
    }

    #[test]
    fn empty_text_matches_everything() {
        let e = evaluator();
        assert!(e.matches_value(&Value::None, &FilterValue::text("")));
    }

    #[test]
    fn whitespace_query_is_a_substring() {
        let e = evaluator();
        let filter = FilterValue::text(" ");
        assert!(e.matches_value(&Value::from("Acme Capital"), &filter));
        assert!(!e.matches_value(&Value::from("Acme"), &filter));
    }

    #[test]
    fn enum_membership() {
        let e = evaluator();
        let filter = FilterValue::one_of(["open", "won"]);
        assert!(e.matches_value(&Value::from("open"), &filter));
        assert!(!e.matches_value(&Value::from("Open"), &filter));
        assert!(!e.matches_value(&Value::None, &filter));
    }

    #[test]
    fn enum_membership_of_empty_key() {
        let e = evaluator();
        assert!(e.matches_value(&Value::None, &FilterValue::one_of([""])));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let e = evaluator();
        let filter = FilterValue::range(Some(1000.0), Some(3000.0));
        assert!(e.matches_value(&Value::from(1000i64), &filter));
        assert!(e.matches_value(&Value::from(3000i64), &filter));
        assert!(!e.matches_value(&Value::from(999i64), &filter));
        assert!(!e.matches_value(&Value::from(3000.5f64), &filter));
    }

    #[test]
    fn range_open_sides() {
        let e = evaluator();
        assert!(e.matches_value(&Value::from(i64::MAX), &FilterValue::at_least(0.0)));
        assert!(e.matches_value(&Value::from(-5i64), &FilterValue::at_most(0.0)));
    }

    #[test]
    fn range_requires_a_number() {
        let e = evaluator();
        let filter = FilterValue::at_least(0.0);
        assert!(!e.matches_value(&Value::from("5"), &filter));
        assert!(!e.matches_value(&Value::None, &filter));
        assert!(!e.matches_value(&Value::from(f64::NAN), &filter));
    }

    #[test]
    fn boolean_presence() {
        let e = evaluator();
        let has = FilterValue::has();
        let lacks = FilterValue::lacks();

        for truthy in [Value::Bool(true), Value::from("x"), Value::from(1i64)] {
            assert!(e.matches_value(&truthy, &has));
            assert!(!e.matches_value(&truthy, &lacks));
        }
        for falsy in [
            Value::None,
            Value::Bool(false),
            Value::from(""),
            Value::from(0i64),
            Value::from(f64::NAN),
        ] {
            assert!(!e.matches_value(&falsy, &has));
            assert!(e.matches_value(&falsy, &lacks));
        }
    }

    #[test]
    fn date_presets_use_window() {
        let e = evaluator();
        let stale = FilterValue::presets([DatePreset::SevenPlusDays]);
        assert!(e.matches_value(&Value::from("2024-05-06T12:00:00Z"), &stale));
        assert!(!e.matches_value(&Value::None, &stale));
    }
}
