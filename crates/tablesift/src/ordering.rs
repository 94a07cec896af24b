//! Ordering types and the record comparator.
//!
//! Provides [`Dir`] for sort direction, [`SortConfig`] for the single active
//! sort, and [`compare_records`] which applies a column's sort accessor.

use std::cmp::Ordering;

use deunicode::deunicode;
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The active sort: one column and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    pub column_id: String,
    pub direction: Dir,
}

impl SortConfig {
    pub fn new(column_id: impl Into<String>, direction: Dir) -> Self {
        SortConfig {
            column_id: column_id.into(),
            direction,
        }
    }

    pub fn asc(column_id: impl Into<String>) -> Self {
        SortConfig::new(column_id, Dir::Asc)
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        SortConfig::new(column_id, Dir::Desc)
    }
}

/// Compares two records by a column's sort value.
///
/// Records whose sort value is `None` go after every record with a value,
/// in both directions.
pub fn compare_records<T>(a: &T, b: &T, column: &Column<T>, dir: Dir) -> Ordering {
    let val_a = column.sort_value(a);
    let val_b = column.sort_value(b);

    match (val_a.is_none(), val_b.is_none()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => dir.apply(compare_values(&val_a, &val_b)),
    }
}

/// Compares two present values in ascending order.
///
/// Strings compare case-insensitively with accents folded first; numbers
/// compare numerically (NaN ties); any other pairing compares the
/// stringified forms.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => compare_text(a, b),
        (Value::Number(a), Value::Number(b)) => a.compare(*b).unwrap_or(Ordering::Equal),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        _ => compare_text(&a.to_key(), &b.to_key()),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let (lower_a, lower_b) = (a.to_lowercase(), b.to_lowercase());
    deunicode(&lower_a)
        .cmp(&deunicode(&lower_b))
        .then_with(|| lower_a.cmp(&lower_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Timestamp};

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn dir_display() {
        assert_eq!(Dir::Asc.to_string(), "asc");
        assert_eq!(Dir::Desc.to_string(), "desc");
    }

    #[test]
    fn strings_ignore_case() {
        let a = Value::from("apple");
        let b = Value::from("Banana");
        assert_eq!(compare_values(&a, &b), Ordering::Less);
        assert_eq!(
            compare_values(&Value::from("ACME"), &Value::from("acme")),
            Ordering::Equal
        );
    }

    #[test]
    fn accents_sort_next_to_base_letter() {
        let e = Value::from("eclair");
        let e_acute = Value::from("Éclair");
        let f = Value::from("fig");
        assert_eq!(compare_values(&e, &e_acute), Ordering::Less);
        assert_eq!(compare_values(&e_acute, &f), Ordering::Less);
    }

    #[test]
    fn numbers_compare_numerically() {
        let a = Value::Number(Number::I64(9));
        let b = Value::Number(Number::F64(10.5));
        assert_eq!(compare_values(&a, &b), Ordering::Less);
        assert_eq!(
            compare_values(&Value::from(f64::NAN), &Value::from(1i64)),
            Ordering::Equal
        );
    }

    #[test]
    fn timestamps_compare_chronologically() {
        assert_eq!(
            compare_values(&Value::Timestamp(Timestamp(1)), &Value::Timestamp(Timestamp(2))),
            Ordering::Less
        );
    }

    #[test]
    fn mixed_types_compare_as_strings() {
        // "10" < "9" as text
        assert_eq!(
            compare_values(&Value::from(10i64), &Value::from("9")),
            Ordering::Less
        );
    }

    #[test]
    fn none_sorts_last_in_both_directions() {
        struct Row(Option<i64>);
        let column = Column::range("n", "N", |r: &Row| Value::from(r.0));
        let some = Row(Some(1));
        let none = Row(None);

        for dir in [Dir::Asc, Dir::Desc] {
            assert_eq!(compare_records(&none, &some, &column, dir), Ordering::Greater);
            assert_eq!(compare_records(&some, &none, &column, dir), Ordering::Less);
            assert_eq!(compare_records(&none, &none, &column, dir), Ordering::Equal);
        }
    }

    #[test]
    fn sort_config_serializes_camel_case() {
        let json = serde_json::to_string(&SortConfig::desc("amount")).unwrap();
        assert_eq!(json, r#"{"columnId":"amount","direction":"desc"}"#);
    }
}
