//! Runtime value types returned by column accessors.
//!
//! The [`Value`] enum is what a column accessor hands back for a record. It
//! is the single input to filtering, sorting and facet counting, so every
//! rule about stringification and truthiness lives here.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat};

/// Value extracted from a record by a column accessor.
///
/// Strings may borrow from the record or be computed on the fly.
///
/// # Example
///
/// ```
/// use tablesift::{Value, Number};
///
/// struct Deal {
///     name: String,
///     amount_cents: i64,
/// }
///
/// fn name(deal: &Deal) -> Value<'_> {
///     Value::from(deal.name.as_str())
/// }
///
/// fn amount(deal: &Deal) -> Value<'_> {
///     Value::Number(Number::I64(deal.amount_cents))
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value, borrowed or owned.
    String(Cow<'a, str>),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// Field not present or null.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerces the value to a boolean.
    ///
    /// Falsy values are `None`, `false`, zero, NaN and the empty string.
    /// Everything else, timestamps included, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Number(n) => {
                let f = n.to_f64();
                f != 0.0 && !f.is_nan()
            }
            Value::String(s) => !s.is_empty(),
            Value::Timestamp(_) => true,
        }
    }

    /// Renders the value as the string used for text matching and enum
    /// membership. `None` renders as the empty string.
    pub fn to_key(&self) -> String {
        match self {
            Value::None => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Timestamp(t) => write!(f, "{}", t),
            Value::Bool(b) => write!(f, "{}", b),
            Value::None => Ok(()),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(Cow::Borrowed(s))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::String(Cow::Owned(s))
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value<'_> {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Timestamp> for Value<'_> {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl From<i64> for Value<'_> {
    fn from(n: i64) -> Self {
        Value::Number(Number::I64(n))
    }
}

impl From<i32> for Value<'_> {
    fn from(n: i32) -> Self {
        Value::Number(Number::I64(n as i64))
    }
}

impl From<u64> for Value<'_> {
    fn from(n: u64) -> Self {
        Value::Number(Number::U64(n))
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Number(Number::F64(n))
    }
}

impl<'a, V> From<Option<V>> for Value<'a>
where
    V: Into<Value<'a>>,
{
    fn from(opt: Option<V>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision.
/// Comparisons between different variants go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) if n.is_nan() => f.write_str("NaN"),
            Number::F64(n) if n.is_infinite() => {
                f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // Integral floats print without a trailing ".0".
            Number::F64(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{:.0}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// Accessors for natively typed dates return this rather than a string, so
/// date-preset filtering can skip parsing.
///
/// ```
/// use tablesift::Timestamp;
///
/// assert!(Timestamp(1000) < Timestamp(2000));
/// assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Timestamp(dt.timestamp_millis())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp_millis(self.0) {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_extractors() {
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::from(42i64).as_number(), Some(Number::I64(42)));
        assert_eq!(
            Value::Timestamp(Timestamp(1000)).as_timestamp(),
            Some(Timestamp(1000))
        );
        assert_eq!(Value::Bool(true).as_bool(), Some(true));

        assert_eq!(Value::from("test").as_number(), None);
        assert_eq!(Value::from(1i64).as_str(), None);
    }

    #[test]
    fn option_conversion() {
        let missing: Option<&str> = None;
        assert!(Value::from(missing).is_none());
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::from(0i64).is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());

        assert!(Value::Bool(true).is_truthy());
        assert!(Value::from(-1i64).is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::Timestamp(Timestamp(0)).is_truthy());
    }

    #[test]
    fn keys() {
        assert_eq!(Value::None.to_key(), "");
        assert_eq!(Value::from("open").to_key(), "open");
        assert_eq!(Value::from(3000i64).to_key(), "3000");
        assert_eq!(Value::from(3.0f64).to_key(), "3");
        assert_eq!(Value::from(2.5f64).to_key(), "2.5");
        assert_eq!(Value::Bool(false).to_key(), "false");
        assert_eq!(
            Value::Timestamp(Timestamp(0)).to_key(),
            "1970-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn number_display() {
        assert_eq!(Number::F64(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Number::F64(-0.25).to_string(), "-0.25");
        assert_eq!(Number::U64(7).to_string(), "7");
    }
}
