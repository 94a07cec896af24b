//! Human-readable summaries of active filters, for chip and badge rendering.

use serde::Serialize;

use crate::column::{Column, NumberFormat};
use crate::filter::{FilterValue, Presence};
use crate::value::Number;

/// Enum labels shown before collapsing the rest into "+N".
const MAX_LISTED: usize = 2;

/// One active filter, described for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
    pub column_id: String,
    pub label: String,
    pub description: String,
}

impl ActiveFilter {
    pub fn new<T>(column: &Column<T>, filter: &FilterValue) -> Self {
        ActiveFilter {
            column_id: column.id().to_string(),
            label: column.label().to_string(),
            description: describe(column, filter),
        }
    }
}

/// Renders a filter value the way a chip would show it.
///
/// - text: the query in double quotes
/// - enum: option labels in declared order, overflow collapsed to `+N`
/// - range: `≥ min`, `≤ max` or `min – max`
/// - date preset: preset labels in declared order
/// - boolean: the column's has/lacks label
pub fn describe<T>(column: &Column<T>, filter: &FilterValue) -> String {
    match filter {
        FilterValue::Text { query } => format!("\"{}\"", query),
        FilterValue::Enum { selected } => {
            let mut labels: Vec<&str> = column
                .enum_options()
                .iter()
                .filter(|option| selected.contains(&option.value))
                .map(|option| option.label.as_str())
                .collect();
            // Values that are not declared options still show, by raw value.
            labels.extend(
                selected
                    .iter()
                    .filter(|value| !column.enum_options().iter().any(|o| &o.value == *value))
                    .map(String::as_str),
            );
            list_with_overflow(&labels)
        }
        FilterValue::Range { min, max } => {
            let format = column.number_format();
            match (min, max) {
                (Some(min), Some(max)) => format!(
                    "{} – {}",
                    format_number(*min, format),
                    format_number(*max, format)
                ),
                (Some(min), None) => format!("≥ {}", format_number(*min, format)),
                (None, Some(max)) => format!("≤ {}", format_number(*max, format)),
                (None, None) => String::new(),
            }
        }
        FilterValue::DatePreset { selected } => column
            .date_presets()
            .iter()
            .filter(|option| selected.contains(&option.value))
            .map(|option| option.label.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        FilterValue::Boolean { value } => match value {
            Presence::Has => column.boolean_labels().has.clone(),
            Presence::Lacks => column.boolean_labels().lacks.clone(),
        },
    }
}

fn list_with_overflow(labels: &[&str]) -> String {
    if labels.len() <= MAX_LISTED {
        return labels.join(", ");
    }
    format!(
        "{} +{}",
        labels[..MAX_LISTED].join(", "),
        labels.len() - MAX_LISTED
    )
}

/// Formats a range bound for display.
///
/// Currency values are minor units; they render in major units with cents
/// only when non-zero.
pub fn format_number(value: f64, format: NumberFormat) -> String {
    match format {
        NumberFormat::Plain => group_decimal(&Number::F64(value).to_string()),
        NumberFormat::Currency => {
            let cents = value.round() as i64;
            let sign = if cents < 0 { "-" } else { "" };
            let cents = cents.unsigned_abs();
            let major = group_thousands(&(cents / 100).to_string());
            match cents % 100 {
                0 => format!("{}${}", sign, major),
                minor => format!("{}${}.{:02}", sign, major, minor),
            }
        }
    }
}

fn group_decimal(rendered: &str) -> String {
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered),
    };
    match unsigned.split_once('.') {
        Some((int, frac)) => format!("{}{}.{}", sign, group_thousands(int), frac),
        None => format!("{}{}", sign, group_thousands(unsigned)),
    }
}

fn group_thousands(digits: &str) -> String {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::DatePreset;
    use crate::value::Value;

    struct Row;

    fn none(_: &Row) -> Value<'_> {
        Value::None
    }

    #[test]
    fn text_is_quoted() {
        let column = Column::text("name", "Name", none);
        assert_eq!(describe(&column, &FilterValue::text("acme")), "\"acme\"");
    }

    #[test]
    fn enum_uses_labels_in_declared_order() {
        let column = Column::enumerated("stage", "Stage", none).options([
            ("lead", "Lead"),
            ("qualified", "Qualified"),
            ("won", "Won"),
            ("lost", "Lost"),
        ]);
        assert_eq!(
            describe(&column, &FilterValue::one_of(["won", "lead"])),
            "Lead, Won"
        );
        assert_eq!(
            describe(&column, &FilterValue::one_of(["won", "lead", "lost"])),
            "Lead, Won +1"
        );
    }

    #[test]
    fn enum_falls_back_to_raw_values() {
        let column = Column::enumerated("stage", "Stage", none).options([("lead", "Lead")]);
        assert_eq!(
            describe(&column, &FilterValue::one_of(["lead", "archived"])),
            "Lead, archived"
        );
    }

    #[test]
    fn plain_ranges() {
        let column = Column::range("employees", "Employees", none);
        assert_eq!(describe(&column, &FilterValue::at_least(1500.0)), "≥ 1,500");
        assert_eq!(describe(&column, &FilterValue::at_most(2.5)), "≤ 2.5");
        assert_eq!(
            describe(&column, &FilterValue::range(Some(10.0), Some(1234567.0))),
            "10 – 1,234,567"
        );
    }

    #[test]
    fn currency_ranges_render_major_units() {
        let column = Column::range("amount", "Amount", none).currency();
        assert_eq!(describe(&column, &FilterValue::at_least(100000.0)), "≥ $1,000");
        assert_eq!(
            describe(&column, &FilterValue::range(Some(1050.0), Some(250000.0))),
            "$10.50 – $2,500"
        );
        assert_eq!(format_number(-500.0, NumberFormat::Currency), "-$5");
    }

    #[test]
    fn presets_join_labels() {
        let column = Column::date("seen", "Last seen", none);
        let filter = FilterValue::presets([DatePreset::Never, DatePreset::Today]);
        assert_eq!(describe(&column, &filter), "Today, Never");
    }

    #[test]
    fn boolean_labels() {
        let column = Column::boolean("email", "Email", none).labels("Has email", "No email");
        assert_eq!(describe(&column, &FilterValue::has()), "Has email");
        assert_eq!(describe(&column, &FilterValue::lacks()), "No email");

        let default = Column::boolean("email", "Email", none);
        assert_eq!(describe(&default, &FilterValue::has()), "Yes");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_decimal("-1234567.25"), "-1,234,567.25");
    }
}
