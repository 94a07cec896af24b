//! YAML column schema for JSON records.
//!
//! Each column names a JSON pointer into the record. A bare name is read as
//! a top-level key, so `status` and `/status` are the same field.
//!
//! ```yaml
//! columns:
//!   - id: status
//!     label: Status
//!     kind: enum
//!     options:
//!       - { value: open, label: Open }
//!       - { value: closed, label: Closed }
//!   - id: amount
//!     label: Amount
//!     kind: range
//!     field: /deal/amount_cents
//!     format: currency
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value as Json;
use tablesift::{Column, DatePreset, FilterKind, FilterOption, NumberFormat, Number, Schema, Value};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub kind: FilterKind,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub sort_field: Option<String>,
    #[serde(default)]
    pub options: Vec<FilterOption>,
    #[serde(default)]
    pub presets: Option<Vec<FilterOption<DatePreset>>>,
    #[serde(default)]
    pub format: NumberFormat,
    #[serde(default)]
    pub labels: Option<LabelsConfig>,
    #[serde(default = "enabled")]
    pub sortable: bool,
    #[serde(default = "enabled")]
    pub filterable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelsConfig {
    pub has: String,
    pub lacks: String,
}

fn enabled() -> bool {
    true
}

impl SchemaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading schema {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing schema {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Builds the engine schema, one pointer accessor per column.
    pub fn build(self) -> Result<Schema<Json>> {
        let columns = self
            .columns
            .into_iter()
            .map(ColumnConfig::build)
            .collect::<Vec<_>>();
        Ok(Schema::new(columns)?)
    }
}

impl ColumnConfig {
    fn build(self) -> Column<Json> {
        let pointer = to_pointer(self.field.as_deref().unwrap_or(&self.id));
        let label = self.label.unwrap_or_else(|| self.id.clone());

        let mut column = Column::new(self.id, label, self.kind, move |record: &Json| {
            from_json(record.pointer(&pointer))
        });
        if self.kind == FilterKind::DatePreset {
            // Column::new starts without presets; mirror Column::date's defaults.
            let presets = self.presets.unwrap_or_else(|| {
                DatePreset::ALL
                    .iter()
                    .map(|preset| FilterOption::new(*preset, preset.default_label()))
                    .collect()
            });
            column = column.presets(presets.into_iter().map(|option| (option.value, option.label)));
        }
        if let Some(sort_field) = self.sort_field {
            let sort_pointer = to_pointer(&sort_field);
            column = column.sort_by(move |record: &Json| from_json(record.pointer(&sort_pointer)));
        }
        if let Some(labels) = self.labels {
            column = column.labels(labels.has, labels.lacks);
        }

        column
            .options(self.options.into_iter().map(|option| (option.value, option.label)))
            .format(self.format)
            .sortable(self.sortable)
            .filterable(self.filterable)
    }
}

fn to_pointer(field: &str) -> String {
    if field.starts_with('/') {
        field.to_string()
    } else {
        format!("/{}", field)
    }
}

/// Maps a JSON value onto an accessor result. Arrays and objects are
/// stringified.
pub fn from_json(value: Option<&Json>) -> Value<'_> {
    match value {
        None | Some(Json::Null) => Value::None,
        Some(Json::Bool(b)) => Value::Bool(*b),
        Some(Json::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Value::Number(Number::I64(i))
            } else if let Some(u) = n.as_u64() {
                Value::Number(Number::U64(u))
            } else {
                Value::Number(Number::F64(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        Some(Json::String(s)) => Value::from(s.as_str()),
        Some(other) => Value::from(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &str = r#"
columns:
  - id: company
  - id: status
    label: Status
    kind: enum
    options:
      - { value: open, label: Open }
      - { value: closed, label: Closed }
  - id: amount
    kind: range
    field: /deal/amount
    format: currency
  - id: touched
    kind: datePreset
    presets:
      - { value: never, label: Never touched }
  - id: deck
    kind: boolean
    labels: { has: Has deck, lacks: No deck }
"#;

    #[test]
    fn kind_is_required() {
        assert!(SchemaConfig::parse(SCHEMA).is_err());
    }

    #[test]
    fn builds_schema() {
        let raw = SCHEMA.replace("  - id: company\n", "  - id: company\n    kind: text\n");
        let schema = SchemaConfig::parse(&raw).unwrap().build().unwrap();

        assert_eq!(schema.len(), 5);
        let company = schema.column("company").unwrap();
        assert_eq!(company.label(), "company");

        let record = json!({"company": "Acme", "deal": {"amount": 1500}, "deck": null});
        assert_eq!(company.value(&record), Value::from("Acme"));
        assert_eq!(
            schema.column("amount").unwrap().value(&record),
            Value::Number(Number::I64(1500))
        );
        assert!(schema.column("deck").unwrap().value(&record).is_none());
        assert_eq!(schema.column("touched").unwrap().date_presets().len(), 1);
        assert_eq!(schema.column("deck").unwrap().boolean_labels().has, "Has deck");
    }

    #[test]
    fn enum_without_options_is_rejected() {
        let raw = "columns:\n  - id: stage\n    kind: enum\n";
        assert!(SchemaConfig::parse(raw).unwrap().build().is_err());
    }

    #[test]
    fn json_mapping() {
        assert!(from_json(None).is_none());
        assert_eq!(from_json(Some(&json!(true))), Value::Bool(true));
        assert_eq!(from_json(Some(&json!(2.5))), Value::Number(Number::F64(2.5)));
        assert_eq!(from_json(Some(&json!(["a"]))), Value::from("[\"a\"]"));
    }
}
