//! Column schema: the static declaration of queryable fields.
//!
//! A [`Column`] pairs an id and a display label with a [`FilterKind`] and an
//! accessor that pulls a [`Value`] out of a record. A [`Schema`] is an
//! ordered, id-indexed list of columns.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dates::DatePreset;
use crate::error::{Result, TableError};
use crate::value::Value;

/// The filter-type tag of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// Case-insensitive substring match.
    Text,
    /// Membership in a set of declared options.
    Enum,
    /// Inclusive numeric bounds.
    Range,
    /// Relative-date buckets (`today`, `this_week`, ...).
    DatePreset,
    /// Presence or absence of a truthy value.
    Boolean,
}

impl FilterKind {
    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Text => "text",
            FilterKind::Enum => "enum",
            FilterKind::Range => "range",
            FilterKind::DatePreset => "datePreset",
            FilterKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable option: the stored value and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption<V = String> {
    pub value: V,
    pub label: String,
}

impl<V> FilterOption<V> {
    pub fn new(value: V, label: impl Into<String>) -> Self {
        FilterOption {
            value,
            label: label.into(),
        }
    }
}

/// How range bounds are rendered in active-filter summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// Plain number with thousands separators.
    #[default]
    Plain,
    /// Integer minor units (cents) rendered as major units with a `$` sign.
    Currency,
}

/// Labels used when summarizing a boolean filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanLabels {
    pub has: String,
    pub lacks: String,
}

impl Default for BooleanLabels {
    fn default() -> Self {
        BooleanLabels {
            has: "Yes".to_string(),
            lacks: "No".to_string(),
        }
    }
}

type Accessor<T> = Box<dyn for<'a> Fn(&'a T) -> Value<'a> + Send + Sync>;

/// Declaration of one filterable/sortable field of `T`.
///
/// Accessors must be pure: the engine calls them any number of times, in any
/// order, while counting, filtering and sorting.
///
/// # Example
///
/// ```
/// use tablesift::{Column, Value};
///
/// struct Deal {
///     status: String,
///     amount_cents: i64,
/// }
///
/// let status = Column::enumerated("status", "Status", |d: &Deal| {
///     Value::from(d.status.as_str())
/// })
/// .options([("open", "Open"), ("closed", "Closed")]);
///
/// let amount = Column::range("amount", "Amount", |d: &Deal| Value::from(d.amount_cents))
///     .currency();
/// ```
pub struct Column<T> {
    id: String,
    label: String,
    kind: FilterKind,
    accessor: Accessor<T>,
    sort_accessor: Option<Accessor<T>>,
    options: Vec<FilterOption>,
    presets: Vec<FilterOption<DatePreset>>,
    format: NumberFormat,
    boolean_labels: BooleanLabels,
    sortable: bool,
    filterable: bool,
}

impl<T> Column<T> {
    /// Creates a column of the given kind.
    pub fn new<F>(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: FilterKind,
        accessor: F,
    ) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Column {
            id: id.into(),
            label: label.into(),
            kind,
            accessor: Box::new(accessor),
            sort_accessor: None,
            options: Vec::new(),
            presets: Vec::new(),
            format: NumberFormat::Plain,
            boolean_labels: BooleanLabels::default(),
            sortable: true,
            filterable: true,
        }
    }

    pub fn text<F>(id: impl Into<String>, label: impl Into<String>, accessor: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self::new(id, label, FilterKind::Text, accessor)
    }

    pub fn enumerated<F>(id: impl Into<String>, label: impl Into<String>, accessor: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self::new(id, label, FilterKind::Enum, accessor)
    }

    pub fn range<F>(id: impl Into<String>, label: impl Into<String>, accessor: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self::new(id, label, FilterKind::Range, accessor)
    }

    /// Creates a date-preset column with the standard four presets.
    pub fn date<F>(id: impl Into<String>, label: impl Into<String>, accessor: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        let mut column = Self::new(id, label, FilterKind::DatePreset, accessor);
        column.presets = DatePreset::ALL
            .iter()
            .map(|preset| FilterOption::new(*preset, preset.default_label()))
            .collect();
        column
    }

    pub fn boolean<F>(id: impl Into<String>, label: impl Into<String>, accessor: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self::new(id, label, FilterKind::Boolean, accessor)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Uses a dedicated accessor for ordering.
    pub fn sort_by<F>(mut self, accessor: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        self.sort_accessor = Some(Box::new(accessor));
        self
    }

    /// Declares the enum options, in display order.
    pub fn options<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(value, label)| FilterOption::new(value.into(), label))
            .collect();
        self
    }

    /// Replaces the date presets offered by this column.
    pub fn presets<I, L>(mut self, presets: I) -> Self
    where
        I: IntoIterator<Item = (DatePreset, L)>,
        L: Into<String>,
    {
        self.presets = presets
            .into_iter()
            .map(|(value, label)| FilterOption::new(value, label))
            .collect();
        self
    }

    /// Renders range bounds as currency (values are in cents).
    pub fn currency(self) -> Self {
        self.format(NumberFormat::Currency)
    }

    pub fn format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the labels shown for boolean `has` / `lacks` filters.
    pub fn labels(mut self, has: impl Into<String>, lacks: impl Into<String>) -> Self {
        self.boolean_labels = BooleanLabels {
            has: has.into(),
            lacks: lacks.into(),
        };
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn enum_options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn date_presets(&self) -> &[FilterOption<DatePreset>] {
        &self.presets
    }

    pub fn number_format(&self) -> NumberFormat {
        self.format
    }

    pub fn boolean_labels(&self) -> &BooleanLabels {
        &self.boolean_labels
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Evaluates the filter accessor.
    pub fn value<'a>(&self, record: &'a T) -> Value<'a> {
        (self.accessor)(record)
    }

    /// Evaluates the sort accessor, falling back to the filter accessor.
    pub fn sort_value<'a>(&self, record: &'a T) -> Value<'a> {
        match &self.sort_accessor {
            Some(accessor) => accessor(record),
            None => (self.accessor)(record),
        }
    }

    /// Returns the label of an enum option, or the raw value when the option
    /// is not declared.
    pub fn option_label<'s>(&'s self, value: &'s str) -> &'s str {
        self.options
            .iter()
            .find(|option| option.value == value)
            .map_or(value, |option| option.label.as_str())
    }

    /// Returns the label of a date preset, or its key when not declared.
    pub fn preset_label(&self, preset: DatePreset) -> &str {
        self.presets
            .iter()
            .find(|option| option.value == preset)
            .map_or(preset.as_str(), |option| option.label.as_str())
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("has_sort_accessor", &self.sort_accessor.is_some())
            .field("options", &self.options)
            .field("presets", &self.presets)
            .field("format", &self.format)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .finish()
    }
}

/// An ordered set of columns with unique ids.
pub struct Schema<T> {
    columns: Vec<Column<T>>,
    index: HashMap<String, usize>,
}

impl<T> Schema<T> {
    /// Builds a schema, rejecting duplicate ids and option-less enum or
    /// date-preset columns.
    pub fn new(columns: impl IntoIterator<Item = Column<T>>) -> Result<Self> {
        let columns: Vec<Column<T>> = columns.into_iter().collect();
        let mut index = HashMap::with_capacity(columns.len());

        for (position, column) in columns.iter().enumerate() {
            let missing = match column.kind {
                FilterKind::Enum => column.options.is_empty(),
                FilterKind::DatePreset => column.presets.is_empty(),
                _ => false,
            };
            if missing {
                return Err(TableError::MissingOptions {
                    column: column.id.clone(),
                    kind: column.kind,
                });
            }
            if index.insert(column.id.clone(), position).is_some() {
                return Err(TableError::DuplicateColumn(column.id.clone()));
            }
        }

        Ok(Schema { columns, index })
    }

    pub fn get(&self, id: &str) -> Option<&Column<T>> {
        self.index.get(id).map(|&position| &self.columns[position])
    }

    /// Like [`Schema::get`], but reports unknown ids as an error.
    pub fn column(&self, id: &str) -> Result<&Column<T>> {
        self.get(id)
            .ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column<T>> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.columns).finish()
    }
}
