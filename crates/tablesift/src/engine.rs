//! The engine: owns filter and sort state, derives the view.
//!
//! [`TableEngine`] holds at most one [`FilterValue`] per column and at most
//! one [`SortConfig`]. Records are supplied by the caller on every query
//! and are never mutated. When built with a store and scope key, every
//! successful mutation writes the full state back through the
//! [`crate::codec`] module.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::codec::Snapshot;
use crate::column::{Column, FilterKind, Schema};
use crate::dates::{DatePreset, DateWindow};
use crate::error::{Result, TableError};
use crate::evaluate::Evaluator;
use crate::facets;
use crate::filter::FilterValue;
use crate::ordering::{compare_records, Dir, SortConfig};
use crate::store::StateStore;
use crate::summary::ActiveFilter;

struct Persistence {
    store: Arc<dyn StateStore>,
    key: String,
}

/// Builder for [`TableEngine`].
///
/// ```
/// use std::sync::Arc;
/// use tablesift::{Column, MemoryStore, Schema, TableEngine, Value};
///
/// struct Target { name: String }
///
/// let schema = Schema::new([
///     Column::text("name", "Name", |t: &Target| Value::from(t.name.as_str())),
/// ])
/// .unwrap();
///
/// let engine = TableEngine::builder(schema)
///     .persist(Arc::new(MemoryStore::new()), "outreach-targets")
///     .build();
/// assert!(engine.active_filters().is_empty());
/// ```
pub struct EngineBuilder<T> {
    schema: Schema<T>,
    persistence: Option<Persistence>,
    clock: Arc<dyn Clock>,
}

impl<T> EngineBuilder<T> {
    /// Persists state in `store` under `scope`. Without this the engine is
    /// memory-only.
    pub fn persist(mut self, store: Arc<dyn StateStore>, scope: impl Into<String>) -> Self {
        self.persistence = Some(Persistence {
            store,
            key: scope.into(),
        });
        self
    }

    /// Replaces the clock used for date presets.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Builds the engine, restoring persisted state when a scope is set.
    pub fn build(self) -> TableEngine<T> {
        let mut engine = TableEngine {
            schema: self.schema,
            filters: HashMap::new(),
            sort: None,
            persistence: self.persistence,
            clock: self.clock,
        };
        engine.restore();
        engine
    }
}

/// Filter/sort state for one table, plus the derived view.
///
/// # Example
///
/// ```
/// use tablesift::{Column, FilterValue, Schema, TableEngine, Value};
///
/// struct Deal { status: &'static str, amount: i64 }
///
/// let schema = Schema::new([
///     Column::enumerated("status", "Status", |d: &Deal| Value::from(d.status))
///         .options([("open", "Open"), ("closed", "Closed")]),
///     Column::range("amount", "Amount", |d: &Deal| Value::from(d.amount)).currency(),
/// ])
/// .unwrap();
///
/// let deals = vec![
///     Deal { status: "open", amount: 500 },
///     Deal { status: "closed", amount: 1500 },
///     Deal { status: "open", amount: 3000 },
/// ];
///
/// let mut engine = TableEngine::new(schema);
/// engine.set_filter("status", Some(FilterValue::one_of(["open"]))).unwrap();
/// engine.set_filter("amount", Some(FilterValue::at_least(1000.0))).unwrap();
///
/// let rows = engine.filtered_data(&deals);
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].amount, 3000);
/// ```
pub struct TableEngine<T> {
    schema: Schema<T>,
    filters: HashMap<String, FilterValue>,
    sort: Option<SortConfig>,
    persistence: Option<Persistence>,
    clock: Arc<dyn Clock>,
}

impl<T> TableEngine<T> {
    /// Creates a memory-only engine using the system clock.
    pub fn new(schema: Schema<T>) -> Self {
        Self::builder(schema).build()
    }

    pub fn builder(schema: Schema<T>) -> EngineBuilder<T> {
        EngineBuilder {
            schema,
            persistence: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Installs or removes one column's filter.
    ///
    /// Neutral values, and enum or preset selections covering every declared
    /// option, are stored as "no filter". A value whose kind does not match
    /// the column is rejected and the state is left untouched.
    pub fn set_filter(&mut self, column_id: &str, filter: Option<FilterValue>) -> Result<()> {
        let column = self.filterable_column(column_id)?;
        let normalized = match filter {
            Some(filter) => normalize(column, filter)?,
            None => None,
        };

        match normalized {
            Some(filter) => {
                self.filters.insert(column_id.to_string(), filter);
            }
            None => {
                self.filters.remove(column_id);
            }
        }
        self.persist();
        Ok(())
    }

    /// Removes one column's filter. Clearing twice is the same as once.
    pub fn clear_filter(&mut self, column_id: &str) -> Result<()> {
        self.set_filter(column_id, None)
    }

    /// Drops every filter and the sort, and erases the persisted entry.
    pub fn clear_all_filters(&mut self) {
        self.filters.clear();
        self.sort = None;
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.store.remove(&persistence.key) {
                tracing::warn!(scope = %persistence.key, error = %e, "failed to erase table state");
            }
        }
    }

    /// Advances the column-click cycle: none → asc → desc → none.
    ///
    /// Clicking a column other than the sorted one starts it at asc.
    pub fn toggle_sort(&mut self, column_id: &str) -> Result<()> {
        self.sortable_column(column_id)?;
        self.sort = match &self.sort {
            Some(current) if current.column_id == column_id => match current.direction {
                Dir::Asc => Some(SortConfig::desc(column_id)),
                Dir::Desc => None,
            },
            _ => Some(SortConfig::asc(column_id)),
        };
        self.persist();
        Ok(())
    }

    /// Sets the sort directly, bypassing the cycle. `None` removes it.
    pub fn set_sort(&mut self, column_id: &str, direction: Option<Dir>) -> Result<()> {
        self.sortable_column(column_id)?;
        self.sort = direction.map(|direction| SortConfig::new(column_id, direction));
        self.persist();
        Ok(())
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn filter_value(&self, column_id: &str) -> Option<&FilterValue> {
        self.filters.get(column_id)
    }

    pub fn sort_config(&self) -> Option<&SortConfig> {
        self.sort.as_ref()
    }

    /// Returns the direction if `column_id` is the sorted column.
    pub fn sort_direction(&self, column_id: &str) -> Option<Dir> {
        self.sort
            .as_ref()
            .filter(|sort| sort.column_id == column_id)
            .map(|sort| sort.direction)
    }

    /// Active filters paired with their columns, in schema order.
    fn active(&self) -> Vec<(&Column<T>, &FilterValue)> {
        self.schema
            .iter()
            .filter_map(|column| self.filters.get(column.id()).map(|filter| (column, filter)))
            .collect()
    }

    /// Summaries of the active filters, in schema order.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.active()
            .into_iter()
            .map(|(column, filter)| ActiveFilter::new(column, filter))
            .collect()
    }

    /// Copies the current state, filters in schema order.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            filters: self
                .active()
                .into_iter()
                .map(|(column, filter)| (column.id().to_string(), filter.clone()))
                .collect(),
            sort: self.sort.clone(),
        }
    }

    // ========================================================================
    // Derived data
    // ========================================================================

    /// Filters then sorts `data`.
    ///
    /// A record survives when it matches every active filter. Without a
    /// sort the input order is kept; sorting is stable.
    pub fn filtered_data<'a>(&self, data: &'a [T]) -> Vec<&'a T> {
        let evaluator = Evaluator::new(self.window());
        let active = self.active();

        let mut rows: Vec<&'a T> = data
            .iter()
            .filter(|record| {
                active
                    .iter()
                    .all(|(column, filter)| evaluator.matches(*record, column, filter))
            })
            .collect();

        if let Some(sort) = &self.sort {
            if let Some(column) = self.schema.get(&sort.column_id) {
                rows.sort_by(|a, b| compare_records(*a, *b, column, sort.direction));
            }
        }
        rows
    }

    /// Computes the filtered rows together with the summaries.
    pub fn view<'a>(&self, data: &'a [T]) -> TableView<'a, T> {
        TableView {
            rows: self.filtered_data(data),
            active_filters: self.active_filters(),
            sort: self.sort.clone(),
            total: data.len(),
        }
    }

    /// Counts records per stringified value over all of `data`, ignoring
    /// every filter.
    pub fn enum_counts(&self, column_id: &str, data: &[T]) -> Result<BTreeMap<String, usize>> {
        let column = self.schema.column(column_id)?;
        Ok(facets::value_counts(data, column))
    }

    /// Counts records per date bucket over all of `data`, ignoring every
    /// filter.
    pub fn date_preset_counts(
        &self,
        column_id: &str,
        data: &[T],
    ) -> Result<BTreeMap<DatePreset, usize>> {
        let column = self.schema.column(column_id)?;
        if column.kind() != FilterKind::DatePreset {
            return Err(TableError::KindMismatch {
                column: column_id.to_string(),
                expected: column.kind(),
                actual: FilterKind::DatePreset,
            });
        }
        Ok(facets::preset_counts(data, column, &self.window()))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn window(&self) -> DateWindow {
        DateWindow::new(self.clock.now())
    }

    fn filterable_column(&self, column_id: &str) -> Result<&Column<T>> {
        let column = self.schema.column(column_id)?;
        if !column.is_filterable() {
            return Err(TableError::NotFilterable(column_id.to_string()));
        }
        Ok(column)
    }

    fn sortable_column(&self, column_id: &str) -> Result<&Column<T>> {
        let column = self.schema.column(column_id)?;
        if !column.is_sortable() {
            return Err(TableError::NotSortable(column_id.to_string()));
        }
        Ok(column)
    }

    fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let blob = match self.snapshot().encode() {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(
                    scope = %persistence.key,
                    error = %e,
                    "failed to encode table state"
                );
                return;
            }
        };
        if let Err(e) = persistence.store.set(&persistence.key, &blob) {
            tracing::warn!(scope = %persistence.key, error = %e, "failed to write table state");
        }
    }

    /// Loads persisted state, applying each entry through the same checks
    /// as the mutation API. Entries that no longer fit the schema are
    /// dropped.
    fn restore(&mut self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let blob = match persistence.store.get(&persistence.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(scope = %persistence.key, error = %e, "failed to read table state");
                return;
            }
        };

        let snapshot = Snapshot::decode(&blob);
        for (column_id, filter) in snapshot.filters {
            let restored = self
                .filterable_column(&column_id)
                .and_then(|column| normalize(column, filter));
            match restored {
                Ok(Some(filter)) => {
                    self.filters.insert(column_id, filter);
                }
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "dropping persisted filter"),
            }
        }
        if let Some(sort) = snapshot.sort {
            match self.sortable_column(&sort.column_id) {
                Ok(_) => self.sort = Some(sort),
                Err(e) => tracing::debug!(error = %e, "dropping persisted sort"),
            }
        }
    }
}

/// Checks the filter's kind and collapses values that filter nothing.
fn normalize<T>(column: &Column<T>, filter: FilterValue) -> Result<Option<FilterValue>> {
    if filter.kind() != column.kind() {
        return Err(TableError::KindMismatch {
            column: column.id().to_string(),
            expected: column.kind(),
            actual: filter.kind(),
        });
    }

    let covers_everything = match &filter {
        FilterValue::Enum { selected } => column
            .enum_options()
            .iter()
            .all(|option| selected.contains(&option.value)),
        FilterValue::DatePreset { selected } => column
            .date_presets()
            .iter()
            .all(|option| selected.contains(&option.value)),
        _ => false,
    };

    if filter.is_neutral() || covers_everything {
        tracing::debug!(column = column.id(), "filter selects everything, storing none");
        return Ok(None);
    }
    Ok(Some(filter))
}

/// The filtered/sorted rows of one pass, with what produced them.
#[derive(Debug)]
pub struct TableView<'a, T> {
    pub rows: Vec<&'a T>,
    pub active_filters: Vec<ActiveFilter>,
    pub sort: Option<SortConfig>,
    /// Number of records before filtering.
    pub total: usize,
}

impl<T> TableView<'_, T> {
    /// Number of records after filtering.
    pub fn visible(&self) -> usize {
        self.rows.len()
    }

    pub fn is_filtered(&self) -> bool {
        !self.active_filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;
    use crate::value::Value;

    #[derive(Debug, Clone, PartialEq)]
    struct Deal {
        name: &'static str,
        status: &'static str,
        amount: Option<i64>,
    }

    fn schema() -> Schema<Deal> {
        Schema::new([
            Column::text("name", "Name", |d: &Deal| Value::from(d.name)),
            Column::enumerated("status", "Status", |d: &Deal| Value::from(d.status))
                .options([("open", "Open"), ("closed", "Closed")]),
            Column::range("amount", "Amount", |d: &Deal| Value::from(d.amount)).currency(),
            Column::text("notes", "Notes", |_: &Deal| Value::None).sortable(false),
            Column::text("id", "Id", |d: &Deal| Value::from(d.name)).filterable(false),
        ])
        .unwrap()
    }

    fn deals() -> Vec<Deal> {
        vec![
            Deal {
                name: "Birch",
                status: "open",
                amount: Some(500),
            },
            Deal {
                name: "alder",
                status: "closed",
                amount: Some(1500),
            },
            Deal {
                name: "Cedar",
                status: "open",
                amount: None,
            },
            Deal {
                name: "Aspen",
                status: "open",
                amount: Some(3000),
            },
        ]
    }

    fn names(rows: &[&Deal]) -> Vec<&'static str> {
        rows.iter().map(|d| d.name).collect()
    }

    fn engine() -> TableEngine<Deal> {
        TableEngine::builder(schema())
            .clock(FixedClock::parse("2024-05-15T12:00:00Z").unwrap())
            .build()
    }

    #[test]
    fn no_state_keeps_input_order() {
        let engine = engine();
        let data = deals();
        assert_eq!(
            names(&engine.filtered_data(&data)),
            vec!["Birch", "alder", "Cedar", "Aspen"]
        );
    }

    #[test]
    fn kind_mismatch_is_rejected_without_change() {
        let mut engine = engine();
        engine
            .set_filter("status", Some(FilterValue::one_of(["open"])))
            .unwrap();

        let err = engine
            .set_filter("status", Some(FilterValue::text("open")))
            .unwrap_err();
        assert_eq!(
            err,
            TableError::KindMismatch {
                column: "status".into(),
                expected: FilterKind::Enum,
                actual: FilterKind::Text,
            }
        );
        assert_eq!(
            engine.filter_value("status"),
            Some(&FilterValue::one_of(["open"]))
        );
    }

    #[test]
    fn unknown_and_unfilterable_columns() {
        let mut engine = engine();
        assert_eq!(
            engine.set_filter("nope", Some(FilterValue::text("x"))),
            Err(TableError::UnknownColumn("nope".into()))
        );
        assert_eq!(
            engine.set_filter("id", Some(FilterValue::text("x"))),
            Err(TableError::NotFilterable("id".into()))
        );
        assert_eq!(
            engine.toggle_sort("notes"),
            Err(TableError::NotSortable("notes".into()))
        );
    }

    #[test]
    fn neutral_values_are_not_stored() {
        let mut engine = engine();
        engine.set_filter("name", Some(FilterValue::text(""))).unwrap();
        engine
            .set_filter("amount", Some(FilterValue::range(None, None)))
            .unwrap();
        engine
            .set_filter("status", Some(FilterValue::one_of(Vec::<String>::new())))
            .unwrap();
        assert!(engine.active_filters().is_empty());
        assert!(engine.snapshot().filters.is_empty());
    }

    #[test]
    fn selecting_every_option_clears_the_filter() {
        let mut engine = engine();
        engine
            .set_filter("status", Some(FilterValue::one_of(["open"])))
            .unwrap();
        engine
            .set_filter("status", Some(FilterValue::one_of(["open", "closed"])))
            .unwrap();
        assert_eq!(engine.filter_value("status"), None);
    }

    #[test]
    fn sort_cycle() {
        let mut engine = engine();
        let data = deals();

        engine.toggle_sort("amount").unwrap();
        assert_eq!(engine.sort_direction("amount"), Some(Dir::Asc));
        assert_eq!(
            names(&engine.filtered_data(&data)),
            vec!["Birch", "alder", "Aspen", "Cedar"]
        );

        engine.toggle_sort("amount").unwrap();
        assert_eq!(engine.sort_direction("amount"), Some(Dir::Desc));
        // Missing amount stays last when descending too.
        assert_eq!(
            names(&engine.filtered_data(&data)),
            vec!["Aspen", "alder", "Birch", "Cedar"]
        );

        engine.toggle_sort("amount").unwrap();
        assert_eq!(engine.sort_config(), None);
        assert_eq!(
            names(&engine.filtered_data(&data)),
            vec!["Birch", "alder", "Cedar", "Aspen"]
        );
    }

    #[test]
    fn switching_columns_starts_at_asc() {
        let mut engine = engine();
        engine.toggle_sort("amount").unwrap();
        engine.toggle_sort("amount").unwrap();
        engine.toggle_sort("name").unwrap();

        assert_eq!(engine.sort_config(), Some(&SortConfig::asc("name")));
        assert_eq!(engine.sort_direction("amount"), None);

        let data = deals();
        assert_eq!(
            names(&engine.filtered_data(&data)),
            vec!["alder", "Aspen", "Birch", "Cedar"]
        );
    }

    #[test]
    fn set_sort_is_absolute() {
        let mut engine = engine();
        engine.set_sort("name", Some(Dir::Desc)).unwrap();
        assert_eq!(engine.sort_config(), Some(&SortConfig::desc("name")));

        engine.set_sort("name", None).unwrap();
        assert_eq!(engine.sort_config(), None);
    }

    #[test]
    fn counts_ignore_filters_and_sort() {
        let mut engine = engine();
        let data = deals();
        let before = engine.enum_counts("status", &data).unwrap();

        engine
            .set_filter("status", Some(FilterValue::one_of(["closed"])))
            .unwrap();
        engine.toggle_sort("name").unwrap();

        let after = engine.enum_counts("status", &data).unwrap();
        assert_eq!(before, after);
        assert_eq!(after["open"], 3);
        assert_eq!(after["closed"], 1);
    }

    #[test]
    fn preset_counts_require_a_date_column() {
        let engine = engine();
        assert!(matches!(
            engine.date_preset_counts("status", &deals()),
            Err(TableError::KindMismatch { .. })
        ));
    }

    #[test]
    fn view_reports_counts() {
        let mut engine = engine();
        engine
            .set_filter("amount", Some(FilterValue::range(Some(1000.0), Some(5000.0))))
            .unwrap();
        let data = deals();
        let view = engine.view(&data);

        assert_eq!(view.total, 4);
        assert_eq!(view.visible(), 2);
        assert!(view.is_filtered());
        assert_eq!(view.active_filters[0].description, "$10 – $50");
    }

    #[test]
    fn mutations_are_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = TableEngine::builder(schema())
            .persist(store.clone(), "deals")
            .build();
        assert!(!store.contains("deals"));

        engine.toggle_sort("name").unwrap();
        engine
            .set_filter("status", Some(FilterValue::one_of(["open"])))
            .unwrap();

        let restored = TableEngine::builder(schema())
            .persist(store.clone(), "deals")
            .build();
        assert_eq!(restored.snapshot(), engine.snapshot());

        engine.clear_all_filters();
        assert!(!store.contains("deals"));
        assert!(engine.snapshot().filters.is_empty());
        assert_eq!(engine.sort_config(), None);
    }

    #[test]
    fn restore_drops_entries_that_no_longer_fit() {
        let blob = r#"{
            "filters": [
                ["status", {"type": "text", "query": "open"}],
                ["gone", {"type": "text", "query": "x"}],
                ["name", {"type": "text", "query": "ce"}]
            ],
            "sortConfig": {"columnId": "notes", "direction": "asc"}
        }"#;
        let store = Arc::new(MemoryStore::with_entry("deals", blob));
        let engine = TableEngine::builder(schema()).persist(store, "deals").build();

        assert_eq!(
            engine.snapshot(),
            Snapshot {
                filters: vec![("name".into(), FilterValue::text("ce"))],
                sort: None,
            }
        );
    }
}
