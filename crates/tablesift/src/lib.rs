//! Tablesift - schema-driven filtering, sorting and faceting for in-memory
//! record collections.
//!
//! Declare the queryable fields of a record type once as a [`Schema`], then
//! let a [`TableEngine`] hold the per-column filters and the sort. The engine
//! derives:
//!
//! - the filtered, sorted view of any slice of records
//! - facet counts per option or date bucket, over the unfiltered records
//! - human-readable summaries of the active filters
//! - a JSON snapshot of its state, persisted through an injected store
//!
//! # Quick Start
//!
//! ```rust
//! use tablesift::{Column, Dir, FilterValue, Schema, TableEngine, Value};
//!
//! struct Target {
//!     name: String,
//!     stage: &'static str,
//!     check_size: Option<i64>,
//! }
//!
//! let schema = Schema::new([
//!     Column::text("name", "Name", |t: &Target| Value::from(t.name.as_str())),
//!     Column::enumerated("stage", "Stage", |t: &Target| Value::from(t.stage))
//!         .options([("lead", "Lead"), ("meeting", "Meeting"), ("passed", "Passed")]),
//!     Column::range("check", "Check size", |t: &Target| Value::from(t.check_size)).currency(),
//! ])
//! .unwrap();
//!
//! let targets = vec![
//!     Target { name: "Northwind".into(), stage: "lead", check_size: Some(50_000_00) },
//!     Target { name: "Contoso".into(), stage: "meeting", check_size: None },
//!     Target { name: "Fabrikam".into(), stage: "lead", check_size: Some(250_000_00) },
//! ];
//!
//! let mut engine = TableEngine::new(schema);
//! engine.set_filter("stage", Some(FilterValue::one_of(["lead"]))).unwrap();
//! engine.set_sort("check", Some(Dir::Desc)).unwrap();
//!
//! let rows = engine.filtered_data(&targets);
//! assert_eq!(rows[0].name, "Fabrikam");
//! assert_eq!(engine.active_filters()[0].description, "Lead");
//! assert_eq!(engine.enum_counts("stage", &targets).unwrap()["lead"], 2);
//! ```
//!
//! # Filter Kinds
//!
//! | Kind | Filter value | Matches when |
//! |------|--------------|--------------|
//! | `text` | query | lowercase query is a substring of the lowercase value |
//! | `enum` | set of option values | stringified value is in the set |
//! | `range` | optional min / max | value is a number within the inclusive bounds |
//! | `datePreset` | set of presets | value falls in any selected bucket |
//! | `boolean` | has / lacks | truthiness of the value agrees |
//!
//! Filters on different columns combine with AND. Sorting puts missing
//! values last in both directions.
//!
//! # Persistence
//!
//! Build the engine with [`EngineBuilder::persist`] to load state from a
//! [`StateStore`] at startup and write it back after every mutation.
//! Unreadable or outdated state is discarded entry by entry, never raised.

mod clock;
pub mod codec;
mod column;
mod dates;
mod engine;
mod error;
mod evaluate;
pub mod facets;
mod filter;
mod ordering;
pub mod store;
pub mod summary;
mod value;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::Snapshot;
pub use column::{BooleanLabels, Column, FilterKind, FilterOption, NumberFormat, Schema};
pub use dates::{Buckets, DatePreset, DateWindow};
pub use engine::{EngineBuilder, TableEngine, TableView};
pub use error::{Result, TableError};
pub use evaluate::Evaluator;
pub use filter::{FilterValue, Presence};
pub use ordering::{compare_records, compare_values, Dir, SortConfig};
pub use store::{FileStore, MemoryStore, StateStore};
pub use summary::ActiveFilter;
pub use value::{Number, Timestamp, Value};
