//! Error types for the tablesift crate.

use thiserror::Error;

use crate::column::FilterKind;

/// Errors that can occur when declaring a schema or mutating engine state.
///
/// Mutations that fail leave the engine state untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// No column with this id exists in the schema.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// Two columns in one schema share an id.
    #[error("duplicate column id '{0}'")]
    DuplicateColumn(String),

    /// An enum or date-preset column was declared without options.
    #[error("column '{column}' is a {kind} column but declares no options")]
    MissingOptions { column: String, kind: FilterKind },

    /// Filter value tag does not match the column's filter kind.
    #[error("column '{column}' expects a {expected} filter, got {actual}")]
    KindMismatch {
        column: String,
        expected: FilterKind,
        actual: FilterKind,
    },

    /// The column is declared with `filterable = false`.
    #[error("column '{0}' is not filterable")]
    NotFilterable(String),

    /// A date-preset key that names no known bucket.
    #[error("unknown date preset '{0}'")]
    UnknownPreset(String),

    /// The column is declared with `sortable = false`.
    #[error("column '{0}' is not sortable")]
    NotSortable(String),
}

/// Result type for tablesift operations.
pub type Result<T> = std::result::Result<T, TableError>;
