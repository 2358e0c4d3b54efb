//! Tabular data abstractions.
//!
//! This module provides [`Frame`], a column-oriented table with named
//! columns, and CSV input/output for it. A column is either numeric
//! (`f32`, with missing values represented as NaN) or categorical
//! (strings). Frames are the interchange type between pipeline stages.
//!
//! # Missing Values
//!
//! Missing numeric values are represented as `f32::NAN`. An empty CSV
//! field parses as missing and a missing value writes back as an empty
//! field.

mod csv;
mod frame;

pub use csv::{read_csv, read_csv_from_reader, write_csv};
pub use frame::{Column, Frame};

/// Errors raised while constructing, reading, or writing tabular data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// I/O error while reading or writing a table.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// The table has no header row.
    #[error("missing header row")]
    MissingHeader,

    /// A required column is absent.
    #[error("missing required column '{name}'")]
    MissingColumn { name: String },

    /// A column holds strings where numbers are required.
    #[error("column '{name}' is not numeric")]
    NotNumeric { name: String },

    /// Two columns share the same name.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// A column's row count disagrees with the rest of the table.
    #[error("inconsistent number of rows: column '{name}' expected {expected}, got {got}")]
    InconsistentRows {
        name: String,
        expected: usize,
        got: usize,
    },
}
