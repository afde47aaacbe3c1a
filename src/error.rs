//! Error types for astratable
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::schema::ElementType;

/// Result type alias using AstraError
pub type Result<T> = std::result::Result<T, AstraError>;

/// Unified error type for astratable operations
#[derive(Debug, Error)]
pub enum AstraError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("schema error: {0}")]
    Schema(String),

    // -------------------------------------------------------------------------
    // Allocation Errors
    // -------------------------------------------------------------------------
    #[error("allocation failed for column {column}: {source}")]
    Allocation {
        column: String,
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Shape Errors
    // -------------------------------------------------------------------------
    #[error("shape mismatch on column {column}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        column: String,
        expected: Vec<u64>,
        actual: Vec<u64>,
    },

    #[error("bulk write rejected on column {column}: {detail}")]
    BulkShape { column: String, detail: String },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("row index {index} out of range (row count {row_count})")]
    RowIndex { index: u64, row_count: u64 },

    // -------------------------------------------------------------------------
    // Access Errors
    // -------------------------------------------------------------------------
    #[error("column {column} holds {expected} elements, not {requested}")]
    TypeMismatch {
        column: String,
        expected: ElementType,
        requested: ElementType,
    },

    #[error("column {column} is not a {expected} column")]
    ColumnAccess {
        column: String,
        expected: &'static str,
    },

    // -------------------------------------------------------------------------
    // Row Commit Errors
    // -------------------------------------------------------------------------
    #[error("row commit missing value for column {0}")]
    MissingColumn(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("table has been closed")]
    TableClosed,

    #[error("table is open read-only")]
    ReadOnly,

    // -------------------------------------------------------------------------
    // Metadata Errors
    // -------------------------------------------------------------------------
    #[error("table metadata corrupted: {0}")]
    Corruption(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
