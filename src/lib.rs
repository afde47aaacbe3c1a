//! # astratable
//!
//! A minimal columnar table storage engine with pluggable write and
//! file-allocation strategies, built for comparing how write patterns
//! and space reservation affect on-disk I/O behavior for scientific
//! tabular data (scalar and fixed/variable-shape array columns, as used
//! in radio-astronomy measurement sets):
//! - Schema-first tables: scalar, fixed-shape, and variable-shape columns
//! - Three write granularities: per-cell, per-row, whole-column bulk
//! - Three allocation strategies: lazy zero-fill, pre-truncate, pre-reserve
//! - Deterministic read-back checksum for cross-strategy verification
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Schema Builder                           │
//! │              (columns → TableDescriptor)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Table                                 │
//! │      (descriptor + backing files + row count)                │
//! └───────┬─────────────────┬───────────────────┬───────────────┘
//!         │                 │                   │
//!         ▼                 ▼                   ▼
//!  ┌─────────────┐   ┌─────────────┐    ┌─────────────┐
//!  │  Allocator  │   │  Column /   │    │  Verifier   │
//!  │ (file space)│   │ Row Access  │    │ (checksum)  │
//!  └─────────────┘   └─────────────┘    └─────────────┘
//! ```
//!
//! Writes drive the allocator's extension step before the write itself;
//! that ordering is the only inter-step guarantee the engine provides.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod alloc;
pub mod table;
pub mod column;
pub mod row;
pub mod verify;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use alloc::AllocationReport;
pub use column::element::Element;
pub use column::{ArrayColumn, ScalarColumn};
pub use config::{AllocationStrategy, WriteStrategy};
pub use error::{AstraError, Result};
pub use row::{RowBuilder, RowReader};
pub use schema::{CellValue, ColumnSpec, ElementType, SchemaBuilder, ShapeClass, TableDescriptor};
pub use table::{Table, TableOpenMode};
pub use verify::checksum;

/// Complex element type used by complex-valued columns
pub use num_complex::Complex;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of astratable
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
