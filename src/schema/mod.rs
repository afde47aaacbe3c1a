//! Schema Module
//!
//! Column set definition for a table: name, element type, and shape class.
//!
//! ## Responsibilities
//! - Validate column definitions (unique names, legal fixed shapes, defaults)
//! - Produce an immutable `TableDescriptor` bound to a table at creation
//! - Pure value construction; no I/O
//!
//! ## Shape Classes
//! - `Scalar`: one element per cell
//! - `FixedArray(dims)`: every cell has the declared shape
//! - `VariableArray`: shape is per-cell and recorded alongside the cell

mod value;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AstraError, Result};

pub use value::CellValue;

// =============================================================================
// Element Types
// =============================================================================

/// Element types storable in a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementType {
    /// Boolean flag (1 byte on disk)
    Bool,

    /// 32-bit signed integer
    Int32,

    /// 64-bit floating point
    Float64,

    /// Single-precision complex pair (two f32 words, 8 bytes)
    Complex64,
}

impl ElementType {
    /// On-disk size of one element in bytes
    pub fn element_size(&self) -> usize {
        match self {
            ElementType::Bool => 1,
            ElementType::Int32 => 4,
            ElementType::Float64 => 8,
            ElementType::Complex64 => 8,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Bool => write!(f, "Bool"),
            ElementType::Int32 => write!(f, "Int32"),
            ElementType::Float64 => write!(f, "Float64"),
            ElementType::Complex64 => write!(f, "Complex64"),
        }
    }
}

// =============================================================================
// Shape Classes
// =============================================================================

/// How the cells of a column are shaped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeClass {
    /// One element per cell
    Scalar,

    /// Array cells, one shape declared for the whole column
    FixedArray(Vec<u64>),

    /// Array cells whose shape may differ row to row
    VariableArray,
}

// =============================================================================
// Column Specification
// =============================================================================

/// Definition of one column: name, element type, shape class, optional default
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name, unique within the table
    pub name: String,

    /// Element type, fixed for the column's lifetime
    pub element_type: ElementType,

    /// Shape class of the column's cells
    pub shape: ShapeClass,

    /// Value written by a row commit when the column was not set
    pub default: Option<CellValue>,
}

impl ColumnSpec {
    /// Define a scalar column
    pub fn scalar(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type,
            shape: ShapeClass::Scalar,
            default: None,
        }
    }

    /// Define a fixed-shape array column
    pub fn fixed_array(name: impl Into<String>, element_type: ElementType, dims: &[u64]) -> Self {
        Self {
            name: name.into(),
            element_type,
            shape: ShapeClass::FixedArray(dims.to_vec()),
            default: None,
        }
    }

    /// Define a variable-shape array column
    pub fn variable_array(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type,
            shape: ShapeClass::VariableArray,
            default: None,
        }
    }

    /// Attach a default value for row commits that leave this column unset
    pub fn with_default(mut self, value: CellValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Number of elements in one cell, for scalar and fixed-shape columns
    ///
    /// `None` for variable-shape columns: their extent is per-cell.
    pub fn fixed_elements(&self) -> Option<u64> {
        match &self.shape {
            ShapeClass::Scalar => Some(1),
            ShapeClass::FixedArray(dims) => Some(dims.iter().product()),
            ShapeClass::VariableArray => None,
        }
    }

    /// On-disk bytes of one cell, for scalar and fixed-shape columns
    pub fn cell_bytes(&self) -> Option<u64> {
        self.fixed_elements()
            .map(|n| n * self.element_type.element_size() as u64)
    }
}

// =============================================================================
// Schema Builder
// =============================================================================

/// Builder validating a column set into a `TableDescriptor`
///
/// An empty column set is rejected unless `allow_empty()` was requested.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnSpec>,
    allow_empty: bool,
}

impl SchemaBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar column
    pub fn add_scalar_column(self, name: impl Into<String>, element_type: ElementType) -> Self {
        self.add_column(ColumnSpec::scalar(name, element_type))
    }

    /// Add a fixed-shape array column
    pub fn add_array_column(
        self,
        name: impl Into<String>,
        element_type: ElementType,
        dims: &[u64],
    ) -> Self {
        self.add_column(ColumnSpec::fixed_array(name, element_type, dims))
    }

    /// Add a variable-shape array column
    pub fn add_variable_array_column(
        self,
        name: impl Into<String>,
        element_type: ElementType,
    ) -> Self {
        self.add_column(ColumnSpec::variable_array(name, element_type))
    }

    /// Add a fully specified column
    pub fn add_column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }

    /// Permit building a descriptor with zero columns
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Validate the column set and produce an immutable descriptor
    pub fn build(self) -> Result<TableDescriptor> {
        if self.columns.is_empty() && !self.allow_empty {
            return Err(AstraError::Schema(
                "table requires at least one column".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for spec in &self.columns {
            if spec.name.is_empty() {
                return Err(AstraError::Schema("column name is empty".to_string()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(AstraError::Schema(format!(
                    "duplicate column name: {}",
                    spec.name
                )));
            }

            if let ShapeClass::FixedArray(dims) = &spec.shape {
                if dims.is_empty() {
                    return Err(AstraError::Schema(format!(
                        "column {} declares a fixed shape with no dimensions",
                        spec.name
                    )));
                }
                if dims.iter().any(|&d| d == 0) {
                    return Err(AstraError::Schema(format!(
                        "column {} declares a zero dimension in {:?}",
                        spec.name, dims
                    )));
                }
            }

            if let Some(default) = &spec.default {
                default.check_against(spec)?;
            }
        }

        Ok(TableDescriptor::from_columns(self.columns))
    }
}

// =============================================================================
// Table Descriptor
// =============================================================================

/// Immutable ordered column set bound to a table at creation
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    /// Columns in declaration order
    columns: Vec<ColumnSpec>,

    /// Column name → position in `columns`
    index: HashMap<String, usize>,
}

impl TableDescriptor {
    /// Start building a descriptor
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Assemble from already validated columns (descriptor decode path)
    pub(crate) fn from_columns(columns: Vec<ColumnSpec>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self { columns, index }
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Number of columns
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Specification of a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.column_index(name).map(|i| &self.columns[i])
    }
}
