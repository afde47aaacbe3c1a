//! Column Accessors
//!
//! Typed, transient, non-owning views bound to one column of an open
//! table. Accessors to different columns may coexist; none holds an
//! exclusive lock on the table.
//!
//! ## Write Granularities
//! - `put(row, ...)`: one cell per call; correct for sparse or
//!   randomly ordered writes, the most I/O-call-intensive path
//! - `put_all(...)`: the whole column extent in one contiguous
//!   extend+write, the fastest path
//!
//! Row-granularity writes live on the row accessor.

pub mod element;

use std::marker::PhantomData;
use std::sync::Arc;

use bytes::BytesMut;

use crate::error::{AstraError, Result};
use crate::schema::{ColumnSpec, ShapeClass};
use crate::table::TableInner;

use element::{decode_slice, encode_into, Element};

// =============================================================================
// Scalar Column Accessor
// =============================================================================

/// Typed read/write view of one scalar column
pub struct ScalarColumn<T: Element> {
    table: Arc<TableInner>,
    col: usize,
    _marker: PhantomData<T>,
}

impl<T: Element> ScalarColumn<T> {
    pub(crate) fn new(table: Arc<TableInner>, col: usize) -> Self {
        Self {
            table,
            col,
            _marker: PhantomData,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.table.descriptor().columns()[self.col].name
    }

    /// Read the cell at `row`
    pub fn get(&self, row: u64) -> Result<T> {
        let mut buf = vec![0u8; T::SIZE];
        self.table.read_fixed_cell(self.col, row, &mut buf)?;
        Ok(T::get(&buf))
    }

    /// Write the cell at `row`
    pub fn put(&self, row: u64, value: T) -> Result<()> {
        let mut buf = BytesMut::with_capacity(T::SIZE);
        value.put(&mut buf);
        self.table.write_fixed_cell(self.col, row, &buf)
    }

    /// Read every cell, in row order
    pub fn get_all(&self) -> Result<Vec<T>> {
        let rows = self.table.n_rows_now() as usize;
        let mut buf = vec![0u8; rows * T::SIZE];
        self.table.read_fixed_full(self.col, &mut buf)?;
        Ok(decode_slice(&buf))
    }

    /// Write every cell in one contiguous operation
    ///
    /// `values` must hold exactly one value per row.
    pub fn put_all(&self, values: &[T]) -> Result<()> {
        let rows = self.table.n_rows_now();
        if values.len() as u64 != rows {
            return Err(AstraError::BulkShape {
                column: self.name().to_string(),
                detail: format!("expected {} values, got {}", rows, values.len()),
            });
        }

        let mut buf = BytesMut::with_capacity(values.len() * T::SIZE);
        encode_into(values, &mut buf);
        self.table.write_fixed_full(self.col, &buf)
    }
}

// =============================================================================
// Array Column Accessor
// =============================================================================

/// Typed read/write view of one array column (fixed or variable shape)
pub struct ArrayColumn<T: Element> {
    table: Arc<TableInner>,
    col: usize,
    _marker: PhantomData<T>,
}

impl<T: Element> ArrayColumn<T> {
    pub(crate) fn new(table: Arc<TableInner>, col: usize) -> Self {
        Self {
            table,
            col,
            _marker: PhantomData,
        }
    }

    fn spec(&self) -> &ColumnSpec {
        &self.table.descriptor().columns()[self.col]
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.spec().name
    }

    /// Read the cell at `row` as shape + row-major flat values
    ///
    /// A never-written variable-shape cell reads as the empty array.
    pub fn get(&self, row: u64) -> Result<(Vec<u64>, Vec<T>)> {
        match self.spec().shape.clone() {
            ShapeClass::FixedArray(dims) => {
                let n: u64 = dims.iter().product();
                let mut buf = vec![0u8; (n as usize) * T::SIZE];
                self.table.read_fixed_cell(self.col, row, &mut buf)?;
                Ok((dims, decode_slice(&buf)))
            }
            ShapeClass::VariableArray => match self.table.read_var_cell(self.col, row)? {
                Some((shape, payload)) => Ok((shape, decode_slice(&payload))),
                None => Ok((vec![0], Vec::new())),
            },
            ShapeClass::Scalar => Err(AstraError::ColumnAccess {
                column: self.name().to_string(),
                expected: "array",
            }),
        }
    }

    /// Write the cell at `row`
    ///
    /// Fixed-shape columns require `shape` to equal the declared dims;
    /// variable-shape columns accept and persist any shape.
    pub fn put(&self, row: u64, shape: &[u64], values: &[T]) -> Result<()> {
        let n: u64 = shape.iter().product();
        if values.len() as u64 != n {
            return Err(AstraError::ShapeMismatch {
                column: self.name().to_string(),
                expected: shape.to_vec(),
                actual: vec![values.len() as u64],
            });
        }

        match self.spec().shape.clone() {
            ShapeClass::FixedArray(dims) => {
                if shape != dims.as_slice() {
                    return Err(AstraError::ShapeMismatch {
                        column: self.name().to_string(),
                        expected: dims,
                        actual: shape.to_vec(),
                    });
                }
                let mut buf = BytesMut::with_capacity(values.len() * T::SIZE);
                encode_into(values, &mut buf);
                self.table.write_fixed_cell(self.col, row, &buf)
            }
            ShapeClass::VariableArray => {
                let mut buf = BytesMut::with_capacity(values.len() * T::SIZE);
                encode_into(values, &mut buf);
                self.table.write_var_cell(self.col, row, shape, &buf)
            }
            ShapeClass::Scalar => Err(AstraError::ColumnAccess {
                column: self.name().to_string(),
                expected: "array",
            }),
        }
    }

    /// Write every cell in one contiguous operation, one shape for all rows
    ///
    /// Per-row varying shapes are not supported in bulk, even on a
    /// variable-shape column; data that does not tile rows × shape is
    /// rejected.
    pub fn put_all(&self, shape: &[u64], values: &[T]) -> Result<()> {
        let rows = self.table.n_rows_now();
        let per_cell: u64 = shape.iter().product();
        if values.len() as u64 != rows * per_cell {
            return Err(AstraError::BulkShape {
                column: self.name().to_string(),
                detail: format!(
                    "{} values do not tile {} rows of shape {:?}",
                    values.len(),
                    rows,
                    shape
                ),
            });
        }

        match self.spec().shape.clone() {
            ShapeClass::FixedArray(dims) => {
                if shape != dims.as_slice() {
                    return Err(AstraError::ShapeMismatch {
                        column: self.name().to_string(),
                        expected: dims,
                        actual: shape.to_vec(),
                    });
                }
                let mut buf = BytesMut::with_capacity(values.len() * T::SIZE);
                encode_into(values, &mut buf);
                self.table.write_fixed_full(self.col, &buf)
            }
            ShapeClass::VariableArray => {
                let mut buf = BytesMut::with_capacity(values.len() * T::SIZE);
                encode_into(values, &mut buf);
                self.table.write_var_full(self.col, shape, &buf, rows)
            }
            ShapeClass::Scalar => Err(AstraError::ColumnAccess {
                column: self.name().to_string(),
                expected: "array",
            }),
        }
    }

    /// Read every cell of a fixed-shape column, in row order
    pub fn get_all(&self) -> Result<(Vec<u64>, Vec<T>)> {
        match self.spec().shape.clone() {
            ShapeClass::FixedArray(dims) => {
                let rows = self.table.n_rows_now();
                let per_cell: u64 = dims.iter().product();
                let mut buf = vec![0u8; (rows * per_cell) as usize * T::SIZE];
                self.table.read_fixed_full(self.col, &mut buf)?;
                Ok((dims, decode_slice(&buf)))
            }
            _ => Err(AstraError::BulkShape {
                column: self.name().to_string(),
                detail: "bulk read requires a fixed cell shape".to_string(),
            }),
        }
    }
}
