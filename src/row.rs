//! Row Accessors
//!
//! Aggregate one logical row across all columns. The builder groups a
//! row's multi-column writes into one commit, the middle granularity
//! between per-cell puts and whole-column bulk puts.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AstraError, Result};
use crate::schema::CellValue;
use crate::table::TableInner;

// =============================================================================
// Row Reader
// =============================================================================

/// Read-only view of one logical row
pub struct RowReader {
    table: Arc<TableInner>,
    index: u64,
}

impl RowReader {
    pub(crate) fn new(table: Arc<TableInner>, index: u64) -> Self {
        Self { table, index }
    }

    /// Row index this reader is bound to
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Read one column's cell in this row
    pub fn get(&self, column: &str) -> Result<CellValue> {
        let col = self.table.col_index(column)?;
        self.table.get_cell_by_index(col, self.index)
    }

    /// Read every column's cell, in descriptor order
    pub fn values(&self) -> Result<Vec<(String, CellValue)>> {
        let mut out = Vec::with_capacity(self.table.descriptor().n_columns());
        for (col, spec) in self.table.descriptor().columns().iter().enumerate() {
            out.push((
                spec.name.clone(),
                self.table.get_cell_by_index(col, self.index)?,
            ));
        }
        Ok(out)
    }
}

// =============================================================================
// Row Builder
// =============================================================================

/// Write accessor for one logical row: set cells, then commit them together
///
/// `commit` refuses to write anything while a column without a default is
/// unset, so a failed commit leaves the row untouched.
pub struct RowBuilder {
    table: Arc<TableInner>,
    index: u64,
    pending: HashMap<usize, CellValue>,
}

impl RowBuilder {
    pub(crate) fn new(table: Arc<TableInner>, index: u64) -> Self {
        Self {
            table,
            index,
            pending: HashMap::new(),
        }
    }

    /// Row index this builder is bound to
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Stage one column's cell; type and shape are checked immediately
    pub fn set(&mut self, column: &str, value: CellValue) -> Result<()> {
        let col = self.table.col_index(column)?;
        value.check_against(&self.table.descriptor().columns()[col])?;
        self.pending.insert(col, value);
        Ok(())
    }

    /// Commit every staged cell for this row
    ///
    /// Unset columns fall back to their declared default; a column with
    /// neither fails the whole commit before any write happens.
    pub fn commit(self) -> Result<()> {
        self.table.ensure_open()?;
        self.table.ensure_writable()?;
        self.table.check_row(self.index)?;

        // Resolve the full row first so a refused commit writes nothing
        let mut planned = Vec::with_capacity(self.table.descriptor().n_columns());
        for (col, spec) in self.table.descriptor().columns().iter().enumerate() {
            match self.pending.get(&col) {
                Some(value) => planned.push(value),
                None => match &spec.default {
                    Some(default) => planned.push(default),
                    None => return Err(AstraError::MissingColumn(spec.name.clone())),
                },
            }
        }

        for (col, value) in planned.into_iter().enumerate() {
            self.table.put_cell_by_index(col, self.index, value)?;
        }
        Ok(())
    }
}
