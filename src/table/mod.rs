//! Table Module
//!
//! The table owns the open backing storage, the descriptor, and the
//! current row count; accessors are transient views bound to it.
//!
//! ## Responsibilities
//! - Bind a descriptor to a storage location (create / open)
//! - Drive the storage allocator on creation and on row-count growth
//! - Hand out column and row accessors
//! - Flush metadata and release storage on close
//!
//! ## Concurrency Model
//! Single logical writer between `create` and `close`; concurrent readers
//! of written content are safe. All state is behind `&self`: per-column
//! file handles under `parking_lot::Mutex`, the row count under `RwLock`,
//! the lifecycle flag an atomic. Accessors hold a shared non-owning handle
//! (`Arc`) to the table internals; the table never references accessors.
//!
//! ## Lifecycle
//! `Created → Open (writable) → Closed`; no transition leaves `Closed`.
//! After `close()`, any use of the table or a previously issued accessor
//! fails with `TableClosed`.

mod column_file;
mod meta;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::alloc::{self, AllocationReport};
use crate::column::element::Element;
use crate::column::{ArrayColumn, ScalarColumn};
use crate::config::AllocationStrategy;
use crate::error::{AstraError, Result};
use crate::row::{RowBuilder, RowReader};
use crate::schema::{CellValue, ColumnSpec, ShapeClass, TableDescriptor};

use column_file::{ColumnFile, FixedColumnFile, VariableColumnFile};

// =============================================================================
// Open Mode
// =============================================================================

/// How an existing table is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOpenMode {
    /// Read-only; any mutation fails with `ReadOnly`
    Read,

    /// Read-write; appended rows extend lazily
    ReadWrite,
}

// =============================================================================
// Table
// =============================================================================

/// An open columnar table
///
/// Cheap to hand around by reference; accessors created from it stay
/// valid until `close()`.
pub struct Table {
    inner: Arc<TableInner>,
}

/// Shared table internals, owned by the table and referenced by accessors
pub(crate) struct TableInner {
    /// Table directory
    dir: PathBuf,

    /// Immutable column set
    descriptor: TableDescriptor,

    /// One backing file per column, in descriptor order
    columns: Vec<Mutex<ColumnFile>>,

    /// Current row count
    row_count: RwLock<u64>,

    /// Allocation strategy in effect for row-count growth
    alloc: AllocationStrategy,

    /// Creation-time allocation outcome (absent for reopened tables)
    report: Option<AllocationReport>,

    /// Lifecycle flag; set once by `close()`
    closed: AtomicBool,

    /// Whether mutation is permitted
    writable: bool,
}

impl Table {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const DESC_FILENAME: &'static str = "table.desc";

    /// Data filename of the column at `index`
    fn data_filename(index: usize) -> String {
        format!("c{:03}.acd", index)
    }

    /// Cell-directory sidecar filename of the column at `index`
    fn vix_filename(index: usize) -> String {
        format!("c{:03}.vix", index)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a new table at `path` and reserve space for `initial_rows`
    ///
    /// The caller chooses the location; the engine only populates it.
    /// Fixed-extent columns are sized per the allocation strategy;
    /// variable-shape columns grow write-by-write.
    pub fn create(
        path: &Path,
        descriptor: TableDescriptor,
        initial_rows: u64,
        strategy: AllocationStrategy,
    ) -> Result<Table> {
        fs::create_dir_all(path)?;

        // Descriptor first: a table directory is recognizable from the
        // moment data files appear
        let payload = meta::encode_meta(&descriptor, initial_rows)?;
        meta::write_record(&path.join(Self::DESC_FILENAME), meta::DESC_MAGIC, &payload)?;

        let mut columns = Vec::with_capacity(descriptor.n_columns());
        let mut effective = strategy;
        let mut columns_sized = 0usize;
        let mut bytes_reserved = 0u64;

        for (index, spec) in descriptor.columns().iter().enumerate() {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(true)
                .open(path.join(Self::data_filename(index)))?;

            match spec.cell_bytes() {
                Some(cell_bytes) => {
                    let bytes = initial_rows * cell_bytes;
                    let took = alloc::prepare_file(&file, bytes, effective).map_err(|e| {
                        AstraError::Allocation {
                            column: spec.name.clone(),
                            source: e,
                        }
                    })?;
                    if took != effective {
                        warn!(
                            column = %spec.name,
                            requested = %effective,
                            effective = %took,
                            "allocation strategy substituted"
                        );
                        effective = took;
                    }
                    if effective != AllocationStrategy::LazyZeroFill {
                        columns_sized += 1;
                        bytes_reserved += bytes;
                    }

                    let len = file.metadata()?.len();
                    columns.push(Mutex::new(ColumnFile::Fixed(FixedColumnFile::new(
                        file, cell_bytes, len,
                    ))));
                }
                None => {
                    let var = VariableColumnFile::new(
                        file,
                        spec.element_type.element_size(),
                        initial_rows,
                        0,
                    );
                    var.save_directory(&path.join(Self::vix_filename(index)))?;
                    columns.push(Mutex::new(ColumnFile::Variable(var)));
                }
            }
        }

        let report = AllocationReport {
            requested: strategy,
            effective,
            columns_sized,
            bytes_reserved,
        };
        info!(
            path = %path.display(),
            rows = initial_rows,
            columns = descriptor.n_columns(),
            strategy = %report.effective,
            "table created"
        );

        Ok(Table {
            inner: Arc::new(TableInner {
                dir: path.to_path_buf(),
                descriptor,
                columns,
                row_count: RwLock::new(initial_rows),
                alloc: effective,
                report: Some(report),
                closed: AtomicBool::new(false),
                writable: true,
            }),
        })
    }

    /// Open an existing table, validating its descriptor record
    pub fn open(path: &Path, mode: TableOpenMode) -> Result<Table> {
        let payload = meta::read_record(&path.join(Self::DESC_FILENAME), meta::DESC_MAGIC)?;
        let (descriptor, row_count) = meta::decode_meta(&payload)?;

        let writable = mode == TableOpenMode::ReadWrite;
        let mut columns = Vec::with_capacity(descriptor.n_columns());

        for (index, spec) in descriptor.columns().iter().enumerate() {
            let file = OpenOptions::new()
                .read(true)
                .write(writable)
                .open(path.join(Self::data_filename(index)))?;
            let len = file.metadata()?.len();

            match spec.cell_bytes() {
                Some(cell_bytes) => {
                    columns.push(Mutex::new(ColumnFile::Fixed(FixedColumnFile::new(
                        file, cell_bytes, len,
                    ))));
                }
                None => {
                    let mut var = VariableColumnFile::new(
                        file,
                        spec.element_type.element_size(),
                        row_count,
                        len,
                    );
                    var.load_directory(&path.join(Self::vix_filename(index)), row_count)?;
                    columns.push(Mutex::new(ColumnFile::Variable(var)));
                }
            }
        }

        info!(path = %path.display(), rows = row_count, ?mode, "table opened");

        Ok(Table {
            inner: Arc::new(TableInner {
                dir: path.to_path_buf(),
                descriptor,
                columns,
                row_count: RwLock::new(row_count),
                // Creation-time strategy is a parameter, not stored;
                // reopened tables extend lazily
                alloc: AllocationStrategy::LazyZeroFill,
                report: None,
                closed: AtomicBool::new(false),
                writable,
            }),
        })
    }

    // =========================================================================
    // Row-Count Growth
    // =========================================================================

    /// Append `n` rows, extending fixed-extent columns for the delta only
    ///
    /// Previously written cell content is preserved; returns the updated
    /// row count.
    pub fn add_rows(&self, n: u64) -> Result<u64> {
        self.inner.ensure_open()?;
        self.inner.ensure_writable()?;

        let mut row_count = self.inner.row_count.write();
        let old = *row_count;
        let new = old + n;

        for (index, spec) in self.inner.descriptor.columns().iter().enumerate() {
            let mut guard = self.inner.columns[index].lock();
            match &mut *guard {
                ColumnFile::Fixed(fixed) => {
                    let took = alloc::extend_file(
                        &fixed.file,
                        old * fixed.stride,
                        new * fixed.stride,
                        self.inner.alloc,
                    )
                    .map_err(|e| AstraError::Allocation {
                        column: spec.name.clone(),
                        source: e,
                    })?;
                    if took != self.inner.alloc {
                        warn!(
                            column = %spec.name,
                            requested = %self.inner.alloc,
                            effective = %took,
                            "allocation strategy substituted during row growth"
                        );
                    }
                    fixed.len = fixed.file.metadata()?.len();
                }
                ColumnFile::Variable(var) => var.grow(new),
            }
        }

        *row_count = new;
        debug!(added = n, row_count = new, "rows appended");
        Ok(new)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Typed accessor for a scalar column
    pub fn scalar_column<T: Element>(&self, name: &str) -> Result<ScalarColumn<T>> {
        self.inner.ensure_open()?;
        let index = self.inner.col_index(name)?;
        let spec = &self.inner.descriptor.columns()[index];

        if spec.shape != ShapeClass::Scalar {
            return Err(AstraError::ColumnAccess {
                column: spec.name.clone(),
                expected: "scalar",
            });
        }
        Self::check_element::<T>(spec)?;

        Ok(ScalarColumn::new(Arc::clone(&self.inner), index))
    }

    /// Typed accessor for a fixed- or variable-shape array column
    pub fn array_column<T: Element>(&self, name: &str) -> Result<ArrayColumn<T>> {
        self.inner.ensure_open()?;
        let index = self.inner.col_index(name)?;
        let spec = &self.inner.descriptor.columns()[index];

        if spec.shape == ShapeClass::Scalar {
            return Err(AstraError::ColumnAccess {
                column: spec.name.clone(),
                expected: "array",
            });
        }
        Self::check_element::<T>(spec)?;

        Ok(ArrayColumn::new(Arc::clone(&self.inner), index))
    }

    /// Read accessor for one logical row
    pub fn row(&self, index: u64) -> Result<RowReader> {
        self.inner.ensure_open()?;
        self.inner.check_row(index)?;
        Ok(RowReader::new(Arc::clone(&self.inner), index))
    }

    /// Write accessor for one logical row: set cells, then commit
    pub fn begin_row(&self, index: u64) -> Result<RowBuilder> {
        self.inner.ensure_open()?;
        self.inner.ensure_writable()?;
        self.inner.check_row(index)?;
        Ok(RowBuilder::new(Arc::clone(&self.inner), index))
    }

    /// Requested element type must match the column's declared type
    fn check_element<T: Element>(spec: &ColumnSpec) -> Result<()> {
        if T::ELEMENT_TYPE != spec.element_type {
            return Err(AstraError::TypeMismatch {
                column: spec.name.clone(),
                expected: spec.element_type,
                requested: T::ELEMENT_TYPE,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Untyped Cell Access
    // =========================================================================

    /// Read one cell as an untyped value
    pub fn get_cell_value(&self, name: &str, row: u64) -> Result<CellValue> {
        self.inner.ensure_open()?;
        let index = self.inner.col_index(name)?;
        self.inner.check_row(row)?;
        self.inner.get_cell_by_index(index, row)
    }

    /// Write one cell from an untyped value, checking type and shape
    pub fn put_cell_value(&self, name: &str, row: u64, value: &CellValue) -> Result<()> {
        self.inner.ensure_open()?;
        self.inner.ensure_writable()?;
        let index = self.inner.col_index(name)?;
        self.inner.check_row(row)?;
        self.inner.put_cell_by_index(index, row, value)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Current row count
    pub fn n_rows(&self) -> u64 {
        *self.inner.row_count.read()
    }

    /// Number of columns
    pub fn n_columns(&self) -> usize {
        self.inner.descriptor.n_columns()
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.inner
            .descriptor
            .columns()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Full specification of one column
    pub fn column_info(&self, name: &str) -> Result<&ColumnSpec> {
        let index = self.inner.col_index(name)?;
        Ok(&self.inner.descriptor.columns()[index])
    }

    /// The bound descriptor
    pub fn descriptor(&self) -> &TableDescriptor {
        &self.inner.descriptor
    }

    /// Creation-time allocation outcome; reports PreReserve substitution
    pub fn allocation_report(&self) -> Option<&AllocationReport> {
        self.inner.report.as_ref()
    }

    /// Table directory
    pub fn path(&self) -> &Path {
        &self.inner.dir
    }

    // =========================================================================
    // Flush / Close
    // =========================================================================

    /// Persist metadata (row count, variable-cell directories) and sync
    /// data files
    pub fn flush(&self) -> Result<()> {
        self.inner.ensure_open()?;
        if !self.inner.writable {
            return Ok(());
        }
        self.flush_internal()
    }

    /// Flush and mark the table closed; all accessors become invalid
    pub fn close(&self) -> Result<()> {
        self.inner.ensure_open()?;
        if self.inner.writable {
            self.flush_internal()?;
        }
        self.inner.closed.store(true, Ordering::SeqCst);
        info!(path = %self.inner.dir.display(), "table closed");
        Ok(())
    }

    fn flush_internal(&self) -> Result<()> {
        // Data first, metadata last: a fresh descriptor record never
        // points at unsynced cells
        for (index, guard) in self.inner.columns.iter().enumerate() {
            let column = guard.lock();
            column.sync()?;
            if let ColumnFile::Variable(var) = &*column {
                var.save_directory(&self.inner.dir.join(Self::vix_filename(index)))?;
            }
        }

        let row_count = *self.inner.row_count.read();
        let payload = meta::encode_meta(&self.inner.descriptor, row_count)?;
        meta::write_record(
            &self.inner.dir.join(Self::DESC_FILENAME),
            meta::DESC_MAGIC,
            &payload,
        )?;

        debug!(rows = row_count, "table flushed");
        Ok(())
    }
}

// =============================================================================
// Shared Internals (accessor-facing)
// =============================================================================

impl TableInner {
    /// Fail with `TableClosed` once `close()` has run
    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AstraError::TableClosed);
        }
        Ok(())
    }

    /// Fail with `ReadOnly` for tables opened without write access
    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if !self.writable {
            return Err(AstraError::ReadOnly);
        }
        Ok(())
    }

    /// Fail with `RowIndex` for indices at or past the row count
    pub(crate) fn check_row(&self, index: u64) -> Result<()> {
        let row_count = *self.row_count.read();
        if index >= row_count {
            return Err(AstraError::RowIndex { index, row_count });
        }
        Ok(())
    }

    /// Resolve a column name to its descriptor position
    pub(crate) fn col_index(&self, name: &str) -> Result<usize> {
        self.descriptor
            .column_index(name)
            .ok_or_else(|| AstraError::ColumnNotFound(name.to_string()))
    }

    pub(crate) fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub(crate) fn n_rows_now(&self) -> u64 {
        *self.row_count.read()
    }

    // -------------------------------------------------------------------------
    // Byte-level paths used by the typed accessors
    // -------------------------------------------------------------------------

    pub(crate) fn write_fixed_cell(&self, col: usize, row: u64, bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.ensure_writable()?;
        self.check_row(row)?;
        self.columns[col].lock().expect_fixed()?.write_cell(row, bytes)
    }

    pub(crate) fn read_fixed_cell(&self, col: usize, row: u64, out: &mut [u8]) -> Result<()> {
        self.ensure_open()?;
        self.check_row(row)?;
        self.columns[col].lock().expect_fixed()?.read_cell(row, out)
    }

    pub(crate) fn write_fixed_full(&self, col: usize, bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.ensure_writable()?;
        self.columns[col].lock().expect_fixed()?.write_full(bytes)
    }

    pub(crate) fn read_fixed_full(&self, col: usize, out: &mut [u8]) -> Result<()> {
        self.ensure_open()?;
        self.columns[col].lock().expect_fixed()?.read_full(out)
    }

    pub(crate) fn write_var_cell(
        &self,
        col: usize,
        row: u64,
        shape: &[u64],
        payload: &[u8],
    ) -> Result<()> {
        self.ensure_open()?;
        self.ensure_writable()?;
        self.check_row(row)?;
        self.columns[col]
            .lock()
            .expect_variable()?
            .write_cell(row, shape, payload)
    }

    pub(crate) fn read_var_cell(&self, col: usize, row: u64) -> Result<Option<(Vec<u64>, Vec<u8>)>> {
        self.ensure_open()?;
        self.check_row(row)?;
        self.columns[col].lock().expect_variable()?.read_cell(row)
    }

    pub(crate) fn write_var_full(
        &self,
        col: usize,
        shape: &[u64],
        payload: &[u8],
        rows: u64,
    ) -> Result<()> {
        self.ensure_open()?;
        self.ensure_writable()?;
        self.columns[col]
            .lock()
            .expect_variable()?
            .write_all_cells(shape, payload, rows)
    }

    // -------------------------------------------------------------------------
    // Untyped cell paths (row accessors, verifier)
    // -------------------------------------------------------------------------

    /// Read one cell by column position as an untyped value
    pub(crate) fn get_cell_by_index(&self, col: usize, row: u64) -> Result<CellValue> {
        let spec = &self.descriptor.columns()[col];
        match &spec.shape {
            ShapeClass::Scalar => {
                let mut buf = vec![0u8; spec.element_type.element_size()];
                self.read_fixed_cell(col, row, &mut buf)?;
                Ok(CellValue::decode_scalar(spec.element_type, &buf))
            }
            ShapeClass::FixedArray(dims) => {
                let n: u64 = dims.iter().product();
                let mut buf = vec![0u8; (n * spec.element_type.element_size() as u64) as usize];
                self.read_fixed_cell(col, row, &mut buf)?;
                Ok(CellValue::decode_array(
                    spec.element_type,
                    dims.clone(),
                    &buf,
                ))
            }
            ShapeClass::VariableArray => match self.read_var_cell(col, row)? {
                Some((shape, payload)) => {
                    Ok(CellValue::decode_array(spec.element_type, shape, &payload))
                }
                // Never-written variable cell: the empty array
                None => Ok(CellValue::decode_array(spec.element_type, vec![0], &[])),
            },
        }
    }

    /// Write one cell by column position, checking type and shape
    pub(crate) fn put_cell_by_index(&self, col: usize, row: u64, value: &CellValue) -> Result<()> {
        let spec = &self.descriptor.columns()[col];
        value.check_against(spec)?;

        let payload = value.encode_payload();
        match &spec.shape {
            ShapeClass::Scalar | ShapeClass::FixedArray(_) => {
                self.write_fixed_cell(col, row, &payload)
            }
            ShapeClass::VariableArray => {
                // check_against guarantees an array value here
                let shape = value.shape().unwrap_or(&[]).to_vec();
                self.write_var_cell(col, row, &shape, &payload)
            }
        }
    }
}
