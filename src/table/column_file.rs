//! Column Files
//!
//! One data file per column, in descriptor order.
//!
//! ## Fixed-extent columns (scalar and fixed-shape arrays)
//! Headerless fixed-stride layout: `offset(row) = row * stride`. Writes
//! past the current end zero-fill the gap first, so unwritten cells read
//! back as zero; reads past the end are served as zeros without touching
//! the file.
//!
//! ## Variable-shape columns
//! Append-only records `[ndim: u32][dims: u64 × ndim][payload]`. The
//! latest record per row is tracked in an in-memory directory that is
//! persisted to a `.vix` sidecar on flush and reloaded on open. Rewriting
//! a cell appends a new record and repoints the directory entry; old
//! record space is not reclaimed.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::alloc;
use crate::error::{AstraError, Result};

use super::meta::{read_record, write_record, VIX_MAGIC};

// =============================================================================
// Column File
// =============================================================================

/// Backing file of one column
pub(crate) enum ColumnFile {
    Fixed(FixedColumnFile),
    Variable(VariableColumnFile),
}

impl ColumnFile {
    /// View as a fixed-extent file; the shape class was checked when the
    /// accessor was built, so a mismatch here means corrupted state
    pub(crate) fn expect_fixed(&mut self) -> Result<&mut FixedColumnFile> {
        match self {
            ColumnFile::Fixed(f) => Ok(f),
            ColumnFile::Variable(_) => Err(AstraError::Corruption(
                "fixed-extent access to a variable-shape column file".to_string(),
            )),
        }
    }

    /// View as a variable-shape file
    pub(crate) fn expect_variable(&mut self) -> Result<&mut VariableColumnFile> {
        match self {
            ColumnFile::Variable(f) => Ok(f),
            ColumnFile::Fixed(_) => Err(AstraError::Corruption(
                "variable-shape access to a fixed-extent column file".to_string(),
            )),
        }
    }

    /// Flush file content to the storage medium
    pub(crate) fn sync(&self) -> Result<()> {
        match self {
            ColumnFile::Fixed(f) => f.file.sync_all()?,
            ColumnFile::Variable(f) => f.file.sync_all()?,
        }
        Ok(())
    }
}

// =============================================================================
// Fixed-Extent Column File
// =============================================================================

/// Fixed-stride data file for a scalar or fixed-shape array column
pub(crate) struct FixedColumnFile {
    /// Open backing file
    pub(crate) file: File,

    /// Bytes per cell
    pub(crate) stride: u64,

    /// Bytes known present in the file (logical end)
    pub(crate) len: u64,
}

impl FixedColumnFile {
    pub(crate) fn new(file: File, stride: u64, len: u64) -> Self {
        Self { file, stride, len }
    }

    /// Write one cell at its row offset, zero-filling any gap first
    ///
    /// The gap fill is the extension step; it happens before the write
    /// itself, which is the only inter-step ordering the engine promises.
    pub(crate) fn write_cell(&mut self, row: u64, bytes: &[u8]) -> Result<()> {
        let offset = row * self.stride;
        if offset > self.len {
            alloc::zero_fill(&mut self.file, self.len, offset)?;
        }
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        self.len = self.len.max(offset + bytes.len() as u64);
        Ok(())
    }

    /// Write the whole column extent in one contiguous operation
    pub(crate) fn write_full(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(bytes)?;
        self.len = self.len.max(bytes.len() as u64);
        Ok(())
    }

    /// Read one cell; cells beyond the file end read as zeros
    pub(crate) fn read_cell(&mut self, row: u64, out: &mut [u8]) -> Result<()> {
        let offset = row * self.stride;
        if offset + out.len() as u64 <= self.len {
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.read_exact(out)?;
        } else {
            out.fill(0);
        }
        Ok(())
    }

    /// Read the whole column extent, zero-padding past the file end
    pub(crate) fn read_full(&mut self, out: &mut [u8]) -> Result<()> {
        let available = self.len.min(out.len() as u64) as usize;
        if available > 0 {
            self.file.seek(SeekFrom::Start(0))?;
            self.file.read_exact(&mut out[..available])?;
        }
        for b in &mut out[available..] {
            *b = 0;
        }
        Ok(())
    }
}

// =============================================================================
// Variable-Shape Column File
// =============================================================================

/// Directory entry: where the latest record for a row lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct VarCell {
    /// Payload offset (past the record header)
    offset: u64,

    /// Cell shape recorded alongside the payload
    shape: Vec<u64>,
}

/// Append-only data file for a variable-shape array column
pub(crate) struct VariableColumnFile {
    /// Open backing file
    pub(crate) file: File,

    /// Bytes per element
    elem_size: usize,

    /// Append offset (file end)
    end: u64,

    /// Row → latest record, `None` for never-written rows
    directory: Vec<Option<VarCell>>,
}

impl VariableColumnFile {
    pub(crate) fn new(file: File, elem_size: usize, rows: u64, end: u64) -> Self {
        Self {
            file,
            elem_size,
            end,
            directory: vec![None; rows as usize],
        }
    }

    /// Bytes of the record header for a given rank
    fn header_bytes(ndim: usize) -> u64 {
        4 + 8 * ndim as u64
    }

    /// Append one cell record and repoint the row's directory entry
    pub(crate) fn write_cell(&mut self, row: u64, shape: &[u64], payload: &[u8]) -> Result<()> {
        let header = Self::header_bytes(shape.len());
        let mut buf = BytesMut::with_capacity(header as usize + payload.len());
        buf.put_u32_le(shape.len() as u32);
        for &dim in shape {
            buf.put_u64_le(dim);
        }
        buf.put_slice(payload);

        self.file.seek(SeekFrom::Start(self.end))?;
        self.file.write_all(&buf)?;

        self.directory[row as usize] = Some(VarCell {
            offset: self.end + header,
            shape: shape.to_vec(),
        });
        self.end += buf.len() as u64;
        Ok(())
    }

    /// Append records for every row in one contiguous write
    ///
    /// `payload` holds `rows` equally sized cells back to back; the caller
    /// has already validated that it tiles.
    pub(crate) fn write_all_cells(&mut self, shape: &[u64], payload: &[u8], rows: u64) -> Result<()> {
        if rows == 0 {
            return Ok(());
        }

        let cell_bytes = payload.len() as u64 / rows;
        let header = Self::header_bytes(shape.len());
        let record = header + cell_bytes;

        let mut buf = BytesMut::with_capacity((record * rows) as usize);
        for r in 0..rows {
            buf.put_u32_le(shape.len() as u32);
            for &dim in shape {
                buf.put_u64_le(dim);
            }
            let start = (r * cell_bytes) as usize;
            buf.put_slice(&payload[start..start + cell_bytes as usize]);
        }

        self.file.seek(SeekFrom::Start(self.end))?;
        self.file.write_all(&buf)?;

        let base = self.end;
        for r in 0..rows {
            self.directory[r as usize] = Some(VarCell {
                offset: base + r * record + header,
                shape: shape.to_vec(),
            });
        }
        self.end += buf.len() as u64;
        Ok(())
    }

    /// Read one cell's shape and payload; never-written rows return `None`
    pub(crate) fn read_cell(&mut self, row: u64) -> Result<Option<(Vec<u64>, Vec<u8>)>> {
        let cell = match &self.directory[row as usize] {
            Some(cell) => cell.clone(),
            None => return Ok(None),
        };

        let n_elements: u64 = cell.shape.iter().product();
        let mut payload = vec![0u8; (n_elements * self.elem_size as u64) as usize];
        self.file.seek(SeekFrom::Start(cell.offset))?;
        self.file.read_exact(&mut payload)?;
        Ok(Some((cell.shape, payload)))
    }

    /// Extend the directory for appended rows
    pub(crate) fn grow(&mut self, new_rows: u64) {
        self.directory.resize(new_rows as usize, None);
    }

    /// Persist the cell directory to its sidecar
    pub(crate) fn save_directory(&self, path: &Path) -> Result<()> {
        let payload = bincode::serialize(&self.directory)
            .map_err(|e| AstraError::Serialization(e.to_string()))?;
        write_record(path, VIX_MAGIC, &payload)
    }

    /// Reload the cell directory from its sidecar
    pub(crate) fn load_directory(&mut self, path: &Path, rows: u64) -> Result<()> {
        let payload = read_record(path, VIX_MAGIC)?;
        self.directory = bincode::deserialize(&payload)
            .map_err(|e| AstraError::Serialization(e.to_string()))?;
        self.directory.resize(rows as usize, None);
        Ok(())
    }
}
