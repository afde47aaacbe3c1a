//! Table Metadata Records
//!
//! Small framed records for the descriptor file and the variable-column
//! cell directories.
//!
//! ## Record Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Magic (4) | Version: u16 (2) | PayloadLen: u32 (4)      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Payload (bincode, variable)                             │
//! ├─────────────────────────────────────────────────────────┤
//! │ PayloadCRC: u32 (4)                                     │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AstraError, Result};
use crate::schema::{ColumnSpec, TableDescriptor};

/// Magic bytes of the table descriptor record
pub(crate) const DESC_MAGIC: &[u8; 4] = b"ASTB";

/// Magic bytes of a variable-column cell directory record
pub(crate) const VIX_MAGIC: &[u8; 4] = b"ASTV";

/// Current metadata format version
pub(crate) const META_VERSION: u16 = 1;

/// Serialized form of the descriptor file payload
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TableMeta {
    /// Columns in declaration order
    pub columns: Vec<ColumnSpec>,

    /// Row count at the last flush
    pub row_count: u64,
}

/// Encode the descriptor payload
pub(crate) fn encode_meta(descriptor: &TableDescriptor, row_count: u64) -> Result<Vec<u8>> {
    let meta = TableMeta {
        columns: descriptor.columns().to_vec(),
        row_count,
    };
    bincode::serialize(&meta).map_err(|e| AstraError::Serialization(e.to_string()))
}

/// Decode the descriptor payload
pub(crate) fn decode_meta(payload: &[u8]) -> Result<(TableDescriptor, u64)> {
    let meta: TableMeta =
        bincode::deserialize(payload).map_err(|e| AstraError::Serialization(e.to_string()))?;
    Ok((TableDescriptor::from_columns(meta.columns), meta.row_count))
}

/// Write a framed record, replacing any previous file content
pub(crate) fn write_record(path: &Path, magic: &[u8; 4], payload: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let crc = crc32fast::hash(payload);

    file.write_all(magic)?;
    file.write_all(&META_VERSION.to_le_bytes())?;
    file.write_all(&(payload.len() as u32).to_le_bytes())?;
    file.write_all(payload)?;
    file.write_all(&crc.to_le_bytes())?;
    file.sync_all()?;

    Ok(())
}

/// Read and validate a framed record, returning the payload
pub(crate) fn read_record(path: &Path, magic: &[u8; 4]) -> Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;

    let mut header = [0u8; 10];
    file.read_exact(&mut header).map_err(|_| {
        AstraError::Corruption(format!("record too short: {}", path.display()))
    })?;

    if &header[0..4] != magic {
        return Err(AstraError::Corruption(format!(
            "bad magic in {}: expected {:?}, got {:?}",
            path.display(),
            magic,
            &header[0..4]
        )));
    }

    let version = u16::from_le_bytes(header[4..6].try_into().unwrap());
    if version != META_VERSION {
        return Err(AstraError::Corruption(format!(
            "unsupported metadata version: {}",
            version
        )));
    }

    let payload_len = u32::from_le_bytes(header[6..10].try_into().unwrap()) as usize;

    let mut payload = vec![0u8; payload_len];
    file.read_exact(&mut payload).map_err(|_| {
        AstraError::Corruption(format!("truncated payload in {}", path.display()))
    })?;

    let mut crc_bytes = [0u8; 4];
    file.read_exact(&mut crc_bytes).map_err(|_| {
        AstraError::Corruption(format!("missing checksum in {}", path.display()))
    })?;
    let stored_crc = u32::from_le_bytes(crc_bytes);

    let actual_crc = crc32fast::hash(&payload);
    if stored_crc != actual_crc {
        return Err(AstraError::Corruption(format!(
            "checksum mismatch in {}: stored {:08x}, computed {:08x}",
            path.display(),
            stored_crc,
            actual_crc
        )));
    }

    Ok(payload)
}
