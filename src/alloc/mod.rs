//! Storage Allocator
//!
//! File-space reservation policy for fixed-extent column files. Pure
//! policy over caller-supplied file handles; the allocator keeps no I/O
//! state of its own.
//!
//! ## Strategies
//! - `LazyZeroFill`: nothing up front; each write zero-fills the gap
//!   between the file's logical end and the write offset (`zero_fill`)
//! - `PreTruncate`: one size-extension call per column before any write
//! - `PreReserve`: one block-reservation call (`posix_fallocate`) per
//!   column; falls back to `PreTruncate` where unsupported, and the
//!   substitution is reported, never silent
//!
//! Variable-shape columns are excluded from up-front sizing; their space
//! grows write-by-write.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};

use crate::config::AllocationStrategy;

/// Zero-fill chunk size for lazy gap extension
const ZERO_CHUNK: usize = 64 * 1024;

// =============================================================================
// Allocation Report
// =============================================================================

/// Outcome of preparing a table's backing files
///
/// `effective` differs from `requested` only when the reservation
/// primitive was unsupported and `PreTruncate` semantics were substituted.
#[derive(Debug, Clone)]
pub struct AllocationReport {
    /// Strategy the caller asked for
    pub requested: AllocationStrategy,

    /// Strategy that actually took effect
    pub effective: AllocationStrategy,

    /// Fixed-extent columns sized up front
    pub columns_sized: usize,

    /// Total bytes reserved or extended up front
    pub bytes_reserved: u64,
}

impl AllocationReport {
    /// Whether PreReserve was substituted with PreTruncate semantics
    pub fn substituted(&self) -> bool {
        self.requested != self.effective
    }
}

// =============================================================================
// Per-File Preparation
// =============================================================================

/// Reserve space for one column file holding `bytes` of cell data
///
/// Returns the strategy that took effect for this file.
pub(crate) fn prepare_file(
    file: &File,
    bytes: u64,
    strategy: AllocationStrategy,
) -> io::Result<AllocationStrategy> {
    if bytes == 0 {
        return Ok(strategy);
    }

    match strategy {
        AllocationStrategy::LazyZeroFill => Ok(AllocationStrategy::LazyZeroFill),
        AllocationStrategy::PreTruncate => {
            file.set_len(bytes)?;
            Ok(AllocationStrategy::PreTruncate)
        }
        AllocationStrategy::PreReserve => reserve_or_truncate(file, 0, bytes),
    }
}

/// Extend one column file from `old_bytes` to `new_bytes` for appended rows
///
/// Incremental: only the delta region is reserved; written content is
/// untouched.
pub(crate) fn extend_file(
    file: &File,
    old_bytes: u64,
    new_bytes: u64,
    strategy: AllocationStrategy,
) -> io::Result<AllocationStrategy> {
    if new_bytes <= old_bytes {
        return Ok(strategy);
    }

    match strategy {
        AllocationStrategy::LazyZeroFill => Ok(AllocationStrategy::LazyZeroFill),
        AllocationStrategy::PreTruncate => {
            file.set_len(new_bytes)?;
            Ok(AllocationStrategy::PreTruncate)
        }
        AllocationStrategy::PreReserve => reserve_or_truncate(file, old_bytes, new_bytes - old_bytes),
    }
}

/// Explicitly zero-fill `[from, to)` ahead of a lazy write
///
/// This is what guarantees that unwritten cells read back as the element
/// type's zero value under `LazyZeroFill`.
pub(crate) fn zero_fill(file: &mut File, from: u64, to: u64) -> io::Result<()> {
    if to <= from {
        return Ok(());
    }

    file.seek(SeekFrom::Start(from))?;
    let zeros = [0u8; ZERO_CHUNK];
    let mut remaining = to - from;
    while remaining > 0 {
        let n = remaining.min(ZERO_CHUNK as u64) as usize;
        file.write_all(&zeros[..n])?;
        remaining -= n as u64;
    }
    Ok(())
}

// =============================================================================
// Reservation Primitive
// =============================================================================

/// Commit blocks for `[offset, offset + len)` without writing zeros,
/// substituting a size extension where the primitive is unsupported
fn reserve_or_truncate(file: &File, offset: u64, len: u64) -> io::Result<AllocationStrategy> {
    match reserve(file, offset, len) {
        Ok(true) => Ok(AllocationStrategy::PreReserve),
        Ok(false) => {
            tracing::warn!(
                offset,
                len,
                "block reservation unsupported; substituting size extension"
            );
            file.set_len(offset + len)?;
            Ok(AllocationStrategy::PreTruncate)
        }
        Err(e) => Err(e),
    }
}

/// `posix_fallocate` wrapper: `Ok(false)` means the filesystem does not
/// support the primitive and the caller must substitute
#[cfg(unix)]
fn reserve(file: &File, offset: u64, len: u64) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    // posix_fallocate returns the error number directly (not via errno)
    let rc = unsafe {
        libc::posix_fallocate(
            file.as_raw_fd(),
            offset as libc::off_t,
            len as libc::off_t,
        )
    };

    match rc {
        0 => Ok(true),
        libc::EOPNOTSUPP | libc::EINVAL | libc::ENOSYS => Ok(false),
        err => Err(io::Error::from_raw_os_error(err)),
    }
}

#[cfg(not(unix))]
fn reserve(_file: &File, _offset: u64, _len: u64) -> io::Result<bool> {
    Ok(false)
}
