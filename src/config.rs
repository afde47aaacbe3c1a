//! Strategy parameters for astratable
//!
//! Both strategies are plain values passed into table creation and write
//! calls, never process-wide state, so every combination is independently
//! testable.

use std::fmt;

/// How cells are driven into a table
///
/// All three produce identical logical content; they differ in how many
/// I/O calls it takes to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// One row × one column per call (most I/O calls, any write order)
    CellPut,

    /// One row × all columns per call, via the row accessor
    RowPut,

    /// All rows × one column per call (single contiguous extend+write)
    ColumnBulkPut,
}

/// How backing file space is reserved for fixed-extent columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStrategy {
    /// No up-front action; each write extends the file, explicitly
    /// zero-filling any gap. Unwritten cells read back as the element
    /// type's zero value.
    LazyZeroFill,

    /// One size-extension call per column before any write. Gap content is
    /// whatever the filesystem defines for truncation-extended regions
    /// (commonly zero, but implementation-defined).
    PreTruncate,

    /// One block-reservation call per column (commits physical space
    /// without writing zeros). Cells are undefined until written; reads
    /// are only meaningful once every cell has been covered. Falls back to
    /// [`AllocationStrategy::PreTruncate`] where the reservation primitive
    /// is unsupported, and the substitution is reported.
    PreReserve,
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStrategy::CellPut => write!(f, "cell-put"),
            WriteStrategy::RowPut => write!(f, "row-put"),
            WriteStrategy::ColumnBulkPut => write!(f, "column-bulk-put"),
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationStrategy::LazyZeroFill => write!(f, "lazy-zero-fill"),
            AllocationStrategy::PreTruncate => write!(f, "pre-truncate"),
            AllocationStrategy::PreReserve => write!(f, "pre-reserve"),
        }
    }
}
