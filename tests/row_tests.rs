//! Tests for row accessors
//!
//! These tests verify:
//! - Row commit writes every column in one unit
//! - Missing columns without defaults refuse the whole commit
//! - Declared defaults fill unset columns
//! - Row reads aggregate one row across all columns

use std::path::PathBuf;

use astratable::{
    AllocationStrategy, AstraError, CellValue, ColumnSpec, ElementType, SchemaBuilder, Table,
    TableDescriptor,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_table() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("table.ast");
    (temp_dir, path)
}

/// TIME and ANTENNA are required; WEIGHT carries a default
fn row_descriptor() -> TableDescriptor {
    SchemaBuilder::new()
        .add_scalar_column("TIME", ElementType::Float64)
        .add_scalar_column("ANTENNA", ElementType::Int32)
        .add_column(
            ColumnSpec::scalar("WEIGHT", ElementType::Float64)
                .with_default(CellValue::Float64(1.0)),
        )
        .add_array_column("UVW", ElementType::Float64, &[3])
        .build()
        .unwrap()
}

// =============================================================================
// Row Commit
// =============================================================================

#[test]
fn test_commit_writes_full_row() {
    let (_temp, path) = setup_temp_table();
    let table = Table::create(&path, row_descriptor(), 2, AllocationStrategy::LazyZeroFill)
        .unwrap();

    let mut row = table.begin_row(1).unwrap();
    row.set("TIME", CellValue::Float64(123.5)).unwrap();
    row.set("ANTENNA", CellValue::Int32(7)).unwrap();
    row.set("WEIGHT", CellValue::Float64(0.5)).unwrap();
    row.set(
        "UVW",
        CellValue::Float64Array(vec![3], vec![1.0, 2.0, 3.0]),
    )
    .unwrap();
    row.commit().unwrap();

    assert_eq!(
        table.get_cell_value("TIME", 1).unwrap(),
        CellValue::Float64(123.5)
    );
    assert_eq!(
        table.get_cell_value("ANTENNA", 1).unwrap(),
        CellValue::Int32(7)
    );
    assert_eq!(
        table.get_cell_value("UVW", 1).unwrap(),
        CellValue::Float64Array(vec![3], vec![1.0, 2.0, 3.0])
    );
}

#[test]
fn test_commit_applies_default_for_unset_column() {
    let (_temp, path) = setup_temp_table();
    let table = Table::create(&path, row_descriptor(), 1, AllocationStrategy::LazyZeroFill)
        .unwrap();

    let mut row = table.begin_row(0).unwrap();
    row.set("TIME", CellValue::Float64(1.0)).unwrap();
    row.set("ANTENNA", CellValue::Int32(1)).unwrap();
    row.set(
        "UVW",
        CellValue::Float64Array(vec![3], vec![0.0, 0.0, 0.0]),
    )
    .unwrap();
    row.commit().unwrap();

    // WEIGHT was unset: its declared default landed
    assert_eq!(
        table.get_cell_value("WEIGHT", 0).unwrap(),
        CellValue::Float64(1.0)
    );
}

#[test]
fn test_commit_refuses_missing_required_column() {
    let (_temp, path) = setup_temp_table();
    let table = Table::create(&path, row_descriptor(), 1, AllocationStrategy::LazyZeroFill)
        .unwrap();

    let mut row = table.begin_row(0).unwrap();
    row.set("TIME", CellValue::Float64(9.0)).unwrap();
    // ANTENNA and UVW never set, and neither has a default

    let result = row.commit();
    assert!(matches!(result, Err(AstraError::MissingColumn(_))));

    // A refused commit writes nothing, including the cells that were set
    assert_eq!(
        table.get_cell_value("TIME", 0).unwrap(),
        CellValue::Float64(0.0)
    );
}

#[test]
fn test_set_checks_type_immediately() {
    let (_temp, path) = setup_temp_table();
    let table = Table::create(&path, row_descriptor(), 1, AllocationStrategy::LazyZeroFill)
        .unwrap();

    let mut row = table.begin_row(0).unwrap();
    let result = row.set("TIME", CellValue::Int32(3));
    assert!(matches!(result, Err(AstraError::TypeMismatch { .. })));

    let result = row.set("UVW", CellValue::Float64Array(vec![2], vec![0.0, 0.0]));
    assert!(matches!(result, Err(AstraError::ShapeMismatch { .. })));
}

#[test]
fn test_set_unknown_column() {
    let (_temp, path) = setup_temp_table();
    let table = Table::create(&path, row_descriptor(), 1, AllocationStrategy::LazyZeroFill)
        .unwrap();

    let mut row = table.begin_row(0).unwrap();
    let result = row.set("NOPE", CellValue::Float64(0.0));
    assert!(matches!(result, Err(AstraError::ColumnNotFound(_))));
}

#[test]
fn test_begin_row_out_of_range() {
    let (_temp, path) = setup_temp_table();
    let table = Table::create(&path, row_descriptor(), 1, AllocationStrategy::LazyZeroFill)
        .unwrap();

    assert!(matches!(
        table.begin_row(1),
        Err(AstraError::RowIndex { index: 1, row_count: 1 })
    ));
}

// =============================================================================
// Row Reads
// =============================================================================

#[test]
fn test_row_reader_aggregates_columns() {
    let (_temp, path) = setup_temp_table();
    let table = Table::create(&path, row_descriptor(), 1, AllocationStrategy::LazyZeroFill)
        .unwrap();

    let mut row = table.begin_row(0).unwrap();
    row.set("TIME", CellValue::Float64(11.0)).unwrap();
    row.set("ANTENNA", CellValue::Int32(4)).unwrap();
    row.set(
        "UVW",
        CellValue::Float64Array(vec![3], vec![4.0, 5.0, 6.0]),
    )
    .unwrap();
    row.commit().unwrap();

    let reader = table.row(0).unwrap();
    assert_eq!(reader.index(), 0);
    assert_eq!(reader.get("ANTENNA").unwrap(), CellValue::Int32(4));

    let values = reader.values().unwrap();
    assert_eq!(values.len(), 4);
    assert_eq!(values[0].0, "TIME");
    assert_eq!(values[0].1, CellValue::Float64(11.0));
    assert_eq!(values[2].1, CellValue::Float64(1.0)); // WEIGHT default
}

#[test]
fn test_row_accessors_invalid_after_close() {
    let (_temp, path) = setup_temp_table();
    let table = Table::create(&path, row_descriptor(), 1, AllocationStrategy::LazyZeroFill)
        .unwrap();

    let reader = table.row(0).unwrap();
    let mut builder = table.begin_row(0).unwrap();
    builder.set("TIME", CellValue::Float64(1.0)).unwrap();

    table.close().unwrap();

    assert!(matches!(
        reader.get("TIME"),
        Err(AstraError::TableClosed)
    ));
    assert!(matches!(builder.commit(), Err(AstraError::TableClosed)));
}
