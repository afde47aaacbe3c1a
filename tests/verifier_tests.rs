//! Tests for the read-back verifier
//!
//! These tests verify:
//! - Deterministic folding across element types and shapes
//! - The closed-form benchmark checksum
//! - Concurrent readers observe identical content

use astratable::{
    checksum, AllocationStrategy, CellValue, Complex, ElementType, SchemaBuilder, Table,
};
use tempfile::TempDir;

// =============================================================================
// Folding Semantics
// =============================================================================

#[test]
fn test_empty_table_checksum_is_zero() {
    let temp_dir = TempDir::new().unwrap();
    let descriptor = SchemaBuilder::new()
        .add_scalar_column("TIME", ElementType::Float64)
        .build()
        .unwrap();
    let table = Table::create(
        &temp_dir.path().join("t"),
        descriptor,
        0,
        AllocationStrategy::LazyZeroFill,
    )
    .unwrap();

    assert_eq!(checksum(&table).unwrap(), 0.0);
}

#[test]
fn test_mixed_type_folding() {
    let temp_dir = TempDir::new().unwrap();
    let descriptor = SchemaBuilder::new()
        .add_scalar_column("FLAG", ElementType::Bool)
        .add_scalar_column("ANTENNA", ElementType::Int32)
        .add_scalar_column("TIME", ElementType::Float64)
        .add_scalar_column("GAIN", ElementType::Complex64)
        .build()
        .unwrap();
    let table = Table::create(
        &temp_dir.path().join("t"),
        descriptor,
        2,
        AllocationStrategy::LazyZeroFill,
    )
    .unwrap();

    table.put_cell_value("FLAG", 0, &CellValue::Bool(true)).unwrap();
    table.put_cell_value("ANTENNA", 0, &CellValue::Int32(10)).unwrap();
    table.put_cell_value("TIME", 0, &CellValue::Float64(2.5)).unwrap();
    table
        .put_cell_value("GAIN", 0, &CellValue::Complex64(Complex::new(1.5, -0.5)))
        .unwrap();

    // Row 1 left unwritten: contributes zero
    // true + 10 + 2.5 + (1.5 + -0.5) = 14.5
    assert_eq!(checksum(&table).unwrap(), 14.5);
}

#[test]
fn test_array_cells_fold_every_element() {
    let temp_dir = TempDir::new().unwrap();
    let descriptor = SchemaBuilder::new()
        .add_array_column("UVW", ElementType::Float64, &[3])
        .add_variable_array_column("SPECTRUM", ElementType::Int32)
        .build()
        .unwrap();
    let table = Table::create(
        &temp_dir.path().join("t"),
        descriptor,
        2,
        AllocationStrategy::LazyZeroFill,
    )
    .unwrap();

    let uvw = table.array_column::<f64>("UVW").unwrap();
    uvw.put(0, &[3], &[1.0, 2.0, 3.0]).unwrap();

    let spectrum = table.array_column::<i32>("SPECTRUM").unwrap();
    spectrum.put(0, &[4], &[1, 2, 3, 4]).unwrap();
    // Row 1's variable cell is never written: the empty array adds nothing

    // (1+2+3) + (1+2+3+4) = 16
    assert_eq!(checksum(&table).unwrap(), 16.0);
}

// =============================================================================
// Closed-Form Benchmark Checksum
// =============================================================================

#[test]
fn test_benchmark_closed_form() {
    const ROWS: u64 = 1000;

    let temp_dir = TempDir::new().unwrap();
    let mut builder = SchemaBuilder::new();
    for i in 0..3 {
        builder = builder.add_scalar_column(format!("COL_{}", i), ElementType::Float64);
    }
    let descriptor = builder
        .add_array_column("UVW", ElementType::Float64, &[3])
        .build()
        .unwrap();

    let table = Table::create(
        &temp_dir.path().join("t"),
        descriptor,
        ROWS,
        AllocationStrategy::LazyZeroFill,
    )
    .unwrap();

    for c in 0..3u64 {
        let column = table.scalar_column::<f64>(&format!("COL_{}", c)).unwrap();
        let values: Vec<f64> = (0..ROWS).map(|r| c as f64 * 1000.0 + r as f64).collect();
        column.put_all(&values).unwrap();
    }
    let uvw = table.array_column::<f64>("UVW").unwrap();
    let mut values = Vec::with_capacity(3 * ROWS as usize);
    for r in 0..ROWS {
        values.push(r as f64 * 0.1);
        values.push(r as f64 * 0.2);
        values.push(r as f64 * 0.3);
    }
    uvw.put_all(&[3], &values).unwrap();

    let sum = checksum(&table).unwrap();

    let mut expected = 0.0f64;
    for r in 0..ROWS {
        for c in 0..3u64 {
            expected += c as f64 * 1000.0 + r as f64;
        }
        expected += r as f64 * 0.1;
        expected += r as f64 * 0.2;
        expected += r as f64 * 0.3;
    }
    assert!((sum - expected).abs() < 1e-6, "{} vs {}", sum, expected);
}

// =============================================================================
// Concurrent Readers
// =============================================================================

#[test]
fn test_concurrent_readers_agree() {
    let temp_dir = TempDir::new().unwrap();
    let descriptor = SchemaBuilder::new()
        .add_scalar_column("TIME", ElementType::Float64)
        .add_array_column("UVW", ElementType::Float64, &[3])
        .build()
        .unwrap();
    let table = Table::create(
        &temp_dir.path().join("t"),
        descriptor,
        500,
        AllocationStrategy::PreTruncate,
    )
    .unwrap();

    let time = table.scalar_column::<f64>("TIME").unwrap();
    let values: Vec<f64> = (0..500).map(|r| r as f64).collect();
    time.put_all(&values).unwrap();

    let uvw = table.array_column::<f64>("UVW").unwrap();
    let mut cells = Vec::with_capacity(1500);
    for r in 0..500 {
        cells.extend_from_slice(&[r as f64, 0.0, -(r as f64)]);
    }
    uvw.put_all(&[3], &cells).unwrap();

    // Fully written table: concurrent readers share no mutable state
    let sums = crossbeam::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|_| checksum(&table).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<f64>>()
    })
    .unwrap();

    for sum in &sums[1..] {
        assert_eq!(*sum, sums[0]);
    }
}
