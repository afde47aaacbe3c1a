//! Tests for schema building
//!
//! These tests verify:
//! - Descriptor construction and column lookup
//! - Rejection of malformed column sets
//! - Default-value validation at build time
//! - Element size bookkeeping

use astratable::{
    AstraError, CellValue, ColumnSpec, ElementType, SchemaBuilder, ShapeClass, TableDescriptor,
};

// =============================================================================
// Descriptor Construction
// =============================================================================

#[test]
fn test_build_basic_descriptor() {
    let descriptor = SchemaBuilder::new()
        .add_scalar_column("TIME", ElementType::Float64)
        .add_scalar_column("ANTENNA1", ElementType::Int32)
        .add_array_column("UVW", ElementType::Float64, &[3])
        .add_variable_array_column("SPECTRUM", ElementType::Complex64)
        .build()
        .unwrap();

    assert_eq!(descriptor.n_columns(), 4);
    assert_eq!(descriptor.column_index("TIME"), Some(0));
    assert_eq!(descriptor.column_index("SPECTRUM"), Some(3));
    assert_eq!(descriptor.column_index("MISSING"), None);

    let uvw = descriptor.column("UVW").unwrap();
    assert_eq!(uvw.element_type, ElementType::Float64);
    assert_eq!(uvw.shape, ShapeClass::FixedArray(vec![3]));
}

#[test]
fn test_builder_via_descriptor() {
    let descriptor = TableDescriptor::builder()
        .add_scalar_column("FLAG", ElementType::Bool)
        .build()
        .unwrap();

    assert_eq!(descriptor.n_columns(), 1);
}

#[test]
fn test_column_order_is_declaration_order() {
    let descriptor = SchemaBuilder::new()
        .add_scalar_column("C", ElementType::Float64)
        .add_scalar_column("A", ElementType::Float64)
        .add_scalar_column("B", ElementType::Float64)
        .build()
        .unwrap();

    let names: Vec<_> = descriptor.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["C", "A", "B"]);
}

// =============================================================================
// Rejection of Malformed Column Sets
// =============================================================================

#[test]
fn test_duplicate_name_rejected() {
    let result = SchemaBuilder::new()
        .add_scalar_column("TIME", ElementType::Float64)
        .add_scalar_column("TIME", ElementType::Int32)
        .build();

    assert!(matches!(result, Err(AstraError::Schema(_))));
}

#[test]
fn test_empty_name_rejected() {
    let result = SchemaBuilder::new()
        .add_scalar_column("", ElementType::Float64)
        .build();

    assert!(matches!(result, Err(AstraError::Schema(_))));
}

#[test]
fn test_empty_schema_rejected_by_default() {
    let result = SchemaBuilder::new().build();
    assert!(matches!(result, Err(AstraError::Schema(_))));
}

#[test]
fn test_empty_schema_allowed_when_requested() {
    let descriptor = SchemaBuilder::new().allow_empty().build().unwrap();
    assert_eq!(descriptor.n_columns(), 0);
}

#[test]
fn test_fixed_array_without_dimensions_rejected() {
    let result = SchemaBuilder::new()
        .add_array_column("DATA", ElementType::Float64, &[])
        .build();

    assert!(matches!(result, Err(AstraError::Schema(_))));
}

#[test]
fn test_fixed_array_with_zero_dimension_rejected() {
    let result = SchemaBuilder::new()
        .add_array_column("DATA", ElementType::Float64, &[4, 0])
        .build();

    assert!(matches!(result, Err(AstraError::Schema(_))));
}

// =============================================================================
// Default Values
// =============================================================================

#[test]
fn test_valid_default_accepted() {
    let descriptor = SchemaBuilder::new()
        .add_column(
            ColumnSpec::scalar("WEIGHT", ElementType::Float64)
                .with_default(CellValue::Float64(1.0)),
        )
        .build()
        .unwrap();

    assert!(descriptor.column("WEIGHT").unwrap().default.is_some());
}

#[test]
fn test_default_with_wrong_type_rejected() {
    let result = SchemaBuilder::new()
        .add_column(
            ColumnSpec::scalar("WEIGHT", ElementType::Float64).with_default(CellValue::Int32(1)),
        )
        .build();

    assert!(matches!(result, Err(AstraError::TypeMismatch { .. })));
}

#[test]
fn test_default_with_wrong_shape_rejected() {
    let result = SchemaBuilder::new()
        .add_column(
            ColumnSpec::fixed_array("UVW", ElementType::Float64, &[3])
                .with_default(CellValue::Float64Array(vec![2], vec![0.0, 0.0])),
        )
        .build();

    assert!(matches!(result, Err(AstraError::ShapeMismatch { .. })));
}

#[test]
fn test_array_default_for_scalar_column_rejected() {
    let result = SchemaBuilder::new()
        .add_column(
            ColumnSpec::scalar("WEIGHT", ElementType::Float64)
                .with_default(CellValue::Float64Array(vec![1], vec![1.0])),
        )
        .build();

    assert!(matches!(result, Err(AstraError::ShapeMismatch { .. })));
}

// =============================================================================
// Size Bookkeeping
// =============================================================================

#[test]
fn test_element_sizes() {
    assert_eq!(ElementType::Bool.element_size(), 1);
    assert_eq!(ElementType::Int32.element_size(), 4);
    assert_eq!(ElementType::Float64.element_size(), 8);
    assert_eq!(ElementType::Complex64.element_size(), 8);
}

#[test]
fn test_cell_bytes() {
    let scalar = ColumnSpec::scalar("A", ElementType::Float64);
    assert_eq!(scalar.fixed_elements(), Some(1));
    assert_eq!(scalar.cell_bytes(), Some(8));

    let fixed = ColumnSpec::fixed_array("B", ElementType::Complex64, &[4, 2]);
    assert_eq!(fixed.fixed_elements(), Some(8));
    assert_eq!(fixed.cell_bytes(), Some(64));

    let variable = ColumnSpec::variable_array("C", ElementType::Int32);
    assert_eq!(variable.fixed_elements(), None);
    assert_eq!(variable.cell_bytes(), None);
}
