//! Untyped cell values
//!
//! `CellValue` carries one cell of any supported element type and shape.
//! It is the currency of the row accessor and the untyped table API; the
//! typed column accessors bypass it entirely.

use bytes::BytesMut;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::column::element::{decode_slice, encode_into, Element};
use crate::error::{AstraError, Result};
use crate::schema::{ColumnSpec, ElementType, ShapeClass};

/// One cell: a scalar or an array of a single element type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Scalar boolean
    Bool(bool),

    /// Scalar 32-bit integer
    Int32(i32),

    /// Scalar 64-bit float
    Float64(f64),

    /// Scalar single-precision complex
    Complex64(Complex<f32>),

    /// Boolean array: shape + row-major flat elements
    BoolArray(Vec<u64>, Vec<bool>),

    /// Int32 array: shape + row-major flat elements
    Int32Array(Vec<u64>, Vec<i32>),

    /// Float64 array: shape + row-major flat elements
    Float64Array(Vec<u64>, Vec<f64>),

    /// Complex64 array: shape + row-major flat elements
    Complex64Array(Vec<u64>, Vec<Complex<f32>>),
}

impl CellValue {
    /// Element type of this value
    pub fn element_type(&self) -> ElementType {
        match self {
            CellValue::Bool(_) | CellValue::BoolArray(..) => ElementType::Bool,
            CellValue::Int32(_) | CellValue::Int32Array(..) => ElementType::Int32,
            CellValue::Float64(_) | CellValue::Float64Array(..) => ElementType::Float64,
            CellValue::Complex64(_) | CellValue::Complex64Array(..) => ElementType::Complex64,
        }
    }

    /// Array shape, or `None` for scalars
    pub fn shape(&self) -> Option<&[u64]> {
        match self {
            CellValue::BoolArray(shape, _)
            | CellValue::Int32Array(shape, _)
            | CellValue::Float64Array(shape, _)
            | CellValue::Complex64Array(shape, _) => Some(shape),
            _ => None,
        }
    }

    /// Number of elements carried
    pub fn n_elements(&self) -> usize {
        match self {
            CellValue::Bool(_)
            | CellValue::Int32(_)
            | CellValue::Float64(_)
            | CellValue::Complex64(_) => 1,
            CellValue::BoolArray(_, v) => v.len(),
            CellValue::Int32Array(_, v) => v.len(),
            CellValue::Float64Array(_, v) => v.len(),
            CellValue::Complex64Array(_, v) => v.len(),
        }
    }

    /// Check this value against a column's element type and shape class
    ///
    /// Array values must also carry exactly `product(shape)` elements.
    pub fn check_against(&self, spec: &ColumnSpec) -> Result<()> {
        if self.element_type() != spec.element_type {
            return Err(AstraError::TypeMismatch {
                column: spec.name.clone(),
                expected: spec.element_type,
                requested: self.element_type(),
            });
        }

        match (&spec.shape, self.shape()) {
            (ShapeClass::Scalar, None) => Ok(()),
            (ShapeClass::Scalar, Some(shape)) => Err(AstraError::ShapeMismatch {
                column: spec.name.clone(),
                expected: Vec::new(),
                actual: shape.to_vec(),
            }),
            (ShapeClass::FixedArray(dims), Some(shape)) => {
                if shape != dims.as_slice() {
                    return Err(AstraError::ShapeMismatch {
                        column: spec.name.clone(),
                        expected: dims.clone(),
                        actual: shape.to_vec(),
                    });
                }
                self.check_element_count(spec)
            }
            (ShapeClass::FixedArray(dims), None) => Err(AstraError::ShapeMismatch {
                column: spec.name.clone(),
                expected: dims.clone(),
                actual: Vec::new(),
            }),
            (ShapeClass::VariableArray, Some(_)) => self.check_element_count(spec),
            (ShapeClass::VariableArray, None) => Err(AstraError::ColumnAccess {
                column: spec.name.clone(),
                expected: "array",
            }),
        }
    }

    /// Flat element count must match the carried shape
    fn check_element_count(&self, spec: &ColumnSpec) -> Result<()> {
        let declared: u64 = self
            .shape()
            .map(|s| s.iter().product())
            .unwrap_or(1);
        if self.n_elements() as u64 != declared {
            return Err(AstraError::ShapeMismatch {
                column: spec.name.clone(),
                expected: self.shape().unwrap_or(&[]).to_vec(),
                actual: vec![self.n_elements() as u64],
            });
        }
        Ok(())
    }

    /// Encode the payload bytes of this value (little-endian, row-major)
    pub(crate) fn encode_payload(&self) -> BytesMut {
        let size = self.element_type().element_size();
        let mut buf = BytesMut::with_capacity(self.n_elements() * size);
        match self {
            CellValue::Bool(v) => encode_into(&[*v], &mut buf),
            CellValue::Int32(v) => encode_into(&[*v], &mut buf),
            CellValue::Float64(v) => encode_into(&[*v], &mut buf),
            CellValue::Complex64(v) => encode_into(&[*v], &mut buf),
            CellValue::BoolArray(_, v) => encode_into(v, &mut buf),
            CellValue::Int32Array(_, v) => encode_into(v, &mut buf),
            CellValue::Float64Array(_, v) => encode_into(v, &mut buf),
            CellValue::Complex64Array(_, v) => encode_into(v, &mut buf),
        }
        buf
    }

    /// Decode one scalar cell from payload bytes
    pub(crate) fn decode_scalar(ty: ElementType, bytes: &[u8]) -> CellValue {
        match ty {
            ElementType::Bool => CellValue::Bool(bool::get(bytes)),
            ElementType::Int32 => CellValue::Int32(i32::get(bytes)),
            ElementType::Float64 => CellValue::Float64(f64::get(bytes)),
            ElementType::Complex64 => CellValue::Complex64(Complex::<f32>::get(bytes)),
        }
    }

    /// Decode one array cell from payload bytes
    pub(crate) fn decode_array(ty: ElementType, shape: Vec<u64>, bytes: &[u8]) -> CellValue {
        match ty {
            ElementType::Bool => CellValue::BoolArray(shape, decode_slice(bytes)),
            ElementType::Int32 => CellValue::Int32Array(shape, decode_slice(bytes)),
            ElementType::Float64 => CellValue::Float64Array(shape, decode_slice(bytes)),
            ElementType::Complex64 => CellValue::Complex64Array(shape, decode_slice(bytes)),
        }
    }
}
