//! Verifier
//!
//! Deterministic read-back checksum: rows in ascending index order,
//! columns in descriptor order, every element of every cell folded into
//! one floating-point accumulator (real before imaginary for complex
//! values). Identical logical content yields an identical checksum, so
//! write and allocation strategies can be compared for correctness
//! despite their different I/O call patterns.

use crate::error::Result;
use crate::schema::CellValue;
use crate::table::Table;

/// Fold every written cell of the table into a running checksum
pub fn checksum(table: &Table) -> Result<f64> {
    let names = table.column_names();
    let mut acc = 0.0f64;

    for row in 0..table.n_rows() {
        for name in &names {
            let value = table.get_cell_value(name, row)?;
            fold(&value, &mut acc);
        }
    }
    Ok(acc)
}

/// Add one cell's elements to the accumulator, in stored order
fn fold(value: &CellValue, acc: &mut f64) {
    match value {
        CellValue::Bool(v) => *acc += if *v { 1.0 } else { 0.0 },
        CellValue::Int32(v) => *acc += f64::from(*v),
        CellValue::Float64(v) => *acc += v,
        CellValue::Complex64(v) => {
            *acc += f64::from(v.re);
            *acc += f64::from(v.im);
        }
        CellValue::BoolArray(_, vs) => {
            for v in vs {
                *acc += if *v { 1.0 } else { 0.0 };
            }
        }
        CellValue::Int32Array(_, vs) => {
            for v in vs {
                *acc += f64::from(*v);
            }
        }
        CellValue::Float64Array(_, vs) => {
            for v in vs {
                *acc += v;
            }
        }
        CellValue::Complex64Array(_, vs) => {
            for v in vs {
                *acc += f64::from(v.re);
                *acc += f64::from(v.im);
            }
        }
    }
}
