//! Element codecs
//!
//! One implementation of the little-endian on-disk codec per supported
//! element type. Zeroed bytes decode to the type's zero value, which is
//! what the lazy-fill read path relies on.

use bytes::{BufMut, BytesMut};
use num_complex::Complex;

use crate::schema::ElementType;

/// A cell element with a fixed-width little-endian byte layout
pub trait Element: Copy + Send + Sync + 'static {
    /// Tag this Rust type maps to in a column specification
    const ELEMENT_TYPE: ElementType;

    /// On-disk width in bytes
    const SIZE: usize;

    /// Append this element's bytes to a buffer
    fn put<B: BufMut>(&self, buf: &mut B);

    /// Read one element from the front of `buf`
    ///
    /// `buf` must hold at least `SIZE` bytes.
    fn get(buf: &[u8]) -> Self;
}

impl Element for bool {
    const ELEMENT_TYPE: ElementType = ElementType::Bool;
    const SIZE: usize = 1;

    fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(*self as u8);
    }

    fn get(buf: &[u8]) -> Self {
        buf[0] != 0
    }
}

impl Element for i32 {
    const ELEMENT_TYPE: ElementType = ElementType::Int32;
    const SIZE: usize = 4;

    fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32_le(*self);
    }

    fn get(buf: &[u8]) -> Self {
        i32::from_le_bytes(buf[0..4].try_into().unwrap())
    }
}

impl Element for f64 {
    const ELEMENT_TYPE: ElementType = ElementType::Float64;
    const SIZE: usize = 8;

    fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_f64_le(*self);
    }

    fn get(buf: &[u8]) -> Self {
        f64::from_le_bytes(buf[0..8].try_into().unwrap())
    }
}

impl Element for Complex<f32> {
    const ELEMENT_TYPE: ElementType = ElementType::Complex64;
    const SIZE: usize = 8;

    fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_f32_le(self.re);
        buf.put_f32_le(self.im);
    }

    fn get(buf: &[u8]) -> Self {
        let re = f32::from_le_bytes(buf[0..4].try_into().unwrap());
        let im = f32::from_le_bytes(buf[4..8].try_into().unwrap());
        Complex::new(re, im)
    }
}

/// Append a slice of elements to a buffer
pub(crate) fn encode_into<T: Element>(values: &[T], buf: &mut BytesMut) {
    buf.reserve(values.len() * T::SIZE);
    for value in values {
        value.put(buf);
    }
}

/// Decode a packed byte run into elements
pub(crate) fn decode_slice<T: Element>(bytes: &[u8]) -> Vec<T> {
    bytes.chunks_exact(T::SIZE).map(T::get).collect()
}
