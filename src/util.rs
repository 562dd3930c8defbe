//! Shared scalar-vector and scalar-matrix helpers.

#![allow(non_snake_case)]

extern crate alloc;

use alloc::vec::Vec;
use core::iter::FromIterator;

use curve25519_dalek::scalar::Scalar;

/// Read 32 bytes from `data`, used when decoding wire-format scalars
/// and compressed points.
pub fn read32(data: &[u8]) -> [u8; 32] {
    let mut buf32 = [0u8; 32];
    buf32[..].copy_from_slice(&data[..32]);
    buf32
}

/// Sums `x^1 + x^2 + ... + x^n` using the standard doubling trick,
/// correctly wrapping around the scalar field's modulus.
pub fn sum_of_powers(x: &Scalar, n: usize) -> Scalar {
    if n == 0 {
        return Scalar::ZERO;
    }
    if n == 1 {
        return *x;
    }
    // S0(n) = 1 + x + ... + x^(n-1), the 0-indexed geometric sum.
    let mut m = n;
    let mut result = Scalar::ONE + x;
    let mut factor = *x;
    while m > 2 {
        factor *= factor;
        result += factor * result;
        m /= 2;
    }
    // S1(n) = x + x^2 + ... + x^n = x * S0(n).
    *x * result
}

/// A scalar matrix of `rows` rows and `cols` columns, stored
/// column-major: `(i, j) ↦ j * rows + i`. The flattened layout must
/// agree with the indexed generator families it's paired against, so
/// the indexing scheme here is load-bearing, not incidental.
#[derive(Clone, Debug)]
pub struct ScalarMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Scalar>,
}

impl ScalarMatrix {
    pub fn zero(rows: usize, cols: usize) -> Self {
        ScalarMatrix {
            rows,
            cols,
            data: Vec::from_iter(core::iter::repeat(Scalar::ZERO).take(rows * cols)),
        }
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows && j < self.cols);
        j * self.rows + i
    }

    pub fn get(&self, i: usize, j: usize) -> Scalar {
        self.data[self.index(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, v: Scalar) {
        let idx = self.index(i, j);
        self.data[idx] = v;
    }

    /// Flattened column-major view: linear index `k` corresponds to
    /// `(i, j) = (k % rows, k / rows)`.
    pub fn as_flat(&self) -> &[Scalar] {
        &self.data
    }
}
