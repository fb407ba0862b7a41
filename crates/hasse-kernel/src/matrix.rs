//! Dense square matrices backing relations.
//!
//! All order structure in this crate lives in a dense boolean matrix
//! `leq[i][j]` ("i is below-or-equal j"). Matrices are immutable once
//! constructed, so derived views, tables, and hashes are cached under that
//! assumption, so no public mutator exists.

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};

/// A square boolean matrix with flat row-major storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoolMatrix {
    n: usize,
    bits: Vec<bool>,
}

impl BoolMatrix {
    /// A matrix with every entry set to `value`.
    pub fn filled(n: usize, value: bool) -> Self {
        Self {
            n,
            bits: vec![value; n * n],
        }
    }

    /// The identity relation: true exactly on the diagonal.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::filled(n, false);
        for i in 0..n {
            m.set(i, i, true);
        }
        m
    }

    /// Build from explicit rows, validating squareness.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let n = rows.len();
        for (row, entries) in rows.iter().enumerate() {
            if entries.len() != n {
                return Err(OrderError::MatrixShape {
                    row,
                    found: entries.len(),
                    expected: n,
                });
            }
        }
        Ok(Self {
            n,
            bits: rows.iter().flatten().copied().collect(),
        })
    }

    /// Build by evaluating `f(i, j)` densely over `0..n`.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut m = Self::filled(n, false);
        for i in 0..n {
            for j in 0..n {
                m.set(i, j, f(i, j));
            }
        }
        m
    }

    /// Side length of the matrix.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Entry at `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.bits[i * self.n + j]
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize, j: usize, value: bool) {
        self.bits[i * self.n + j] = value;
    }

    /// Row `i` as a slice (the up-set signature of `i` in a `leq` matrix).
    pub fn row(&self, i: usize) -> &[bool] {
        &self.bits[i * self.n..(i + 1) * self.n]
    }

    /// Column `j` collected into a vector (the down-set signature of `j`).
    pub fn column(&self, j: usize) -> Vec<bool> {
        (0..self.n).map(|i| self.get(i, j)).collect()
    }

    /// Number of true entries in column `j`.
    pub fn column_count(&self, j: usize) -> usize {
        (0..self.n).filter(|&i| self.get(i, j)).count()
    }

    /// Number of true entries in row `i`.
    pub fn row_count(&self, i: usize) -> usize {
        self.row(i).iter().filter(|&&b| b).count()
    }

    /// The transposed matrix (the order-reversed relation).
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.n, |i, j| self.get(j, i))
    }

    /// Boolean matrix product: `out[i][j]` iff some `k` links `i` to `j`.
    pub fn compose(&self, other: &Self) -> Self {
        debug_assert_eq!(self.n, other.n);
        Self::from_fn(self.n, |i, j| {
            (0..self.n).any(|k| self.get(i, k) && other.get(k, j))
        })
    }

    /// Elementwise disjunction.
    pub fn or(&self, other: &Self) -> Self {
        debug_assert_eq!(self.n, other.n);
        Self::from_fn(self.n, |i, j| self.get(i, j) || other.get(i, j))
    }
}

/// All-pairs distance matrix over `0..n`, with `n` standing for infinity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistMatrix {
    n: usize,
    vals: Vec<u32>,
}

impl DistMatrix {
    pub(crate) fn new(n: usize, vals: Vec<u32>) -> Self {
        debug_assert_eq!(vals.len(), n * n);
        Self { n, vals }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// The sentinel value meaning "unreachable".
    pub fn infinity(&self) -> u32 {
        self.n as u32
    }

    /// Distance from `i` up to `j`, or [`Self::infinity`] if unreachable.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.vals[i * self.n + j]
    }

    /// Whether `j` is reachable upward from `i`.
    pub fn is_reachable(&self, i: usize, j: usize) -> bool {
        self.get(i, j) < self.infinity()
    }
}

/// A binary-operation table over elements, e.g. the `lub`/`glb` tables
/// of a lattice: `get(i, j)` is the element index of `i op j`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairTable {
    n: usize,
    vals: Vec<usize>,
}

impl PairTable {
    pub(crate) fn new(n: usize, vals: Vec<usize>) -> Self {
        debug_assert_eq!(vals.len(), n * n);
        Self { n, vals }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> usize {
        self.vals[i * self.n + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged() {
        let err = BoolMatrix::from_rows(&[vec![true, false], vec![true]]).unwrap_err();
        assert_eq!(
            err,
            OrderError::MatrixShape {
                row: 1,
                found: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn compose_is_boolean_matmul() {
        // 0 -> 1 -> 2 as a strict adjacency.
        let a = BoolMatrix::from_fn(3, |i, j| j == i + 1);
        let aa = a.compose(&a);
        assert!(aa.get(0, 2));
        assert!(!aa.get(0, 1));
        assert!(!aa.get(1, 2));
    }

    #[test]
    fn transpose_involution() {
        let m = BoolMatrix::from_fn(4, |i, j| i <= j);
        assert_eq!(m.transpose().transpose(), m);
    }
}
