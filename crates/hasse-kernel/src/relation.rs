//! Boolean relation matrices and their law validators.
//!
//! A [`Relation`] is the untyped ground floor of the crate: a square
//! boolean matrix over elements `0..n`, with optional display labels.
//! It makes no promise about order laws; those are checked on demand,
//! so callers can build relations speculatively and upgrade them to a
//! validated [`Poset`](crate::Poset) afterwards.
//!
//! The attribute name `leq` is deliberately order-flavored even for
//! arbitrary relations, because relations exist mostly to be upgraded.

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};
use crate::graph;
use crate::matrix::BoolMatrix;
use crate::poset::Poset;

/// An immutable binary relation over elements `0..n`.
///
/// `leq(i, j)` reads "i is below-or-equal j". Labels are display-only
/// and play no role in any algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    matrix: BoolMatrix,
    labels: Option<Vec<String>>,
}

impl Relation {
    /// Wrap a matrix, validating the label count if labels are given.
    pub fn new(matrix: BoolMatrix, labels: Option<Vec<String>>) -> Result<Self> {
        if let Some(ref l) = labels {
            if l.len() != matrix.n() {
                return Err(OrderError::LabelCount {
                    expected: matrix.n(),
                    found: l.len(),
                });
            }
        }
        Ok(Self { matrix, labels })
    }

    pub(crate) fn unchecked(matrix: BoolMatrix, labels: Option<Vec<String>>) -> Self {
        Self { matrix, labels }
    }

    /// Wrap a bare matrix with no labels. Always valid, since a
    /// relation promises no laws.
    pub fn from_matrix(matrix: BoolMatrix) -> Self {
        Self::unchecked(matrix, None)
    }

    /// Number of elements.
    pub fn n(&self) -> usize {
        self.matrix.n()
    }

    /// Whether `i` is below-or-equal `j`.
    #[inline]
    pub fn leq(&self, i: usize, j: usize) -> bool {
        self.matrix.get(i, j)
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &BoolMatrix {
        &self.matrix
    }

    /// Display labels, if any.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// The label of element `i`, falling back to its index.
    pub fn label(&self, i: usize) -> String {
        match &self.labels {
            Some(l) => l[i].clone(),
            None => i.to_string(),
        }
    }

    /// The n-element chain (total order), correct by construction.
    pub fn total(n: usize) -> Self {
        let children: Vec<Vec<usize>> = (0..n).map(|i| if i > 0 { vec![i - 1] } else { vec![] }).collect();
        let (_, _, leq) = graph::children_to_closure(&children);
        Self::unchecked(leq, None)
    }

    /// From covering-relation form: `children[x]` lists the elements
    /// covered by `x`. The full order is the reachability closure.
    pub fn from_children(children: &[Vec<usize>]) -> Self {
        let (_, _, leq) = graph::children_to_closure(children);
        Self::unchecked(leq, None)
    }

    /// From covering-relation form: `parents[x]` lists the elements
    /// covering `x`.
    pub fn from_parents(parents: &[Vec<usize>]) -> Self {
        Self::from_children(&invert_adjacency(parents))
    }

    /// From arbitrary `(below, above)` edges, closed transitively.
    pub fn from_up_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut m = BoolMatrix::identity(n);
        for &(below, above) in edges {
            m.set(below, above, true);
        }
        Self::unchecked(graph::transitive_closure(&m), None)
    }

    /// From arbitrary `(above, below)` edges, closed transitively.
    pub fn from_down_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let flipped: Vec<(usize, usize)> = edges.iter().map(|&(a, b)| (b, a)).collect();
        Self::from_up_edges(n, &flipped)
    }

    /// Dense O(n²) evaluation of a comparison function over labeled
    /// elements: `leq(i, j) = cmp(&elems[i], &elems[j])`.
    pub fn from_fn<T: ToString>(elems: &[T], mut cmp: impl FnMut(&T, &T) -> bool) -> Self {
        let matrix = BoolMatrix::from_fn(elems.len(), |i, j| cmp(&elems[i], &elems[j]));
        let labels = elems.iter().map(T::to_string).collect();
        Self::unchecked(matrix, Some(labels))
    }

    /// Copy with new labels; a no-op when the labels are unchanged.
    pub fn relabel(&self, labels: Option<Vec<String>>) -> Result<Self> {
        if labels.as_deref() == self.labels.as_deref() {
            return Ok(self.clone());
        }
        Self::new(self.matrix.clone(), labels)
    }

    /// Structure-preserving relabeling: element `i` of `self` becomes
    /// element `perm[i]` of the output (`perm[i]` becomes `i` when
    /// `inverse` is set).
    pub fn reindex(&self, perm: &[usize], inverse: bool) -> Result<Self> {
        let n = self.n();
        if !graph::is_permutation(perm, n) {
            return Err(OrderError::InvalidPermutation {
                perm: perm.to_vec(),
            });
        }
        let forward;
        let f = if inverse {
            forward = graph::inverse_permutation(perm);
            &forward
        } else {
            perm
        };
        Ok(self.apply_permutation(f))
    }

    pub(crate) fn apply_permutation(&self, f: &[usize]) -> Self {
        let n = self.n();
        let mut matrix = BoolMatrix::filled(n, false);
        for i in 0..n {
            for j in 0..n {
                if self.leq(i, j) {
                    matrix.set(f[i], f[j], true);
                }
            }
        }
        let labels = self.labels.as_ref().map(|l| {
            let mut out = vec![String::new(); n];
            for i in 0..n {
                out[f[i]] = l[i].clone();
            }
            out
        });
        Self::unchecked(matrix, labels)
    }

    /// The order-reversed relation (transposed matrix).
    pub fn dual(&self) -> Self {
        Self::unchecked(self.matrix.transpose(), self.labels.clone())
    }

    /// Reflexivity: `leq(i, i)` for every element.
    pub fn assert_is_reflexive(&self) -> Result<()> {
        match (0..self.n()).find(|&i| !self.leq(i, i)) {
            Some(index) => Err(OrderError::NotReflexive { index }),
            None => Ok(()),
        }
    }

    /// Antisymmetry: no two distinct elements are mutually related.
    pub fn assert_is_antisymmetric(&self) -> Result<()> {
        let n = self.n();
        for i in 0..n {
            for j in 0..n {
                if i != j && self.leq(i, j) && self.leq(j, i) {
                    return Err(OrderError::NotAntisymmetric { i, j });
                }
            }
        }
        Ok(())
    }

    /// Transitivity: every two-step path has a direct relation.
    pub fn assert_is_transitive(&self) -> Result<()> {
        let n = self.n();
        for i in 0..n {
            for j in 0..n {
                if self.leq(i, j) {
                    continue;
                }
                if let Some(via) = (0..n).find(|&k| self.leq(i, k) && self.leq(k, j)) {
                    return Err(OrderError::NotTransitive { i, j, via });
                }
            }
        }
        Ok(())
    }

    /// All three poset laws, first violation wins.
    pub fn assert_is_poset(&self) -> Result<()> {
        self.assert_is_reflexive()?;
        self.assert_is_antisymmetric()?;
        self.assert_is_transitive()
    }

    pub fn is_reflexive(&self) -> bool {
        self.assert_is_reflexive().is_ok()
    }

    pub fn is_antisymmetric(&self) -> bool {
        self.assert_is_antisymmetric().is_ok()
    }

    pub fn is_transitive(&self) -> bool {
        self.assert_is_transitive().is_ok()
    }

    pub fn is_poset(&self) -> bool {
        self.assert_is_poset().is_ok()
    }

    /// Upgrade to a [`Poset`], running the law validators when `check`
    /// is set. Unchecked upgrades are for construction-by-proof callers
    /// (e.g. growth operators) that guarantee the laws themselves.
    pub fn into_poset(self, check: bool) -> Result<Poset> {
        if check {
            self.assert_is_poset()?;
        }
        Ok(Poset::from_relation(self))
    }
}

fn invert_adjacency(adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new(); adj.len()];
    for (i, targets) in adj.iter().enumerate() {
        for &j in targets {
            out[j].push(i);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order_laws() {
        let r = Relation::total(5);
        assert!(r.is_poset());
        assert!(r.leq(0, 4));
        assert!(!r.leq(4, 0));
    }

    #[test]
    fn up_and_down_edges_agree() {
        let up = Relation::from_up_edges(3, &[(0, 1), (1, 2)]);
        let down = Relation::from_down_edges(3, &[(1, 0), (2, 1)]);
        assert_eq!(up.matrix(), down.matrix());
        assert!(up.leq(0, 2));
    }

    #[test]
    fn from_fn_divisibility() {
        let r = Relation::from_fn(&[1u32, 2, 3, 6], |a, b| b % a == 0);
        assert!(r.is_poset());
        assert!(r.leq(1, 3)); // 2 divides 6
        assert!(!r.leq(1, 2)); // 2 does not divide 3
        assert_eq!(r.label(3), "6");
    }

    #[test]
    fn law_witnesses() {
        let irreflexive = Relation::new(BoolMatrix::filled(2, false), None).unwrap();
        assert_eq!(
            irreflexive.assert_is_reflexive().unwrap_err(),
            OrderError::NotReflexive { index: 0 }
        );

        let cyclic = Relation::new(BoolMatrix::filled(2, true), None).unwrap();
        assert_eq!(
            cyclic.assert_is_antisymmetric().unwrap_err(),
            OrderError::NotAntisymmetric { i: 0, j: 1 }
        );

        // 0<=1 and 1<=2 without 0<=2.
        let m = BoolMatrix::from_fn(3, |i, j| i == j || (i == 0 && j == 1) || (i == 1 && j == 2));
        let nontransitive = Relation::new(m, None).unwrap();
        assert_eq!(
            nontransitive.assert_is_transitive().unwrap_err(),
            OrderError::NotTransitive { i: 0, j: 2, via: 1 }
        );
    }

    #[test]
    fn relabel_validates_count() {
        let r = Relation::total(3);
        let err = r.relabel(Some(vec!["a".into()])).unwrap_err();
        assert_eq!(
            err,
            OrderError::LabelCount {
                expected: 3,
                found: 1
            }
        );
        let ok = r.relabel(Some(vec!["a".into(), "b".into(), "c".into()])).unwrap();
        assert_eq!(ok.label(2), "c");
    }

    #[test]
    fn reindex_requires_permutation() {
        let r = Relation::total(3);
        assert!(r.reindex(&[0, 0, 1], false).is_err());
        assert!(r.reindex(&[2, 1], false).is_err());
    }

    #[test]
    fn reindex_round_trip() {
        let r = Relation::from_up_edges(4, &[(0, 1), (0, 2), (1, 3)]);
        let perm = [2, 0, 3, 1];
        let there = r.reindex(&perm, false).unwrap();
        let back = there.reindex(&perm, true).unwrap();
        assert_eq!(back.matrix(), r.matrix());
    }

    #[test]
    fn serde_round_trip() {
        let r = Relation::from_up_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let json = serde_json::to_string(&r).unwrap();
        let back: Relation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
