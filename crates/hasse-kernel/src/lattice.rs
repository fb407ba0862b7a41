//! Lattices: posets with all pairwise joins and meets.
//!
//! The join (`lub`) table is derived from the relation matrix alone: the
//! join of `i` and `j` is the unique element whose up-set equals the
//! intersection of both up-sets. Absence of such an element is exactly
//! what distinguishes a mere poset from a lattice, and it is reported
//! with the offending pair and its minimal common upper bounds.
//!
//! The meet (`glb`) table is the join table of the order-reversed
//! matrix, so every meet property is a dual of a join property.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};
use crate::matrix::{BoolMatrix, PairTable};
use crate::poset::Poset;

/// A finite lattice over elements `0..n`.
///
/// Wraps a [`Poset`] that has (or is guaranteed by construction to
/// have) a unique bottom, a unique top, and a total join table. The
/// empty lattice is admitted.
#[derive(Debug, Serialize, Deserialize)]
pub struct Lattice {
    poset: Poset,
    #[serde(skip)]
    lub: OnceLock<Result<PairTable>>,
    #[serde(skip)]
    glb: OnceLock<Result<PairTable>>,
    #[serde(skip)]
    bottom: OnceLock<Result<usize>>,
    #[serde(skip)]
    top: OnceLock<Result<usize>>,
    #[serde(skip)]
    irreducibles: OnceLock<Vec<usize>>,
    #[serde(skip)]
    irreducible_downsets: OnceLock<Vec<Vec<usize>>>,
    #[serde(skip)]
    components: OnceLock<Result<IrreducibleComponents>>,
    #[serde(skip)]
    distributive: OnceLock<bool>,
}

/// The join-irreducible subposet split into its connected components,
/// each with a bottom-up topological order and, aligned with it, the
/// cover lists of the restricted relation (global element ids).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrreducibleComponents {
    pub topos: Vec<Vec<usize>>,
    pub children: Vec<Vec<Vec<usize>>>,
}

impl IrreducibleComponents {
    pub fn len(&self) -> usize {
        self.topos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topos.is_empty()
    }
}

impl Clone for Lattice {
    fn clone(&self) -> Self {
        Self::wrap(self.poset.clone())
    }
}

impl PartialEq for Lattice {
    fn eq(&self, other: &Self) -> bool {
        self.poset == other.poset
    }
}

impl Eq for Lattice {}

impl Lattice {
    fn wrap(poset: Poset) -> Self {
        Self {
            poset,
            lub: OnceLock::new(),
            glb: OnceLock::new(),
            bottom: OnceLock::new(),
            top: OnceLock::new(),
            irreducibles: OnceLock::new(),
            irreducible_downsets: OnceLock::new(),
            components: OnceLock::new(),
            distributive: OnceLock::new(),
        }
    }

    /// Upgrade a poset. When `check` is set this validates the poset
    /// laws, the unique extremes, and the totality of the join table.
    pub(crate) fn from_poset(poset: Poset, check: bool) -> Result<Self> {
        if check {
            poset.relation().assert_is_poset()?;
        }
        let lattice = Self::wrap(poset);
        if check && lattice.n() > 0 {
            lattice.bottom()?;
            lattice.top()?;
            lattice.lub()?;
        }
        Ok(lattice)
    }

    /// Checked construction from covering lists.
    pub fn from_children(children: &[Vec<usize>], check: bool) -> Result<Self> {
        Poset::from_children(children, check)?.into_lattice(check)
    }

    /// Checked construction from parent lists.
    pub fn from_parents(parents: &[Vec<usize>], check: bool) -> Result<Self> {
        Poset::from_parents(parents, check)?.into_lattice(check)
    }

    /// Checked construction from `(below, above)` edges.
    pub fn from_up_edges(n: usize, edges: &[(usize, usize)], check: bool) -> Result<Self> {
        Poset::from_up_edges(n, edges, check)?.into_lattice(check)
    }

    /// The n-element chain, a lattice by construction.
    pub fn total(n: usize) -> Self {
        Self::wrap(Poset::total(n))
    }

    pub fn n(&self) -> usize {
        self.poset.n()
    }

    #[inline]
    pub fn leq(&self, i: usize, j: usize) -> bool {
        self.poset.leq(i, j)
    }

    /// The underlying poset, carrying all derived graph views.
    pub fn poset(&self) -> &Poset {
        &self.poset
    }

    pub fn matrix(&self) -> &BoolMatrix {
        self.poset.matrix()
    }

    pub fn labels(&self) -> Option<&[String]> {
        self.poset.labels()
    }

    /// Permutation-invariant whole-lattice hash.
    pub fn hash(&self) -> u64 {
        self.poset.hash()
    }

    /// The join table: `lub().get(i, j)` is `i ∨ j`.
    pub fn lub(&self) -> Result<&PairTable> {
        self.lub
            .get_or_init(|| join_table(self.matrix()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The meet table, derived as the join table of the reversed order.
    pub fn glb(&self) -> Result<&PairTable> {
        self.glb
            .get_or_init(|| join_table(&self.matrix().transpose()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The unique bottom element.
    pub fn bottom(&self) -> Result<usize> {
        self.bottom
            .get_or_init(|| match self.poset.bottoms() {
                [b] => Ok(*b),
                found => Err(OrderError::NotUniqueBottom {
                    found: found.to_vec(),
                }),
            })
            .clone()
    }

    /// The unique top element.
    pub fn top(&self) -> Result<usize> {
        self.top
            .get_or_init(|| match self.poset.tops() {
                [t] => Ok(*t),
                found => Err(OrderError::NotUniqueTop {
                    found: found.to_vec(),
                }),
            })
            .clone()
    }

    /// Join of arbitrarily many elements, seeded at bottom.
    pub fn join_of(&self, elems: impl IntoIterator<Item = usize>) -> Result<usize> {
        let lub = self.lub()?;
        let mut acc = self.bottom()?;
        for e in elems {
            acc = lub.get(acc, e);
        }
        Ok(acc)
    }

    /// Meet of arbitrarily many elements, seeded at top.
    pub fn meet_of(&self, elems: impl IntoIterator<Item = usize>) -> Result<usize> {
        let glb = self.glb()?;
        let mut acc = self.top()?;
        for e in elems {
            acc = glb.get(acc, e);
        }
        Ok(acc)
    }

    /// Join-irreducible elements: those with exactly one cover below.
    pub fn irreducibles(&self) -> &[usize] {
        self.irreducibles.get_or_init(|| {
            let children = self.poset.children();
            (0..self.n()).filter(|&i| children[i].len() == 1).collect()
        })
    }

    /// For each element, the join-irreducibles below-or-equal to it.
    pub fn irreducible_downsets(&self) -> &[Vec<usize>] {
        self.irreducible_downsets.get_or_init(|| {
            (0..self.n())
                .map(|x| {
                    self.irreducibles()
                        .iter()
                        .copied()
                        .filter(|&i| self.leq(i, x))
                        .collect()
                })
                .collect()
        })
    }

    /// The join-irreducible subposet decomposed into independent
    /// connected components.
    pub fn irreducible_components(&self) -> Result<&IrreducibleComponents> {
        self.components
            .get_or_init(|| self.compute_irreducible_components())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn compute_irreducible_components(&self) -> Result<IrreducibleComponents> {
        if self.n() <= 1 {
            return Ok(IrreducibleComponents {
                topos: Vec::new(),
                children: Vec::new(),
            });
        }
        let irr = self.irreducibles();
        let sub = self.poset.subposet(irr)?;
        let global_topo = self.poset.topo_bottom_up()?;
        let mut topos = Vec::new();
        let mut children = Vec::new();
        for comp in sub.components() {
            let members: Vec<usize> = comp.iter().map(|&pos| irr[pos]).collect();
            let topo: Vec<usize> = global_topo
                .iter()
                .copied()
                .filter(|x| members.contains(x))
                .collect();
            let comp_sub = self.poset.subposet(&topo)?;
            let comp_children: Vec<Vec<usize>> = comp_sub
                .children()
                .iter()
                .map(|covered| covered.iter().map(|&q| topo[q]).collect())
                .collect();
            topos.push(topo);
            children.push(comp_children);
        }
        Ok(IrreducibleComponents { topos, children })
    }

    /// Scan for a distributivity counterexample
    /// `i ∧ (j ∨ k) ≠ (i ∧ j) ∨ (i ∧ k)`.
    pub fn assert_is_distributive(&self) -> Result<()> {
        let lub = self.lub()?;
        let glb = self.glb()?;
        let n = self.n();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    if glb.get(i, lub.get(j, k)) != lub.get(glb.get(i, j), glb.get(i, k)) {
                        return Err(OrderError::NotDistributive { i, j, k });
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether the lattice is distributive; cached, since the
    /// endomorphism algebra dispatches on it repeatedly.
    pub fn is_distributive(&self) -> bool {
        *self
            .distributive
            .get_or_init(|| self.assert_is_distributive().is_ok())
    }

    /// Modularity via Dilworth's reformulation: for `c < a`, the
    /// lattice is non-modular iff some `b` has `a ∧ b = c ∧ b` and
    /// `a ∨ b = c ∨ b`.
    pub fn assert_is_modular(&self) -> Result<()> {
        let lub = self.lub()?;
        let glb = self.glb()?;
        let n = self.n();
        for c in 0..n {
            for a in 0..n {
                if a == c || !self.leq(c, a) {
                    continue;
                }
                for b in 0..n {
                    if glb.get(a, b) == glb.get(c, b) && lub.get(a, b) == lub.get(c, b) {
                        return Err(OrderError::NotModular { a, b, c });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn is_modular(&self) -> bool {
        self.assert_is_modular().is_ok()
    }

    /// The order-reversed lattice; a lattice by duality.
    pub fn dual(&self) -> Self {
        Self::wrap(self.poset.dual())
    }

    /// Permutation of a lattice is a lattice.
    pub fn reindex(&self, perm: &[usize], inverse: bool) -> Result<Self> {
        Ok(Self::wrap(self.poset.reindex(perm, inverse)?))
    }

    /// The canonical representative of this lattice's isomorphism class.
    pub fn canonical(&self) -> Result<Self> {
        Ok(Self::wrap(self.poset.canonical()?))
    }
}

/// Build the join table of a `leq` matrix, or report the first pair
/// with no unique least upper bound.
fn join_table(m: &BoolMatrix) -> Result<PairTable> {
    let n = m.n();
    let mut by_upset: HashMap<&[bool], usize> = HashMap::with_capacity(n);
    for i in 0..n {
        by_upset.insert(m.row(i), i);
    }
    let mut vals = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let above: Vec<bool> = (0..n).map(|k| m.get(i, k) && m.get(j, k)).collect();
            match by_upset.get(above.as_slice()) {
                Some(&k) => vals.push(k),
                None => return Err(join_error(m, i, j)),
            }
        }
    }
    Ok(PairTable::new(n, vals))
}

fn join_error(m: &BoolMatrix, i: usize, j: usize) -> OrderError {
    let n = m.n();
    let uppers: Vec<usize> = (0..n).filter(|&k| m.get(i, k) && m.get(j, k)).collect();
    let minimal: Vec<usize> = uppers
        .iter()
        .copied()
        .filter(|&k| !uppers.iter().any(|&x| x != k && m.get(x, k)))
        .collect();
    OrderError::LubInconsistency {
        i,
        j,
        uppers: minimal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The M3 diamond: bottom 0, atoms 1..3, top 4.
    fn m3() -> Lattice {
        Lattice::from_up_edges(5, &[(0, 1), (0, 2), (0, 3), (1, 4), (2, 4), (3, 4)], true).unwrap()
    }

    /// The N5 pentagon: 0 < 1 < 2 < 4 and 0 < 3 < 4.
    fn n5() -> Lattice {
        Lattice::from_up_edges(5, &[(0, 1), (1, 2), (0, 3), (2, 4), (3, 4)], true).unwrap()
    }

    #[test]
    fn m3_is_modular_not_distributive() {
        let l = m3();
        assert_eq!(l.bottom().unwrap(), 0);
        assert_eq!(l.top().unwrap(), 4);
        assert!(l.is_modular());
        assert!(!l.is_distributive());
        assert!(matches!(
            l.assert_is_distributive().unwrap_err(),
            OrderError::NotDistributive { .. }
        ));
    }

    #[test]
    fn n5_is_neither() {
        let l = n5();
        assert!(!l.is_modular());
        assert!(!l.is_distributive());
    }

    #[test]
    fn joins_and_meets_in_m3() {
        let l = m3();
        let lub = l.lub().unwrap();
        let glb = l.glb().unwrap();
        assert_eq!(lub.get(1, 2), 4);
        assert_eq!(glb.get(1, 2), 0);
        assert_eq!(lub.get(0, 3), 3);
        assert_eq!(glb.get(4, 3), 3);
    }

    #[test]
    fn glb_is_dual_lub() {
        for l in [m3(), n5(), Lattice::total(4)] {
            let glb = l.glb().unwrap();
            let dual = l.dual();
            let dual_lub = dual.lub().unwrap();
            for i in 0..l.n() {
                for j in 0..l.n() {
                    assert_eq!(glb.get(i, j), dual_lub.get(i, j));
                }
            }
        }
    }

    #[test]
    fn join_of_folds_from_bottom() {
        let l = m3();
        assert_eq!(l.join_of([]).unwrap(), 0);
        assert_eq!(l.join_of([1, 2]).unwrap(), 4);
        assert_eq!(l.meet_of([]).unwrap(), 4);
        assert_eq!(l.meet_of([1, 2]).unwrap(), 0);
    }

    #[test]
    fn non_lattice_reports_witness() {
        // Two atoms below two coatoms: 1 lub 2 has no unique minimum.
        let p = Poset::from_up_edges(6, &[(0, 1), (0, 2), (1, 3), (2, 3), (1, 4), (2, 4), (3, 5), (4, 5)], true)
            .unwrap();
        let err = p.into_lattice(true).unwrap_err();
        match err {
            OrderError::LubInconsistency { i, j, uppers } => {
                assert_eq!((i, j), (1, 2));
                assert_eq!(uppers, vec![3, 4]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn irreducibles_of_chain_and_m3() {
        assert_eq!(Lattice::total(4).irreducibles(), &[1, 2, 3]);
        assert_eq!(m3().irreducibles(), &[1, 2, 3]);
        assert_eq!(m3().irreducible_downsets()[4], vec![1, 2, 3]);
        assert_eq!(m3().irreducible_downsets()[0], Vec::<usize>::new());
    }

    #[test]
    fn irreducible_components_of_m3_are_singletons() {
        let l = m3();
        let comps = l.irreducible_components().unwrap();
        assert_eq!(comps.len(), 3);
        for (topo, children) in comps.topos.iter().zip(&comps.children) {
            assert_eq!(topo.len(), 1);
            assert_eq!(children[0], Vec::<usize>::new());
        }
    }

    #[test]
    fn empty_and_singleton_are_lattices() {
        assert!(Lattice::from_children(&[], true).is_ok());
        let one = Lattice::from_children(&[vec![]], true).unwrap();
        assert_eq!(one.bottom().unwrap(), 0);
        assert_eq!(one.top().unwrap(), 0);
        assert!(one.irreducible_components().unwrap().is_empty());
    }

    #[test]
    fn boolean_cube_is_distributive() {
        // Subsets of {a, b} ordered by inclusion.
        let l = Lattice::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], true).unwrap();
        assert!(l.is_distributive());
        assert!(l.is_modular());
    }
}
