//! Validated partial orders with lazily derived graph views.
//!
//! A [`Poset`] wraps a [`Relation`] whose poset laws either passed
//! validation or are guaranteed by construction. Every derived quantity
//! (cover matrix, adjacency lists, distances, topological order,
//! fingerprints, whole-poset hash) is computed on first access and
//! published through a write-once cell owned by this instance: the
//! immutability of the underlying matrix is what makes that sound.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};
use crate::graph;
use crate::identity;
use crate::lattice::Lattice;
use crate::matrix::{BoolMatrix, DistMatrix};
use crate::relation::Relation;

/// A finite partial order over elements `0..n`.
///
/// Equality is structural (same matrix, same labels); use
/// [`Poset::isomorphic_to`] for equality up to relabeling.
#[derive(Debug, Serialize, Deserialize)]
pub struct Poset {
    relation: Relation,
    #[serde(skip)]
    covers: OnceLock<BoolMatrix>,
    #[serde(skip)]
    adjacency: OnceLock<(Vec<Vec<usize>>, Vec<Vec<usize>>)>,
    #[serde(skip)]
    dist: OnceLock<DistMatrix>,
    #[serde(skip)]
    topo: OnceLock<Result<Vec<usize>>>,
    #[serde(skip)]
    bottoms: OnceLock<Vec<usize>>,
    #[serde(skip)]
    tops: OnceLock<Vec<usize>>,
    #[serde(skip)]
    elem_hashes: OnceLock<Vec<u64>>,
    #[serde(skip)]
    hash: OnceLock<u64>,
}

impl Clone for Poset {
    fn clone(&self) -> Self {
        // Caches are per-instance; the clone recomputes its own.
        Self::from_relation(self.relation.clone())
    }
}

impl PartialEq for Poset {
    fn eq(&self, other: &Self) -> bool {
        self.relation == other.relation
    }
}

impl Eq for Poset {}

impl Poset {
    pub(crate) fn from_relation(relation: Relation) -> Self {
        Self {
            relation,
            covers: OnceLock::new(),
            adjacency: OnceLock::new(),
            dist: OnceLock::new(),
            topo: OnceLock::new(),
            bottoms: OnceLock::new(),
            tops: OnceLock::new(),
            elem_hashes: OnceLock::new(),
            hash: OnceLock::new(),
        }
    }

    /// Upgrade a relation, validating the poset laws when `check` is set.
    pub fn new(relation: Relation, check: bool) -> Result<Self> {
        relation.into_poset(check)
    }

    /// Checked construction from covering lists; the cover matrix and
    /// distance matrix computed along the way are kept, not recomputed.
    pub fn from_children(children: &[Vec<usize>], check: bool) -> Result<Self> {
        let (covers, dist, leq) = graph::children_to_closure(children);
        let relation = Relation::unchecked(leq, None);
        if check {
            relation.assert_is_poset()?;
        }
        let poset = Self::from_relation(relation);
        let _ = poset.covers.set(covers);
        let _ = poset.dist.set(dist);
        Ok(poset)
    }

    /// Checked construction from parent lists.
    pub fn from_parents(parents: &[Vec<usize>], check: bool) -> Result<Self> {
        Relation::from_parents(parents).into_poset(check)
    }

    /// Checked construction from `(below, above)` edges.
    pub fn from_up_edges(n: usize, edges: &[(usize, usize)], check: bool) -> Result<Self> {
        Relation::from_up_edges(n, edges).into_poset(check)
    }

    /// Checked construction from `(above, below)` edges.
    pub fn from_down_edges(n: usize, edges: &[(usize, usize)], check: bool) -> Result<Self> {
        Relation::from_down_edges(n, edges).into_poset(check)
    }

    /// The n-element chain, correct by construction.
    pub fn total(n: usize) -> Self {
        Self::from_relation(Relation::total(n))
    }

    pub fn n(&self) -> usize {
        self.relation.n()
    }

    #[inline]
    pub fn leq(&self, i: usize, j: usize) -> bool {
        self.relation.leq(i, j)
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn matrix(&self) -> &BoolMatrix {
        self.relation.matrix()
    }

    pub fn labels(&self) -> Option<&[String]> {
        self.relation.labels()
    }

    /// Copy with new labels.
    pub fn relabel(&self, labels: Option<Vec<String>>) -> Result<Self> {
        Ok(Self::from_relation(self.relation.relabel(labels)?))
    }

    /// The cover (Hasse) matrix: `covers().get(i, j)` iff `j` covers `i`.
    pub fn covers(&self) -> &BoolMatrix {
        self.covers
            .get_or_init(|| graph::transitive_reduction(self.matrix()))
    }

    /// `children()[x]`: elements covered by `x` (immediately below).
    pub fn children(&self) -> &[Vec<usize>] {
        &self.adjacency().0
    }

    /// `parents()[x]`: elements covering `x` (immediately above).
    pub fn parents(&self) -> &[Vec<usize>] {
        &self.adjacency().1
    }

    fn adjacency(&self) -> &(Vec<Vec<usize>>, Vec<Vec<usize>>) {
        self.adjacency.get_or_init(|| graph::cover_lists(self.covers()))
    }

    /// Shortest upward distance through covers; `n` means unreachable.
    pub fn dist(&self) -> &DistMatrix {
        self.dist.get_or_init(|| graph::floyd_warshall(self.covers()))
    }

    /// Bottom-up topological order of the cover DAG.
    pub fn topo_bottom_up(&self) -> Result<&[usize]> {
        self.topo
            .get_or_init(|| graph::toposort_bottom_up(self.children(), self.parents()))
            .as_deref()
            .map_err(Clone::clone)
    }

    /// Minimal elements: comparable to exactly one element (themselves).
    pub fn bottoms(&self) -> &[usize] {
        self.bottoms.get_or_init(|| {
            (0..self.n())
                .filter(|&i| self.matrix().column_count(i) == 1)
                .collect()
        })
    }

    /// Maximal elements: below-or-equal to exactly one element
    /// (themselves). Not elements above everything; those exist only
    /// when the top is unique, and here every maximum is listed.
    pub fn tops(&self) -> &[usize] {
        self.tops.get_or_init(|| {
            (0..self.n())
                .filter(|&i| self.matrix().row_count(i) == 1)
                .collect()
        })
    }

    /// Distance from each element down to its nearest bottom.
    pub fn heights(&self) -> Vec<u32> {
        let dist = self.dist();
        (0..self.n())
            .map(|i| {
                self.bottoms()
                    .iter()
                    .map(|&b| dist.get(b, i))
                    .min()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Distance from each element up to its nearest top.
    pub fn depths(&self) -> Vec<u32> {
        let dist = self.dist();
        (0..self.n())
            .map(|i| {
                self.tops()
                    .iter()
                    .map(|&t| dist.get(i, t))
                    .min()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// The largest element height; 0 for the empty poset.
    pub fn height(&self) -> u32 {
        self.heights().into_iter().max().unwrap_or(0)
    }

    /// Connected components of the symmetrized relation.
    pub fn components(&self) -> Vec<Vec<usize>> {
        graph::components(self.matrix())
    }

    /// Restriction to the given elements, labels re-derived. The domain
    /// must be a duplicate-free list of valid indices.
    pub fn subposet(&self, domain: &[usize]) -> Result<Self> {
        let n = self.n();
        let mut seen = vec![false; n];
        for &d in domain {
            if d >= n || seen[d] {
                return Err(OrderError::InvalidDomain {
                    domain: domain.to_vec(),
                });
            }
            seen[d] = true;
        }
        let matrix = BoolMatrix::from_fn(domain.len(), |i, j| self.leq(domain[i], domain[j]));
        let labels = self
            .labels()
            .map(|l| domain.iter().map(|&d| l[d].clone()).collect());
        Ok(Self::from_relation(Relation::unchecked(matrix, labels)))
    }

    /// Restriction to the elements selected by a boolean mask.
    pub fn subposet_mask(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.n() {
            return Err(OrderError::InvalidDomain {
                domain: mask.iter().map(|&b| b as usize).collect(),
            });
        }
        let domain: Vec<usize> = (0..self.n()).filter(|&i| mask[i]).collect();
        self.subposet(&domain)
    }

    /// The order-reversed poset; a poset by duality.
    pub fn dual(&self) -> Self {
        Self::from_relation(self.relation.dual())
    }

    /// Permutation of a poset is a poset.
    pub fn reindex(&self, perm: &[usize], inverse: bool) -> Result<Self> {
        Ok(Self::from_relation(self.relation.reindex(perm, inverse)?))
    }

    /// Per-element structural fingerprints, invariant under relabeling.
    pub fn elem_hashes(&self) -> &[u64] {
        self.elem_hashes
            .get_or_init(|| identity::elem_hashes(self.matrix(), identity::DEFAULT_ROUNDS, 0))
    }

    /// Whole-poset hash: equal for isomorphic posets, stable across
    /// runs and processes.
    pub fn hash(&self) -> u64 {
        *self
            .hash
            .get_or_init(|| identity::hash_sorted(self.elem_hashes().to_vec()))
    }

    /// A deterministic structure-only total order over elements; see
    /// [`identity::canonical_rank`].
    pub fn canonical_rank(&self) -> Result<Vec<usize>> {
        identity::canonical_rank(self)
    }

    /// The canonical representative of this poset's isomorphism class:
    /// reindexed by the canonical rank, labels cleared.
    pub fn canonical(&self) -> Result<Self> {
        let rank = self.canonical_rank()?;
        let relation = self.relation.apply_permutation(&rank);
        Ok(Self::from_relation(Relation::unchecked(
            relation.matrix().clone(),
            None,
        )))
    }

    /// Whether some relabeling turns `self` into `other`.
    pub fn isomorphic_to(&self, other: &Self) -> bool {
        identity::find_isomorphism(self, other).is_some()
    }

    /// Upgrade to a [`Lattice`], validating when `check` is set: poset
    /// laws, unique bottom and top, and a total lub table.
    pub fn into_lattice(self, check: bool) -> Result<Lattice> {
        Lattice::from_poset(self, check)
    }
}
