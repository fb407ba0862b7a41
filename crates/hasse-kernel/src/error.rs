//! Error types for order-theoretic law violations.
//!
//! Every validator in this crate is a pure check that either returns
//! successfully or fails with one of these variants. Each variant carries
//! the minimal counterexample as plain data (indices, witness sets, the
//! offending function) so that an explanatory renderer can be layered on
//! top without the core depending on any display capability.

/// A violated invariant of a relation, poset, lattice, or endomorphism.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// The relation matrix is not square.
    #[error("relation matrix must be square: row {row} has {found} entries, expected {expected}")]
    MatrixShape {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// The label list does not match the element count.
    #[error("{found} labels found, expected {expected}")]
    LabelCount { expected: usize, found: usize },

    /// The given index sequence is not a permutation of `0..n`.
    #[error("invalid permutation {perm:?}")]
    InvalidPermutation { perm: Vec<usize> },

    /// A subgraph domain repeats an element or exceeds the element range.
    #[error("invalid subgraph domain {domain:?}")]
    InvalidDomain { domain: Vec<usize> },

    /// Reflexivity fails: `leq[i][i]` is false.
    #[error("not reflexive: leq[{index}][{index}] is false")]
    NotReflexive { index: usize },

    /// Antisymmetry fails: two distinct elements are mutually related.
    #[error("not antisymmetric: cycle {i} <= {j} <= {i}")]
    NotAntisymmetric { i: usize, j: usize },

    /// Transitivity fails: a two-step path with no direct relation.
    #[error("not transitive: {i} <= {via} <= {j} but leq[{i}][{j}] is false")]
    NotTransitive { i: usize, j: usize, via: usize },

    /// The cover relation contains a cycle, so no topological order exists.
    /// Indicates a broken antisymmetry invariant upstream.
    #[error("cycle detected through element {element}: no topological order")]
    CycleDetected { element: usize },

    /// The poset does not have exactly one bottom element.
    #[error("expected a unique bottom element, found {found:?}")]
    NotUniqueBottom { found: Vec<usize> },

    /// The poset does not have exactly one top element.
    #[error("expected a unique top element, found {found:?}")]
    NotUniqueTop { found: Vec<usize> },

    /// The pair `(i, j)` has no unique least upper bound. `uppers` holds
    /// the minimal common upper bounds: empty means no common upper bound
    /// at all, two or more mean no unique minimal one.
    #[error("not a lattice: {i} lub {j} has minimal upper bounds {uppers:?}")]
    LubInconsistency {
        i: usize,
        j: usize,
        uppers: Vec<usize>,
    },

    /// Distributivity counterexample:
    /// `i glb (j lub k) != (i glb j) lub (i glb k)`.
    #[error("not distributive: {i} glb ({j} lub {k}) != ({i} glb {j}) lub ({i} glb {k})")]
    NotDistributive { i: usize, j: usize, k: usize },

    /// Modularity counterexample (Dilworth): `c < a` yet some `b` agrees
    /// with both on meets and joins.
    #[error("not modular: {c} < {a} but glb and lub agree with {b} on both")]
    NotModular { a: usize, b: usize, c: usize },

    /// The function does not preserve order on the witnessed pair.
    #[error("function {f:?} is not monotone: {i} <= {j} but f[{i}] !<= f[{j}]")]
    NotMonotone { i: usize, j: usize, f: Vec<usize> },

    /// The function does not preserve joins on the witnessed pair. The
    /// degenerate witness `i == j == bottom` marks a bottom violation.
    #[error("function {f:?} does not preserve lub on pair ({i}, {j})")]
    NotLubPreserving { i: usize, j: usize, f: Vec<usize> },
}

/// Shorthand for results carrying an [`OrderError`].
pub type Result<T> = std::result::Result<T, OrderError>;
