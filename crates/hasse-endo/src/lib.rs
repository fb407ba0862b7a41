//! # Hasse Endo
//!
//! The endomorphism algebra of finite lattices: self-maps
//! `{0..n} -> {0..n}` represented as plain index vectors.
//!
//! Three layers:
//!
//! - **Validators** ([`check`]): monotonicity and join preservation as
//!   assert/boolean pairs carrying the violating pair and function.
//! - **Enumerators** ([`enumerate`]): lazy backtracking searches over a
//!   bottom-up topological order producing all functions, all monotone
//!   functions, or all join-endomorphisms, the latter via the
//!   join-irreducible shortcut on distributive lattices, brute-force
//!   filtering elsewhere. Each search is a [`FunctionStream`] with an
//!   in-place buffer mode and a cloning [`Iterator`] mode.
//! - **Operations** ([`ops`]): pointwise joins and meets, downward
//!   fixpoint repair toward the greatest join-endomorphism below a
//!   function, and the O(n·m) irreducible-based meet.

pub mod check;
pub mod enumerate;
pub mod ops;

/// A total self-map on lattice elements: `f[i]` is the image of `i`.
pub type Endomorphism = Vec<usize>;

pub use check::{assert_is_lub_preserving, assert_is_monotone, is_lub_preserving, is_monotone};
pub use enumerate::{
    AllFunctions, ClonedFunctions, FunctionStream, IrreducibleMonotone, LubFunctions,
    MonotoneFunctions, count_all, count_all_bottom, count_lub_preserving_distributive,
    count_monotone,
};
pub use ops::{fix_f_naive, glb_of_functions_dmeet, pointwise_glb, pointwise_lub};
