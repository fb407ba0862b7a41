//! # Hasse Kernel
//!
//! Finite partial orders and lattices as dense boolean matrices.
//!
//! Elements are always `0..n`; the order is the matrix `leq[i][j]`
//! ("i is below-or-equal j"). Optional labels are display-only. Objects
//! are immutable after construction, which is what licenses the
//! write-once caching of every derived view.
//!
//! ## Architecture
//!
//! ```text
//! BoolMatrix             ← Dense storage, no laws promised
//!     │
//! Relation               ← Matrix + labels, law validators on demand
//!     │
//! Poset                  ← Validated laws, cached graph views,
//!     │                    permutation-invariant identity
//! Lattice                ← Unique extremes, lub/glb tables,
//!                          irreducibles, distributivity
//! ```
//!
//! Upgrades between the layers are explicit and fallible:
//! [`Relation::into_poset`] and [`Poset::into_lattice`] either validate
//! the laws or, for construction-by-proof callers, skip the scan.
//!
//! Identity is structural up to relabeling: isomorphic objects share a
//! deterministic 64-bit [`Poset::hash`], and [`Poset::canonical`] picks
//! one representative per isomorphism class.

pub mod error;
pub mod graph;
pub mod identity;
pub mod lattice;
pub mod matrix;
pub mod poset;
pub mod relation;

pub use error::{OrderError, Result};
pub use identity::find_isomorphism;
pub use lattice::{IrreducibleComponents, Lattice};
pub use matrix::{BoolMatrix, DistMatrix, PairTable};
pub use poset::Poset;
pub use relation::Relation;
