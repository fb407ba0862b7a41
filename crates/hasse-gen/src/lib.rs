//! # Hasse Gen
//!
//! Exhaustive generation of finite lattices, one representative per
//! isomorphism class.
//!
//! The search grows lattices breadth-first with two operators (adding
//! a covering edge at fixed size, and inserting a node between two
//! elements), pruned by a forbidden-pairs filter that rejects growth
//! steps which cannot preserve join uniqueness. The identity engine of
//! `hasse-kernel` supplies both the visited-set deduplication and the
//! canonical form of every emitted lattice.

pub mod enumerate;
pub mod grow;

pub use enumerate::AllLattices;
pub use grow::{add_edge, add_node, edge_grown, forbidden_pairs, node_grown};
