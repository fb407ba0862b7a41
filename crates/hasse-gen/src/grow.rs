//! Growth operators on lattices.
//!
//! Both operators close transitively by construction: adding `i ≤ j`
//! relates every `x ≤ i` to every `y ≥ j` in the same step, so the
//! result needs no closure pass. They do not re-validate: candidate
//! pairs must already have passed [`forbidden_pairs`], and a violation
//! downstream is a defect in that filter, not user error.

use hasse_kernel::{BoolMatrix, Lattice, Result};

/// Grow by relating `i ≤ j`, keeping the element count fixed.
pub fn add_edge(l: &Lattice, i: usize, j: usize) -> Result<Lattice> {
    let leq = l.matrix();
    let grown = BoolMatrix::from_fn(l.n(), |x, y| {
        leq.get(x, y) || (leq.get(x, i) && leq.get(j, y))
    });
    hasse_kernel::Relation::from_matrix(grown)
        .into_poset(false)?
        .into_lattice(false)
}

/// Grow by inserting a new element strictly between `i` and `j`: its
/// down-set is the down-set of `i`, its up-set the up-set of `j`, and
/// `i ≤ j` is added alongside.
pub fn add_node(l: &Lattice, i: usize, j: usize) -> Result<Lattice> {
    let n = l.n();
    let leq = l.matrix();
    let grown = BoolMatrix::from_fn(n + 1, |x, y| match (x == n, y == n) {
        (true, true) => true,
        (true, false) => leq.get(j, y),
        (false, true) => leq.get(x, i),
        (false, false) => leq.get(x, y) || (leq.get(x, i) && leq.get(j, y)),
    });
    hasse_kernel::Relation::from_matrix(grown)
        .into_poset(false)?
        .into_lattice(false)
}

/// Pairs `(i, j)` whose addition as `i ≤ j` cannot yield a lattice.
///
/// `(i, j)` is forbidden when `j ≤ i` already holds (the edge would
/// collapse them), or when some `x ≤ i` and some `y` outside the up-set
/// of `j` and incomparable to `i` would end up with `x ∨ y` and `j ∨ y`
/// incomparable, breaking join uniqueness. Pairs already related are
/// not forbidden here; edge growth skips them separately.
pub fn forbidden_pairs(l: &Lattice) -> Result<BoolMatrix> {
    let n = l.n();
    let leq = l.matrix();
    let lub = l.lub()?;
    let nocmp = |x: usize, y: usize| !leq.get(x, y) && !leq.get(y, x);
    Ok(BoolMatrix::from_fn(n, |a, b| {
        if leq.get(b, a) {
            return true;
        }
        if leq.get(a, b) {
            return false;
        }
        let xs: Vec<usize> = (0..n).filter(|&x| leq.get(x, a)).collect();
        (0..n)
            .filter(|&y| !leq.get(b, y) && nocmp(y, a))
            .any(|y| xs.iter().any(|&x| nocmp(lub.get(x, y), lub.get(b, y))))
    }))
}

/// All edge-grown successors, one per non-forbidden unrelated pair, in
/// pair order. Isomorphic duplicates are kept; deduplication belongs to
/// the search's visited set. Matching element fingerprints do not make
/// two pairs interchangeable, so any local pruning here can lose whole
/// isomorphism classes.
pub fn edge_grown(l: &Lattice) -> Result<Vec<Lattice>> {
    let n = l.n();
    let fb = forbidden_pairs(l)?;
    let mut out = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if !fb.get(i, j) && !l.leq(i, j) {
                out.push(add_edge(l, i, j)?);
            }
        }
    }
    Ok(out)
}

/// All node-grown successors, one per non-forbidden pair, in pair
/// order. Duplicates are kept, as in [`edge_grown`].
pub fn node_grown(l: &Lattice) -> Result<Vec<Lattice>> {
    let n = l.n();
    let fb = forbidden_pairs(l)?;
    let mut out = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if !fb.get(i, j) {
                out.push(add_node(l, i, j)?);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> Lattice {
        Lattice::total(n)
    }

    #[test]
    fn edge_growth_linearizes_a_diamond() {
        // 0 < {1, 2} < 3, then relate 1 ≤ 2: the middle antichain
        // becomes ordered and the result is the 4-chain.
        let diamond = Lattice::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], true).unwrap();
        let grown = add_edge(&diamond, 1, 2).unwrap();
        assert!(grown.poset().relation().is_poset());
        assert!(grown.poset().isomorphic_to(chain(4).poset()));
    }

    #[test]
    fn node_growth_extends_a_chain() {
        let l = chain(3);
        // Between bottom and top, incomparable to the middle: a diamond.
        let grown = add_node(&l, 0, 2).unwrap();
        assert_eq!(grown.n(), 4);
        assert!(grown.poset().relation().is_poset());
        let diamond = Lattice::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], true).unwrap();
        assert!(grown.poset().isomorphic_to(diamond.poset()));
    }

    #[test]
    fn forbidden_pairs_of_small_lattices() {
        // Diagonal and downward pairs are always forbidden.
        let l = chain(3);
        let fb = forbidden_pairs(&l).unwrap();
        for i in 0..3 {
            assert!(fb.get(i, i));
            for j in 0..i {
                assert!(fb.get(i, j));
            }
        }
        // Upward pairs of a chain are fine.
        assert!(!fb.get(0, 1));
        assert!(!fb.get(0, 2));
    }

    #[test]
    fn singleton_and_empty_have_no_successors() {
        for l in [chain(0), chain(1)] {
            assert!(edge_grown(&l).unwrap().is_empty());
            assert!(node_grown(&l).unwrap().is_empty());
        }
    }

    #[test]
    fn two_chain_grows_exactly_into_the_three_chain() {
        let l = chain(2);
        assert!(edge_grown(&l).unwrap().is_empty());
        let nodes = node_grown(&l).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].poset().isomorphic_to(chain(3).poset()));
    }

    #[test]
    fn node_growth_keeps_pairs_with_matching_fingerprints_apart() {
        // Hexagon 0 < 1 < 3 < 5 and 0 < 2 < 4 < 5: swapping the two
        // branches is an automorphism, so 3 and 4 share a fingerprint,
        // yet inserting at (1, 3) subdivides a cover while (1, 4)
        // bridges the branches. Both classes must be emitted.
        let hex = Lattice::from_children(
            &[vec![], vec![0], vec![0], vec![1], vec![2], vec![3, 4]],
            true,
        )
        .unwrap();
        let h = hex.poset().elem_hashes();
        assert_eq!(h[3], h[4]);

        let subdivided = add_node(&hex, 1, 3).unwrap();
        let bridged = add_node(&hex, 1, 4).unwrap();
        assert!(!subdivided.poset().isomorphic_to(bridged.poset()));

        let grown = node_grown(&hex).unwrap();
        assert!(grown.iter().any(|g| g.poset().isomorphic_to(subdivided.poset())));
        assert!(grown.iter().any(|g| g.poset().isomorphic_to(bridged.poset())));

        // One successor per non-forbidden pair, none skipped.
        let fb = forbidden_pairs(&hex).unwrap();
        let allowed = (0..hex.n())
            .flat_map(|i| (0..hex.n()).map(move |j| (i, j)))
            .filter(|&(i, j)| !fb.get(i, j))
            .count();
        assert_eq!(grown.len(), allowed);
    }

    #[test]
    fn grown_candidates_are_valid_lattices() {
        let seed = Lattice::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], true).unwrap();
        let mut all = edge_grown(&seed).unwrap();
        all.extend(node_grown(&seed).unwrap());
        assert!(!all.is_empty());
        for v in &all {
            assert!(v.poset().relation().is_poset());
            assert!(v.lub().is_ok());
            assert!(v.bottom().is_ok() && v.top().is_ok());
        }
    }
}
