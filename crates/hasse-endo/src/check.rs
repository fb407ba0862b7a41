//! Law validators for endomorphisms.
//!
//! Pure checks in assert/boolean pairs, in the style of the relation
//! law validators in `hasse-kernel`: the assert form fails with a
//! witness-carrying error, the boolean form is catch-and-return-false.
//! An optional `domain` restricts the quantified pairs to a subset of
//! elements.

use hasse_kernel::{Lattice, OrderError, Poset, Result};

/// Monotonicity over `domain` (all elements when `None`):
/// `i ≤ j ⇒ f(i) ≤ f(j)`.
pub fn assert_is_monotone(p: &Poset, f: &[usize], domain: Option<&[usize]>) -> Result<()> {
    let all: Vec<usize>;
    let dom: &[usize] = match domain {
        Some(d) => d,
        None => {
            all = (0..p.n()).collect();
            &all
        }
    };
    for &i in dom {
        for &j in dom {
            if p.leq(i, j) && !p.leq(f[i], f[j]) {
                return Err(OrderError::NotMonotone {
                    i,
                    j,
                    f: f.to_vec(),
                });
            }
        }
    }
    Ok(())
}

pub fn is_monotone(p: &Poset, f: &[usize], domain: Option<&[usize]>) -> bool {
    assert_is_monotone(p, f, domain).is_ok()
}

/// Join preservation over `domain`: `f(i ∨ j) = f(i) ∨ f(j)` for all
/// pairs, and `f(bottom) = bottom` when `bottom_to_bottom` is set.
///
/// A domain of at most one element is trivially join-preserving, as is
/// the empty lattice.
pub fn assert_is_lub_preserving(
    l: &Lattice,
    f: &[usize],
    bottom_to_bottom: bool,
    domain: Option<&[usize]>,
) -> Result<()> {
    let n = l.n();
    if bottom_to_bottom {
        if n == 0 || domain.is_some_and(|d| d.len() <= 1) {
            return Ok(());
        }
        let bot = l.bottom()?;
        if f[bot] != bot || domain.is_some_and(|d| !d.contains(&bot)) {
            return Err(OrderError::NotLubPreserving {
                i: bot,
                j: bot,
                f: f.to_vec(),
            });
        }
    }
    let lub = l.lub()?;
    let all: Vec<usize>;
    let dom: &[usize] = match domain {
        Some(d) => d,
        None => {
            all = (0..n).collect();
            &all
        }
    };
    for &i in dom {
        for &j in dom {
            if f[lub.get(i, j)] != lub.get(f[i], f[j]) {
                return Err(OrderError::NotLubPreserving {
                    i,
                    j,
                    f: f.to_vec(),
                });
            }
        }
    }
    Ok(())
}

pub fn is_lub_preserving(
    l: &Lattice,
    f: &[usize],
    bottom_to_bottom: bool,
    domain: Option<&[usize]>,
) -> bool {
    assert_is_lub_preserving(l, f, bottom_to_bottom, domain).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Lattice {
        Lattice::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], true).unwrap()
    }

    #[test]
    fn identity_is_monotone_and_lub_preserving() {
        let l = diamond();
        let id: Vec<usize> = (0..l.n()).collect();
        assert!(is_monotone(l.poset(), &id, None));
        assert!(is_lub_preserving(&l, &id, true, None));
    }

    #[test]
    fn violations_carry_witnesses() {
        let l = diamond();
        // Swap bottom and top: order-reversing, not monotone.
        let rev = vec![3, 1, 2, 0];
        match assert_is_monotone(l.poset(), &rev, None).unwrap_err() {
            OrderError::NotMonotone { i, j, f } => {
                assert!(l.leq(i, j) && !l.leq(f[i], f[j]));
                assert_eq!(f, rev);
            }
            other => panic!("unexpected error {other:?}"),
        }

        // Monotone but not join-preserving:
        // f(1 v 2) = f(3) = 3, yet f(1) v f(2) = 1 v 0 = 1.
        let f = vec![0, 1, 0, 3];
        assert!(is_monotone(l.poset(), &f, None));
        match assert_is_lub_preserving(&l, &f, true, None).unwrap_err() {
            OrderError::NotLubPreserving { i, j, .. } => {
                assert_eq!((i, j), (1, 2));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bottom_constraint_is_separate() {
        let l = diamond();
        // Constant-top preserves pairwise joins but moves bottom.
        let top = vec![3, 3, 3, 3];
        assert!(is_lub_preserving(&l, &top, false, None));
        assert!(!is_lub_preserving(&l, &top, true, None));
    }

    #[test]
    fn domain_restriction() {
        let l = diamond();
        let f = vec![0, 1, 0, 3]; // not join-preserving on the full lattice
        assert!(is_lub_preserving(&l, &f, true, Some(&[0, 1, 3])));
        assert!(!is_lub_preserving(&l, &f, true, Some(&[0, 1, 2, 3])));
        // A domain missing bottom fails the bottom requirement outright.
        assert!(!is_lub_preserving(&l, &f, true, Some(&[1, 3])));
    }
}
