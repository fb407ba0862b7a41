//! Operations on endomorphisms: pointwise bounds, fixpoint repair, and
//! the irreducible-based meet of join-endomorphisms.
//!
//! The pointwise glb of join-preserving functions is monotone but not
//! in general join-preserving. [`fix_f_naive`] repairs it downward to
//! the greatest join-endomorphism below it; [`glb_of_functions_dmeet`]
//! computes the same meet directly from the join-irreducibles in
//! O(n·m) when the irreducible decomposition is trustworthy.

use std::collections::VecDeque;

use hasse_kernel::{Lattice, Result};

use crate::Endomorphism;

/// Pointwise join of a collection of functions. The empty collection
/// yields the constant-bottom function, the unit of pointwise join.
pub fn pointwise_lub(l: &Lattice, functions: &[Endomorphism]) -> Result<Endomorphism> {
    let n = l.n();
    if n == 0 {
        return Ok(Vec::new());
    }
    let Some((first, rest)) = functions.split_first() else {
        return Ok(vec![l.bottom()?; n]);
    };
    let lub = l.lub()?;
    let mut h = first.clone();
    for g in rest {
        for i in 0..n {
            h[i] = lub.get(h[i], g[i]);
        }
    }
    Ok(h)
}

/// Pointwise meet of a collection of functions. The empty collection
/// yields the constant-top function with bottom forced to bottom, the
/// unit of pointwise meet among bottom-preserving functions.
pub fn pointwise_glb(l: &Lattice, functions: &[Endomorphism]) -> Result<Endomorphism> {
    let n = l.n();
    if n == 0 {
        return Ok(Vec::new());
    }
    let Some((first, rest)) = functions.split_first() else {
        let mut h = vec![l.top()?; n];
        let bot = l.bottom()?;
        h[bot] = bot;
        return Ok(h);
    };
    let glb = l.glb()?;
    let mut h = first.clone();
    for g in rest {
        for i in 0..n {
            h[i] = glb.get(h[i], g[i]);
        }
    }
    Ok(h)
}

/// Repair `f` downward into a join-preserving function.
///
/// Scans all pairs `(i, j)` with `k = i ∨ j`: when `f(i) ∨ f(j) ≤ f(k)`
/// the image of `k` is lowered to `f(i) ∨ f(j)`; when the two disagree
/// incomparably, `f(i)` and `f(j)` are pulled down toward `f(k)` by
/// meet. Values only ever decrease, so in a finite lattice the sweep
/// reaches a fixpoint; the result is the greatest join-endomorphism
/// below the input when the input upper-bounds one.
///
/// `budget` caps the number of full sweeps. A truncated run returns the
/// current, possibly non-join-preserving, approximation; pass `None`
/// for the convergence guarantee.
pub fn fix_f_naive(l: &Lattice, f: &[usize], budget: Option<usize>) -> Result<Endomorphism> {
    let n = l.n();
    let lub = l.lub()?;
    let glb = l.glb()?;
    let mut f = f.to_vec();
    let mut prev = f.clone();
    let mut sweeps = 0usize;
    loop {
        if budget.is_some_and(|b| sweeps >= b) {
            break;
        }
        sweeps += 1;
        for i in 0..n {
            for j in 0..n {
                let k = lub.get(i, j);
                let fij = lub.get(f[i], f[j]);
                if l.leq(fij, f[k]) {
                    f[k] = fij;
                } else if f[k] != fij {
                    f[i] = glb.get(f[i], f[k]);
                    f[j] = glb.get(f[j], f[k]);
                }
            }
        }
        if f == prev {
            break;
        }
        prev.clone_from(&f);
    }
    Ok(f)
}

/// Meet of join-endomorphisms via the join-irreducibles, O(n·m) for `m`
/// input functions.
///
/// The meet is pinned at bottom and at every irreducible (pointwise
/// glb there), then propagated up the cover DAG: a non-irreducible
/// element's value is the join of two of its covers' values once both
/// are known.
///
/// # Panics
///
/// If some non-irreducible, non-bottom element has fewer than two
/// covers. That cannot happen for a valid lattice and indicates an
/// inconsistent irreducible decomposition.
pub fn glb_of_functions_dmeet(l: &Lattice, functions: &[Endomorphism]) -> Result<Endomorphism> {
    let n = l.n();
    if n == 0 || functions.len() <= 1 {
        return pointwise_glb(l, functions);
    }
    let glb = l.glb()?;
    let lub = l.lub()?;
    let top = l.top()?;
    let bottom = l.bottom()?;
    let children = l.poset().children();

    let mut h = vec![0usize; n];
    let mut known = vec![false; n];
    h[bottom] = bottom;
    known[bottom] = true;
    for &j in l.irreducibles() {
        let mut v = top;
        for f in functions {
            v = glb.get(v, f[j]);
        }
        h[j] = v;
        known[j] = true;
    }

    let mut work: VecDeque<usize> = (0..n).collect();
    while let Some(x) = work.pop_front() {
        if known[x] {
            continue;
        }
        assert!(
            children[x].len() >= 2,
            "element {x} is neither irreducible nor bottom but has {} covers",
            children[x].len()
        );
        let (i, j) = (children[x][0], children[x][1]);
        if known[i] && known[j] {
            h[x] = lub.get(h[i], h[j]);
            known[x] = true;
        } else {
            if !known[i] {
                work.push_back(i);
            }
            if !known[j] {
                work.push_back(j);
            }
            work.push_back(x);
        }
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::is_lub_preserving;
    use crate::enumerate::{FunctionStream, LubFunctions};

    fn cube3() -> Lattice {
        // Subsets of {a, b, c} ordered by inclusion.
        Lattice::from_children(
            &[
                vec![],
                vec![0],
                vec![0],
                vec![0],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
                vec![4, 5, 6],
            ],
            true,
        )
        .unwrap()
    }

    #[test]
    fn pointwise_identities() {
        let l = cube3();
        let lub_unit = pointwise_lub(&l, &[]).unwrap();
        assert_eq!(lub_unit, vec![0; 8]);
        let glb_unit = pointwise_glb(&l, &[]).unwrap();
        assert_eq!(glb_unit[0], 0);
        assert!(glb_unit[1..].iter().all(|&v| v == 7));

        let empty = Lattice::total(0);
        assert_eq!(pointwise_lub(&empty, &[]).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn pointwise_folds() {
        let l = cube3();
        let f = vec![0, 1, 1, 1, 1, 1, 1, 1];
        let g = vec![0, 2, 2, 2, 2, 2, 2, 2];
        assert_eq!(pointwise_lub(&l, &[f.clone(), g.clone()]).unwrap()[1], 4);
        assert_eq!(pointwise_glb(&l, &[f, g]).unwrap()[1], 0);
    }

    #[test]
    fn repair_of_a_pointwise_glb_is_join_preserving() {
        let l = cube3();
        let lub_fns: Vec<Endomorphism> = LubFunctions::new(&l, true).unwrap().cloned().collect();
        // Sample pairs rather than the full quadratic sweep.
        for (a, f) in lub_fns.iter().enumerate().step_by(7) {
            for g in lub_fns.iter().skip(a % 5).step_by(11) {
                let h = pointwise_glb(&l, &[f.clone(), g.clone()]).unwrap();
                let fixed = fix_f_naive(&l, &h, None).unwrap();
                assert!(is_lub_preserving(&l, &fixed, true, None), "{f:?} {g:?}");
                for i in 0..l.n() {
                    assert!(l.leq(fixed[i], h[i]));
                }
            }
        }
    }

    #[test]
    fn dmeet_agrees_with_naive_repair() {
        let l = cube3();
        assert!(l.is_distributive());
        let lub_fns: Vec<Endomorphism> = LubFunctions::new(&l, true).unwrap().cloned().collect();
        for (a, f) in lub_fns.iter().enumerate().step_by(13) {
            for g in lub_fns.iter().skip(a % 3).step_by(17) {
                let pair = [f.clone(), g.clone()];
                let naive = fix_f_naive(&l, &pointwise_glb(&l, &pair).unwrap(), None).unwrap();
                let direct = glb_of_functions_dmeet(&l, &pair).unwrap();
                assert_eq!(direct, naive, "{f:?} {g:?}");
            }
        }
    }

    #[test]
    fn dmeet_with_few_functions_degenerates_to_pointwise() {
        let l = cube3();
        let f = vec![0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(glb_of_functions_dmeet(&l, &[f.clone()]).unwrap(), f);
        assert_eq!(
            glb_of_functions_dmeet(&l, &[]).unwrap(),
            pointwise_glb(&l, &[]).unwrap()
        );
    }

    #[test]
    fn zero_budget_returns_the_input() {
        let l = cube3();
        let f = vec![0, 4, 5, 6, 7, 7, 7, 7];
        assert_eq!(fix_f_naive(&l, &f, Some(0)).unwrap(), f);
    }
}
