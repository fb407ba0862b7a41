//! Cross-module checks on join-endomorphisms, exercising the public
//! API on hand-built lattices.

use hasse_endo::{
    Endomorphism, FunctionStream, LubFunctions, count_lub_preserving_distributive, fix_f_naive,
    is_lub_preserving, pointwise_glb, pointwise_lub,
};
use hasse_kernel::Lattice;

fn m3() -> Lattice {
    Lattice::from_up_edges(5, &[(0, 1), (0, 2), (0, 3), (1, 4), (2, 4), (3, 4)], true).unwrap()
}

fn n5() -> Lattice {
    Lattice::from_up_edges(5, &[(0, 1), (1, 2), (0, 3), (2, 4), (3, 4)], true).unwrap()
}

#[test]
fn counts_on_small_distributive_lattices() {
    // Diamond with two atoms: a join-endomorphism is free on each atom,
    // so 4 * 4 = 16.
    let diamond = Lattice::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], true).unwrap();
    assert_eq!(count_lub_preserving_distributive(&diamond).unwrap(), 16);
    assert_eq!(LubFunctions::new(&diamond, true).unwrap().count(), 16);

    // 3-chain: monotone choices for the two irreducibles, C(4, 2) = 6.
    let chain = Lattice::total(3);
    assert_eq!(count_lub_preserving_distributive(&chain).unwrap(), 6);
    assert_eq!(LubFunctions::new(&chain, true).unwrap().count(), 6);
}

#[test]
fn pointwise_lub_of_join_endomorphisms_preserves_joins() {
    // Closure under pointwise join holds on every lattice, including
    // the non-distributive M3.
    for l in [m3(), n5()] {
        let fns: Vec<Endomorphism> = LubFunctions::new(&l, true).unwrap().cloned().collect();
        assert!(!fns.is_empty());
        for f in fns.iter().step_by(3) {
            for g in fns.iter().step_by(5) {
                let joined = pointwise_lub(&l, &[f.clone(), g.clone()]).unwrap();
                assert!(is_lub_preserving(&l, &joined, true, None), "{f:?} {g:?}");
            }
        }
    }
}

#[test]
fn repair_works_on_non_distributive_lattices() {
    for l in [m3(), n5()] {
        let fns: Vec<Endomorphism> = LubFunctions::new(&l, true).unwrap().cloned().collect();
        for f in fns.iter().step_by(2) {
            for g in fns.iter().step_by(3) {
                let met = pointwise_glb(&l, &[f.clone(), g.clone()]).unwrap();
                let fixed = fix_f_naive(&l, &met, None).unwrap();
                assert!(is_lub_preserving(&l, &fixed, true, None), "{f:?} {g:?}");
                for i in 0..l.n() {
                    assert!(l.leq(fixed[i], met[i]), "repair must move downward");
                }
            }
        }
    }
}

#[test]
fn every_yielded_function_is_join_preserving() {
    for l in [m3(), n5(), Lattice::total(4)] {
        let mut stream = LubFunctions::new(&l, true).unwrap();
        while let Some(f) = stream.next_ref() {
            assert!(is_lub_preserving(&l, f, true, None), "{f:?}");
        }
    }
}
