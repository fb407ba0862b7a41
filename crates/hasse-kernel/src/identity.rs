//! Permutation-invariant identity: fingerprints, isomorphism search,
//! and canonical ranking.
//!
//! Two structurally identical posets must compare and hash equal no
//! matter how their elements are numbered. The fingerprinting here is a
//! color-refinement relaxation: each element starts from its row/column
//! signature and repeatedly absorbs the sorted multiset of its related
//! elements' fingerprints. Refinement may fail to separate elements that
//! no isomorphism could identify only with negligible probability, and
//! the exact matrix check is always the final arbiter.

use itertools::Itertools;
use sha2::{Digest, Sha256};

use crate::error::{OrderError, Result};
use crate::matrix::BoolMatrix;
use crate::poset::Poset;

/// Refinement rounds used for the cached per-element fingerprints.
pub const DEFAULT_ROUNDS: usize = 2;

/// Deeper refinement used when the candidate space is too large.
const REFINE_ROUNDS: usize = 4;
const REFINE_SALT: u64 = 1;

/// Deterministic 64-bit hash of a word sequence.
///
/// SHA-256 over the little-endian encoding, truncated to the first
/// eight bytes. Stable across runs, processes, and platforms; this
/// value participates in object identity and in the generation
/// engine's visited set, so process-seeded hashing is not an option.
pub fn hasher(words: &[u64]) -> u64 {
    let mut h = Sha256::new();
    for w in words {
        h.update(w.to_le_bytes());
    }
    let digest = h.finalize();
    u64::from_le_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
}

/// Hash of a word sequence as a multiset (order-insensitive).
pub fn hash_sorted(mut words: Vec<u64>) -> u64 {
    words.sort_unstable();
    hasher(&words)
}

/// Per-element structural fingerprints of a relation matrix.
///
/// Elements in distinguishable structural positions get different
/// fingerprints with high probability after enough rounds; elements
/// related by an automorphism always keep equal fingerprints.
pub fn elem_hashes(matrix: &BoolMatrix, rounds: usize, salt: u64) -> Vec<u64> {
    let n = matrix.n();
    let mut mat: Vec<u64> = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            mat.push(matrix.get(i, j) as u64);
        }
    }
    let mut h = perm_invariant(&mat, n, salt);
    for _ in 0..rounds {
        for i in 0..n {
            for j in 0..n {
                mat[i * n + j] = mat[i * n + j].wrapping_add(h[i].wrapping_mul(h[j]));
            }
        }
        h = perm_invariant(&mat, n, salt);
    }
    h
}

fn perm_invariant(mat: &[u64], n: usize, salt: u64) -> Vec<u64> {
    (0..n)
        .map(|i| {
            let col = (0..n).map(|r| mat[r * n + i].wrapping_add(salt)).collect();
            let row = (0..n).map(|c| mat[i * n + c].wrapping_add(salt)).collect();
            hasher(&[hash_sorted(col), hash_sorted(row)])
        })
        .collect()
}

/// Search for a permutation `f` with `P.leq(i, j) == Q.leq(f(i), f(j))`
/// for all pairs.
///
/// Quick-rejects on size or hash mismatch, then restricts candidate
/// bijections to same-fingerprint groups. If the candidate count
/// (product of group factorials) exceeds `n²`, fingerprints are refined
/// once more before backtracking. Every surviving candidate is verified
/// against the full matrices; fingerprint agreement alone is never
/// trusted.
pub fn find_isomorphism(p: &Poset, q: &Poset) -> Option<Vec<usize>> {
    if p.n() != q.n() || p.hash() != q.hash() {
        return None;
    }
    let n = p.n();
    let (total, groups) = candidate_groups(p.elem_hashes(), q.elem_hashes())?;
    let groups = if total > (n * n) as u128 {
        let ha: Vec<u64> = p
            .elem_hashes()
            .iter()
            .zip(elem_hashes(p.matrix(), REFINE_ROUNDS, REFINE_SALT))
            .map(|(&a, b)| a.wrapping_add(b))
            .collect();
        let hb: Vec<u64> = q
            .elem_hashes()
            .iter()
            .zip(elem_hashes(q.matrix(), REFINE_ROUNDS, REFINE_SALT))
            .map(|(&a, b)| a.wrapping_add(b))
            .collect();
        let (_, refined) = candidate_groups(&ha, &hb)?;
        refined
    } else {
        groups
    };
    let mut map = vec![0usize; n];
    search(p, q, &groups, 0, &mut map)
}

type Groups = Vec<(Vec<usize>, Vec<usize>)>;

/// Group both element sets by fingerprint. Returns the total number of
/// group-respecting bijections and the groups themselves, or `None`
/// when the fingerprint multisets already rule out an isomorphism.
fn candidate_groups(ha: &[u64], hb: &[u64]) -> Option<(u128, Groups)> {
    use std::collections::BTreeMap;
    let mut by_fp: BTreeMap<u64, (Vec<usize>, Vec<usize>)> = BTreeMap::new();
    for (i, &v) in ha.iter().enumerate() {
        by_fp.entry(v).or_default().0.push(i);
    }
    for (i, &v) in hb.iter().enumerate() {
        by_fp.entry(v).or_default().1.push(i);
    }
    let mut total: u128 = 1;
    let mut groups = Vec::with_capacity(by_fp.len());
    for (_, (ga, gb)) in by_fp {
        if ga.len() != gb.len() {
            return None;
        }
        total = total.saturating_mul(factorial(ga.len()));
        groups.push((ga, gb));
    }
    Some((total, groups))
}

fn factorial(k: usize) -> u128 {
    (2..=k as u128).fold(1, u128::saturating_mul)
}

fn search(p: &Poset, q: &Poset, groups: &Groups, gi: usize, map: &mut [usize]) -> Option<Vec<usize>> {
    if gi == groups.len() {
        return is_isomorphism(p, q, map).then(|| map.to_vec());
    }
    let (ga, gb) = &groups[gi];
    for perm in gb.iter().copied().permutations(gb.len()) {
        for (&a, &b) in ga.iter().zip(&perm) {
            map[a] = b;
        }
        if let Some(f) = search(p, q, groups, gi + 1, map) {
            return Some(f);
        }
    }
    None
}

fn is_isomorphism(p: &Poset, q: &Poset, f: &[usize]) -> bool {
    let n = p.n();
    (0..n).all(|i| (0..n).all(|j| p.leq(i, j) == q.leq(f[i], f[j])))
}

/// A deterministic, structure-only total order over a poset's elements.
///
/// Peels layers bottom-up (elements whose children are all ranked),
/// breaking ties within a layer by: smallest rank among already-ranked
/// covered elements, the downset/upset size ratio, more covers first,
/// then fingerprint. Reindexing by this rank yields one canonical
/// representative per isomorphism class.
pub fn canonical_rank(p: &Poset) -> Result<Vec<usize>> {
    let n = p.n();
    let children = p.children();
    let parents = p.parents();
    let matrix = p.matrix();
    let fp = p.elem_hashes();

    let nleq: Vec<u64> = (0..n).map(|i| matrix.column_count(i) as u64).collect();
    let ngeq: Vec<u64> = (0..n).map(|i| matrix.row_count(i) as u64).collect();
    let nchild: Vec<usize> = (0..n).map(|i| children[i].len()).collect();

    let mut rank = vec![usize::MAX; n];
    let mut pa_rank = vec![n; n];
    let mut visited = vec![false; n];
    let mut next_layer: Vec<usize> = (0..n).filter(|&i| children[i].is_empty()).collect();
    for &i in &next_layer {
        visited[i] = true;
    }

    let mut last = 0;
    while !next_layer.is_empty() {
        let mut layer = std::mem::take(&mut next_layer);
        layer.sort_by(|&a, &b| {
            pa_rank[a]
                .cmp(&pa_rank[b])
                // downset/upset ratios compared by cross-multiplication
                .then_with(|| {
                    let lhs = ((nleq[a] + 1) as u128) * ((ngeq[b] + 1) as u128);
                    let rhs = ((nleq[b] + 1) as u128) * ((ngeq[a] + 1) as u128);
                    lhs.cmp(&rhs)
                })
                .then_with(|| nchild[b].cmp(&nchild[a]))
                .then_with(|| fp[a].cmp(&fp[b]))
                .then_with(|| a.cmp(&b))
        });
        for &i in &layer {
            rank[i] = last;
            last += 1;
        }
        for &i in &layer {
            for &j in &parents[i] {
                if !visited[j] {
                    visited[j] = true;
                    next_layer.push(j);
                }
                pa_rank[j] = pa_rank[j].min(rank[i]);
            }
        }
    }

    if let Some(element) = (0..n).find(|&i| rank[i] == usize::MAX) {
        return Err(OrderError::CycleDetected { element });
    }
    Ok(rank)
}
