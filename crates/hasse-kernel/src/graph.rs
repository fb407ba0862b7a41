//! Graph algorithms over relation matrices.
//!
//! Everything here is a pure function of a matrix: transitive closure and
//! reduction, all-pairs shortest paths, topological ordering of the cover
//! DAG, and connected components of the symmetrized relation.

use std::collections::VecDeque;

use crate::error::{OrderError, Result};
use crate::matrix::{BoolMatrix, DistMatrix};

/// All-pairs shortest upward distances over an adjacency matrix
/// (Floyd–Warshall, O(n³)). Unreachable pairs get the value `n`.
pub fn floyd_warshall(adj: &BoolMatrix) -> DistMatrix {
    let n = adj.n();
    let inf = n as u32;
    let mut d = vec![inf; n * n];
    for i in 0..n {
        for j in 0..n {
            if adj.get(i, j) {
                d[i * n + j] = 1;
            }
        }
        d[i * n + i] = 0;
    }
    for k in 0..n {
        for i in 0..n {
            let dik = d[i * n + k];
            if dik >= inf {
                continue;
            }
            for j in 0..n {
                let via = dik + d[k * n + j];
                if via < d[i * n + j] {
                    d[i * n + j] = via;
                }
            }
        }
    }
    DistMatrix::new(n, d)
}

/// Transitive closure of an arbitrary relation (Warshall, O(n³)).
pub fn transitive_closure(rel: &BoolMatrix) -> BoolMatrix {
    let n = rel.n();
    let mut out = rel.clone();
    for k in 0..n {
        for i in 0..n {
            if out.get(i, k) {
                for j in 0..n {
                    if out.get(k, j) {
                        out.set(i, j, true);
                    }
                }
            }
        }
    }
    out
}

/// Transitive reduction of a poset's `leq` matrix, also known as the
/// cover (Hasse) relation: `out[i][j]` iff `i < j` with nothing strictly
/// in between. Computed as `lt & !(lt ∘ lt)`, O(n³).
pub fn transitive_reduction(leq: &BoolMatrix) -> BoolMatrix {
    let n = leq.n();
    let lt = BoolMatrix::from_fn(n, |i, j| i != j && leq.get(i, j));
    let inbetween = lt.compose(&lt);
    BoolMatrix::from_fn(n, |i, j| lt.get(i, j) && !inbetween.get(i, j))
}

/// Expand a cover matrix into adjacency lists: `children[x]` are the
/// elements covered by `x`, `parents[x]` the elements covering `x`.
pub fn cover_lists(covers: &BoolMatrix) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let n = covers.n();
    let children = (0..n)
        .map(|x| (0..n).filter(|&j| covers.get(j, x)).collect())
        .collect();
    let parents = (0..n)
        .map(|x| (0..n).filter(|&j| covers.get(x, j)).collect())
        .collect();
    (children, parents)
}

/// Bottom-up topological order of the cover DAG (Kahn's algorithm).
///
/// Fails with [`OrderError::CycleDetected`] if some element is never
/// freed, which indicates a broken antisymmetry invariant upstream.
pub fn toposort_bottom_up(children: &[Vec<usize>], parents: &[Vec<usize>]) -> Result<Vec<usize>> {
    let n = children.len();
    let mut indeg: Vec<usize> = children.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| indeg[i] == 0).collect();
    let mut topo = Vec::with_capacity(n);
    let mut seen = vec![false; n];
    while let Some(u) = queue.pop_front() {
        topo.push(u);
        seen[u] = true;
        for &v in &parents[u] {
            indeg[v] -= 1;
            if indeg[v] == 0 {
                queue.push_back(v);
            }
        }
    }
    if topo.len() != n {
        let element = (0..n).find(|&i| !seen[i]).unwrap_or(0);
        return Err(OrderError::CycleDetected { element });
    }
    Ok(topo)
}

/// Connected components of the relation with all edges made
/// bidirectional, via BFS coloring. Each component lists its elements
/// in discovery order.
pub fn components(leq: &BoolMatrix) -> Vec<Vec<usize>> {
    let n = leq.n();
    let mut color = vec![usize::MAX; n];
    let mut comps: Vec<Vec<usize>> = Vec::new();
    for start in 0..n {
        if color[start] != usize::MAX {
            continue;
        }
        let id = comps.len();
        color[start] = id;
        let mut found = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            found.push(u);
            for v in 0..n {
                if (leq.get(u, v) || leq.get(v, u)) && color[v] != id {
                    color[v] = id;
                    queue.push_back(v);
                }
            }
        }
        comps.push(found);
    }
    comps
}

/// Closure of a covering-relation adjacency list: the cover matrix, the
/// upward distance matrix, and the induced `leq` (reachability) matrix.
pub fn children_to_closure(children: &[Vec<usize>]) -> (BoolMatrix, DistMatrix, BoolMatrix) {
    let n = children.len();
    let mut covers = BoolMatrix::filled(n, false);
    for (parent, below) in children.iter().enumerate() {
        for &child in below {
            covers.set(child, parent, true);
        }
    }
    let dist = floyd_warshall(&covers);
    let leq = BoolMatrix::from_fn(n, |i, j| dist.is_reachable(i, j));
    (covers, dist, leq)
}

/// Invert a permutation: `out[perm[i]] = i`.
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inv[p] = i;
    }
    inv
}

/// Whether `perm` is a permutation of `0..n`.
pub fn is_permutation(perm: &[usize], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &p in perm {
        if p >= n || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_leq(n: usize) -> BoolMatrix {
        BoolMatrix::from_fn(n, |i, j| i <= j)
    }

    #[test]
    fn reduction_of_chain_is_successor() {
        let covers = transitive_reduction(&chain_leq(4));
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(covers.get(i, j), j == i + 1, "({i}, {j})");
            }
        }
    }

    #[test]
    fn closure_inverts_reduction() {
        // Diamond: 0 < {1, 2} < 3.
        let children = vec![vec![], vec![0], vec![0], vec![1, 2]];
        let (covers, dist, leq) = children_to_closure(&children);
        assert_eq!(transitive_reduction(&leq), covers);
        assert_eq!(dist.get(0, 3), 2);
        assert!(!dist.is_reachable(1, 2));
    }

    #[test]
    fn toposort_detects_cycles() {
        // 0 and 1 cover each other.
        let children = vec![vec![1], vec![0]];
        let parents = vec![vec![1], vec![0]];
        let err = toposort_bottom_up(&children, &parents).unwrap_err();
        assert!(matches!(err, OrderError::CycleDetected { .. }));
    }

    #[test]
    fn toposort_respects_covers() {
        let children = vec![vec![], vec![0], vec![0], vec![1, 2]];
        let (covers, _, _) = children_to_closure(&children);
        let (ch, pa) = cover_lists(&covers);
        let topo = toposort_bottom_up(&ch, &pa).unwrap();
        let rank = inverse_permutation(&topo);
        assert!(rank[0] < rank[1] && rank[0] < rank[2]);
        assert!(rank[1] < rank[3] && rank[2] < rank[3]);
    }

    #[test]
    fn components_of_disjoint_chains() {
        // Two 2-chains side by side: 0<1, 2<3.
        let leq = BoolMatrix::from_fn(4, |i, j| i == j || (i == 0 && j == 1) || (i == 2 && j == 3));
        let comps = components(&leq);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0], vec![0, 1]);
        assert_eq!(comps[1], vec![2, 3]);
    }
}
