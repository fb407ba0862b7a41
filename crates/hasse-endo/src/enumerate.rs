//! Lazy enumeration of endomorphisms.
//!
//! Every enumerator here is a backtracking search over a bottom-up
//! topological order of the lattice: one element's image is assigned at
//! a time, and the admissible images for an element are exactly those
//! above-or-equal the join of the images already assigned to its
//! covering children. That is what makes monotonicity hold by
//! construction at every leaf instead of being re-checked per function.
//!
//! Enumerators implement [`FunctionStream`], which yields views into a
//! single internal buffer ([`FunctionStream::next_ref`], the in-place
//! performance mode) and can be wrapped into an ordinary cloning
//! [`Iterator`] via [`FunctionStream::cloned`]. Both contracts produce
//! the same deterministic sequence; only the ownership of the yielded
//! value differs.

use hasse_kernel::{Lattice, PairTable, Result};

use crate::Endomorphism;
use crate::check;

/// A restartable, deterministic sequence of endomorphisms sharing one
/// internal buffer.
pub trait FunctionStream {
    /// Step to the next function; `false` once exhausted.
    fn advance(&mut self) -> bool;

    /// The current function. Invalidated by the next [`advance`].
    ///
    /// [`advance`]: FunctionStream::advance
    fn current(&self) -> &[usize];

    /// Advance and view, in one call. The returned slice aliases the
    /// internal buffer and is invalidated by the next call.
    fn next_ref(&mut self) -> Option<&[usize]> {
        if self.advance() { Some(self.current()) } else { None }
    }

    /// Wrap into an [`Iterator`] yielding owned copies.
    fn cloned(self) -> ClonedFunctions<Self>
    where
        Self: Sized,
    {
        ClonedFunctions { stream: self }
    }

    /// Exhaust the stream, counting functions.
    fn count(mut self) -> usize
    where
        Self: Sized,
    {
        let mut found = 0;
        while self.advance() {
            found += 1;
        }
        found
    }
}

/// Iterator adapter over a [`FunctionStream`]; the safe default mode.
pub struct ClonedFunctions<S> {
    stream: S,
}

impl<S: FunctionStream> Iterator for ClonedFunctions<S> {
    type Item = Endomorphism;

    fn next(&mut self) -> Option<Endomorphism> {
        self.stream.next_ref().map(<[usize]>::to_vec)
    }
}

/// The shared backtracking engine.
///
/// Walks `seq` in order; the image of `seq[d]` must be above-or-equal
/// the join of the images of `kids[d]` (all assigned earlier), and the
/// candidates for a minimum `v` are the precomputed up-set `geq[v]`.
/// `geq[v]` always contains `v` itself, so descent never dead-ends and
/// every descent reaches a full assignment.
struct Backtrack<'a> {
    lub: &'a PairTable,
    bottom: usize,
    seq: Vec<usize>,
    kids: Vec<Vec<usize>>,
    geq: Vec<Vec<usize>>,
    f: Vec<usize>,
    frames: Vec<Frame>,
    fresh: bool,
    done: bool,
}

struct Frame {
    min: usize,
    idx: usize,
}

impl<'a> Backtrack<'a> {
    fn new(
        lub: &'a PairTable,
        bottom: usize,
        seq: Vec<usize>,
        kids: Vec<Vec<usize>>,
        geq: Vec<Vec<usize>>,
        f: Vec<usize>,
        done: bool,
    ) -> Self {
        Self {
            lub,
            bottom,
            seq,
            kids,
            geq,
            frames: Vec::with_capacity(f.len()),
            f,
            fresh: true,
            done,
        }
    }

    fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        if self.fresh {
            self.fresh = false;
            self.descend();
            return true;
        }
        loop {
            let Some(mut frame) = self.frames.pop() else {
                self.done = true;
                return false;
            };
            frame.idx += 1;
            if frame.idx < self.geq[frame.min].len() {
                let depth = self.frames.len();
                self.f[self.seq[depth]] = self.geq[frame.min][frame.idx];
                self.frames.push(frame);
                self.descend();
                return true;
            }
        }
    }

    /// Assign first candidates down to a full assignment.
    fn descend(&mut self) {
        while self.frames.len() < self.seq.len() {
            let depth = self.frames.len();
            let mut min = self.bottom;
            for &c in &self.kids[depth] {
                min = self.lub.get(min, self.f[c]);
            }
            self.f[self.seq[depth]] = self.geq[min][0];
            self.frames.push(Frame { min, idx: 0 });
        }
    }
}

/// Every function `{0..n} -> {0..n}`, in odometer order (last element
/// varies fastest). The empty lattice yields nothing.
pub struct AllFunctions {
    f: Vec<usize>,
    n: usize,
    fixed: Option<usize>,
    fresh: bool,
    done: bool,
}

impl AllFunctions {
    pub fn new(n: usize) -> Self {
        Self {
            f: vec![0; n],
            n,
            fixed: None,
            fresh: true,
            done: n == 0,
        }
    }

    /// All functions mapping bottom to bottom.
    pub fn bottom_fixed(l: &Lattice) -> Result<Self> {
        let mut stream = Self::new(l.n());
        if l.n() > 0 {
            let b = l.bottom()?;
            stream.fixed = Some(b);
            stream.f[b] = b;
        }
        Ok(stream)
    }
}

impl FunctionStream for AllFunctions {
    fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        if self.fresh {
            self.fresh = false;
            return true;
        }
        for i in (0..self.n).rev() {
            if Some(i) == self.fixed {
                continue;
            }
            if self.f[i] + 1 < self.n {
                self.f[i] += 1;
                return true;
            }
            self.f[i] = 0;
        }
        self.done = true;
        false
    }

    fn current(&self) -> &[usize] {
        &self.f
    }
}

/// All monotone endomorphisms, via constrained backtracking over the
/// topological order.
pub struct MonotoneFunctions<'a> {
    engine: Backtrack<'a>,
}

impl<'a> MonotoneFunctions<'a> {
    pub fn new(l: &'a Lattice, bottom_to_bottom: bool) -> Result<Self> {
        let n = l.n();
        let lub = l.lub()?;
        if n == 0 {
            let engine = Backtrack::new(lub, 0, Vec::new(), Vec::new(), Vec::new(), Vec::new(), true);
            return Ok(Self { engine });
        }
        let bottom = l.bottom()?;
        let topo = l.poset().topo_bottom_up()?;
        let children = l.poset().children();
        // Candidate images in topo order, upward-closed from each element.
        let geq: Vec<Vec<usize>> = (0..n)
            .map(|v| topo.iter().copied().filter(|&j| l.leq(v, j)).collect())
            .collect();
        let mut f = vec![0usize; n];
        let seq: Vec<usize> = if bottom_to_bottom {
            f[bottom] = bottom;
            topo[1..].to_vec()
        } else {
            topo.to_vec()
        };
        let kids: Vec<Vec<usize>> = seq.iter().map(|&x| children[x].clone()).collect();
        Ok(Self {
            engine: Backtrack::new(lub, bottom, seq, kids, geq, f, false),
        })
    }
}

impl FunctionStream for MonotoneFunctions<'_> {
    fn advance(&mut self) -> bool {
        self.engine.advance()
    }

    fn current(&self) -> &[usize] {
        &self.engine.f
    }
}

/// Monotone assignments over the join-irreducibles only, with every
/// other element extrapolated as the join of the irreducibles below it.
///
/// On a distributive lattice this is exactly the set of join-preserving
/// endomorphisms (a join-endomorphism is determined by its values on
/// irreducibles). On other lattices the extrapolated functions are a
/// superset and must be filtered.
pub struct IrreducibleMonotone<'a> {
    engine: Backtrack<'a>,
    bottom: usize,
    /// Non-irreducible elements, recomputed from the irreducible images
    /// after every assignment.
    targets: Vec<usize>,
    /// Per element, the irreducibles below-or-equal to it.
    irr_below: Vec<Vec<usize>>,
    roam: Option<Roam<'a>>,
}

/// State of the `bottom_to_bottom = false` variant: for each base
/// function, the bottom image additionally ranges over the down-set of
/// the meet of all irreducible images.
struct Roam<'a> {
    glb: &'a PairTable,
    top: usize,
    below: Vec<Vec<usize>>,
    irreducibles: Vec<usize>,
    options: Vec<usize>,
    idx: usize,
    active: bool,
}

impl<'a> IrreducibleMonotone<'a> {
    pub fn new(l: &'a Lattice, bottom_to_bottom: bool) -> Result<Self> {
        let n = l.n();
        let lub = l.lub()?;
        if n == 0 {
            let engine = Backtrack::new(lub, 0, Vec::new(), Vec::new(), Vec::new(), Vec::new(), true);
            return Ok(Self {
                engine,
                bottom: 0,
                targets: Vec::new(),
                irr_below: Vec::new(),
                roam: None,
            });
        }
        let bottom = l.bottom()?;
        let comps = l.irreducible_components()?;
        let mut seq = Vec::new();
        let mut kids = Vec::new();
        for (topo, children) in comps.topos.iter().zip(&comps.children) {
            seq.extend_from_slice(topo);
            kids.extend(children.iter().cloned());
        }
        let geq: Vec<Vec<usize>> = (0..n)
            .map(|v| (0..n).filter(|&j| l.leq(v, j)).collect())
            .collect();
        let irreducibles = l.irreducibles().to_vec();
        let targets: Vec<usize> = (0..n).filter(|i| !irreducibles.contains(i)).collect();
        let irr_below = l.irreducible_downsets().to_vec();
        let roam = if bottom_to_bottom {
            None
        } else {
            Some(Roam {
                glb: l.glb()?,
                top: l.top()?,
                below: (0..n)
                    .map(|j| (0..n).filter(|&i| l.leq(i, j)).collect())
                    .collect(),
                irreducibles,
                options: Vec::new(),
                idx: 0,
                active: false,
            })
        };
        Ok(Self {
            engine: Backtrack::new(lub, bottom, seq, kids, geq, vec![bottom; n], false),
            bottom,
            targets,
            irr_below,
            roam,
        })
    }

    fn extrapolate(&mut self) {
        for &j in &self.targets {
            let mut v = self.bottom;
            for &i in &self.irr_below[j] {
                v = self.engine.lub.get(v, self.engine.f[i]);
            }
            self.engine.f[j] = v;
        }
    }
}

impl FunctionStream for IrreducibleMonotone<'_> {
    fn advance(&mut self) -> bool {
        if let Some(roam) = &mut self.roam {
            if roam.active && roam.idx + 1 < roam.options.len() {
                roam.idx += 1;
                self.engine.f[self.bottom] = roam.options[roam.idx];
                return true;
            }
        }
        if !self.engine.advance() {
            return false;
        }
        self.extrapolate();
        if let Some(roam) = &mut self.roam {
            let mut meet = roam.top;
            for &i in &roam.irreducibles {
                meet = roam.glb.get(meet, self.engine.f[i]);
            }
            roam.options.clone_from(&roam.below[meet]);
            roam.idx = 0;
            roam.active = true;
            self.engine.f[self.bottom] = roam.options[0];
        }
        true
    }

    fn current(&self) -> &[usize] {
        &self.engine.f
    }
}

/// All join-preserving endomorphisms.
///
/// Dispatches on distributivity: distributive lattices use the
/// irreducible shortcut, everything else enumerates monotone functions
/// and filters, since extrapolation from irreducibles is unsound there.
pub struct LubFunctions<'a> {
    inner: LubInner<'a>,
}

enum LubInner<'a> {
    Irreducible(IrreducibleMonotone<'a>),
    Brute {
        lattice: &'a Lattice,
        mono: MonotoneFunctions<'a>,
        bottom_to_bottom: bool,
    },
}

impl<'a> LubFunctions<'a> {
    pub fn new(l: &'a Lattice, bottom_to_bottom: bool) -> Result<Self> {
        let inner = if l.is_distributive() {
            LubInner::Irreducible(IrreducibleMonotone::new(l, bottom_to_bottom)?)
        } else {
            LubInner::Brute {
                lattice: l,
                mono: MonotoneFunctions::new(l, bottom_to_bottom)?,
                bottom_to_bottom,
            }
        };
        Ok(Self { inner })
    }
}

impl FunctionStream for LubFunctions<'_> {
    fn advance(&mut self) -> bool {
        match &mut self.inner {
            LubInner::Irreducible(stream) => stream.advance(),
            LubInner::Brute {
                lattice,
                mono,
                bottom_to_bottom,
            } => loop {
                if !mono.advance() {
                    return false;
                }
                if check::is_lub_preserving(*lattice, mono.current(), *bottom_to_bottom, None) {
                    return true;
                }
            },
        }
    }

    fn current(&self) -> &[usize] {
        match &self.inner {
            LubInner::Irreducible(stream) => stream.current(),
            LubInner::Brute { mono, .. } => mono.current(),
        }
    }
}

/// `n^n`, matching [`AllFunctions`] (which yields nothing for `n = 0`).
pub fn count_all(l: &Lattice) -> u128 {
    let n = l.n();
    if n == 0 { 0 } else { (n as u128).pow(n as u32) }
}

/// `n^(n-1)`: all functions with the bottom image fixed.
pub fn count_all_bottom(l: &Lattice) -> u128 {
    let n = l.n();
    if n == 0 { 0 } else { (n as u128).pow(n as u32 - 1) }
}

/// Count monotone endomorphisms by exhausting the stream.
pub fn count_monotone(l: &Lattice, bottom_to_bottom: bool) -> Result<u128> {
    Ok(MonotoneFunctions::new(l, bottom_to_bottom)?.count() as u128)
}

/// Count join-preserving endomorphisms of a distributive lattice
/// without enumerating them: the join-irreducibles split into
/// independent components, so the count is the product of the monotone
/// counts restricted to each component.
pub fn count_lub_preserving_distributive(l: &Lattice) -> Result<u128> {
    let n = l.n();
    if n == 0 {
        return Ok(0);
    }
    l.assert_is_distributive()?;
    let lub = l.lub()?;
    let bottom = l.bottom()?;
    let geq: Vec<Vec<usize>> = (0..n)
        .map(|v| (0..n).filter(|&j| l.leq(v, j)).collect())
        .collect();
    let comps = l.irreducible_components()?;
    let mut f = vec![bottom; n];
    let mut total: u128 = 1;
    for (topo, children) in comps.topos.iter().zip(&comps.children) {
        total *= count_restricted(lub, bottom, &geq, topo, children, &mut f, 0);
    }
    Ok(total)
}

fn count_restricted(
    lub: &PairTable,
    bottom: usize,
    geq: &[Vec<usize>],
    topo: &[usize],
    children: &[Vec<usize>],
    f: &mut [usize],
    depth: usize,
) -> u128 {
    if depth == topo.len() {
        return 1;
    }
    let mut min = bottom;
    for &c in &children[depth] {
        min = lub.get(min, f[c]);
    }
    let mut total = 0;
    for k in 0..geq[min].len() {
        f[topo[depth]] = geq[min][k];
        total += count_restricted(lub, bottom, geq, topo, children, f, depth + 1);
    }
    total
}
