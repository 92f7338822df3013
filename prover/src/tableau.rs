//! Proof search by the method of analytic tableaux for classical
//! first-order logic.
//!
//! A proof state carries antecedents (side `L`) and succedents (side `R`).
//! Cedents are classified into five buckets: ι (atomic), α (non-branching),
//! β (branching), γ (universal-like) and δ (existential-like). Each bucket
//! is a FIFO shared by both sides, so γ-formulas from either side are
//! round-robined instead of starving one another; membership hash sets per
//! side suppress duplicates and detect ground closure on insertion.
//!
//! The search is depth-first with an iterative-deepening outer loop. Depth
//! is measured in γ-instantiations on the current path, the only source of
//! unbounded growth. β-rules fork the state; both forks must close, and the
//! substitution found while closing the first fork carries into the second.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};

use kernel::{Arena, Context, Expr};

use crate::fol::{self, FOLForm};
use crate::unify::{apply_subs, equal_after_subs, unify, Subs};

/// A term reference with its hash precomputed, so set probes do not rehash
/// whole trees.
#[derive(Debug, Clone, Copy)]
struct HashedExpr<'a> {
    e: &'a Expr<'a>,
    hash: u64,
}

impl<'a> HashedExpr<'a> {
    fn new(e: &'a Expr<'a>) -> Self {
        HashedExpr { e, hash: e.hash64() }
    }
}

impl PartialEq for HashedExpr<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.e == other.e
    }
}

impl Eq for HashedExpr<'_> {}

impl Hash for HashedExpr<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    L,
    R,
}

impl Side {
    fn flip(self) -> Side {
        match self {
            Side::L => Side::R,
            Side::R => Side::L,
        }
    }
}

/// Cedent buckets, declared in expansion priority order: atoms first to
/// maximize early closure, β last because it multiplies states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Atom,
    Alpha,
    Delta,
    Gamma,
    Beta,
}

const KINDS: usize = 5;
const EXPANSION_ORDER: [Kind; KINDS] = [Kind::Atom, Kind::Alpha, Kind::Delta, Kind::Gamma, Kind::Beta];

fn classify(side: Side, e: &Expr<'_>) -> Kind {
    match FOLForm::from_expr(e) {
        FOLForm::Other(_) | FOLForm::Equals(..) | FOLForm::True | FOLForm::False => Kind::Atom,
        FOLForm::Not(_) => Kind::Alpha,
        FOLForm::And(..) | FOLForm::Iff(..) | FOLForm::Unique(..) => {
            if side == Side::L {
                Kind::Alpha
            } else {
                Kind::Beta
            }
        }
        FOLForm::Or(..) | FOLForm::Implies(..) => {
            if side == Side::L {
                Kind::Beta
            } else {
                Kind::Alpha
            }
        }
        FOLForm::Forall(..) => {
            if side == Side::L {
                Kind::Gamma
            } else {
                Kind::Delta
            }
        }
        FOLForm::Exists(..) => {
            if side == Side::L {
                Kind::Delta
            } else {
                Kind::Gamma
            }
        }
    }
}

/// Everything that varies along one branch of the tableau: the bucket
/// queues with their head indices, per-side membership sets, the
/// accumulated substitution, and the fresh-identifier counters.
#[derive(Clone, Default)]
struct Branch<'a> {
    queues: [Vec<(Side, &'a Expr<'a>)>; KINDS],
    heads: [usize; KINDS],
    members: [HashSet<HashedExpr<'a>>; 2],
    subs: Subs<'a>,
    num_universal: usize,
    num_skolem: usize,
}

impl<'a> Branch<'a> {
    /// Inserts a cedent, returning `true` when the branch closes on the
    /// spot: a `false` antecedent, a `true` succedent, or an expression
    /// already present on the opposite side.
    fn add(&mut self, side: Side, e: &'a Expr<'a>) -> bool {
        match FOLForm::from_expr(e) {
            FOLForm::True => return side == Side::R,
            FOLForm::False => return side == Side::L,
            _ => {}
        }
        let key = HashedExpr::new(e);
        if self.members[side.flip() as usize].contains(&key) {
            return true;
        }
        if self.members[side as usize].insert(key) {
            let kind = classify(side, e);
            self.queues[kind as usize].push((side, e));
        }
        false
    }
}

/// The tableau engine. Decides, soundly but incompletely, whether the
/// antecedents entail the disjunction of the succedents. The context is
/// consulted for its size (skolem identifiers are allocated past it);
/// expansion products are allocated into the caller's arena.
pub struct Tableau<'a> {
    ctx: &'a Context<'a>,
    pool: &'a Arena,
    branch: Branch<'a>,
    root_closed: bool,
    // Statistics: observable but non-semantic.
    max_depth_reached: usize,
    invocations: usize,
    branches: usize,
    closed: usize,
}

impl<'a> Tableau<'a> {
    pub fn new(ctx: &'a Context<'a>, pool: &'a Arena) -> Self {
        Tableau {
            ctx,
            pool,
            branch: Branch::default(),
            root_closed: false,
            max_depth_reached: 0,
            invocations: 0,
            branches: 0,
            closed: 0,
        }
    }

    pub fn add_antecedent(&mut self, e: &'a Expr<'a>) {
        if self.branch.add(Side::L, e) {
            self.root_closed = true;
        }
    }

    pub fn add_succedent(&mut self, e: &'a Expr<'a>) {
        if self.branch.add(Side::R, e) {
            self.root_closed = true;
        }
    }

    /// Removes all cedents and resets statistics. The arena is owned by the
    /// caller and is not touched.
    pub fn clear(&mut self) {
        self.branch = Branch::default();
        self.root_closed = false;
        self.max_depth_reached = 0;
        self.invocations = 0;
        self.branches = 0;
        self.closed = 0;
    }

    /// Searches for a closed tableau, iteratively deepening the
    /// γ-instantiation budget up to `max_depth`.
    ///
    /// `false` means no proof was found within the budget, not that the
    /// sequent is unprovable.
    pub fn search(&mut self, max_depth: usize) -> bool {
        if self.root_closed {
            return true;
        }
        let initial = self.branch.clone();
        for budget in 0..=max_depth {
            self.branch = initial.clone();
            if self.dfs(0, budget) {
                self.branch = initial;
                return true;
            }
        }
        self.branch = initial;
        false
    }

    pub fn print_stats(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "invocations: {}", self.invocations);
        let _ = writeln!(out, "branches: {}", self.branches);
        let _ = writeln!(out, "closed: {}", self.closed);
        let _ = writeln!(out, "max depth reached: {}", self.max_depth_reached);
        out
    }

    fn dfs(&mut self, depth: usize, max_depth: usize) -> bool {
        self.invocations += 1;
        if depth > self.max_depth_reached {
            self.max_depth_reached = depth;
        }
        for kind in EXPANSION_ORDER {
            if kind == Kind::Gamma && depth >= max_depth {
                continue;
            }
            let head = self.branch.heads[kind as usize];
            if head >= self.branch.queues[kind as usize].len() {
                continue;
            }
            let (side, e) = self.branch.queues[kind as usize][head];
            self.branch.heads[kind as usize] += 1;
            return self.expand(kind, side, e, depth, max_depth);
        }
        // Fully explored with no closure: the branch stays open.
        false
    }

    fn expand(&mut self, kind: Kind, side: Side, e: &'a Expr<'a>, depth: usize, max_depth: usize) -> bool {
        let pool = self.pool;
        match kind {
            Kind::Atom => self.expand_atom(side, e, depth, max_depth),
            Kind::Alpha => {
                let children: Vec<(Side, &'a Expr<'a>)> = match (FOLForm::from_expr(e), side) {
                    (FOLForm::Not(p), s) => vec![(s.flip(), p)],
                    (FOLForm::And(p, q), Side::L) => vec![(Side::L, p), (Side::L, q)],
                    (FOLForm::Or(p, q), Side::R) => vec![(Side::R, p), (Side::R, q)],
                    (FOLForm::Implies(p, q), Side::R) => vec![(Side::L, p), (Side::R, q)],
                    (FOLForm::Iff(p, q), Side::L) => {
                        let (pq, qp) = fol::split_iff(p, q, pool);
                        vec![(Side::L, pq), (Side::L, qp)]
                    }
                    (FOLForm::Unique(hint, body), Side::L) => {
                        let (ex, uq) = fol::split_unique(hint, body, pool);
                        vec![(Side::L, ex), (Side::L, uq)]
                    }
                    _ => unreachable!("misclassified α-cedent"),
                };
                for (s, c) in children {
                    if self.branch.add(s, c) {
                        self.closed += 1;
                        return true;
                    }
                }
                self.dfs(depth, max_depth)
            }
            Kind::Delta => {
                let body = match FOLForm::from_expr(e) {
                    FOLForm::Forall(_, b) | FOLForm::Exists(_, b) => b,
                    _ => unreachable!("misclassified δ-cedent"),
                };
                // A fresh skolem symbol, applied to every metavariable in
                // scope so that later instantiations cannot capture it.
                let mut witness = pool.free(self.ctx.size() + self.branch.num_skolem);
                self.branch.num_skolem += 1;
                for m in 0..self.branch.num_universal {
                    witness = pool.app(witness, pool.meta(m));
                }
                let inst = body.make_replace(witness, pool);
                if self.branch.add(side, inst) {
                    self.closed += 1;
                    return true;
                }
                self.dfs(depth, max_depth)
            }
            Kind::Gamma => {
                let body = match FOLForm::from_expr(e) {
                    FOLForm::Forall(_, b) | FOLForm::Exists(_, b) => b,
                    _ => unreachable!("misclassified γ-cedent"),
                };
                let m = pool.meta(self.branch.num_universal);
                self.branch.num_universal += 1;
                let inst = body.make_replace(m, pool);
                // Re-enqueue so the formula can be instantiated again later.
                self.branch.queues[Kind::Gamma as usize].push((side, e));
                if self.branch.add(side, inst) {
                    self.closed += 1;
                    return true;
                }
                self.dfs(depth + 1, max_depth)
            }
            Kind::Beta => {
                let (first, second) = match (FOLForm::from_expr(e), side) {
                    (FOLForm::Or(p, q), Side::L) => ((Side::L, p), (Side::L, q)),
                    (FOLForm::And(p, q), Side::R) => ((Side::R, p), (Side::R, q)),
                    (FOLForm::Implies(p, q), Side::L) => ((Side::R, p), (Side::L, q)),
                    (FOLForm::Iff(p, q), Side::R) => {
                        let (pq, qp) = fol::split_iff(p, q, pool);
                        ((Side::R, pq), (Side::R, qp))
                    }
                    (FOLForm::Unique(hint, body), Side::R) => {
                        let (ex, uq) = fol::split_unique(hint, body, pool);
                        ((Side::R, ex), (Side::R, uq))
                    }
                    _ => unreachable!("misclassified β-cedent"),
                };
                self.branches += 1;
                let saved = self.branch.clone();
                let closed_first = if self.branch.add(first.0, first.1) {
                    self.closed += 1;
                    true
                } else {
                    self.dfs(depth, max_depth)
                };
                if closed_first {
                    // The second fork restarts from the saved state but
                    // keeps the substitution and counters the first fork
                    // committed to.
                    let subs = std::mem::take(&mut self.branch.subs);
                    let num_universal = self.branch.num_universal;
                    let num_skolem = self.branch.num_skolem;
                    self.branch = saved.clone();
                    self.branch.subs = subs;
                    self.branch.num_universal = num_universal;
                    self.branch.num_skolem = num_skolem;
                    let closed_second = if self.branch.add(second.0, second.1) {
                        self.closed += 1;
                        true
                    } else {
                        self.dfs(depth, max_depth)
                    };
                    if closed_second {
                        return true;
                    }
                }
                self.branch = saved;
                false
            }
        }
    }

    // Expanding an atom means trying to close the branch against the
    // opposite side, by equality modulo the current substitution or by
    // unification. If nothing closes, the atom stays available for later
    // pairs and the search moves on.
    fn expand_atom(&mut self, side: Side, e: &'a Expr<'a>, depth: usize, max_depth: usize) -> bool {
        let opposite: Vec<&'a Expr<'a>> = self.branch.queues[Kind::Atom as usize]
            .iter()
            .filter(|(s, _)| *s != side)
            .map(|(_, x)| *x)
            .collect();
        for other in opposite {
            if equal_after_subs(e, other, &self.branch.subs) {
                self.closed += 1;
                return true;
            }
            if e.is_ground() && other.is_ground() {
                continue;
            }
            let lhs = apply_subs(e, &self.branch.subs, self.pool);
            let rhs = apply_subs(other, &self.branch.subs, self.pool);
            if let Some(found) = unify(vec![(lhs, rhs)], self.pool) {
                merge_subs(&mut self.branch.subs, &found);
                self.closed += 1;
                return true;
            }
        }
        self.dfs(depth, max_depth)
    }
}

// Adjoins bindings found by a closing unification. The pair was resolved
// through `subs` before unifying, so the new bindings only concern
// previously undetermined variables and acyclicity is preserved.
fn merge_subs<'a>(subs: &mut Subs<'a>, found: &Subs<'a>) {
    for (i, binding) in found.iter().enumerate() {
        if let Some(t) = binding {
            while subs.len() <= i {
                subs.push(None);
            }
            subs[i] = Some(t);
        }
    }
}
