//! First-order unification and anti-unification over kernel terms.
//!
//! Metavariables (`Var(Meta, i)`) are the unknowns; every other variable is
//! a constant. Substitutions are dense indexed sequences with unset holes
//! and must be acyclic, which the occurs check guarantees.

use kernel::{Arena, Context, Expr, VarKind};

/// A substitution: `subs[i]` is the replacement for `Var(Meta, i)`, or
/// `None` when the metavariable is still undetermined.
pub type Subs<'a> = Vec<Option<&'a Expr<'a>>>;

/// Rewrites every determined metavariable, resolving chains through `subs`
/// recursively.
pub fn apply_subs<'a>(e: &Expr<'_>, subs: &[Option<&'a Expr<'a>>], pool: &'a Arena) -> &'a Expr<'a> {
    e.update_vars(0, pool, &mut |_, kind, id, pool| {
        if kind == VarKind::Meta {
            if let Some(t) = subs.get(id).copied().flatten() {
                return Some(apply_subs(t, subs, pool));
            }
        }
        None
    })
}

/// Structural equality after resolving metavariables through `subs` on both
/// sides. Allocation-free.
pub fn equal_after_subs<'a>(
    l: &'a Expr<'a>,
    r: &'a Expr<'a>,
    subs: &[Option<&'a Expr<'a>>],
) -> bool {
    let l = resolve(l, subs);
    let r = resolve(r, subs);
    match (*l, *r) {
        (Expr::Sort(a), Expr::Sort(b)) => a == b,
        (Expr::Var(k1, i1), Expr::Var(k2, i2)) => k1 == k2 && i1 == i2,
        (Expr::App(l1, r1), Expr::App(l2, r2)) => {
            equal_after_subs(l1, l2, subs) && equal_after_subs(r1, r2, subs)
        }
        (Expr::Lam(_, t1, b1), Expr::Lam(_, t2, b2))
        | (Expr::Pi(_, t1, b1), Expr::Pi(_, t2, b2)) => {
            equal_after_subs(t1, t2, subs) && equal_after_subs(b1, b2, subs)
        }
        _ => false,
    }
}

fn resolve<'a>(mut e: &'a Expr<'a>, subs: &[Option<&'a Expr<'a>>]) -> &'a Expr<'a> {
    while let Expr::Var(VarKind::Meta, id) = *e {
        match subs.get(id).copied().flatten() {
            Some(t) => e = t,
            None => break,
        }
    }
    e
}

/// Robinson's unification over a worklist of pairs.
///
/// Returns the solved substitution, or `None` on mismatch or occurs-check
/// failure. Worst case is exponential; callers size their problems.
pub fn unify<'a>(
    mut pairs: Vec<(&'a Expr<'a>, &'a Expr<'a>)>,
    pool: &'a Arena,
) -> Option<Subs<'a>> {
    let mut subs: Subs<'a> = Vec::new();
    let mut i = 0;
    while i < pairs.len() {
        let (lhs, rhs) = pairs[i];
        match (*lhs, *rhs) {
            // Variable elimination on the left.
            (Expr::Var(VarKind::Meta, id), _) => {
                if lhs != rhs {
                    if rhs.occurs(VarKind::Meta, id) {
                        return None;
                    }
                    eliminate(id, rhs, &mut subs, &mut pairs, i + 1, pool);
                }
            }
            // Variable elimination on the right.
            (_, Expr::Var(VarKind::Meta, id)) => {
                if lhs.occurs(VarKind::Meta, id) {
                    return None;
                }
                eliminate(id, lhs, &mut subs, &mut pairs, i + 1, pool);
            }
            // Term reduction: matching roots push their children.
            (Expr::Sort(a), Expr::Sort(b)) => {
                if a != b {
                    return None;
                }
            }
            (Expr::Var(k1, i1), Expr::Var(k2, i2)) => {
                if k1 != k2 || i1 != i2 {
                    return None;
                }
            }
            (Expr::App(l1, r1), Expr::App(l2, r2)) => {
                pairs.push((l1, l2));
                pairs.push((r1, r2));
            }
            (Expr::Lam(_, t1, b1), Expr::Lam(_, t2, b2))
            | (Expr::Pi(_, t1, b1), Expr::Pi(_, t2, b2)) => {
                pairs.push((t1, t2));
                pairs.push((b1, b2));
            }
            _ => return None,
        }
        i += 1;
    }
    Some(subs)
}

// Records `id := e`, then substitutes through the rest of the worklist so
// the eliminated variable never reappears.
fn eliminate<'a>(
    id: usize,
    e: &'a Expr<'a>,
    subs: &mut Subs<'a>,
    pairs: &mut [(&'a Expr<'a>, &'a Expr<'a>)],
    from: usize,
    pool: &'a Arena,
) {
    while subs.len() <= id {
        subs.push(None);
    }
    subs[id] = Some(e);
    for p in pairs[from..].iter_mut() {
        p.0 = replace_meta(p.0, id, e, pool);
        p.1 = replace_meta(p.1, id, e, pool);
    }
}

fn replace_meta<'a>(
    target: &'a Expr<'a>,
    id: usize,
    e: &'a Expr<'a>,
    pool: &'a Arena,
) -> &'a Expr<'a> {
    target.update_vars(0, pool, &mut |_, kind, i, _| {
        if kind == VarKind::Meta && i == id {
            Some(e)
        } else {
            None
        }
    })
}

/// First-order syntactic anti-unification: the least general generalization
/// of two terms, with the two substitutions recovering each side.
///
/// Wherever the roots disagree a fresh metavariable is emitted, numbered
/// from 0 in discovery order, and `applySubs(gen, ls) ≡ lhs` (likewise for
/// the right side).
pub fn antiunify<'a>(
    lhs: &'a Expr<'a>,
    rhs: &'a Expr<'a>,
    pool: &'a Arena,
) -> (&'a Expr<'a>, Subs<'a>, Subs<'a>) {
    let mut ls = Vec::new();
    let mut rs = Vec::new();
    let gen = antiunify_inner(lhs, rhs, &mut ls, &mut rs, pool);
    (gen, ls, rs)
}

fn antiunify_inner<'a>(
    lhs: &'a Expr<'a>,
    rhs: &'a Expr<'a>,
    ls: &mut Subs<'a>,
    rs: &mut Subs<'a>,
    pool: &'a Arena,
) -> &'a Expr<'a> {
    match (*lhs, *rhs) {
        (Expr::Sort(a), Expr::Sort(b)) if a == b => pool.sort(a),
        (Expr::Var(k1, i1), Expr::Var(k2, i2)) if k1 == k2 && i1 == i2 => pool.var(k1, i1),
        (Expr::App(l1, r1), Expr::App(l2, r2)) => {
            let l = antiunify_inner(l1, l2, ls, rs, pool);
            let r = antiunify_inner(r1, r2, ls, rs, pool);
            pool.app(l, r)
        }
        (Expr::Lam(h, t1, b1), Expr::Lam(_, t2, b2)) => {
            let t = antiunify_inner(t1, t2, ls, rs, pool);
            let b = antiunify_inner(b1, b2, ls, rs, pool);
            pool.lam(h, t, b)
        }
        (Expr::Pi(h, t1, b1), Expr::Pi(_, t2, b2)) => {
            let t = antiunify_inner(t1, t2, ls, rs, pool);
            let b = antiunify_inner(b1, b2, ls, rs, pool);
            pool.pi(h, t, b)
        }
        _ => {
            // Disagreement point: generalize with a fresh metavariable.
            let id = ls.len();
            ls.push(Some(lhs));
            rs.push(Some(rhs));
            pool.meta(id)
        }
    }
}

/// Renders a substitution with context names, one binding per line.
pub fn show_subs(subs: &Subs<'_>, ctx: &Context<'_>) -> String {
    let mut out = String::new();
    for (i, binding) in subs.iter().enumerate() {
        if let Some(t) = binding {
            out.push_str(&format!("@M{i} => {}\n", t.show(ctx)));
        }
    }
    out
}
