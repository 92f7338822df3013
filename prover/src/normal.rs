//! Normal forms over the first-order surface: negation normal form,
//! skolemization and conjunctive normal form.

use kernel::{Arena, Context, Expr, VarKind};

use crate::fol::{self, FOLForm};

/// Negation normal form. Pushes `not` down to literals, flipping
/// `and`/`or` and the quantifiers; `implies`, `iff` and `unique` are
/// expanded away. Pass `negated = true` to normalize the negation of `e`.
pub fn nnf<'a>(e: &'a Expr<'a>, pool: &'a Arena, negated: bool) -> &'a Expr<'a> {
    match FOLForm::from_expr(e) {
        FOLForm::Other(_) | FOLForm::Equals(..) => {
            if negated {
                fol::not(e, pool)
            } else {
                e
            }
        }
        FOLForm::True => {
            if negated {
                FOLForm::False.to_expr(pool)
            } else {
                e
            }
        }
        FOLForm::False => {
            if negated {
                FOLForm::True.to_expr(pool)
            } else {
                e
            }
        }
        FOLForm::Not(p) => nnf(p, pool, !negated),
        FOLForm::And(p, q) => {
            let p = nnf(p, pool, negated);
            let q = nnf(q, pool, negated);
            if negated {
                fol::or(p, q, pool)
            } else {
                fol::and(p, q, pool)
            }
        }
        FOLForm::Or(p, q) => {
            let p = nnf(p, pool, negated);
            let q = nnf(q, pool, negated);
            if negated {
                fol::and(p, q, pool)
            } else {
                fol::or(p, q, pool)
            }
        }
        // p → q is ¬p ∨ q.
        FOLForm::Implies(p, q) => {
            let p = nnf(p, pool, !negated);
            let q = nnf(q, pool, negated);
            if negated {
                fol::and(p, q, pool)
            } else {
                fol::or(p, q, pool)
            }
        }
        // p ↔ q is (p → q) ∧ (q → p).
        FOLForm::Iff(p, q) => {
            let (pq, qp) = fol::split_iff(p, q, pool);
            let pq = nnf(pq, pool, negated);
            let qp = nnf(qp, pool, negated);
            if negated {
                fol::or(pq, qp, pool)
            } else {
                fol::and(pq, qp, pool)
            }
        }
        FOLForm::Forall(hint, body) => {
            let body = nnf(body, pool, negated);
            if negated {
                fol::exists(hint, body, pool)
            } else {
                fol::forall(hint, body, pool)
            }
        }
        FOLForm::Exists(hint, body) => {
            let body = nnf(body, pool, negated);
            if negated {
                fol::forall(hint, body, pool)
            } else {
                fol::exists(hint, body, pool)
            }
        }
        FOLForm::Unique(hint, body) => {
            let (ex, uq) = fol::split_unique(hint, body, pool);
            let ex = nnf(ex, pool, negated);
            let uq = nnf(uq, pool, negated);
            if negated {
                fol::or(ex, uq, pool)
            } else {
                fol::and(ex, uq, pool)
            }
        }
    }
}

/// Skolemization: strips quantifiers from a formula, replacing universally
/// bound variables with fresh metavariables and existentially bound
/// variables with fresh skolem symbols applied to the metavariables in
/// scope. Skolem identifiers start past the end of the context. Connectives
/// outside negation normal form are normalized first.
pub fn skolemize<'a>(e: &'a Expr<'a>, ctx: &Context<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    let mut num_meta = e.num_meta();
    let mut num_skolem = 0;
    let mut scope = Vec::new();
    skolemize_inner(e, ctx, pool, &mut num_meta, &mut num_skolem, &mut scope)
}

fn skolemize_inner<'a>(
    e: &'a Expr<'a>,
    ctx: &Context<'a>,
    pool: &'a Arena,
    num_meta: &mut usize,
    num_skolem: &mut usize,
    scope: &mut Vec<usize>,
) -> &'a Expr<'a> {
    match FOLForm::from_expr(e) {
        FOLForm::Other(_) | FOLForm::Equals(..) | FOLForm::True | FOLForm::False => e,
        FOLForm::Not(p) => match FOLForm::from_expr(p) {
            // Negated literals pass through.
            FOLForm::Other(_) | FOLForm::Equals(..) | FOLForm::True | FOLForm::False => e,
            _ => skolemize_inner(nnf(e, pool, false), ctx, pool, num_meta, num_skolem, scope),
        },
        FOLForm::And(p, q) => {
            let p = skolemize_inner(p, ctx, pool, num_meta, num_skolem, scope);
            let q = skolemize_inner(q, ctx, pool, num_meta, num_skolem, scope);
            fol::and(p, q, pool)
        }
        FOLForm::Or(p, q) => {
            let p = skolemize_inner(p, ctx, pool, num_meta, num_skolem, scope);
            let q = skolemize_inner(q, ctx, pool, num_meta, num_skolem, scope);
            fol::or(p, q, pool)
        }
        FOLForm::Forall(_, body) => {
            let m = *num_meta;
            *num_meta += 1;
            scope.push(m);
            let inst = body.make_replace(pool.var(VarKind::Meta, m), pool);
            let res = skolemize_inner(inst, ctx, pool, num_meta, num_skolem, scope);
            scope.pop();
            res
        }
        FOLForm::Exists(_, body) => {
            let mut witness = pool.free(ctx.size() + *num_skolem);
            *num_skolem += 1;
            for &m in scope.iter() {
                witness = pool.app(witness, pool.var(VarKind::Meta, m));
            }
            let inst = body.make_replace(witness, pool);
            skolemize_inner(inst, ctx, pool, num_meta, num_skolem, scope)
        }
        // Not in negation normal form: normalize first.
        FOLForm::Implies(..) | FOLForm::Iff(..) | FOLForm::Unique(..) => {
            skolemize_inner(nnf(e, pool, false), ctx, pool, num_meta, num_skolem, scope)
        }
    }
}

/// A clause: a disjunction of literals.
pub type Clause<'a> = Vec<&'a Expr<'a>>;

/// Conjunctive normal form for the `and`/`or`/`true`/`false` fragment.
/// Conjunction concatenates clause sets, disjunction distributes, and every
/// other shape is kept as an opaque literal.
pub fn cnf<'a>(e: &'a Expr<'a>) -> Vec<Clause<'a>> {
    match FOLForm::from_expr(e) {
        FOLForm::And(p, q) => {
            let mut clauses = cnf(p);
            clauses.extend(cnf(q));
            clauses
        }
        FOLForm::Or(p, q) => {
            let left = cnf(p);
            let right = cnf(q);
            let mut clauses = Vec::with_capacity(left.len() * right.len());
            for a in &left {
                for b in &right {
                    let mut clause = a.clone();
                    clause.extend(b.iter().copied());
                    clauses.push(clause);
                }
            }
            clauses
        }
        // An empty conjunction.
        FOLForm::True => Vec::new(),
        // A conjunction containing the empty clause.
        FOLForm::False => vec![Vec::new()],
        _ => vec![vec![e]],
    }
}
