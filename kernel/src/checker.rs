//! The type checker: computes the β-normal type of a term under a context.
//!
//! Presented as type synthesis. Failures are values; nothing here panics on
//! ill-typed input.

use thiserror::Error;

use crate::arena::Arena;
use crate::context::{Context, EntryBody};
use crate::expr::{Expr, Sort, VarKind};

/// A structural or type failure during checking. Each variant carries the
/// offending subterm so callers can overlay diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidExpr<'a> {
    #[error("Type has no type: {at}")]
    SortOfType { at: &'a Expr<'a> },
    #[error("de Bruijn index too large ({id} with {depth} binders in scope): {at}")]
    BoundOverflow {
        id: usize,
        depth: usize,
        at: &'a Expr<'a>,
    },
    #[error("free variable not in context: {at}")]
    FreeUnbound { id: usize, at: &'a Expr<'a> },
    #[error("free variable refers to a hypothesis, not a declaration: {at}")]
    FreeNotDecl { id: usize, at: &'a Expr<'a> },
    #[error("unexpected metavariable: {at}")]
    UnexpectedMeta { at: &'a Expr<'a> },
    #[error("expected a sort, got {got}: {at}")]
    ExpectedSort {
        got: &'a Expr<'a>,
        at: &'a Expr<'a>,
    },
    #[error("expected a function type, got {got}: {at}")]
    ExpectedPi {
        got: &'a Expr<'a>,
        at: &'a Expr<'a>,
    },
    #[error("argument type mismatch: expected {expected}, got {got}: {at}")]
    ArgTypeMismatch {
        expected: &'a Expr<'a>,
        got: &'a Expr<'a>,
        at: &'a Expr<'a>,
    },
}

/// Synthesizes the type of `e` under `ctx`, allocating into `pool`.
///
/// The returned type is β-normal and closed with respect to local binders.
pub fn check<'a>(
    e: &'a Expr<'a>,
    ctx: &Context<'a>,
    pool: &'a Arena,
) -> Result<&'a Expr<'a>, InvalidExpr<'a>> {
    let mut stk = Vec::new();
    check_inner(e, ctx, pool, &mut stk)
}

fn check_inner<'a>(
    e: &'a Expr<'a>,
    ctx: &Context<'a>,
    pool: &'a Arena,
    stk: &mut Vec<&'a Expr<'a>>,
) -> Result<&'a Expr<'a>, InvalidExpr<'a>> {
    match *e {
        Expr::Sort(Sort::Prop) => Ok(pool.sort(Sort::Type)),
        Expr::Sort(Sort::Type) => Err(InvalidExpr::SortOfType { at: e }),
        Expr::Var(VarKind::Bound, id) => {
            if id < stk.len() {
                let t = stk[stk.len() - 1 - id];
                // The stored type predates `id + 1` binders.
                Ok(t.lift(id + 1, pool).reduce(pool))
            } else {
                Err(InvalidExpr::BoundOverflow {
                    id,
                    depth: stk.len(),
                    at: e,
                })
            }
        }
        Expr::Var(VarKind::Free, id) => match ctx.get(id) {
            Some(entry) => match entry.body {
                EntryBody::Decl(t) => Ok(t.reduce(pool)),
                EntryBody::Hyp(_) => Err(InvalidExpr::FreeNotDecl { id, at: e }),
            },
            None => Err(InvalidExpr::FreeUnbound { id, at: e }),
        },
        Expr::Var(VarKind::Meta, _) => Err(InvalidExpr::UnexpectedMeta { at: e }),
        Expr::App(l, r) => {
            let lt = check_inner(l, ctx, pool, stk)?;
            let Expr::Pi(_, expected, body) = *lt else {
                return Err(InvalidExpr::ExpectedPi { got: lt, at: e });
            };
            let rt = check_inner(r, ctx, pool, stk)?;
            if rt != expected {
                return Err(InvalidExpr::ArgTypeMismatch {
                    expected,
                    got: rt,
                    at: e,
                });
            }
            Ok(body.make_replace(r, pool).reduce(pool))
        }
        Expr::Lam(hint, t, b) => {
            domain_sort(t, ctx, pool, stk)?;
            let t = t.reduce(pool);
            stk.push(t);
            let bt = check_inner(b, ctx, pool, stk);
            stk.pop();
            Ok(pool.pi(hint, t, bt?))
        }
        Expr::Pi(_, t, b) => {
            let s1 = domain_sort(t, ctx, pool, stk)?;
            stk.push(t.reduce(pool));
            let bt = check_inner(b, ctx, pool, stk);
            stk.pop();
            let bt = bt?;
            let Expr::Sort(s2) = *bt else {
                return Err(InvalidExpr::ExpectedSort { got: bt, at: e });
            };
            Ok(pool.sort(s1.imax(s2)))
        }
    }
}

// A binder domain is either a sort itself (a sort has no type, but is a
// valid domain classifying at `Type`) or a term whose type is a sort.
fn domain_sort<'a>(
    t: &'a Expr<'a>,
    ctx: &Context<'a>,
    pool: &'a Arena,
    stk: &mut Vec<&'a Expr<'a>>,
) -> Result<Sort, InvalidExpr<'a>> {
    if let Expr::Sort(_) = *t {
        return Ok(Sort::Type);
    }
    let s = check_inner(t, ctx, pool, stk)?;
    match *s {
        Expr::Sort(s) => Ok(s),
        _ => Err(InvalidExpr::ExpectedSort { got: s, at: t }),
    }
}
