//! The first-order surface: a shallow classification of kernel terms into
//! connective and quantifier shapes.
//!
//! Connectives and quantifiers are applications of the context's prelude
//! constants, so classification is pure pattern matching on the outermost
//! application spine; anything unrecognized is `Other`. Quantifiers bind a
//! `setvar` through a `Lam`, and the classified body still has the bound
//! variable at de Bruijn index 0.

use kernel::context::{AND, EQUALS, EXISTS, FALSE, FORALL, IFF, IMPLIES, NOT, OR, SETVAR, TRUE, UNIQUE};
use kernel::{Arena, Expr, VarKind};

/// The outermost first-order shape of a term.
#[derive(Debug, Clone, Copy)]
pub enum FOLForm<'a> {
    /// Opaque to the first-order layer.
    Other(&'a Expr<'a>),
    Equals(&'a Expr<'a>, &'a Expr<'a>),
    True,
    False,
    Not(&'a Expr<'a>),
    And(&'a Expr<'a>, &'a Expr<'a>),
    Or(&'a Expr<'a>, &'a Expr<'a>),
    Implies(&'a Expr<'a>, &'a Expr<'a>),
    Iff(&'a Expr<'a>, &'a Expr<'a>),
    Forall(Option<&'a str>, &'a Expr<'a>),
    Exists(Option<&'a str>, &'a Expr<'a>),
    Unique(Option<&'a str>, &'a Expr<'a>),
}

// Binder hints are display-only, mirroring `Expr` equality.
impl PartialEq for FOLForm<'_> {
    fn eq(&self, other: &Self) -> bool {
        use FOLForm::*;
        match (self, other) {
            (Other(a), Other(b)) => a == b,
            (True, True) | (False, False) => true,
            (Not(a), Not(b)) => a == b,
            (Equals(a, b), Equals(c, d))
            | (And(a, b), And(c, d))
            | (Or(a, b), Or(c, d))
            | (Implies(a, b), Implies(c, d))
            | (Iff(a, b), Iff(c, d)) => a == c && b == d,
            (Forall(_, a), Forall(_, b))
            | (Exists(_, a), Exists(_, b))
            | (Unique(_, a), Unique(_, b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FOLForm<'_> {}

impl<'a> FOLForm<'a> {
    /// Classifies the outermost shape of `e`.
    pub fn from_expr(e: &'a Expr<'a>) -> FOLForm<'a> {
        match *e {
            Expr::Var(VarKind::Free, TRUE) => FOLForm::True,
            Expr::Var(VarKind::Free, FALSE) => FOLForm::False,
            Expr::App(f, x) => match *f {
                Expr::Var(VarKind::Free, NOT) => FOLForm::Not(x),
                Expr::Var(VarKind::Free, FORALL) => match *x {
                    Expr::Lam(hint, _, body) => FOLForm::Forall(hint, body),
                    _ => FOLForm::Other(e),
                },
                Expr::Var(VarKind::Free, EXISTS) => match *x {
                    Expr::Lam(hint, _, body) => FOLForm::Exists(hint, body),
                    _ => FOLForm::Other(e),
                },
                Expr::Var(VarKind::Free, UNIQUE) => match *x {
                    Expr::Lam(hint, _, body) => FOLForm::Unique(hint, body),
                    _ => FOLForm::Other(e),
                },
                Expr::App(g, l) => match *g {
                    Expr::Var(VarKind::Free, EQUALS) => FOLForm::Equals(l, x),
                    Expr::Var(VarKind::Free, AND) => FOLForm::And(l, x),
                    Expr::Var(VarKind::Free, OR) => FOLForm::Or(l, x),
                    Expr::Var(VarKind::Free, IMPLIES) => FOLForm::Implies(l, x),
                    Expr::Var(VarKind::Free, IFF) => FOLForm::Iff(l, x),
                    _ => FOLForm::Other(e),
                },
                _ => FOLForm::Other(e),
            },
            _ => FOLForm::Other(e),
        }
    }

    /// Rebuilds the term this form denotes. Inverse of
    /// [`FOLForm::from_expr`] up to the choice of binder hints.
    pub fn to_expr(&self, pool: &'a Arena) -> &'a Expr<'a> {
        match *self {
            FOLForm::Other(e) => e,
            FOLForm::Equals(l, r) => equals(l, r, pool),
            FOLForm::True => pool.free(TRUE),
            FOLForm::False => pool.free(FALSE),
            FOLForm::Not(p) => not(p, pool),
            FOLForm::And(l, r) => and(l, r, pool),
            FOLForm::Or(l, r) => or(l, r, pool),
            FOLForm::Implies(l, r) => implies(l, r, pool),
            FOLForm::Iff(l, r) => iff(l, r, pool),
            FOLForm::Forall(hint, body) => forall(hint, body, pool),
            FOLForm::Exists(hint, body) => exists(hint, body, pool),
            FOLForm::Unique(hint, body) => unique(hint, body, pool),
        }
    }
}

pub fn equals<'a>(l: &'a Expr<'a>, r: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.app(pool.free(EQUALS), l), r)
}

pub fn not<'a>(p: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.free(NOT), p)
}

pub fn and<'a>(l: &'a Expr<'a>, r: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.app(pool.free(AND), l), r)
}

pub fn or<'a>(l: &'a Expr<'a>, r: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.app(pool.free(OR), l), r)
}

pub fn implies<'a>(l: &'a Expr<'a>, r: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.app(pool.free(IMPLIES), l), r)
}

pub fn iff<'a>(l: &'a Expr<'a>, r: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.app(pool.free(IFF), l), r)
}

pub fn forall<'a>(hint: Option<&str>, body: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.free(FORALL), pool.lam(hint, pool.free(SETVAR), body))
}

pub fn exists<'a>(hint: Option<&str>, body: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.free(EXISTS), pool.lam(hint, pool.free(SETVAR), body))
}

pub fn unique<'a>(hint: Option<&str>, body: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.free(UNIQUE), pool.lam(hint, pool.free(SETVAR), body))
}

/// `p ↔ q` as the pair `(p → q, q → p)`.
pub fn split_iff<'a>(
    p: &'a Expr<'a>,
    q: &'a Expr<'a>,
    pool: &'a Arena,
) -> (&'a Expr<'a>, &'a Expr<'a>) {
    (implies(p, q, pool), implies(q, p, pool))
}

/// `∃!x. P` as the pair `(∃x. P, ∀x. (P → ∀x'. (P[x'] → x = x')))`.
///
/// In the second component the inner copy of `P` keeps index 0 for the
/// primed variable, so only its references across the new binder shift.
pub fn split_unique<'a>(
    hint: Option<&'a str>,
    body: &'a Expr<'a>,
    pool: &'a Arena,
) -> (&'a Expr<'a>, &'a Expr<'a>) {
    let existence = exists(hint, body, pool);
    let primed = hint.map(|h| pool.alloc_str(&format!("{h}'")));
    let inner_body = body.lift_above(1, 1, pool);
    let eq = equals(pool.bound(1), pool.bound(0), pool);
    let inner = forall(primed, implies(inner_body, eq, pool), pool);
    let uniqueness = forall(hint, implies(body, inner, pool), pool);
    (existence, uniqueness)
}
