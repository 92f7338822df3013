//! The term representation: a dependently-typed lambda calculus with two
//! universes, using de Bruijn indices for bound variables, context indices
//! for free variables and numeric identifiers for metavariables.
//!
//! Terms are immutable once constructed and live in an [`Arena`]; every
//! operation that builds new structure takes the target arena explicitly
//! and returns a reference into it.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::arena::Arena;
use crate::context::Context;

/// The two universes. `Prop` classifies propositions and `Type` classifies
/// data; `Type` itself has no type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    Prop,
    Type,
}

impl Sort {
    /// Universe of `Pi`-types: quantifying into `Prop` stays in `Prop`
    /// (impredicativity), everything else lands in `Type`.
    pub fn imax(self, other: Sort) -> Sort {
        if other == Sort::Prop {
            Sort::Prop
        } else {
            Sort::Type
        }
    }
}

/// How a variable identifier is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// de Bruijn index counting binders outward; 0 is the nearest binder.
    Bound,
    /// Index of a context entry.
    Free,
    /// Metavariable placeholder, to be determined by unification.
    Meta,
}

/// A term.
///
/// Binder hints on `Lam` and `Pi` are display-only: equality and hashing
/// ignore them, and every operation preserves them where it can.
#[derive(Debug, Clone, Copy)]
pub enum Expr<'a> {
    Sort(Sort),
    Var(VarKind, usize),
    App(&'a Expr<'a>, &'a Expr<'a>),
    Lam(Option<&'a str>, &'a Expr<'a>, &'a Expr<'a>),
    Pi(Option<&'a str>, &'a Expr<'a>, &'a Expr<'a>),
}

// Convenience constructors, so call sites read `pool.app(f, x)` instead of
// spelling out the allocation.
impl Arena {
    pub fn sort<'a>(&'a self, s: Sort) -> &'a Expr<'a> {
        self.alloc(Expr::Sort(s))
    }

    pub fn var<'a>(&'a self, kind: VarKind, id: usize) -> &'a Expr<'a> {
        self.alloc(Expr::Var(kind, id))
    }

    pub fn bound<'a>(&'a self, id: usize) -> &'a Expr<'a> {
        self.var(VarKind::Bound, id)
    }

    pub fn free<'a>(&'a self, id: usize) -> &'a Expr<'a> {
        self.var(VarKind::Free, id)
    }

    pub fn meta<'a>(&'a self, id: usize) -> &'a Expr<'a> {
        self.var(VarKind::Meta, id)
    }

    pub fn app<'a>(&'a self, l: &'a Expr<'a>, r: &'a Expr<'a>) -> &'a Expr<'a> {
        self.alloc(Expr::App(l, r))
    }

    pub fn lam<'a>(&'a self, hint: Option<&str>, ty: &'a Expr<'a>, body: &'a Expr<'a>) -> &'a Expr<'a> {
        self.alloc(Expr::Lam(hint.map(|h| self.alloc_str(h)), ty, body))
    }

    pub fn pi<'a>(&'a self, hint: Option<&str>, ty: &'a Expr<'a>, body: &'a Expr<'a>) -> &'a Expr<'a> {
        self.alloc(Expr::Pi(hint.map(|h| self.alloc_str(h)), ty, body))
    }
}

// Structural equality. Hints are skipped; variable kinds are not.
impl PartialEq for Expr<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Sort(a), Expr::Sort(b)) => a == b,
            (Expr::Var(k1, i1), Expr::Var(k2, i2)) => k1 == k2 && i1 == i2,
            (Expr::App(l1, r1), Expr::App(l2, r2)) => l1 == l2 && r1 == r2,
            (Expr::Lam(_, t1, b1), Expr::Lam(_, t2, b2)) => t1 == t2 && b1 == b2,
            (Expr::Pi(_, t1, b1), Expr::Pi(_, t2, b2)) => t1 == t2 && b1 == b2,
            _ => false,
        }
    }
}

impl Eq for Expr<'_> {}

// Must agree with `PartialEq`, so hints are skipped here as well.
impl Hash for Expr<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Expr::Sort(s) => s.hash(state),
            Expr::Var(kind, id) => {
                kind.hash(state);
                id.hash(state);
            }
            Expr::App(l, r) => {
                l.hash(state);
                r.hash(state);
            }
            Expr::Lam(_, t, b) | Expr::Pi(_, t, b) => {
                t.hash(state);
                b.hash(state);
            }
        }
    }
}

impl<'a> Expr<'a> {
    /// A 64-bit digest of the term, consistent with equality.
    pub fn hash64(&self) -> u64 {
        let mut h = DefaultHasher::new();
        self.hash(&mut h);
        h.finish()
    }

    /// Deep copy into `pool`. Structure and hints are preserved; the copy
    /// is independent of the source arena.
    pub fn clone_in<'b>(&self, pool: &'b Arena) -> &'b Expr<'b> {
        self.update_vars(0, pool, &mut |_, _, _, _| None)
    }

    /// Does a `Var(kind, id)` occur anywhere in the tree?
    pub fn occurs(&self, kind: VarKind, id: usize) -> bool {
        match *self {
            Expr::Sort(_) => false,
            Expr::Var(k, i) => k == kind && i == id,
            Expr::App(l, r) => l.occurs(kind, id) || r.occurs(kind, id),
            Expr::Lam(_, t, b) | Expr::Pi(_, t, b) => t.occurs(kind, id) || b.occurs(kind, id),
        }
    }

    /// Node count.
    pub fn size(&self) -> usize {
        match *self {
            Expr::Sort(_) | Expr::Var(..) => 1,
            Expr::App(l, r) => 1 + l.size() + r.size(),
            Expr::Lam(_, t, b) | Expr::Pi(_, t, b) => 1 + t.size() + b.size(),
        }
    }

    /// One past the largest metavariable id occurring in the term, or 0 if
    /// the term is ground.
    pub fn num_meta(&self) -> usize {
        match *self {
            Expr::Sort(_) => 0,
            Expr::Var(VarKind::Meta, id) => id + 1,
            Expr::Var(..) => 0,
            Expr::App(l, r) => l.num_meta().max(r.num_meta()),
            Expr::Lam(_, t, b) | Expr::Pi(_, t, b) => t.num_meta().max(b.num_meta()),
        }
    }

    /// True when the term contains no metavariables.
    pub fn is_ground(&self) -> bool {
        match *self {
            Expr::Sort(_) => true,
            Expr::Var(kind, _) => kind != VarKind::Meta,
            Expr::App(l, r) => l.is_ground() && r.is_ground(),
            Expr::Lam(_, t, b) | Expr::Pi(_, t, b) => t.is_ground() && b.is_ground(),
        }
    }

    /// Rebuilds the term into `pool`, applying `f` to every variable.
    ///
    /// `f` receives the binder depth at the occurrence (starting from
    /// `depth` at the root), the variable's kind and id, and the target
    /// arena; returning `None` keeps the variable unchanged. Everything
    /// that is not a variable is copied structurally.
    pub fn update_vars<'b, F>(&self, depth: usize, pool: &'b Arena, f: &mut F) -> &'b Expr<'b>
    where
        F: FnMut(usize, VarKind, usize, &'b Arena) -> Option<&'b Expr<'b>>,
    {
        match *self {
            Expr::Sort(s) => pool.sort(s),
            Expr::Var(kind, id) => f(depth, kind, id, pool).unwrap_or_else(|| pool.var(kind, id)),
            Expr::App(l, r) => {
                let l = l.update_vars(depth, pool, f);
                let r = r.update_vars(depth, pool, f);
                pool.app(l, r)
            }
            Expr::Lam(h, t, b) => {
                let t = t.update_vars(depth, pool, f);
                let b = b.update_vars(depth + 1, pool, f);
                pool.lam(h, t, b)
            }
            Expr::Pi(h, t, b) => {
                let t = t.update_vars(depth, pool, f);
                let b = b.update_vars(depth + 1, pool, f);
                pool.pi(h, t, b)
            }
        }
    }

    /// Shifts bound variables at or above `cutoff` up by `by`.
    pub fn lift_above<'b>(&self, cutoff: usize, by: usize, pool: &'b Arena) -> &'b Expr<'b> {
        self.update_vars(cutoff, pool, &mut |depth, kind, id, pool| {
            if kind == VarKind::Bound && id >= depth {
                Some(pool.var(VarKind::Bound, id + by))
            } else {
                None
            }
        })
    }

    /// Shifts all free bound variables up by `by`.
    pub fn lift<'b>(&self, by: usize, pool: &'b Arena) -> &'b Expr<'b> {
        self.lift_above(0, by, pool)
    }

    /// Fills the hole at de Bruijn index 0 with `arg`: deeper indices are
    /// decremented and `arg` is lifted as it crosses binders.
    pub fn make_replace<'b, 'c>(&self, arg: &Expr<'c>, pool: &'b Arena) -> &'b Expr<'b> {
        self.update_vars(0, pool, &mut |depth, kind, id, pool| {
            if kind != VarKind::Bound {
                None
            } else if id == depth {
                Some(arg.lift(depth, pool))
            } else if id > depth {
                Some(pool.var(VarKind::Bound, id - 1))
            } else {
                None
            }
        })
    }

    /// β-normalization: children are reduced first, then head redexes are
    /// contracted until none remain.
    ///
    /// Termination is not guaranteed for arbitrary terms; the checker only
    /// reduces well-typed expressions, for which normalization holds.
    pub fn reduce<'b>(&self, pool: &'b Arena) -> &'b Expr<'b> {
        match *self {
            Expr::Sort(_) | Expr::Var(..) => self.clone_in(pool),
            Expr::App(l, r) => {
                let l = l.reduce(pool);
                let r = r.reduce(pool);
                if let Expr::Lam(_, _, body) = *l {
                    body.make_replace(r, pool).reduce(pool)
                } else {
                    pool.app(l, r)
                }
            }
            Expr::Lam(h, t, b) => {
                let t = t.reduce(pool);
                let b = b.reduce(pool);
                pool.lam(h, t, b)
            }
            Expr::Pi(h, t, b) => {
                let t = t.reduce(pool);
                let b = b.reduce(pool);
                pool.pi(h, t, b)
            }
        }
    }

    /// Renders the term with context names for free variables.
    pub fn show(&self, ctx: &Context) -> String {
        let mut names = Vec::new();
        self.render(Some(ctx), &mut names)
    }

    fn render(&self, ctx: Option<&Context>, names: &mut Vec<String>) -> String {
        match *self {
            Expr::Sort(Sort::Prop) => "Prop".to_string(),
            Expr::Sort(Sort::Type) => "Type".to_string(),
            Expr::Var(VarKind::Bound, id) => {
                if id < names.len() {
                    names[names.len() - 1 - id].clone()
                } else {
                    format!("@B{id}")
                }
            }
            Expr::Var(VarKind::Free, id) => match ctx {
                Some(ctx) if ctx.valid(id) => ctx.name_of(id).unwrap_or_default().to_string(),
                _ => format!("@F{id}"),
            },
            Expr::Var(VarKind::Meta, id) => format!("@M{id}"),
            Expr::App(l, r) => format!("({} {})", l.render(ctx, names), r.render(ctx, names)),
            Expr::Lam(hint, t, b) => {
                let name = binder_name(hint, names.len());
                let t = t.render(ctx, names);
                names.push(name.clone());
                let b = b.render(ctx, names);
                names.pop();
                format!("(\\{name}: {t} => {b})")
            }
            Expr::Pi(hint, t, b) => {
                let dependent = b.uses_bound(0);
                let name = binder_name(hint, names.len());
                let t = t.render(ctx, names);
                names.push(name.clone());
                let b = b.render(ctx, names);
                names.pop();
                if dependent {
                    format!("(({name}: {t}) -> {b})")
                } else {
                    format!("({t} -> {b})")
                }
            }
        }
    }

    // Depth-aware occurrence test used for the non-dependent Pi shorthand.
    fn uses_bound(&self, depth: usize) -> bool {
        match *self {
            Expr::Sort(_) => false,
            Expr::Var(kind, id) => kind == VarKind::Bound && id == depth,
            Expr::App(l, r) => l.uses_bound(depth) || r.uses_bound(depth),
            Expr::Lam(_, t, b) | Expr::Pi(_, t, b) => {
                t.uses_bound(depth) || b.uses_bound(depth + 1)
            }
        }
    }
}

fn binder_name(hint: Option<&str>, depth: usize) -> String {
    match hint {
        Some(h) if !h.is_empty() => h.to_string(),
        _ => {
            // Unnamed binders get a, b, ..., z, aa, ... by depth.
            let mut i = depth;
            let mut name = String::new();
            loop {
                name.push((b'a' + (i % 26) as u8) as char);
                i /= 26;
                if i == 0 {
                    break;
                }
            }
            name
        }
    }
}

impl fmt::Display for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        write!(f, "{}", self.render(None, &mut names))
    }
}
