//! Ordered, named stack of typed declarations and hypotheses.
//!
//! Entry `i` introduces the free variable `Var(Free, i)`; later entries may
//! reference earlier ones, never the converse. Popping an assumption
//! *discharges* it: every later entry is rewritten so its dependency on the
//! popped entry becomes explicit — an implication or universal
//! quantification for propositions, a `Pi`-abstraction for types.

use crate::arena::Arena;
use crate::expr::{Expr, Sort, VarKind};

/// Prelude indices. Every context starts with these entries, in this
/// order, so the identifiers are fixed across contexts.
pub const SETVAR: usize = 0;
/// The distinguished equality predicate.
pub const EQUALS: usize = 1;
pub const TRUE: usize = 2;
pub const FALSE: usize = 3;
pub const NOT: usize = 4;
pub const AND: usize = 5;
pub const OR: usize = 6;
pub const IMPLIES: usize = 7;
pub const IFF: usize = 8;
pub const FORALL: usize = 9;
pub const EXISTS: usize = 10;
pub const UNIQUE: usize = 11;
/// Number of prelude entries installed by [`Context::new`].
pub const PRELUDE_SIZE: usize = 12;

/// What an entry asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryBody<'a> {
    /// A typed declaration: the term is the type classifying `Var(Free, i)`.
    Decl(&'a Expr<'a>),
    /// A hypothesis: a proposition assumed to hold.
    Hyp(&'a Expr<'a>),
}

impl<'a> EntryBody<'a> {
    pub fn expr(&self) -> &'a Expr<'a> {
        match *self {
            EntryBody::Decl(e) | EntryBody::Hyp(e) => e,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub name: String,
    pub body: EntryBody<'a>,
}

/// The context: a stack of entries plus the indices of entries that were
/// pushed as assumptions and are still eligible for discharge.
pub struct Context<'a> {
    entries: Vec<Entry<'a>>,
    scopes: Vec<usize>,
}

impl<'a> Context<'a> {
    /// A context holding just the prelude: the base type of individuals,
    /// equality, and the propositional connectives and quantifiers the
    /// first-order layer recognizes.
    pub fn new(pool: &'a Arena) -> Self {
        let mut ctx = Context {
            entries: Vec::new(),
            scopes: Vec::new(),
        };
        let setvar = pool.free(SETVAR);
        let prop = pool.sort(Sort::Prop);
        let unary = pool.pi(None, prop, prop);
        let binary = pool.pi(None, prop, unary);
        let pred = pool.pi(None, setvar, prop);
        let quant = pool.pi(None, pred, prop);
        ctx.add("setvar", EntryBody::Decl(pool.sort(Sort::Type)));
        ctx.add("=", EntryBody::Decl(pool.pi(None, setvar, pred)));
        ctx.add("true", EntryBody::Decl(prop));
        ctx.add("false", EntryBody::Decl(prop));
        ctx.add("not", EntryBody::Decl(unary));
        ctx.add("and", EntryBody::Decl(binary));
        ctx.add("or", EntryBody::Decl(binary));
        ctx.add("implies", EntryBody::Decl(binary));
        ctx.add("iff", EntryBody::Decl(binary));
        ctx.add("forall", EntryBody::Decl(quant));
        ctx.add("exists", EntryBody::Decl(quant));
        ctx.add("unique", EntryBody::Decl(quant));
        ctx
    }

    /// Appends a derived entry (a definition or proven theorem). Derived
    /// entries are rewritten by discharge but never discharged themselves.
    pub fn add(&mut self, name: impl Into<String>, body: EntryBody<'a>) {
        self.entries.push(Entry {
            name: name.into(),
            body,
        });
    }

    /// Appends an assumption and records it for discharge.
    pub fn push(&mut self, name: impl Into<String>, body: EntryBody<'a>) {
        self.scopes.push(self.entries.len());
        self.add(name, body);
    }

    /// Discharges the most recently pushed assumption, rewriting every
    /// later entry. Returns `false` when there is nothing to discharge.
    pub fn pop(&mut self, pool: &'a Arena) -> bool {
        let Some(k) = self.scopes.pop() else {
            return false;
        };
        let popped = self.entries[k].body;
        let hint = self.entries[k].name.clone();
        for j in (k + 1)..self.entries.len() {
            let name = std::mem::take(&mut self.entries[j].name);
            let body = self.entries[j].body;
            let new_body = match popped {
                EntryBody::Hyp(h) => match body {
                    // Implication-introduction for later hypotheses.
                    EntryBody::Hyp(p) => {
                        let p = decrement_free(p, k, pool);
                        EntryBody::Hyp(pool.app(pool.app(pool.free(IMPLIES), h), p))
                    }
                    // Types do not depend on hypotheses in this logic.
                    EntryBody::Decl(t) => EntryBody::Decl(decrement_free(t, k, pool)),
                },
                EntryBody::Decl(tau) => {
                    let tau2 = decrement_free(tau, k, pool);
                    match body {
                        // Universal-introduction for later hypotheses. A
                        // first-order variable generalizes through the
                        // `forall` constant; anything else through `Pi`.
                        EntryBody::Hyp(p) => {
                            let p = abstract_free(p, k, pool);
                            if matches!(*tau, Expr::Var(VarKind::Free, SETVAR)) {
                                EntryBody::Hyp(pool.app(
                                    pool.free(FORALL),
                                    pool.lam(Some(hint.as_str()), tau2, p),
                                ))
                            } else {
                                EntryBody::Hyp(pool.pi(Some(hint.as_str()), tau2, p))
                            }
                        }
                        // Later declarations become function types.
                        EntryBody::Decl(s) => {
                            let s = abstract_free(s, k, pool);
                            EntryBody::Decl(pool.pi(Some(hint.as_str()), tau2, s))
                        }
                    }
                }
            };
            self.entries[j - 1] = Entry {
                name,
                body: new_body,
            };
        }
        self.entries.pop();
        true
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn valid(&self, i: usize) -> bool {
        i < self.entries.len()
    }

    pub fn get(&self, i: usize) -> Option<&Entry<'a>> {
        self.entries.get(i)
    }

    pub fn name_of(&self, i: usize) -> Option<&str> {
        self.entries.get(i).map(|e| e.name.as_str())
    }

    /// Identifier of the built-in equality predicate.
    pub fn equals_id(&self) -> usize {
        EQUALS
    }
}

// Free variables defined after the popped entry shift down by one.
fn decrement_free<'a>(e: &Expr<'_>, k: usize, pool: &'a Arena) -> &'a Expr<'a> {
    e.update_vars(0, pool, &mut |_, kind, id, pool| {
        if kind == VarKind::Free && id > k {
            Some(pool.var(VarKind::Free, id - 1))
        } else {
            None
        }
    })
}

// The popped variable itself becomes the nearest new binder; later free
// variables shift down by one.
fn abstract_free<'a>(e: &Expr<'_>, k: usize, pool: &'a Arena) -> &'a Expr<'a> {
    e.update_vars(0, pool, &mut |depth, kind, id, pool| {
        if kind != VarKind::Free {
            None
        } else if id == k {
            Some(pool.var(VarKind::Bound, depth))
        } else if id > k {
            Some(pool.var(VarKind::Free, id - 1))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_layout() {
        let pool = Arena::new();
        let ctx = Context::new(&pool);
        assert_eq!(ctx.size(), PRELUDE_SIZE);
        assert_eq!(ctx.equals_id(), EQUALS);
        assert_eq!(ctx.name_of(EQUALS), Some("="));
        assert_eq!(ctx.name_of(FORALL), Some("forall"));
        assert!(ctx.valid(UNIQUE));
        assert!(!ctx.valid(PRELUDE_SIZE));
    }

    #[test]
    fn pop_on_pristine_context_underflows() {
        let pool = Arena::new();
        let mut ctx = Context::new(&pool);
        assert!(!ctx.pop(&pool));
        assert_eq!(ctx.size(), PRELUDE_SIZE);
    }

    #[test]
    fn push_then_pop_restores_size() {
        let pool = Arena::new();
        let mut ctx = Context::new(&pool);
        ctx.push("p", EntryBody::Decl(pool.sort(Sort::Prop)));
        assert_eq!(ctx.size(), PRELUDE_SIZE + 1);
        assert!(ctx.pop(&pool));
        assert_eq!(ctx.size(), PRELUDE_SIZE);
        assert_eq!(ctx.name_of(UNIQUE), Some("unique"));
    }
}
