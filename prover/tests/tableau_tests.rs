//! End-to-end proof search scenarios: propositional sequents, quantifier
//! reasoning, soundness on non-theorems, and budget exhaustion.

use kernel::context::{Context, EntryBody, SETVAR};
use kernel::{Arena, Expr, Sort};
use prover::fol;
use prover::Tableau;

// A context with propositional atoms p, q, r, unary predicates P, Q and a
// binary relation R past the prelude.
struct Theory<'a> {
    ctx: Context<'a>,
    p: &'a Expr<'a>,
    q: &'a Expr<'a>,
    r: &'a Expr<'a>,
    pred_p: &'a Expr<'a>,
    pred_q: &'a Expr<'a>,
    rel: &'a Expr<'a>,
}

fn theory(pool: &Arena) -> Theory<'_> {
    let mut ctx = Context::new(pool);
    let setvar = pool.free(SETVAR);
    let prop = pool.sort(Sort::Prop);
    let pred = pool.pi(None, setvar, prop);
    let rel_ty = pool.pi(None, setvar, pred);
    let mut declare = |name: &str, ty| {
        let id = ctx.size();
        ctx.add(name, EntryBody::Decl(ty));
        pool.free(id)
    };
    let p = declare("p", prop);
    let q = declare("q", prop);
    let r = declare("r", prop);
    let pred_p = declare("P", pred);
    let pred_q = declare("Q", pred);
    let rel = declare("R", rel_ty);
    Theory {
        ctx,
        p,
        q,
        r,
        pred_p,
        pred_q,
        rel,
    }
}

fn ap<'a>(f: &'a Expr<'a>, x: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(f, x)
}

fn ap2<'a>(f: &'a Expr<'a>, x: &'a Expr<'a>, y: &'a Expr<'a>, pool: &'a Arena) -> &'a Expr<'a> {
    pool.app(pool.app(f, x), y)
}

// =============================================================================
// PROPOSITIONAL
// =============================================================================

#[test]
fn modus_ponens() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_antecedent(fol::implies(th.p, th.q, &pool));
    tableau.add_antecedent(th.p);
    tableau.add_succedent(th.q);
    assert!(tableau.search(4));
}

#[test]
fn excluded_middle() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_succedent(fol::or(th.p, fol::not(th.p, &pool), &pool));
    assert!(tableau.search(4));
}

#[test]
fn conjunction_commutes() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_antecedent(fol::and(th.p, th.q, &pool));
    tableau.add_succedent(fol::and(th.q, th.p, &pool));
    assert!(tableau.search(4));
}

#[test]
fn hypothetical_syllogism() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_antecedent(fol::implies(th.p, th.q, &pool));
    tableau.add_antecedent(fol::implies(th.q, th.r, &pool));
    tableau.add_succedent(fol::implies(th.p, th.r, &pool));
    assert!(tableau.search(4));
}

#[test]
fn iff_is_two_implications() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_antecedent(fol::iff(th.p, th.q, &pool));
    tableau.add_antecedent(th.q);
    tableau.add_succedent(th.p);
    assert!(tableau.search(4));
}

#[test]
fn false_antecedent_proves_anything() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_antecedent(fol::FOLForm::False.to_expr(&pool));
    tableau.add_succedent(th.q);
    assert!(tableau.search(0));
}

#[test]
fn atoms_do_not_entail_each_other() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_antecedent(th.p);
    tableau.add_succedent(th.q);
    assert!(!tableau.search(4));
}

// =============================================================================
// QUANTIFIERS
// =============================================================================

#[test]
fn universal_entails_existential() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    let body = ap(th.pred_p, pool.bound(0), &pool);
    tableau.add_antecedent(fol::forall(Some("x"), body, &pool));
    tableau.add_succedent(fol::exists(Some("x"), body, &pool));
    assert!(tableau.search(4));
}

#[test]
fn universal_modus_ponens() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    // ∀x. P x → Q x, ∀x. P x ⊢ ∀x. Q x
    let px = ap(th.pred_p, pool.bound(0), &pool);
    let qx = ap(th.pred_q, pool.bound(0), &pool);
    tableau.add_antecedent(fol::forall(Some("x"), fol::implies(px, qx, &pool), &pool));
    tableau.add_antecedent(fol::forall(Some("x"), px, &pool));
    tableau.add_succedent(fol::forall(Some("x"), qx, &pool));
    assert!(tableau.search(4));
}

#[test]
fn exists_forall_entails_forall_exists() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    // ∃x. ∀y. R x y ⊢ ∀y. ∃x. R x y
    let inner_l = fol::forall(Some("y"), ap2(th.rel, pool.bound(1), pool.bound(0), &pool), &pool);
    tableau.add_antecedent(fol::exists(Some("x"), inner_l, &pool));
    let inner_r = fol::exists(Some("x"), ap2(th.rel, pool.bound(0), pool.bound(1), &pool), &pool);
    tableau.add_succedent(fol::forall(Some("y"), inner_r, &pool));
    assert!(tableau.search(4));
}

#[test]
fn forall_exists_does_not_entail_exists_forall() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    // ∀x. ∃y. R x y ⊬ ∃y. ∀x. R x y — the skolem dependencies must block
    // the closing unification.
    let inner_l = fol::exists(Some("y"), ap2(th.rel, pool.bound(1), pool.bound(0), &pool), &pool);
    tableau.add_antecedent(fol::forall(Some("x"), inner_l, &pool));
    let inner_r = fol::forall(Some("x"), ap2(th.rel, pool.bound(0), pool.bound(1), &pool), &pool);
    tableau.add_succedent(fol::exists(Some("y"), inner_r, &pool));
    assert!(!tableau.search(3));
}

#[test]
fn unique_entails_existence() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    let body = ap(th.pred_p, pool.bound(0), &pool);
    tableau.add_antecedent(fol::unique(Some("x"), body, &pool));
    tableau.add_succedent(fol::exists(Some("x"), body, &pool));
    assert!(tableau.search(4));
}

// =============================================================================
// BUDGET AND STATE
// =============================================================================

#[test]
fn budget_exhaustion_is_not_a_proof() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_succedent(fol::exists(Some("x"), ap(th.pred_p, pool.bound(0), &pool), &pool));
    assert!(!tableau.search(3));
    let stats = tableau.print_stats();
    assert!(stats.contains("invocations:"));
    assert!(stats.contains("max depth reached:"));
}

#[test]
fn clear_resets_the_proof_state() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_antecedent(th.p);
    tableau.add_succedent(th.p);
    assert!(tableau.search(0));
    tableau.clear();
    // The old cedents are gone: an empty sequent is not provable.
    assert!(!tableau.search(2));
    // And the engine is reusable afterwards.
    tableau.add_antecedent(th.q);
    tableau.add_succedent(th.q);
    assert!(tableau.search(0));
}

#[test]
fn search_is_repeatable() {
    let pool = Arena::new();
    let th = theory(&pool);
    let mut tableau = Tableau::new(&th.ctx, &pool);
    tableau.add_antecedent(fol::implies(th.p, th.q, &pool));
    tableau.add_antecedent(th.p);
    tableau.add_succedent(th.q);
    assert!(tableau.search(4));
    assert!(tableau.search(4));
}
