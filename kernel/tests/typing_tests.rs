//! Type checker semantics that must remain stable: sorts, binder rules,
//! impredicativity, β-normal results, and the error surface.

use kernel::checker::{check, InvalidExpr};
use kernel::context::{Context, EntryBody};
use kernel::{Arena, Expr, Sort, VarKind};

fn prop_decl<'a>(ctx: &mut Context<'a>, pool: &'a Arena, name: &str) -> &'a Expr<'a> {
    let id = ctx.size();
    ctx.add(name, EntryBody::Decl(pool.sort(Sort::Prop)));
    pool.free(id)
}

// =============================================================================
// SORTS AND VARIABLES
// =============================================================================

#[test]
fn prop_lives_in_type() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    let ty = check(pool.sort(Sort::Prop), &ctx, &pool).expect("Prop should check");
    assert_eq!(ty, pool.sort(Sort::Type));
}

#[test]
fn type_has_no_type() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    let err = check(pool.sort(Sort::Type), &ctx, &pool).expect_err("Type should not check");
    assert!(matches!(err, InvalidExpr::SortOfType { .. }));
}

#[test]
fn free_variable_types_come_from_the_context() {
    let pool = Arena::new();
    let mut ctx = Context::new(&pool);
    let p = prop_decl(&mut ctx, &pool, "p");
    let ty = check(p, &ctx, &pool).expect("declared variable should check");
    assert_eq!(ty, pool.sort(Sort::Prop));
}

#[test]
fn out_of_context_variables_are_rejected() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    let err = check(pool.free(99), &ctx, &pool).expect_err("unbound free variable");
    assert!(matches!(err, InvalidExpr::FreeUnbound { id: 99, .. }));

    let err = check(pool.bound(0), &ctx, &pool).expect_err("dangling de Bruijn index");
    assert!(matches!(err, InvalidExpr::BoundOverflow { id: 0, depth: 0, .. }));

    let err = check(pool.meta(0), &ctx, &pool).expect_err("metavariable in checking");
    assert!(matches!(err, InvalidExpr::UnexpectedMeta { .. }));
}

#[test]
fn hypotheses_are_not_terms() {
    let pool = Arena::new();
    let mut ctx = Context::new(&pool);
    let p = prop_decl(&mut ctx, &pool, "p");
    let hyp_id = ctx.size();
    ctx.push("h", EntryBody::Hyp(p));
    let err = check(pool.free(hyp_id), &ctx, &pool).expect_err("hypothesis used as a term");
    assert!(matches!(err, InvalidExpr::FreeNotDecl { .. }));
}

// =============================================================================
// BINDERS
// =============================================================================

#[test]
fn type_of_identity_on_types() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    // \x: Type => x  :  Type -> Type
    let id = pool.lam(Some("x"), pool.sort(Sort::Type), pool.bound(0));
    let ty = check(id, &ctx, &pool).expect("identity should check");
    assert_eq!(ty, pool.pi(Some("x"), pool.sort(Sort::Type), pool.sort(Sort::Type)));
}

#[test]
fn type_of_polymorphic_identity() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    // \A: Type => \x: A => x  :  (A: Type) -> (x: A) -> A
    let id = pool.lam(
        Some("A"),
        pool.sort(Sort::Type),
        pool.lam(Some("x"), pool.bound(0), pool.bound(0)),
    );
    let ty = check(id, &ctx, &pool).expect("polymorphic identity should check");
    let expected = pool.pi(
        Some("A"),
        pool.sort(Sort::Type),
        pool.pi(Some("x"), pool.bound(0), pool.bound(1)),
    );
    assert_eq!(ty, expected);
}

#[test]
fn prop_is_impredicative() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    // (P: Prop) -> P  :  Prop
    let e = pool.pi(Some("P"), pool.sort(Sort::Prop), pool.bound(0));
    let ty = check(e, &ctx, &pool).expect("impredicative Pi should check");
    assert_eq!(ty, pool.sort(Sort::Prop));
}

#[test]
fn pi_over_data_lands_in_type() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    // setvar -> Prop (the type of predicates) : Type
    let setvar = pool.free(kernel::context::SETVAR);
    let e = pool.pi(None, setvar, pool.sort(Sort::Prop));
    let ty = check(e, &ctx, &pool).expect("predicate type should check");
    assert_eq!(ty, pool.sort(Sort::Type));
}

// =============================================================================
// APPLICATION
// =============================================================================

#[test]
fn application_substitutes_and_normalizes() {
    let pool = Arena::new();
    let mut ctx = Context::new(&pool);
    let p = prop_decl(&mut ctx, &pool, "p");
    // (\q: Prop => q) p  :  Prop
    let e = pool.app(pool.lam(Some("q"), pool.sort(Sort::Prop), pool.bound(0)), p);
    let ty = check(e, &ctx, &pool).expect("redex should check");
    assert_eq!(ty, pool.sort(Sort::Prop));
}

#[test]
fn application_of_non_function_is_rejected() {
    let pool = Arena::new();
    let mut ctx = Context::new(&pool);
    let p = prop_decl(&mut ctx, &pool, "p");
    let err = check(pool.app(p, p), &ctx, &pool).expect_err("p is not a function");
    assert!(matches!(err, InvalidExpr::ExpectedPi { .. }));
}

#[test]
fn argument_type_mismatch_reports_both_types() {
    let pool = Arena::new();
    let mut ctx = Context::new(&pool);
    // f : Prop -> Prop, a : Type
    let f_id = ctx.size();
    let prop = pool.sort(Sort::Prop);
    ctx.add("f", EntryBody::Decl(pool.pi(None, prop, prop)));
    let a_id = ctx.size();
    ctx.add("a", EntryBody::Decl(pool.sort(Sort::Type)));
    let err = check(pool.app(pool.free(f_id), pool.free(a_id)), &ctx, &pool)
        .expect_err("argument has the wrong type");
    let InvalidExpr::ArgTypeMismatch { expected, got, .. } = err else {
        panic!("expected an argument type mismatch, got {err}");
    };
    assert_eq!(expected, pool.sort(Sort::Prop));
    assert_eq!(got, pool.sort(Sort::Type));
    assert!(err.to_string().contains("argument type mismatch"));
}

// =============================================================================
// STABILITY
// =============================================================================

#[test]
fn checking_is_stable_under_cloning() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    let e = pool.lam(
        Some("A"),
        pool.sort(Sort::Type),
        pool.lam(Some("x"), pool.bound(0), pool.bound(0)),
    );
    let ty = check(e, &ctx, &pool).expect("term should check");
    let clone = e.clone_in(&pool);
    let ty2 = check(clone, &ctx, &pool).expect("clone should check");
    assert_eq!(ty, ty2);
}

#[test]
fn checked_types_are_beta_normal() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    // The prelude quantifier type applied to nothing stays a Pi; checking a
    // lambda whose annotation contains a redex normalizes it.
    let redex = pool.app(
        pool.lam(Some("S"), pool.sort(Sort::Type), pool.bound(0)),
        pool.sort(Sort::Prop),
    );
    let e = pool.lam(Some("q"), redex, pool.bound(0));
    let ty = check(e, &ctx, &pool).expect("annotation should normalize");
    assert_eq!(ty, pool.pi(Some("q"), pool.sort(Sort::Prop), pool.sort(Sort::Prop)));
    assert_eq!(ty.reduce(&pool), ty);
}

#[test]
fn prelude_constants_check() {
    let pool = Arena::new();
    let ctx = Context::new(&pool);
    use kernel::context::{AND, EQUALS, FORALL, NOT, TRUE};
    for id in [EQUALS, TRUE, NOT, AND, FORALL] {
        let ty = check(pool.free(id), &ctx, &pool).expect("prelude constant should check");
        let sort = check(ty, &ctx, &pool).expect("its type should be well-formed");
        assert!(
            matches!(*sort, Expr::Sort(_)),
            "prelude type of {:?} is not classified by a sort",
            ctx.name_of(id)
        );
    }
    // Variable kinds survive in types: the equality predicate's type
    // mentions setvar as a free variable.
    let eq_ty = check(pool.free(EQUALS), &ctx, &pool).expect("= should check");
    assert!(eq_ty.occurs(VarKind::Free, kernel::context::SETVAR));
}
