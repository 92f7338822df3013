//! Proof search over kernel terms: a first-order surface layer,
//! unification and anti-unification, normal forms, and an analytic-tableau
//! engine for classical first-order logic.

pub mod fol;
pub mod normal;
pub mod tableau;
pub mod unify;

pub use fol::FOLForm;
pub use normal::{cnf, nnf, skolemize, Clause};
pub use tableau::Tableau;
pub use unify::{antiunify, apply_subs, equal_after_subs, show_subs, unify, Subs};
