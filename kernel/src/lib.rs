//! Logical kernel: arena-allocated terms of a dependently-typed lambda
//! calculus with two universes, a context of declarations and hypotheses
//! with discharge, and a normalizing type checker.
//!
//! The kernel is single-threaded and synchronous. An elaborator owns one
//! [`Arena`] and one [`Context`]; term references never cross arena
//! boundaries.

pub mod arena;
pub mod checker;
pub mod context;
pub mod expr;

pub use arena::Arena;
pub use checker::{check, InvalidExpr};
pub use context::{Context, Entry, EntryBody};
pub use expr::{Expr, Sort, VarKind};
