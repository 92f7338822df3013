//! Region-scoped storage for term nodes.
//!
//! Terms form sharing-heavy DAGs that are created and destroyed in phase
//! with elaboration steps, so no node is ever freed individually: an
//! [`Arena`] hands out references that stay valid until the whole region is
//! cleared or dropped.

use std::cell::Cell;

use bumpalo::Bump;

use crate::expr::Expr;

/// Default capacity reserved up front, in nodes.
const DEFAULT_BLOCK: usize = 1024;

/// A region allocator for [`Expr`] nodes and binder hints.
///
/// References returned by [`Arena::alloc`] borrow the region, so the borrow
/// checker enforces that no term outlives its arena. There is no per-node
/// freeing and no reference counting; [`Arena::clear`] releases everything
/// at once.
pub struct Arena {
    bump: Bump,
    nodes: Cell<usize>,
}

impl Arena {
    pub fn new() -> Self {
        Arena {
            bump: Bump::with_capacity(DEFAULT_BLOCK * std::mem::size_of::<Expr<'static>>()),
            nodes: Cell::new(0),
        }
    }

    /// Moves `expr` into the region, constructing it in place.
    pub fn alloc<'a>(&'a self, expr: Expr<'a>) -> &'a Expr<'a> {
        self.nodes.set(self.nodes.get() + 1);
        self.bump.alloc(expr)
    }

    /// Copies a binder hint into the region.
    pub fn alloc_str<'a>(&'a self, s: &str) -> &'a str {
        self.bump.alloc_str(s)
    }

    /// Number of nodes allocated since creation or the last [`Arena::clear`].
    pub fn size(&self) -> usize {
        self.nodes.get()
    }

    /// Destroys all nodes and releases the region's blocks.
    pub fn clear(&mut self) {
        self.bump.reset();
        self.nodes.set(0);
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
