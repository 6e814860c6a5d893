//! Indexed tensor expressions.
//!
//! Expressions form a directed acyclic graph of immutable, reference-counted nodes. Nodes may be
//! shared between several parents, so any pass over an expression should go through
//! [`traversal`](crate::traversal::traversal) rather than naive recursion.
//!
//! The building blocks are named flat buffers ([`Expr::variable`]) and the various views that
//! index into them: full indexing, flexible (mixed-radix) indexing, reshaping and partial
//! indexing of leading dimensions. Scalar-valued expressions can be combined with literals,
//! comparisons, conditionals, sums and products.

mod evaluate;
mod expr;
mod index;
pub mod traversal;

pub use evaluate::*;
pub use expr::*;
pub use index::*;
