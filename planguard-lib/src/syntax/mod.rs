//! Unevaluated attribute expressions
//!
//! Resource attributes are carried twice: once as their evaluated value (used by
//! rule expressions through `self`) and once as the syntax tree they were written
//! as. The tree is what lets a rule ask questions about *how* a value was built,
//! such as whether a secret was pulled in through a `file()` call, which the
//! evaluated value no longer shows.
//!
//! # Implementation Model
//!
//! [`Expr`] is a closed enum with one variant per node kind of the configuration
//! language's expression grammar. Walkers over the tree are written as a single
//! exhaustive `match`, so adding a node kind is a compile error everywhere the
//! tree is inspected rather than a silent non-match.
//!
//! The tree is deserialized from resource manifests using an internally tagged
//! representation (`{"kind": "function_call", ...}`).

mod call_detector;
mod expr;

pub use call_detector::contains_call;
pub use expr::{BinaryOperator, Expr, ObjectItem, UnaryOperator};
