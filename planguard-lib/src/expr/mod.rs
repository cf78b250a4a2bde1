//! Rule expression compilation and evaluation using CEL
//!
//! Rule `when` gates and conditions are written in the CEL (Common Expression
//! Language), which gives a safe, sandboxed evaluation environment with no access
//! to the filesystem or network.
//!
//! # Implementation Model
//!
//! Expressions are compiled to [`Expression`]s once, when configuration is loaded.
//! Evaluation happens per resource: an [`Evaluator`] produces an
//! [`EvaluationScope`] for each resource under evaluation, and the rule engine
//! evaluates that rule's expressions in it.
//!
//! The CEL scope binds two things:
//!
//! - `self`: the resource's attributes merged with its `type`, `name`, `file` and
//!   `line` (attributes win on a name clash)
//! - the built-in function table, with resource-scoped functions such as
//!   `contains_function_call` closed over the resource
//!
//! A scope is built once per resource and reused for every expression of a rule.

mod evaluator;
mod expression;
pub mod value;

pub use evaluator::{CelEvaluator, CelScope, EvaluationScope, Evaluator};
pub use expression::Expression;
