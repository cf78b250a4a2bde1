//! Per-resource expression evaluation
//!
//! The engine talks to the expression language only through [`Evaluator`] and
//! [`EvaluationScope`]. An evaluator hands out one scope per resource; the scope
//! carries `self` and the resource-bound functions, so nothing about the resource
//! under evaluation is ever stored in shared state.

use super::Expression;
use super::value::resource_to_value;
use crate::Result;
use crate::functions::FunctionTable;
use crate::model::Resource;
use cel_interpreter::{Context, Value};
use core::fmt;
use ohno::app_err;
use std::sync::Arc;

/// Creates evaluation scopes bound to individual resources.
pub trait Evaluator {
    type Scope: EvaluationScope;

    fn scope(&self, resource: &Arc<Resource>) -> Self::Scope;
}

/// Evaluates expressions in the context of one resource.
pub trait EvaluationScope {
    /// Evaluate a boolean expression.
    ///
    /// # Errors
    /// Returns an error if evaluation fails or the result is not a boolean
    fn evaluate(&self, expression: &Expression) -> Result<bool>;
}

/// [`Evaluator`] backed by the CEL interpreter.
#[derive(Debug, Clone)]
pub struct CelEvaluator {
    functions: FunctionTable,
}

impl CelEvaluator {
    #[must_use]
    pub const fn new(functions: FunctionTable) -> Self {
        Self { functions }
    }

    #[must_use]
    pub const fn functions(&self) -> &FunctionTable {
        &self.functions
    }
}

impl Evaluator for CelEvaluator {
    type Scope = CelScope;

    fn scope(&self, resource: &Arc<Resource>) -> CelScope {
        let mut context = Context::default();
        context.add_variable_from_value("self", resource_to_value(resource));
        self.functions.install(&mut context, Some(resource));

        CelScope { context }
    }
}

/// A CEL context holding `self` and the function table for one resource.
pub struct CelScope {
    context: Context<'static>,
}

impl fmt::Debug for CelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CelScope").finish_non_exhaustive()
    }
}

impl EvaluationScope for CelScope {
    fn evaluate(&self, expression: &Expression) -> Result<bool> {
        let result = expression
            .program()
            .execute(&self.context)
            .map_err(|e| app_err!("evaluating '{expression}': {e}"))?;

        match result {
            Value::Bool(b) => Ok(b),
            other => Err(app_err!("expression '{expression}' did not return a boolean, got '{other:?}' instead")),
        }
    }
}
