//! Built-in functions available to rule expressions
//!
//! Rule expressions can call a library of helper functions on top of the CEL
//! standard functions: queries over the scanned resources, static analysis of the
//! resource under evaluation, string/collection/number utilities, JSON and YAML
//! codecs, date arithmetic and CIDR calculations. `try` and `can` catch
//! evaluation errors and are installed alongside the table.
//!
//! # Implementation Model
//!
//! A [`FunctionTable`] maps function names to [`Callable`]s. A callable receives a
//! [`CallScope`] describing the resource under evaluation (if any) together with
//! the already-evaluated arguments, and returns a value or an error. The table
//! itself holds no per-resource state: the evaluator installs it into every
//! per-resource evaluation context, binding the scope at that point.
//!
//! Anything time-dependent reads the `now` fixed when the table was built, so a
//! single scan sees a single instant.

mod args;
mod cidr;
mod collections;
mod datetime;
mod encoding;
mod fallback;
mod matching;
mod numbers;
mod resources;
mod security;
mod strings;

use crate::Result;
use crate::index::ResourceIndex;
use crate::model::Resource;
use cel_interpreter::extractors::Arguments;
use cel_interpreter::{Context, ExecutionError, Value};
use chrono::{DateTime, Utc};
use core::fmt;
use ohno::app_err;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use args::Args;

/// A built-in function implementation.
pub type Callable = Arc<dyn Fn(&CallScope<'_>, &[Value]) -> Result<Value> + Send + Sync>;

/// What a built-in function can see about the evaluation it was called from.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallScope<'a> {
    resource: Option<&'a Resource>,
}

impl<'a> CallScope<'a> {
    #[must_use]
    pub const fn new(resource: Option<&'a Resource>) -> Self {
        Self { resource }
    }

    /// The resource under evaluation, or `None` outside of a per-resource scope.
    #[must_use]
    pub const fn resource(&self) -> Option<&'a Resource> {
        self.resource
    }
}

#[derive(Clone, Default)]
pub struct FunctionTable {
    functions: BTreeMap<String, Callable>,
}

impl FunctionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The full function library, with resource queries answered from `index`.
    #[must_use]
    pub fn standard(index: Arc<ResourceIndex>, now: DateTime<Utc>) -> Self {
        let mut table = Self::new();

        resources::register(&mut table, &index);
        security::register(&mut table);
        matching::register(&mut table);
        strings::register(&mut table);
        collections::register(&mut table);
        numbers::register(&mut table);
        encoding::register(&mut table);
        datetime::register(&mut table, now);
        cidr::register(&mut table);

        table
    }

    /// Add a function, replacing any existing function of the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&CallScope<'_>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let _ = self.functions.insert(name.into(), Arc::new(f));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Call a function directly.
    ///
    /// # Errors
    /// Returns an error if no function has this name or if the function fails
    pub fn call(&self, name: &str, scope: &CallScope<'_>, args: &[Value]) -> Result<Value> {
        let f = self.functions.get(name).ok_or_else(|| app_err!("undefined function '{name}'"))?;
        f(scope, args)
    }

    /// Register every function of this table into `context`, bound to `resource`,
    /// together with `try` and `can`.
    ///
    /// Failures inside a function surface as CEL execution errors naming the function.
    pub fn install(&self, context: &mut Context<'_>, resource: Option<&Arc<Resource>>) {
        for (name, callable) in &self.functions {
            let callable = Arc::clone(callable);
            let resource = resource.cloned();
            let function_name = name.clone();

            context.add_function(name.as_str(), move |Arguments(args): Arguments| -> core::result::Result<Value, ExecutionError> {
                let scope = CallScope::new(resource.as_deref());
                callable(&scope, args.as_slice()).map_err(|e| ExecutionError::function_error(&function_name, e.to_string()))
            });
        }

        fallback::install(context);
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}
