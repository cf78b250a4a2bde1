use crate::syntax::Expr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One declared configuration unit (a `resource` or `data` block).
///
/// Resources are created once by extraction and never mutated afterwards; the
/// index shares them behind `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,

    /// Evaluated attribute values
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,

    /// Attribute expressions as written, before evaluation
    #[serde(default)]
    pub raw_expressions: BTreeMap<String, Expr>,
}

impl Resource {
    #[must_use]
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>, file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            file: file.into(),
            line,
            column,
            attributes: BTreeMap::new(),
            raw_expressions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_raw_expression(mut self, name: impl Into<String>, expr: Expr) -> Self {
        let _ = self.raw_expressions.insert(name.into(), expr);
        self
    }

    /// `type.name`, the address used in reports.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }

    /// Returns `true` if any attribute expression of this resource calls `function`.
    #[must_use]
    pub fn contains_call(&self, function: &str) -> bool {
        self.raw_expressions.values().any(|expr| expr.contains_call(function))
    }
}
