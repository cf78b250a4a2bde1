use serde::{Deserialize, Serialize};

/// A node of an unevaluated attribute expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// A literal scalar or collection value, e.g. `"t3.large"` or `42`.
    Literal { value: serde_json::Value },

    /// A reference rooted at a variable, e.g. `var.region` or `aws_s3_bucket.logs.id`.
    ScopeTraversal { path: Vec<String> },

    /// `name(args...)`
    FunctionCall { name: String, args: Vec<Self> },

    /// A string with interpolations, e.g. `"prefix-${var.name}"`.
    Template { parts: Vec<Self> },

    /// A template consisting of a single interpolation, e.g. `"${var.name}"`.
    TemplateWrap { wrapped: Box<Self> },

    /// `condition ? true_result : false_result`
    Conditional {
        condition: Box<Self>,
        true_result: Box<Self>,
        false_result: Box<Self>,
    },

    BinaryOp {
        op: BinaryOperator,
        lhs: Box<Self>,
        rhs: Box<Self>,
    },

    UnaryOp { op: UnaryOperator, operand: Box<Self> },

    Parentheses { inner: Box<Self> },

    /// `collection[key]`
    Index { collection: Box<Self>, key: Box<Self> },

    /// Attribute access applied to the result of another expression, e.g. `foo(x).id`.
    RelativeTraversal { source: Box<Self>, path: Vec<String> },

    /// `source[*].each`
    Splat {
        source: Box<Self>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        each: Option<Box<Self>>,
    },

    /// `[for k, v in collection : value if condition]` and the object form.
    For {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key_var: Option<String>,
        value_var: String,
        collection: Box<Self>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<Box<Self>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Box<Self>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Box<Self>>,
    },

    /// `{ key = value, ... }`
    Object { items: Vec<ObjectItem> },

    /// `[a, b, c]`
    Tuple { elements: Vec<Self> },
}

/// One `key = value` entry of an object constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectItem {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Not,
    Negate,
}

impl Expr {
    #[must_use]
    pub fn literal(value: impl Into<serde_json::Value>) -> Self {
        Self::Literal { value: value.into() }
    }

    /// Builds a traversal from a dotted path such as `var.region`.
    #[must_use]
    pub fn traversal(path: &str) -> Self {
        Self::ScopeTraversal {
            path: path.split('.').map(str::to_string).collect(),
        }
    }

    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::FunctionCall { name: name.into(), args }
    }

    #[must_use]
    pub fn conditional(condition: Self, true_result: Self, false_result: Self) -> Self {
        Self::Conditional {
            condition: Box::new(condition),
            true_result: Box::new(true_result),
            false_result: Box::new(false_result),
        }
    }

    #[must_use]
    pub fn binary(op: BinaryOperator, lhs: Self, rhs: Self) -> Self {
        Self::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Returns `true` if a call to `function` appears anywhere in this expression.
    #[must_use]
    pub fn contains_call(&self, function: &str) -> bool {
        super::contains_call(self, function)
    }
}
