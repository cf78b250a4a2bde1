use super::{Exception, Resource, Rule, Severity};
use serde::Serialize;

/// One rule firing on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,

    pub file: String,
    pub line: u32,
    pub column: u32,
    pub resource_type: String,
    pub resource_name: String,
}

impl Violation {
    #[must_use]
    pub fn new(rule: &Rule, resource: &Resource) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            severity: rule.severity,
            message: rule.message.clone(),
            remediation: rule.remediation.clone(),
            file: resource.file.clone(),
            line: resource.line,
            column: resource.column,
            resource_type: resource.resource_type.clone(),
            resource_name: resource.name.clone(),
        }
    }

    /// `type.name` of the offending resource.
    #[must_use]
    pub fn resource_address(&self) -> String {
        format!("{}.{}", self.resource_type, self.resource_name)
    }

    /// `file:line:column` of the offending resource.
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A violation together with the exception that suppressed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredViolation {
    pub violation: Violation,
    pub exception: Exception,
}
