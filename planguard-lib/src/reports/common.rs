//! Common utilities shared across report generators.

use crate::model::{Severity, Violation};
use strum::IntoEnumIterator;

/// Group violations by severity, most severe first, skipping empty groups.
///
/// Violations keep their relative order within a group.
pub fn group_by_severity(violations: &[Violation]) -> Vec<(Severity, Vec<&Violation>)> {
    Severity::iter()
        .rev()
        .map(|severity| (severity, violations.iter().filter(|v| v.severity == severity).collect::<Vec<_>>()))
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Section heading for a severity group.
pub const fn severity_heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERRORS",
        Severity::Warning => "WARNINGS",
        Severity::Info => "INFO",
    }
}

/// Unique rule ids in the order they first appear, each with its first violation.
pub fn first_seen_rules(violations: &[Violation]) -> Vec<&Violation> {
    let mut seen = Vec::new();
    for violation in violations {
        if !seen.iter().any(|v: &&Violation| v.rule_id == violation.rule_id) {
            seen.push(violation);
        }
    }
    seen
}
