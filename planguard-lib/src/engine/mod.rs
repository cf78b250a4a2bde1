//! Policy evaluation
//!
//! A scan runs every rule against the resources it selects and then removes the
//! violations covered by exceptions.
//!
//! # Scan Model
//!
//! Rules are evaluated in declaration order. For each resource selected by the
//! rule's `resource_type` pattern, the optional `when` gate is evaluated first;
//! if it holds, the conditions are evaluated in order and the first one that is
//! true produces a violation. A failing or non-boolean expression aborts the
//! whole scan: a scan either yields a complete result or a single error naming
//! the rule that failed.
//!
//! The surviving violations are then checked against the exceptions, in order,
//! and the first applicable exception moves a violation into the excepted list.

mod exception_filter;
mod rule_evaluator;

use crate::Result;
use crate::expr::{CelEvaluator, Evaluator};
use crate::functions::FunctionTable;
use crate::index::ResourceIndex;
use crate::model::{Exception, FilteredViolation, Resource, Rule, Severity, Violation};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub use exception_filter::{FilterOutcome, applies, filter_violations};
pub use rule_evaluator::{evaluate_rule, evaluate_rules};

#[cfg(test)]
pub(crate) use rule_evaluator::test_support;

const LOG_TARGET: &str = "      scan";

/// The outcome of a complete scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Violations not covered by any exception, in rule then resource order
    pub violations: Vec<Violation>,

    /// Violations suppressed by an exception, in the same order
    pub excepted: Vec<FilteredViolation>,
}

/// Violation counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub excepted: usize,
}

impl ScanResult {
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            excepted: self.excepted.len(),
            ..Summary::default()
        };

        for violation in &self.violations {
            match violation.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
            }
        }

        summary
    }

    /// Active violations at or above `threshold`.
    pub fn at_or_above(&self, threshold: Severity) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.severity >= threshold)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Run `rules` over `index` and apply `exceptions` as of `now`.
///
/// # Errors
/// Returns the first evaluation error, identifying the rule that produced it
pub fn scan<E: Evaluator>(
    rules: &[Rule],
    exceptions: &[Exception],
    index: &ResourceIndex,
    evaluator: &E,
    now: DateTime<Utc>,
) -> Result<ScanResult> {
    log::debug!(
        target: LOG_TARGET,
        "Scanning {} resource(s) with {} rule(s) and {} exception(s)",
        index.len(),
        rules.len(),
        exceptions.len()
    );

    let violations = evaluate_rules(rules, index, evaluator)?;
    let FilterOutcome { active, excepted } = filter_violations(violations, exceptions, now);

    log::debug!(
        target: LOG_TARGET,
        "Scan found {} violation(s), {} excepted",
        active.len(),
        excepted.len()
    );

    Ok(ScanResult {
        violations: active,
        excepted,
    })
}

/// Index `resources` and scan them with the CEL evaluator and the standard function library.
///
/// # Errors
/// Returns the first evaluation error, identifying the rule that produced it
pub fn scan_resources(
    rules: &[Rule],
    exceptions: &[Exception],
    resources: impl IntoIterator<Item = Resource>,
    now: DateTime<Utc>,
) -> Result<ScanResult> {
    let index = Arc::new(ResourceIndex::new(resources));
    let evaluator = CelEvaluator::new(FunctionTable::standard(Arc::clone(&index), now));
    scan(rules, exceptions, &index, &evaluator, now)
}
