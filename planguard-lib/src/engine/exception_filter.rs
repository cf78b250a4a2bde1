use crate::index::matches_path;
use crate::model::{Exception, Expiration, FilteredViolation, Violation};
use chrono::{DateTime, Utc};

const LOG_TARGET: &str = "exceptions";

/// Violations split into those still in force and those suppressed by an exception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub active: Vec<Violation>,
    pub excepted: Vec<FilteredViolation>,
}

/// Partition `violations` by the exceptions that cover them.
///
/// Each violation is checked against the exceptions in declaration order and the
/// first one that applies wins. Relative order is preserved on both sides.
#[must_use]
pub fn filter_violations(violations: Vec<Violation>, exceptions: &[Exception], now: DateTime<Utc>) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for violation in violations {
        match exceptions.iter().find(|exception| applies(exception, &violation, now)) {
            Some(exception) => {
                log::info!(
                    target: LOG_TARGET,
                    "Excepting rule '{}' on {} ({}): {}",
                    violation.rule_id,
                    violation.resource_address(),
                    violation.location(),
                    exception.reason
                );
                outcome.excepted.push(FilteredViolation {
                    violation,
                    exception: exception.clone(),
                });
            }
            None => outcome.active.push(violation),
        }
    }

    outcome
}

/// Whether `exception` suppresses `violation` at instant `now`.
///
/// All criteria must hold: the rule id is listed, the file matches one of the
/// path globs (if any), the resource name matches one of the name globs (if any)
/// and the exception has not expired.
#[must_use]
pub fn applies(exception: &Exception, violation: &Violation, now: DateTime<Utc>) -> bool {
    if !exception.rules.iter().any(|id| *id == violation.rule_id) {
        return false;
    }

    if !exception.paths.is_empty() && !exception.paths.iter().any(|p| matches_path(p, &violation.file)) {
        return false;
    }

    if !exception.resource_names.is_empty() && !exception.resource_names.iter().any(|p| matches_path(p, &violation.resource_name)) {
        return false;
    }

    if exception.expiration() == Expiration::Unparsable {
        log::warn!(
            target: LOG_TARGET,
            "Exception for rule(s) {} has an unparsable expiry date '{}', treating it as never expiring",
            exception.rules.join(", "),
            exception.expires_at.as_deref().unwrap_or_default()
        );
    }

    !exception.is_expired(now)
}
