//! Core records: resources, rules, exceptions and violations

mod exception;
mod resource;
mod rule;
mod severity;
mod violation;

pub use exception::{Exception, Expiration};
pub use resource::Resource;
pub use rule::Rule;
pub use severity::Severity;
pub use violation::{FilteredViolation, Violation};
