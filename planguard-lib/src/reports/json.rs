use crate::Result;
use crate::engine::{ScanResult, Summary};
use crate::model::{FilteredViolation, Violation};
use core::fmt::Write;
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    violations: &'a [Violation],
    excepted: &'a [FilteredViolation],
    summary: Summary,
}

pub fn generate<W: Write>(result: &ScanResult, writer: &mut W) -> Result<()> {
    let report = Report {
        violations: &result.violations,
        excepted: &result.excepted,
        summary: result.summary(),
    };

    writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}
