use super::common;
use crate::Result;
use crate::engine::ScanResult;
use crate::model::{Severity, Violation};
use core::fmt::Write;
use serde_json::{Value, json};

const SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";

/// Only active violations are reported; excepted ones are left out of the run.
pub fn generate<W: Write>(result: &ScanResult, writer: &mut W) -> Result<()> {
    let rules: Vec<Value> = common::first_seen_rules(&result.violations).into_iter().map(rule).collect();
    let results: Vec<Value> = result.violations.iter().map(finding).collect();

    let output = json!({
        "$schema": SCHEMA,
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "planguard",
                    "informationUri": env!("CARGO_PKG_HOMEPAGE"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "rules": rules,
                }
            },
            "results": results,
        }]
    });

    writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

const fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn rule(violation: &Violation) -> Value {
    json!({
        "id": violation.rule_id,
        "name": violation.rule_name,
        "shortDescription": { "text": violation.rule_name },
        "fullDescription": { "text": violation.message },
        "defaultConfiguration": { "level": level(violation.severity) },
    })
}

fn finding(violation: &Violation) -> Value {
    json!({
        "ruleId": violation.rule_id,
        "level": level(violation.severity),
        "message": { "text": violation.message },
        "locations": [{
            "physicalLocation": {
                "artifactLocation": { "uri": violation.file },
                "region": {
                    "startLine": violation.line,
                    "startColumn": violation.column,
                }
            },
            "logicalLocations": [{
                "name": violation.resource_name,
                "fullyQualifiedName": violation.resource_address(),
                "kind": "resource",
            }]
        }]
    })
}
