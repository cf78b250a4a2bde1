use super::common;
use crate::Result;
use crate::engine::ScanResult;
use crate::model::{FilteredViolation, Severity, Violation};
use core::fmt::Write;
use owo_colors::OwoColorize;

const RULE_WIDTH: usize = 50;

pub fn generate<W: Write>(result: &ScanResult, use_colors: bool, writer: &mut W) -> Result<()> {
    if result.violations.is_empty() && result.excepted.is_empty() {
        if use_colors {
            writeln!(writer, "{}", "No violations found".green().bold())?;
        } else {
            writeln!(writer, "No violations found")?;
        }
        return Ok(());
    }

    if use_colors {
        writeln!(writer, "{}", "planguard scan results".bold())?;
    } else {
        writeln!(writer, "planguard scan results")?;
    }
    writeln!(writer, "{}", "=".repeat(RULE_WIDTH))?;

    for (severity, group) in common::group_by_severity(&result.violations) {
        let heading = format!("{}: {}", common::severity_heading(severity), group.len());
        writeln!(writer)?;
        if use_colors {
            match severity {
                Severity::Error => writeln!(writer, "{}", heading.red().bold())?,
                Severity::Warning => writeln!(writer, "{}", heading.yellow().bold())?,
                Severity::Info => writeln!(writer, "{}", heading.blue().bold())?,
            }
        } else {
            writeln!(writer, "{heading}")?;
        }
        writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;

        for violation in group {
            write_violation(writer, violation, use_colors)?;
        }
    }

    if !result.excepted.is_empty() {
        let heading = format!("EXCEPTED: {}", result.excepted.len());
        writeln!(writer)?;
        if use_colors {
            writeln!(writer, "{}", heading.green().bold())?;
        } else {
            writeln!(writer, "{heading}")?;
        }
        writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;

        for filtered in &result.excepted {
            write_excepted(writer, filtered, use_colors)?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(RULE_WIDTH))?;
    write!(writer, "Total: {} violation(s)", result.violations.len())?;
    if result.excepted.is_empty() {
        writeln!(writer)?;
    } else {
        writeln!(writer, " ({} excepted)", result.excepted.len())?;
    }

    Ok(())
}

fn write_header<W: Write>(writer: &mut W, violation: &Violation, use_colors: bool) -> Result<()> {
    writeln!(writer)?;
    if use_colors {
        writeln!(writer, "{}", violation.location().bold())?;
    } else {
        writeln!(writer, "{}", violation.location())?;
    }
    writeln!(writer, "  Rule: {} ({})", violation.rule_name, violation.rule_id)?;
    writeln!(writer, "  Resource: {}", violation.resource_address())?;
    Ok(())
}

fn write_violation<W: Write>(writer: &mut W, violation: &Violation, use_colors: bool) -> Result<()> {
    write_header(writer, violation, use_colors)?;
    writeln!(writer, "  Message: {}", violation.message)?;

    if let Some(remediation) = &violation.remediation {
        writeln!(writer, "  Remediation:")?;
        for line in remediation.lines() {
            writeln!(writer, "    {line}")?;
        }
    }

    Ok(())
}

fn write_excepted<W: Write>(writer: &mut W, filtered: &FilteredViolation, use_colors: bool) -> Result<()> {
    let exception = &filtered.exception;

    write_header(writer, &filtered.violation, use_colors)?;
    writeln!(writer, "  Reason: {}", exception.reason)?;
    writeln!(writer, "  Approved by: {}", exception.approved_by)?;

    if let Some(ticket) = &exception.ticket {
        writeln!(writer, "  Ticket: {ticket}")?;
    }

    if let Some(expires_at) = &exception.expires_at {
        writeln!(writer, "  Expires: {expires_at}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_support::sample_result;

    #[test]
    fn test_report_no_colors() {
        let mut output = String::new();
        generate(&sample_result(), false, &mut output).unwrap();

        insta::assert_snapshot!(output, @r#"
        planguard scan results
        ==================================================

        ERRORS: 2
        --------------------------------------------------

        storage.tf:3:1
          Rule: S3 bucket is public (s3_public)
          Resource: aws_s3_bucket.assets
          Message: Bucket allows public reads
          Remediation:
            Set acl = "private"
            Enable block public access

        storage.tf:40:1
          Rule: S3 bucket is public (s3_public)
          Resource: aws_s3_bucket.media
          Message: Bucket allows public reads
          Remediation:
            Set acl = "private"
            Enable block public access

        WARNINGS: 1
        --------------------------------------------------

        compute.tf:12:3
          Rule: Oversized instance (instance_size)
          Resource: aws_instance.web
          Message: Instance type is larger than allowed

        INFO: 1
        --------------------------------------------------

        network.tf:1:1
          Rule: Missing tags (missing_tags)
          Resource: aws_vpc.main
          Message: Resource has no tags

        EXCEPTED: 1
        --------------------------------------------------

        storage.tf:20:1
          Rule: S3 bucket is public (s3_public)
          Resource: aws_s3_bucket.logs
          Reason: Partner log delivery
          Approved by: security-team
          Ticket: SEC-42
          Expires: 2030-01-01

        ==================================================
        Total: 4 violation(s) (1 excepted)
        "#);
    }

    #[test]
    fn test_report_with_colors_has_ansi_codes() {
        let mut output = String::new();
        generate(&sample_result(), true, &mut output).unwrap();

        assert!(output.contains("\u{1b}["));
        assert!(output.contains("Total: 4 violation(s) (1 excepted)"));
    }

    #[test]
    fn test_only_excepted() {
        let mut result = sample_result();
        result.violations.clear();

        let mut output = String::new();
        generate(&result, false, &mut output).unwrap();

        assert!(!output.contains("ERRORS"));
        assert!(output.contains("EXCEPTED: 1"));
        assert!(output.ends_with("Total: 0 violation(s) (1 excepted)\n"));
    }

    #[test]
    fn test_optional_exception_fields_omitted() {
        let mut result = sample_result();
        result.excepted[0].exception.ticket = None;
        result.excepted[0].exception.expires_at = None;

        let mut output = String::new();
        generate(&result, false, &mut output).unwrap();

        assert!(!output.contains("Ticket:"));
        assert!(!output.contains("Expires:"));
    }

    #[test]
    fn test_empty_report() {
        let mut output = String::new();
        generate(&ScanResult::default(), false, &mut output).unwrap();
        assert_eq!(output, "No violations found\n");
    }
}
