use super::Host;
use super::common::{ColorMode, LogLevel, init_logging};
use super::config::Config;
use super::manifest;
use crate::Result;
use crate::engine::scan_resources;
use crate::model::Severity;
use crate::reports::{Format, generate};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::Parser;
use ohno::{IntoAppError, bail};
use std::fs;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Resource manifest produced by the extraction step (repeatable)
    #[arg(long, short = 'r', value_name = "PATH", required = true)]
    pub resources: Vec<Utf8PathBuf>,

    /// Path to configuration file (default is `planguard.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Additional rules file or directory of rules files (repeatable)
    #[arg(long, value_name = "PATH")]
    pub rules: Vec<Utf8PathBuf>,

    /// Report format
    #[arg(long, short = 'f', value_name = "FORMAT", default_value = "text")]
    pub format: Format,

    /// Write the report to a file instead of standard output
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Lowest severity that fails the scan (default is `warning` when
    /// `fail_on_warning` is set, `error` otherwise)
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<Severity>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

/// Scan resource manifests against the configured rules and report the results.
///
/// # Errors
///
/// Returns an error if loading fails, an expression fails to evaluate, or any
/// active violation is at or above the failure threshold
pub fn scan<H: Host>(host: &mut H, args: &ScanArgs) -> Result<()> {
    init_logging(args.log_level);

    let mut config = Config::load(Utf8Path::new("."), args.config.as_deref())?;
    config.add_rule_files(&args.rules)?;
    config.validate()?;

    let resources = manifest::exclude_paths(manifest::load_resources(&args.resources)?, &config.settings.exclude_paths);
    let result = scan_resources(&config.rules, &config.exceptions, resources, Utc::now())?;

    let use_colors = args.output.is_none() && args.format == Format::Text && args.color.use_colors();
    let mut report = String::new();
    generate(&result, args.format, use_colors, &mut report)?;

    if let Some(path) = &args.output {
        fs::write(path, report).into_app_err_with(|| format!("writing report to '{path}'"))?;
    } else {
        let _ = write!(host.output(), "{report}");
    }

    let threshold = args.fail_on.unwrap_or(if config.settings.fail_on_warning {
        Severity::Warning
    } else {
        Severity::Error
    });

    let failing = result.at_or_above(threshold).count();
    if failing > 0 {
        bail!("{failing} violation(s) at or above severity '{threshold}'");
    }

    Ok(())
}
