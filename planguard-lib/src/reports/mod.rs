//! Report generation for scan results
//!
//! Three report generators are provided, each accessed through a `generate` function:
//! - **Text**: human-readable output grouped by severity, optionally colored
//! - **JSON**: machine-readable violations, exceptions and summary counts
//! - **SARIF**: SARIF 2.1.0 for code-scanning integrations
//!
//! All generators operate on the same input, a [`ScanResult`](crate::engine::ScanResult),
//! and write into a `core::fmt::Write` sink so the caller decides where output goes.

mod common;
mod console;
mod json;
mod sarif;

use crate::Result;
use crate::engine::ScanResult;
use clap::ValueEnum;
use core::fmt::Write;
use strum::Display;

pub use console::generate as generate_console;
pub use json::generate as generate_json;
pub use sarif::generate as generate_sarif;

/// Output format of a scan report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
    Sarif,
}

/// Render `result` in `format`.
///
/// `use_colors` only affects the text format.
pub fn generate<W: Write>(result: &ScanResult, format: Format, use_colors: bool, writer: &mut W) -> Result<()> {
    match format {
        Format::Text => generate_console(result, use_colors, writer),
        Format::Json => generate_json(result, writer),
        Format::Sarif => generate_sarif(result, writer),
    }
}
