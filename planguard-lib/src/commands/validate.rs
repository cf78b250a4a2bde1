use super::Host;
use super::config::{Config, DEFAULT_CONFIG_FILE};
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `planguard.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Additional rules file or directory of rules files (repeatable)
    #[arg(long, value_name = "PATH")]
    pub rules: Vec<Utf8PathBuf>,
}

fn validate_config_inner(base_dir: &Utf8Path, args: &ValidateArgs) -> Result<Config> {
    let mut config = Config::load(base_dir, args.config.as_deref())?;
    config.add_rule_files(&args.rules)?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration and any extra rules files, reporting problems.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid
pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let base_dir = Utf8Path::new(".");

    match validate_config_inner(base_dir, args) {
        Ok(config) => {
            for warning in config.warnings() {
                let _ = writeln!(host.error(), "warning: {warning}");
            }

            let mut out = host.output();
            let _ = writeln!(out, "Configuration is valid");
            if let Some(path) = &args.config {
                let _ = writeln!(out, "Config file: {path}");
            } else if base_dir.join(DEFAULT_CONFIG_FILE).is_file() {
                let _ = writeln!(out, "Config file: {DEFAULT_CONFIG_FILE}");
            } else {
                let _ = writeln!(out, "Using default configuration (no config file found)");
            }
            let _ = writeln!(out, "{} rule(s), {} exception(s)", config.rules.len(), config.exceptions.len());
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use std::fs;

    fn write_config(dir: &tempfile::TempDir, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join("planguard.toml")).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_valid_config_reports_counts_and_warnings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            r#"
[[rule]]
id = "r1"
name = "Rule"
severity = "error"
resource_type = "*"
conditions = ["true"]
message = "m"

[[exception]]
rules = ["r2"]
reason = "why"
approved_by = "who"
"#,
        );

        let mut host = TestHost::new();
        validate_config(&mut host, &ValidateArgs { config: Some(path), rules: vec![] }).unwrap();

        let output = host.output_str();
        assert!(output.contains("Configuration is valid"));
        assert!(output.contains("1 rule(s), 1 exception(s)"));
        assert_eq!(host.error_str(), "warning: exception #1 refers to unknown rule 'r2'\n");
        assert_eq!(host.exit_code, None);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_toml_syntax() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "[[rule]\nid = \"x\"");

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(path), rules: vec![] });

        assert!(result.unwrap_err().to_string().contains("parsing configuration file"));
        assert!(host.error_str().starts_with("Configuration validation failed"));
        assert_eq!(host.exit_code, Some(1));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_expression_syntax() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            r#"
[[rule]]
id = "broken"
name = "Broken"
severity = "error"
resource_type = "*"
conditions = ["this is not a valid expression !!!"]
message = "m"
"#,
        );

        let mut host = TestHost::new();
        let err = validate_config(&mut host, &ValidateArgs { config: Some(path), rules: vec![] }).unwrap_err();

        assert!(err.to_string().contains("this is not a valid expression !!!"));
        assert_eq!(host.exit_code, Some(1));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_duplicate_ids_across_rule_files() {
        let tmp = tempfile::tempdir().unwrap();
        let rule = r#"
[[rule]]
id = "dup"
name = "Dup"
severity = "info"
resource_type = "*"
conditions = ["false"]
message = "m"
"#;
        let path = write_config(&tmp, rule);
        let extra = Utf8PathBuf::try_from(tmp.path().join("extra.toml")).unwrap();
        fs::write(&extra, rule).unwrap();

        let mut host = TestHost::new();
        let err = validate_config(&mut host, &ValidateArgs { config: Some(path), rules: vec![extra] }).unwrap_err();

        assert!(err.to_string().contains("rule id 'dup' is defined more than once"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_empty_config_is_valid() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "# Empty config file\n");

        let mut host = TestHost::new();
        validate_config(&mut host, &ValidateArgs { config: Some(path), rules: vec![] }).unwrap();
        assert!(host.output_str().contains("0 rule(s), 0 exception(s)"));
    }
}
