use crate::Result;
use crate::model::{Exception, Expiration, Rule};
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{IntoAppError, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;

const LOG_TARGET: &str = "    config";

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// The configuration file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "planguard.toml";

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    /// Rules in evaluation order
    #[serde(default, rename = "rule")]
    pub rules: Vec<Rule>,

    /// Exceptions in resolution order
    #[serde(default, rename = "exception")]
    pub exceptions: Vec<Exception>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Fail the scan on warnings as well as errors
    #[serde(default)]
    pub fail_on_warning: bool,

    /// Resources declared in files matching these globs are not scanned
    #[serde(default)]
    pub exclude_paths: Vec<String>,
}

/// A standalone rules file holding only `[[rule]]` tables.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default, rename = "rule")]
    rules: Vec<Rule>,
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `planguard.toml` in `base_dir` is used if it
    /// exists, and the embedded default configuration otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!(target: LOG_TARGET, "No '{path}' found, using the default configuration");
                    return Ok(Self::default_config());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        log::debug!(
            target: LOG_TARGET,
            "Loaded {} rule(s) and {} exception(s) from '{final_path}'",
            config.rules.len(),
            config.exceptions.len()
        );

        Ok(config)
    }

    /// Parse configuration TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration TOML or an expression does not compile
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Append the rules of additional rule files, in order.
    ///
    /// A directory contributes every `*.toml` file directly inside it, in name order.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed
    pub fn add_rule_files(&mut self, paths: &[Utf8PathBuf]) -> Result<()> {
        for path in paths {
            for file in rule_files(path)? {
                let text = fs::read_to_string(&file).into_app_err_with(|| format!("reading rules file '{file}'"))?;
                let RuleFile { rules } = toml::from_str(&text).into_app_err_with(|| format!("parsing rules file '{file}'"))?;

                log::debug!(target: LOG_TARGET, "Loaded {} rule(s) from '{file}'", rules.len());
                self.rules.extend(rules);
            }
        }

        Ok(())
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a rule is malformed, rule ids repeat, or an exception names no rules
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if !ids.insert(rule.id.as_str()) {
                bail!("rule id '{}' is defined more than once", rule.id);
            }
        }

        for (index, exception) in self.exceptions.iter().enumerate() {
            if exception.rules.is_empty() {
                bail!("exception #{} does not name any rules", index + 1);
            }
        }

        Ok(())
    }

    /// Problems that do not prevent a scan but likely indicate a mistake.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let ids: HashSet<&str> = self.rules.iter().map(|r| r.id.as_str()).collect();
        let mut warnings = Vec::new();

        for (index, exception) in self.exceptions.iter().enumerate() {
            for rule_id in &exception.rules {
                if !ids.contains(rule_id.as_str()) {
                    warnings.push(format!("exception #{} refers to unknown rule '{rule_id}'", index + 1));
                }
            }

            if exception.expiration() == Expiration::Unparsable {
                warnings.push(format!(
                    "exception #{} has an unparsable expires_at '{}' and will never expire",
                    index + 1,
                    exception.expires_at.as_deref().unwrap_or_default()
                ));
            }
        }

        warnings
    }

    fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

fn rule_files(path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in path.read_dir_utf8().into_app_err_with(|| format!("reading rules directory '{path}'"))? {
        let entry = entry.into_app_err_with(|| format!("reading rules directory '{path}'"))?;
        if entry.path().extension() == Some("toml") && entry.path().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
