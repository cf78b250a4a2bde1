use crate::Result;
use cel_interpreter::Program;
use core::fmt;
use ohno::app_err;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// A rule expression, compiled once when the configuration is loaded.
///
/// Expressions are written as plain strings in configuration files; parse errors
/// are reported at load time together with the offending text.
#[derive(Debug, Clone)]
pub struct Expression {
    text: String,
    program: Arc<Program>,
}

impl Expression {
    /// Compile an expression string.
    ///
    /// # Errors
    /// Returns an error if the expression cannot be parsed
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let program = Program::compile(&text).map_err(|e| app_err!("could not parse expression '{text}': {e}"))?;

        Ok(Self {
            text,
            program: Arc::new(program),
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Serialize for Expression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::new(text).map_err(D::Error::custom)
    }
}
