use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A scoped, optionally time-boxed override that suppresses rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Exception {
    /// Ids of the rules this exception covers
    pub rules: Vec<String>,

    /// Path globs; empty means every file
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,

    /// Resource name globs; empty means every resource
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_names: Vec<String>,

    pub reason: String,
    pub approved_by: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,

    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// When an exception stops applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    Never,

    /// Midnight UTC of the `expires_at` date
    At(DateTime<Utc>),

    /// `expires_at` is present but not a valid date; treated as never expiring
    Unparsable,
}

impl Exception {
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = impl Into<String>>, reason: impl Into<String>, approved_by: impl Into<String>) -> Self {
        Self {
            rules: rules.into_iter().map(Into::into).collect(),
            paths: Vec::new(),
            resource_names: Vec::new(),
            reason: reason.into(),
            approved_by: approved_by.into(),
            ticket: None,
            expires_at: None,
        }
    }

    #[must_use]
    pub fn with_paths(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_resource_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_ticket(mut self, ticket: impl Into<String>) -> Self {
        self.ticket = Some(ticket.into());
        self
    }

    #[must_use]
    pub fn with_expires_at(mut self, date: impl Into<String>) -> Self {
        self.expires_at = Some(date.into());
        self
    }

    #[must_use]
    pub fn expiration(&self) -> Expiration {
        let Some(text) = &self.expires_at else {
            return Expiration::Never;
        };

        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_or(Expiration::Unparsable, |date| Expiration::At(date.and_time(NaiveTime::MIN).and_utc()))
    }

    /// An exception is expired once `now` is strictly after its expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiration() {
            Expiration::At(expiry) => now > expiry,
            Expiration::Never | Expiration::Unparsable => false,
        }
    }
}
