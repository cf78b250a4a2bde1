use crate::model::Resource;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

const LOG_TARGET: &str = "     index";

/// All resources of a scan, grouped by type and by file.
///
/// Every lookup returns resources in extraction order.
#[derive(Debug, Default)]
pub struct ResourceIndex {
    all: Vec<Arc<Resource>>,

    /// Distinct types in the order they were first seen
    types: Vec<String>,
    by_type: HashMap<String, Vec<Arc<Resource>>>,
    by_file: HashMap<String, Vec<Arc<Resource>>>,
}

impl ResourceIndex {
    #[must_use]
    pub fn new(resources: impl IntoIterator<Item = Resource>) -> Self {
        let mut index = Self::default();

        for resource in resources {
            let resource = Arc::new(resource);

            if !index.by_type.contains_key(&resource.resource_type) {
                index.types.push(resource.resource_type.clone());
            }

            index
                .by_type
                .entry(resource.resource_type.clone())
                .or_default()
                .push(Arc::clone(&resource));
            index.by_file.entry(resource.file.clone()).or_default().push(Arc::clone(&resource));
            index.all.push(resource);
        }

        log::debug!(
            target: LOG_TARGET,
            "Indexed {} resource(s) of {} type(s) from {} file(s)",
            index.all.len(),
            index.types.len(),
            index.by_file.len()
        );

        index
    }

    #[must_use]
    pub fn all(&self) -> &[Arc<Resource>] {
        &self.all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Distinct resource types, in the order they were first seen.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    /// Resources whose type is exactly `resource_type`.
    #[must_use]
    pub fn by_type(&self, resource_type: &str) -> &[Arc<Resource>] {
        self.by_type.get(resource_type).map(Vec::as_slice).unwrap_or_default()
    }

    /// Resources declared in exactly `file`.
    #[must_use]
    pub fn by_file(&self, file: &str) -> &[Arc<Resource>] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or_default()
    }

    /// Resources whose type matches `pattern`.
    ///
    /// `*` matches everything. A pattern containing `*` or `?` is a wildcard
    /// pattern matched against whole type names; results are grouped by type, in
    /// the order the types were first seen. Any other pattern is an exact type name.
    #[must_use]
    pub fn by_type_pattern(&self, pattern: &str) -> Cow<'_, [Arc<Resource>]> {
        if pattern == "*" {
            return Cow::Borrowed(&self.all);
        }

        if !pattern.contains(['*', '?']) {
            return Cow::Borrowed(self.by_type(pattern));
        }

        let regex = match wildcard_regex(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Ignoring unusable resource type pattern '{pattern}': {e}");
                return Cow::Borrowed(&[]);
            }
        };

        Cow::Owned(
            self.types
                .iter()
                .filter(|t| regex.is_match(t))
                .flat_map(|t| self.by_type(t).iter().cloned())
                .collect(),
        )
    }
}

/// Anchored regex for a `*` / `?` wildcard pattern; every other character is literal.
fn wildcard_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = regex::escape(pattern).replace(r"\*", ".*").replace(r"\?", ".");
    Regex::new(&format!("^{body}$"))
}
