use crate::Result;
use crate::index::matches_path;
use crate::model::Resource;
use camino::Utf8PathBuf;
use ohno::IntoAppError;
use serde::Deserialize;
use std::fs;

const LOG_TARGET: &str = "  manifest";

/// A resource manifest produced by the extraction step.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    resources: Vec<Resource>,
}

/// Read every manifest in order and concatenate their resources.
pub fn load_resources(paths: &[Utf8PathBuf]) -> Result<Vec<Resource>> {
    let mut resources = Vec::new();

    for path in paths {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading resource manifest '{path}'"))?;
        let manifest: Manifest = serde_json::from_str(&text).into_app_err_with(|| format!("parsing resource manifest '{path}'"))?;

        log::debug!(target: LOG_TARGET, "Loaded {} resource(s) from '{path}'", manifest.resources.len());
        resources.extend(manifest.resources);
    }

    Ok(resources)
}

/// Drop resources declared in files matching any of `patterns`.
pub fn exclude_paths(resources: Vec<Resource>, patterns: &[String]) -> Vec<Resource> {
    if patterns.is_empty() {
        return resources;
    }

    let before = resources.len();
    let kept: Vec<_> = resources
        .into_iter()
        .filter(|r| !patterns.iter().any(|p| matches_path(p, &r.file)))
        .collect();

    log::debug!(target: LOG_TARGET, "Excluded {} resource(s) by path", before - kept.len());
    kept
}
