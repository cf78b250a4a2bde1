use camino::Utf8Path;
use globset::GlobBuilder;

const LOG_TARGET: &str = "     index";

/// Match `candidate` against a filesystem glob.
///
/// `*` and `?` never cross a `/`. An absolute pattern must match the whole
/// candidate. A relative pattern matches if it matches either the candidate's
/// file name or the whole candidate. An invalid pattern never matches.
///
/// `**` matches across directories and `{a,b}` matches either alternative.
#[must_use]
pub fn matches_path(pattern: &str, candidate: &str) -> bool {
    let matcher = match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => glob.compile_matcher(),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Ignoring invalid path pattern '{pattern}': {e}");
            return false;
        }
    };

    if Utf8Path::new(pattern).is_absolute() {
        return matcher.is_match(candidate);
    }

    Utf8Path::new(candidate).file_name().is_some_and(|name| matcher.is_match(name)) || matcher.is_match(candidate)
}
