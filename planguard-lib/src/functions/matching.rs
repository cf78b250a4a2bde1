use super::{Args, FunctionTable};
use crate::Result;
use crate::expr::value::{list_value, map_value, string_value};
use cel_interpreter::Value;
use globset::GlobBuilder;
use ohno::{app_err, bail};
use regex::{Captures, Regex};

pub fn register(table: &mut FunctionTable) {
    table.register("glob_match", |_, args| {
        let args = Args::exact(args, 2)?;
        let pattern = args.string(0)?;
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| app_err!("invalid pattern '{pattern}': {e}"))?
            .compile_matcher();
        Ok(Value::Bool(glob.is_match(args.string(1)?)))
    });

    table.register("regex_match", |_, args| {
        let args = Args::exact(args, 2)?;
        let re = compile(args.string(0)?)?;
        Ok(Value::Bool(re.is_match(args.string(1)?)))
    });

    table.register("regex", |_, args| {
        let args = Args::exact(args, 2)?;
        let re = compile(args.string(0)?)?;
        let text = args.string(1)?;
        let captures = re
            .captures(text)
            .ok_or_else(|| app_err!("pattern '{}' does not match '{text}'", re.as_str()))?;
        capture_value(&re, &captures)
    });

    table.register("regexall", |_, args| {
        let args = Args::exact(args, 2)?;
        let re = compile(args.string(0)?)?;
        let matches = re
            .captures_iter(args.string(1)?)
            .map(|captures| capture_value(&re, &captures))
            .collect::<Result<_>>()?;
        Ok(list_value(matches))
    });
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| app_err!("invalid regex '{pattern}': {e}"))
}

/// The result of one match: the matched text when the pattern has no groups, a
/// list of the groups when they are unnamed or a map of them when they are named.
///
/// Groups that did not participate in the match yield an empty string.
fn capture_value(re: &Regex, captures: &Captures<'_>) -> Result<Value> {
    let group = |index: usize| string_value(captures.get(index).map_or("", |m| m.as_str()));

    let groups = re.captures_len() - 1;
    if groups == 0 {
        return Ok(group(0));
    }

    let named = re.capture_names().flatten().count();
    if named == 0 {
        return Ok(list_value((1..=groups).map(group).collect()));
    }
    if named != groups {
        bail!("pattern '{}' mixes named and unnamed groups", re.as_str());
    }

    Ok(map_value(
        re.capture_names()
            .enumerate()
            .filter_map(|(index, name)| name.map(|name| (name.to_string(), group(index)))),
    ))
}
