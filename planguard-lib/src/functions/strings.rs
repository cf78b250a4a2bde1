use super::{Args, FunctionTable};
use crate::Result;
use crate::expr::value::{list_value, string_value, to_json, type_name};
use cel_interpreter::Value;
use ohno::{app_err, bail};

pub fn register(table: &mut FunctionTable) {
    table.register("upper", |_, args| Ok(string_value(Args::exact(args, 1)?.string(0)?.to_uppercase())));
    table.register("lower", |_, args| Ok(string_value(Args::exact(args, 1)?.string(0)?.to_lowercase())));
    table.register("trimspace", |_, args| Ok(string_value(Args::exact(args, 1)?.string(0)?.trim())));
    table.register("chomp", |_, args| {
        Ok(string_value(Args::exact(args, 1)?.string(0)?.trim_end_matches(['\n', '\r'])))
    });

    table.register("trim", |_, args| {
        let args = Args::exact(args, 2)?;
        let cutset: Vec<char> = args.string(1)?.chars().collect();
        Ok(string_value(args.string(0)?.trim_matches(cutset.as_slice())))
    });

    table.register("trimprefix", |_, args| {
        let args = Args::exact(args, 2)?;
        let s = args.string(0)?;
        Ok(string_value(s.strip_prefix(args.string(1)?).unwrap_or(s)))
    });

    table.register("trimsuffix", |_, args| {
        let args = Args::exact(args, 2)?;
        let s = args.string(0)?;
        Ok(string_value(s.strip_suffix(args.string(1)?).unwrap_or(s)))
    });

    table.register("split", |_, args| {
        let args = Args::exact(args, 2)?;
        let separator = args.string(0)?;
        let parts = args.string(1)?.split(separator).map(string_value).collect();
        Ok(list_value(parts))
    });

    table.register("join", |_, args| {
        let args = Args::at_least(args, 2)?;
        let separator = args.string(0)?;
        let mut parts = Vec::new();
        for index in 1..args.len() {
            for item in args.list(index)? {
                match item {
                    Value::String(s) => parts.push(s.as_str()),
                    other => bail!("join: list elements must be strings, got {}", type_name(other)),
                }
            }
        }
        Ok(string_value(parts.join(separator)))
    });

    table.register("replace", |_, args| {
        let args = Args::exact(args, 3)?;
        Ok(string_value(args.string(0)?.replace(args.string(1)?, args.string(2)?)))
    });

    table.register("substr", |_, args| {
        let args = Args::exact(args, 3)?;
        Ok(string_value(substr(args.string(0)?, args.int(1)?, args.int(2)?)))
    });

    // every line but the first gets the prefix
    table.register("indent", |_, args| {
        let args = Args::exact(args, 2)?;
        let spaces = usize::try_from(args.int(0)?).map_err(|e| app_err!("indent width must not be negative: {e}"))?;
        let separator = format!("\n{}", " ".repeat(spaces));
        Ok(string_value(args.string(1)?.split('\n').collect::<Vec<_>>().join(&separator)))
    });

    table.register("format", |_, args| {
        let args = Args::at_least(args, 1)?;
        Ok(string_value(format(args.string(0)?, args.all().get(1..).unwrap_or_default())?))
    });

    // list arguments are iterated in lockstep, other arguments repeat on every line
    table.register("formatlist", |_, args| {
        let args = Args::at_least(args, 1)?;
        let spec = args.string(0)?;
        let values = args.all().get(1..).unwrap_or_default();

        let mut lines = None;
        for value in values {
            if let Value::List(items) = value {
                match lines {
                    Some(n) if n != items.len() => bail!("formatlist: list arguments must all have the same length"),
                    _ => lines = Some(items.len()),
                }
            }
        }

        let mut result = Vec::new();
        for line in 0..lines.unwrap_or(1) {
            let row: Vec<Value> = values
                .iter()
                .map(|value| match value {
                    Value::List(items) => items[line].clone(),
                    other => other.clone(),
                })
                .collect();
            result.push(string_value(format(spec, &row)?));
        }
        Ok(list_value(result))
    });
}

/// printf-style formatting supporting the `%s %d %f %t %q %v` verbs and `%%`.
fn format(spec: &str, values: &[Value]) -> Result<String> {
    let mut out = String::with_capacity(spec.len());
    let mut values = values.iter();
    let mut chars = spec.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let verb = chars.next().ok_or_else(|| app_err!("format string '{spec}' ends with a lone '%'"))?;
        if verb == '%' {
            out.push('%');
            continue;
        }

        let value = values
            .next()
            .ok_or_else(|| app_err!("not enough arguments for format string '{spec}'"))?;

        match (verb, value) {
            ('s' | 'v', Value::String(s)) => out.push_str(s),
            ('q', Value::String(s)) => out.push_str(&serde_json::to_string(s.as_str())?),
            ('d' | 'v', Value::Int(i)) => out.push_str(&i.to_string()),
            ('d' | 'v', Value::UInt(u)) => out.push_str(&u.to_string()),
            ('v', Value::Float(f)) => out.push_str(&f.to_string()),
            ('f', Value::Float(f)) => out.push_str(&format!("{f:.6}")),
            #[expect(clippy::cast_precision_loss, reason = "matches numeric promotion rules")]
            ('f', Value::Int(i)) => out.push_str(&format!("{:.6}", *i as f64)),
            ('t' | 'v', Value::Bool(b)) => out.push_str(&b.to_string()),
            ('v', other) => out.push_str(&to_json(other)?.to_string()),
            (verb, other) => bail!("format: %{verb} cannot format a {}", type_name(other)),
        }
    }

    if values.next().is_some() {
        bail!("too many arguments for format string '{spec}'");
    }

    Ok(out)
}

/// Character-based substring.
///
/// A negative `offset` counts back from the end of the string; a negative `length`
/// takes everything up to the end. Out-of-range requests are clamped.
fn substr(s: &str, offset: i64, length: i64) -> String {
    let total = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);

    let start = if offset < 0 { (total + offset).max(0) } else { offset.min(total) };
    let take = if length < 0 { total - start } else { length.min(total - start) };

    s.chars()
        .skip(usize::try_from(start).unwrap_or(usize::MAX))
        .take(usize::try_from(take).unwrap_or(0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_support::{call, s};

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(call("upper", &[s("t3.Large")]).unwrap(), s("T3.LARGE"));
        assert_eq!(call("lower", &[s("PROD")]).unwrap(), s("prod"));
        assert_eq!(call("trimspace", &[s("  x \n")]).unwrap(), s("x"));
        assert_eq!(call("chomp", &[s("line\r\n")]).unwrap(), s("line"));
        assert_eq!(call("trim", &[s("?!hello?!"), s("!?")]).unwrap(), s("hello"));
    }

    #[test]
    fn test_trim_prefix_and_suffix() {
        assert_eq!(call("trimprefix", &[s("arn:aws:iam"), s("arn:")]).unwrap(), s("aws:iam"));
        assert_eq!(call("trimprefix", &[s("aws:iam"), s("arn:")]).unwrap(), s("aws:iam"));
        assert_eq!(call("trimsuffix", &[s("bucket.tf"), s(".tf")]).unwrap(), s("bucket"));
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(call("split", &[s(","), s("a,b,,c")]).unwrap(), list_value(vec![s("a"), s("b"), s(""), s("c")]));
        assert_eq!(call("split", &[s(","), s("")]).unwrap(), list_value(vec![s("")]));

        let list = list_value(vec![s("a"), s("b")]);
        let more = list_value(vec![s("c")]);
        assert_eq!(call("join", &[s("-"), list, more]).unwrap(), s("a-b-c"));
    }

    #[test]
    fn test_join_rejects_non_strings() {
        let err = call("join", &[s(","), list_value(vec![Value::Int(1)])]).unwrap_err();
        assert!(err.to_string().contains("must be strings"));
    }

    #[test]
    fn test_replace_is_literal() {
        assert_eq!(call("replace", &[s("a.b.c"), s("."), s("/")]).unwrap(), s("a/b/c"));
    }

    #[test]
    fn test_substr() {
        assert_eq!(substr("hello world", 1, 4), "ello");
        assert_eq!(substr("hello world", -5, -1), "world");
        assert_eq!(substr("hello", 0, 100), "hello");
        assert_eq!(substr("hello", 10, 2), "");
        assert_eq!(substr("héllo", 1, 2), "él");
        assert_eq!(call("substr", &[s("abcdef"), Value::Int(2), Value::Int(-1)]).unwrap(), s("cdef"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(call("indent", &[Value::Int(2), s("a\nb\nc")]).unwrap(), s("a\n  b\n  c"));
        assert_eq!(call("indent", &[Value::Int(4), s("single")]).unwrap(), s("single"));
        assert!(call("indent", &[Value::Int(-1), s("x")]).is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(
            call("format", &[s("%s has %d port(s), 100%% %t"), s("web"), Value::Int(2), Value::Bool(true)]).unwrap(),
            s("web has 2 port(s), 100% true")
        );
        assert_eq!(call("format", &[s("%q"), s("say \"hi\"")]).unwrap(), s(r#""say \"hi\"""#));
        assert_eq!(call("format", &[s("%f"), Value::Float(1.5)]).unwrap(), s("1.500000"));
        assert_eq!(call("format", &[s("%v"), list_value(vec![Value::Int(1), s("a")])]).unwrap(), s(r#"[1,"a"]"#));
    }

    #[test]
    fn test_format_argument_mismatch() {
        assert!(call("format", &[s("%s %s"), s("a")]).unwrap_err().to_string().contains("not enough arguments"));
        assert!(call("format", &[s("%s"), s("a"), s("b")]).unwrap_err().to_string().contains("too many arguments"));
        assert!(call("format", &[s("%d"), s("a")]).unwrap_err().to_string().contains("%d cannot format a string"));
        assert!(call("format", &[s("50%")]).is_err());
    }

    #[test]
    fn test_formatlist() {
        let names = list_value(vec![s("a"), s("b")]);
        let ids = list_value(vec![Value::Int(1), Value::Int(2)]);

        assert_eq!(
            call("formatlist", &[s("%s-%d@%s"), names.clone(), ids, s("prod")]).unwrap(),
            list_value(vec![s("a-1@prod"), s("b-2@prod")])
        );
        assert_eq!(call("formatlist", &[s("%s!"), s("x")]).unwrap(), list_value(vec![s("x!")]));
        assert!(call("formatlist", &[s("%s%s"), names, list_value(vec![s("z")])]).is_err());
    }
}
