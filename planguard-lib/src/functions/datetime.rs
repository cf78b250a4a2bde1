use super::{Args, FunctionTable};
use crate::Result;
use crate::expr::value::string_value;
use cel_interpreter::Value;
use chrono::{DateTime, Datelike, FixedOffset, SecondsFormat, TimeDelta, Timelike, Utc};
use ohno::{app_err, bail};

pub fn register(table: &mut FunctionTable, now: DateTime<Utc>) {
    // replaces the CEL builtin of the same name; the one-argument form keeps its meaning
    table.register("timestamp", move |_, args| {
        let args = Args::between(args, 0, 1)?;
        if args.is_empty() {
            Ok(string_value(now.to_rfc3339_opts(SecondsFormat::Secs, true)))
        } else {
            Ok(Value::Timestamp(args.timestamp(0)?))
        }
    });

    table.register("day_of_week", move |_, args| {
        let _ = Args::exact(args, 0)?;
        Ok(string_value(now.format("%A").to_string().to_lowercase()))
    });

    table.register("formatdate", |_, args| {
        let args = Args::exact(args, 2)?;
        Ok(string_value(format_date(args.string(0)?, &args.timestamp(1)?)))
    });

    table.register("timeadd", |_, args| {
        let args = Args::exact(args, 2)?;
        let ts = args.timestamp(0)?;
        let text = args.string(1)?;
        let result = ts
            .checked_add_signed(parse_duration(text)?)
            .ok_or_else(|| app_err!("adding '{text}' to {ts} is out of range"))?;

        // keep the representation the caller used
        Ok(match args.value(0)? {
            Value::Timestamp(_) => Value::Timestamp(result),
            _ => string_value(result.to_rfc3339_opts(SecondsFormat::Secs, true)),
        })
    });
}

/// Render `ts` using the `YYYY YY MM DD hh mm ss` tokens; anything else is copied through.
fn format_date(format: &str, ts: &DateTime<FixedOffset>) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        let (piece, consumed) = if rest.starts_with("YYYY") {
            (format!("{:04}", ts.year()), 4)
        } else if rest.starts_with("YY") {
            (format!("{:02}", ts.year().rem_euclid(100)), 2)
        } else if rest.starts_with("MM") {
            (format!("{:02}", ts.month()), 2)
        } else if rest.starts_with("DD") {
            (format!("{:02}", ts.day()), 2)
        } else if rest.starts_with("hh") {
            (format!("{:02}", ts.hour()), 2)
        } else if rest.starts_with("mm") {
            (format!("{:02}", ts.minute()), 2)
        } else if rest.starts_with("ss") {
            (format!("{:02}", ts.second()), 2)
        } else {
            (c.to_string(), c.len_utf8())
        };

        out.push_str(&piece);
        rest = rest.get(consumed..).unwrap_or_default();
    }

    out
}

/// Parse a duration such as `1h30m`, `-10m`, `1.5h` or `250ms`.
fn parse_duration(text: &str) -> Result<TimeDelta> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    if unsigned == "0" {
        return Ok(TimeDelta::zero());
    }
    if unsigned.is_empty() {
        bail!("invalid duration '{text}'");
    }

    let mut total: i128 = 0;
    let mut rest = unsigned;
    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let unit_nanos: i128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            "" => bail!("missing unit in duration '{text}'"),
            other => bail!("unknown unit '{other}' in duration '{text}'"),
        };

        let nanos = component_nanos(number, unit_nanos).ok_or_else(|| app_err!("invalid duration '{text}'"))?;
        total = total.checked_add(nanos).ok_or_else(|| app_err!("duration '{text}' is out of range"))?;
        rest = tail;
    }

    let total = if negative { -total } else { total };
    let nanos = i64::try_from(total).map_err(|e| app_err!("duration '{text}' is out of range: {e}"))?;
    Ok(TimeDelta::nanoseconds(nanos))
}

/// `number` (digits with an optional fraction) times `unit_nanos`.
fn component_nanos(number: &str, unit_nanos: i128) -> Option<i128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let whole: i128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(unit_nanos)?;

    let mut scale = unit_nanos;
    for digit in fraction.chars() {
        scale /= 10;
        nanos = nanos.checked_add(i128::from(digit.to_digit(10)?) * scale)?;
    }

    Some(nanos)
}
