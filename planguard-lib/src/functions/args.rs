use crate::Result;
use crate::expr::value::type_name;
use cel_interpreter::Value;
use cel_interpreter::objects::Map;
use chrono::{DateTime, FixedOffset};
use ohno::{app_err, bail};

/// Typed access to the arguments of a built-in function call.
///
/// Argument positions in error messages are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Require exactly `count` arguments.
    pub fn exact(values: &'a [Value], count: usize) -> Result<Self> {
        Self::between(values, count, count)
    }

    /// Require between `min` and `max` arguments, inclusive.
    pub fn between(values: &'a [Value], min: usize, max: usize) -> Result<Self> {
        let got = values.len();
        if got < min || got > max {
            if min == max {
                bail!("expected {min} argument(s), got {got}");
            }
            bail!("expected between {min} and {max} arguments, got {got}");
        }
        Ok(Self { values })
    }

    /// Require at least `min` arguments.
    pub fn at_least(values: &'a [Value], min: usize) -> Result<Self> {
        if values.len() < min {
            bail!("expected at least {min} argument(s), got {}", values.len());
        }
        Ok(Self { values })
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub const fn all(&self) -> &'a [Value] {
        self.values
    }

    pub fn value(&self, index: usize) -> Result<&'a Value> {
        self.values
            .get(index)
            .ok_or_else(|| app_err!("missing argument {}", index + 1))
    }

    pub fn string(&self, index: usize) -> Result<&'a str> {
        match self.value(index)? {
            Value::String(s) => Ok(s.as_str()),
            other => Err(mismatch(index, "string", other)),
        }
    }

    /// An integer argument. Doubles with no fractional part are accepted.
    pub fn int(&self, index: usize) -> Result<i64> {
        match self.value(index)? {
            Value::Int(i) => Ok(*i),
            Value::UInt(u) => i64::try_from(*u).map_err(|e| app_err!("argument {} is out of range: {e}", index + 1)),
            #[expect(clippy::cast_possible_truncation, reason = "range and integrality are checked first")]
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(*f as i64),
            other => Err(mismatch(index, "int", other)),
        }
    }

    pub fn number(&self, index: usize) -> Result<f64> {
        match self.value(index)? {
            #[expect(clippy::cast_precision_loss, reason = "matches numeric promotion rules")]
            Value::Int(i) => Ok(*i as f64),
            #[expect(clippy::cast_precision_loss, reason = "matches numeric promotion rules")]
            Value::UInt(u) => Ok(*u as f64),
            Value::Float(f) => Ok(*f),
            other => Err(mismatch(index, "number", other)),
        }
    }

    pub fn list(&self, index: usize) -> Result<&'a [Value]> {
        match self.value(index)? {
            Value::List(items) => Ok(items.as_slice()),
            other => Err(mismatch(index, "list", other)),
        }
    }

    pub fn map(&self, index: usize) -> Result<&'a Map> {
        match self.value(index)? {
            Value::Map(map) => Ok(map),
            other => Err(mismatch(index, "map", other)),
        }
    }

    /// A timestamp argument, given either as a CEL timestamp or an RFC 3339 string.
    pub fn timestamp(&self, index: usize) -> Result<DateTime<FixedOffset>> {
        match self.value(index)? {
            Value::Timestamp(ts) => Ok(*ts),
            Value::String(s) => {
                DateTime::parse_from_rfc3339(s).map_err(|e| app_err!("argument {} is not an RFC 3339 timestamp '{s}': {e}", index + 1))
            }
            other => Err(mismatch(index, "timestamp", other)),
        }
    }
}

fn mismatch(index: usize, expected: &str, got: &Value) -> ohno::AppError {
    app_err!("argument {} must be a {expected}, got {}", index + 1, type_name(got))
}
