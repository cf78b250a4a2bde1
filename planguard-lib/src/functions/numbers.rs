use super::{Args, FunctionTable};
use crate::expr::value::type_name;
use cel_interpreter::Value;
use ohno::{app_err, bail};

pub fn register(table: &mut FunctionTable) {
    table.register("abs", |_, args| match Args::exact(args, 1)?.value(0)? {
        Value::Int(i) => i.checked_abs().map(Value::Int).ok_or_else(|| app_err!("absolute value of {i} overflows")),
        Value::UInt(u) => Ok(Value::UInt(*u)),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => bail!("abs: argument must be a number, got {}", type_name(other)),
    });

    table.register("ceil", |_, args| round(Args::exact(args, 1)?, f64::ceil));
    table.register("floor", |_, args| round(Args::exact(args, 1)?, f64::floor));

    // truncates toward zero, numeric strings are parsed first
    table.register("tonumber", |_, args| {
        let number = match Args::exact(args, 1)?.value(0)? {
            Value::Int(i) => return Ok(Value::Int(*i)),
            Value::UInt(u) => return Ok(Value::UInt(*u)),
            Value::Float(f) => *f,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| app_err!("cannot convert '{s}' to a number: {e}"))?,
            other => bail!("tonumber: argument must be a number or string, got {}", type_name(other)),
        };

        let truncated = number.trunc();
        if !truncated.is_finite() || truncated.abs() >= 9.0e15 {
            bail!("{number} is out of range for an integer");
        }
        #[expect(clippy::cast_possible_truncation, reason = "magnitude is checked above")]
        let int = truncated as i64;
        Ok(Value::Int(int))
    });

    table.register("parseint", |_, args| {
        let args = Args::exact(args, 2)?;
        let s = args.string(0)?;
        let base = args.int(1)?;
        if !(2..=36).contains(&base) {
            bail!("base must be between 2 and 36, got {base}");
        }
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "base is range-checked above")]
        let radix = base as u32;
        i64::from_str_radix(s, radix)
            .map(Value::Int)
            .map_err(|e| app_err!("cannot parse '{s}' as a base {base} integer: {e}"))
    });
}

/// Integers pass through unchanged, doubles are rounded with `f` and become integers when they fit.
fn round(args: Args<'_>, f: fn(f64) -> f64) -> crate::Result<Value> {
    match args.value(0)? {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::UInt(u) => Ok(Value::UInt(*u)),
        Value::Float(x) => {
            let rounded = f(*x);
            if rounded.is_finite() && rounded.abs() < 9.0e15 {
                #[expect(clippy::cast_possible_truncation, reason = "magnitude is checked above")]
                let int = rounded as i64;
                Ok(Value::Int(int))
            } else {
                Ok(Value::Float(rounded))
            }
        }
        other => bail!("argument must be a number, got {}", type_name(other)),
    }
}
