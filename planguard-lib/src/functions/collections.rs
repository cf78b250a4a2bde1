use super::{Args, FunctionTable};
use crate::expr::value::{key_to_string, list_value, string_value, type_name};
use cel_interpreter::Value;
use cel_interpreter::objects::{Key, Map};
use ohno::{IntoAppError, app_err, bail};
use std::collections::HashMap;
use std::sync::Arc;

pub fn register(table: &mut FunctionTable) {
    table.register("length", |_, args| {
        let len = match Args::exact(args, 1)?.value(0)? {
            Value::List(items) => items.len(),
            Value::Map(map) => map.map.len(),
            Value::String(s) => s.chars().count(),
            other => bail!("cannot take the length of {}", type_name(other)),
        };
        Ok(Value::Int(i64::try_from(len).into_app_err("length out of range")?))
    });

    table.register("keys", |_, args| {
        let map = Args::exact(args, 1)?.map(0)?;
        Ok(list_value(sorted_entries(map).into_iter().map(|(k, _)| string_value(k)).collect()))
    });

    table.register("values", |_, args| {
        let map = Args::exact(args, 1)?.map(0)?;
        Ok(list_value(sorted_entries(map).into_iter().map(|(_, v)| v.clone()).collect()))
    });

    table.register("lookup", |_, args| {
        let args = Args::between(args, 2, 3)?;
        let map = args.map(0)?;
        let key = args.string(1)?;
        match map.map.get(&string_key(key)) {
            Some(value) => Ok(value.clone()),
            None if args.len() == 3 => Ok(args.value(2)?.clone()),
            None => bail!("key '{key}' not found and no default given"),
        }
    });

    table.register("element", |_, args| {
        let args = Args::exact(args, 2)?;
        let list = args.list(0)?;
        let index = args.int(1)?;
        if list.is_empty() {
            bail!("cannot use element function with an empty list");
        }
        let index = usize::try_from(index).map_err(|e| app_err!("index must not be negative: {e}"))?;
        Ok(list[index % list.len()].clone())
    });

    table.register("concat", |_, args| {
        let args = Args::at_least(args, 1)?;
        let mut result = Vec::new();
        for index in 0..args.len() {
            result.extend(args.list(index)?.iter().cloned());
        }
        Ok(list_value(result))
    });

    table.register("flatten", |_, args| {
        let mut result = Vec::new();
        flatten_into(Args::exact(args, 1)?.list(0)?, &mut result);
        Ok(list_value(result))
    });

    table.register("distinct", |_, args| {
        let mut result: Vec<Value> = Vec::new();
        for item in Args::exact(args, 1)?.list(0)? {
            if !result.contains(item) {
                result.push(item.clone());
            }
        }
        Ok(list_value(result))
    });

    table.register("compact", |_, args| {
        let list = Args::exact(args, 1)?.list(0)?;
        Ok(list_value(list.iter().filter(|v| !is_blank(v)).cloned().collect()))
    });

    table.register("reverse", |_, args| {
        let list = Args::exact(args, 1)?.list(0)?;
        Ok(list_value(list.iter().rev().cloned().collect()))
    });

    table.register("slice", |_, args| {
        let args = Args::exact(args, 3)?;
        let list = args.list(0)?;
        let start = usize::try_from(args.int(1)?).map_err(|e| app_err!("start index must not be negative: {e}"))?;
        let end = usize::try_from(args.int(2)?).map_err(|e| app_err!("end index must not be negative: {e}"))?;
        if start > end || end > list.len() {
            bail!("invalid slice range {start}..{end} for a list of length {}", list.len());
        }
        Ok(list_value(list.iter().skip(start).take(end - start).cloned().collect()))
    });

    table.register("sort", |_, args| {
        let mut strings = Vec::new();
        for item in Args::exact(args, 1)?.list(0)? {
            match item {
                Value::String(s) => strings.push(Arc::clone(s)),
                other => bail!("sort: list elements must be strings, got {}", type_name(other)),
            }
        }
        strings.sort();
        Ok(list_value(strings.into_iter().map(Value::String).collect()))
    });

    table.register("zipmap", |_, args| {
        let args = Args::exact(args, 2)?;
        let keys = args.list(0)?;
        let values = args.list(1)?;
        if keys.len() != values.len() {
            bail!("number of keys ({}) does not match number of values ({})", keys.len(), values.len());
        }
        let mut map = HashMap::new();
        for (key, value) in keys.iter().zip(values) {
            let Value::String(key) = key else {
                bail!("zipmap: keys must be strings, got {}", type_name(key));
            };
            let _ = map.insert(Key::String(Arc::clone(key)), value.clone());
        }
        Ok(Value::Map(Map::from(map)))
    });

    table.register("index", |_, args| {
        let args = Args::exact(args, 2)?;
        let item = args.value(1)?;
        let position = args
            .list(0)?
            .iter()
            .position(|candidate| candidate == item)
            .ok_or_else(|| app_err!("item not found in list"))?;
        Ok(Value::Int(i64::try_from(position).into_app_err("index out of range")?))
    });

    table.register("hasindex", |_, args| {
        let args = Args::exact(args, 2)?;
        let found = match args.value(0)? {
            Value::Map(map) => map.map.contains_key(&string_key(args.string(1)?)),
            Value::List(items) => usize::try_from(args.int(1)?).is_ok_and(|index| index < items.len()),
            other => bail!("hasindex: cannot index into {}", type_name(other)),
        };
        Ok(Value::Bool(found))
    });

    table.register("chunklist", |_, args| {
        let args = Args::exact(args, 2)?;
        let list = args.list(0)?;
        let size = usize::try_from(args.int(1)?).map_err(|e| app_err!("chunk size must not be negative: {e}"))?;
        if size == 0 {
            return Ok(list_value(vec![list_value(list.to_vec())]));
        }
        Ok(list_value(list.chunks(size).map(|chunk| list_value(chunk.to_vec())).collect()))
    });

    table.register("coalescelist", |_, args| {
        let args = Args::at_least(args, 1)?;
        for index in 0..args.len() {
            if !args.list(index)?.is_empty() {
                return Ok(args.value(index)?.clone());
            }
        }
        bail!("no non-empty list arguments")
    });

    table.register("coalesce", |_, args| {
        Args::at_least(args, 1)?
            .all()
            .iter()
            .find(|v| !is_blank(v))
            .cloned()
            .ok_or_else(|| app_err!("no non-null, non-empty-string arguments"))
    });

    table.register("merge", |_, args| {
        let mut merged: HashMap<Key, Value> = HashMap::new();
        for arg in args {
            match arg {
                Value::Map(map) => merged.extend(map.map.iter().map(|(k, v)| (k.clone(), v.clone()))),
                Value::Null => {}
                other => bail!("merge: arguments must be maps, got {}", type_name(other)),
            }
        }
        Ok(Value::Map(Map::from(merged)))
    });

    table.register("anytrue", |_, args| {
        Ok(Value::Bool(match Args::exact(args, 1)?.value(0)? {
            Value::List(items) => items.iter().any(|v| matches!(v, Value::Bool(true))),
            _ => false,
        }))
    });

    table.register("alltrue", |_, args| {
        Ok(Value::Bool(match Args::exact(args, 1)?.value(0)? {
            Value::List(items) => items.iter().all(|v| matches!(v, Value::Bool(true))),
            _ => false,
        }))
    });
}

fn string_key(key: &str) -> Key {
    Key::String(Arc::new(key.to_string()))
}

/// Map entries ordered by stringified key.
fn sorted_entries(map: &Map) -> Vec<(String, &Value)> {
    let mut entries: Vec<_> = map.map.iter().map(|(k, v)| (key_to_string(k), v)).collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

fn flatten_into(items: &[Value], out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::List(inner) => flatten_into(inner, out),
            other => out.push(other.clone()),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
