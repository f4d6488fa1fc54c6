//! Collection filters: `length`, `first`, `last`, `join`, `keys`, `values`,
//! `sort`, `reverse`, `uniq`, `slice`, `contains`, `compact`, `flatten`,
//! `sum`, `group_by`, `map`, `filter`, `reject`, `dump`.

use std::cmp::Ordering;

use prana_error::EngineError;
use serde_json::Value;

use super::{argument_error, number_arg, string_arg};

/// Default string conversion used by `join`, `dump`'s non-canonical
/// cousins, and the `truncate`/`upper_case`/etc. string filters when the
/// piped value isn't already a string.
pub(crate) fn to_display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn as_array<'a>(filter: &str, value: &'a Value) -> Result<&'a Vec<Value>, EngineError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(argument_error(filter, "value must be a sequence")),
    }
}

pub fn length(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    let len = match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::String(s) => s.chars().count(),
        Value::Null => 0,
        _ => return Err(argument_error("length", "value has no length")),
    };
    Ok(serde_json::json!(len))
}

pub fn first(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    Ok(as_array("first", value)?.first().cloned().unwrap_or(Value::Null))
}

pub fn last(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    Ok(as_array("last", value)?.last().cloned().unwrap_or(Value::Null))
}

pub fn join(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let sep = string_arg("join", args, 0, Some(", "))?;
    let items = as_array("join", value)?;
    let joined = items.iter().map(to_display_string).collect::<Vec<_>>().join(&sep);
    Ok(Value::String(joined))
}

pub fn keys(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    match value {
        Value::Object(map) => Ok(Value::Array(map.keys().cloned().map(Value::String).collect())),
        _ => Err(argument_error("keys", "value must be an object")),
    }
}

pub fn values(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    match value {
        Value::Object(map) => Ok(Value::Array(map.values().cloned().collect())),
        _ => Err(argument_error("values", "value must be an object")),
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&y.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

pub fn sort(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    let mut items = as_array("sort", value)?.clone();
    items.sort_by(compare);
    Ok(Value::Array(items))
}

pub fn reverse(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    let mut items = as_array("reverse", value)?.clone();
    items.reverse();
    Ok(Value::Array(items))
}

pub fn uniq(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    let items = as_array("uniq", value)?;
    let mut seen: Vec<Value> = Vec::new();
    for item in items {
        if !seen.contains(item) {
            seen.push(item.clone());
        }
    }
    Ok(Value::Array(seen))
}

/// `slice(start, count)`.
pub fn slice(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let items = as_array("slice", value)?;
    let start = number_arg("slice", args, 0, None)? as usize;
    let count = number_arg("slice", args, 1, None)? as usize;
    let end = (start + count).min(items.len());
    let sliced = if start >= items.len() { Vec::new() } else { items[start..end].to_vec() };
    Ok(Value::Array(sliced))
}

pub fn contains(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let needle = args.first().ok_or_else(|| argument_error("contains", "missing argument"))?;
    let found = match value {
        Value::Array(items) => items.contains(needle),
        Value::String(s) => needle.as_str().is_some_and(|n| s.contains(n)),
        _ => return Err(argument_error("contains", "value must be a sequence or string")),
    };
    Ok(Value::Bool(found))
}

pub fn compact(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    let items = as_array("compact", value)?;
    Ok(Value::Array(items.iter().filter(|v| !v.is_null()).cloned().collect()))
}

pub fn flatten(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    let items = as_array("flatten", value)?;
    let mut out = Vec::new();
    for item in items {
        match item {
            Value::Array(inner) => out.extend(inner.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    Ok(Value::Array(out))
}

pub fn sum(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    let items = as_array("sum", value)?;
    let mut total = 0.0;
    for item in items {
        total += item
            .as_f64()
            .ok_or_else(|| argument_error("sum", "all elements must be numeric"))?;
    }
    Ok(serde_json::json!(total))
}

/// `group_by(field)` — returns an object mapping each distinct field value
/// (as a string key) to the array of elements sharing it.
pub fn group_by(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let field = string_arg("group_by", args, 0, None)?;
    let items = as_array("group_by", value)?;
    let mut groups = serde_json::Map::new();
    for item in items {
        let key = item.get(&field).map_or_else(|| "null".to_string(), to_display_string);
        groups
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .expect("inserted as array")
            .push(item.clone());
    }
    Ok(Value::Object(groups))
}

pub fn map_field(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let field = string_arg("map", args, 0, None)?;
    let items = as_array("map", value)?;
    Ok(Value::Array(items.iter().map(|item| item.get(&field).cloned().unwrap_or(Value::Null)).collect()))
}

pub fn filter_field(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let field = string_arg("filter", args, 0, None)?;
    let want = args.get(1).ok_or_else(|| argument_error("filter", "missing comparison value"))?;
    let items = as_array("filter", value)?;
    Ok(Value::Array(items.iter().filter(|item| item.get(&field) == Some(want)).cloned().collect()))
}

pub fn reject_field(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let field = string_arg("reject", args, 0, None)?;
    let want = args.get(1).ok_or_else(|| argument_error("reject", "missing comparison value"))?;
    let items = as_array("reject", value)?;
    Ok(Value::Array(items.iter().filter(|item| item.get(&field) != Some(want)).cloned().collect()))
}

/// `dump` — canonical string form of any value.
pub fn dump(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    Ok(Value::String(serde_json::to_string(value).unwrap_or_default()))
}
