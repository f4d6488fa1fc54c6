//! String filters: `upper_case`, `lower_case`, `capitalize`, `truncate`,
//! `default`.

use prana_error::EngineError;
use serde_json::Value;

use super::{argument_error, string_arg};

fn as_str(_filter: &str, value: &Value) -> Result<String, EngineError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Ok(super::collection::to_display_string(other)),
    }
}

pub fn upper_case(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    Ok(Value::String(as_str("upper_case", value)?.to_uppercase()))
}

pub fn lower_case(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    Ok(Value::String(as_str("lower_case", value)?.to_lowercase()))
}

pub fn capitalize(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    let s = as_str("capitalize", value)?;
    let mut chars = s.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    Ok(Value::String(capitalized))
}

/// `truncate(len, suffix?="...")`. A string already at or under `len`
/// passes through unchanged; otherwise the result is exactly `len`
/// characters including the suffix, when `len >= suffix.len()`.
pub fn truncate(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let s = as_str("truncate", value)?;
    let len = super::number_arg("truncate", args, 0, None)? as usize;
    let suffix = string_arg("truncate", args, 1, Some("..."))?;

    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= len {
        return Ok(Value::String(s));
    }
    if len < suffix.chars().count() {
        let truncated: String = suffix.chars().take(len).collect();
        return Ok(Value::String(truncated));
    }
    let keep = len - suffix.chars().count();
    let head: String = chars.into_iter().take(keep).collect();
    Ok(Value::String(head + &suffix))
}

/// `default(fallback)` — substitutes `fallback` only when the piped value
/// is `null`.
pub fn default_filter(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    if value.is_null() {
        args.first()
            .cloned()
            .ok_or_else(|| argument_error("default", "missing fallback argument"))
    } else {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upper_and_lower_case() {
        assert_eq!(upper_case(&json!("hi"), &[]).unwrap(), json!("HI"));
        assert_eq!(lower_case(&json!("HI"), &[]).unwrap(), json!("hi"));
    }

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize(&json!("hello world"), &[]).unwrap(), json!("Hello world"));
        assert_eq!(capitalize(&json!(""), &[]).unwrap(), json!(""));
    }

    #[test]
    fn truncate_passes_through_when_under_length() {
        let result = truncate(&json!("hi"), &[json!(10)]).unwrap();
        assert_eq!(result, json!("hi"));
    }

    #[test]
    fn truncate_produces_exact_length_with_suffix() {
        let result = truncate(&json!("hello world"), &[json!(8), json!("...")]).unwrap();
        assert_eq!(result, json!("hello..."));
        assert_eq!(result.as_str().unwrap().chars().count(), 8);
    }

    #[test]
    fn truncate_uses_default_suffix() {
        let result = truncate(&json!("hello world"), &[json!(8)]).unwrap();
        assert_eq!(result, json!("hello..."));
    }

    #[test]
    fn default_substitutes_only_on_null() {
        assert_eq!(default_filter(&Value::Null, &[json!("fallback")]).unwrap(), json!("fallback"));
        assert_eq!(default_filter(&json!(0), &[json!("fallback")]).unwrap(), json!(0));
        assert_eq!(default_filter(&json!(""), &[json!("fallback")]).unwrap(), json!(""));
    }
}
