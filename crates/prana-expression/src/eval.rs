//! Pipeline evaluation: `$input.foo | upper_case | truncate(10, "..")`.

use prana_error::{EngineError, ErrorKind};
use serde_json::Value;

use crate::context::ExpressionContext;
use crate::filters;
use crate::path::Path;

/// The result of evaluating one `{{ ... }}` expression region.
pub enum PipelineOutcome {
    /// The pipeline evaluated to a value.
    Value(Value),
    /// The pipeline referenced an unknown filter; per the filter contract
    /// this is not an error — the caller re-inserts the original region
    /// text unchanged.
    UnknownFilter,
}

/// Evaluate `expr` (the text between `{{` and `}}`, already trimmed)
/// against `ctx`.
pub fn evaluate(expr: &str, ctx: &ExpressionContext) -> Result<PipelineOutcome, EngineError> {
    let segments = split_top_level(expr, '|');
    let mut iter = segments.into_iter();
    let base = iter.next().unwrap_or_default();
    let mut value = evaluate_base(base.trim(), ctx);

    for segment in iter {
        let segment = segment.trim();
        let (name, args) = parse_call(segment)?;
        match filters::lookup(name) {
            Some(f) => value = f(&value, &args)?,
            None => return Ok(PipelineOutcome::UnknownFilter),
        }
    }
    Ok(PipelineOutcome::Value(value))
}

fn evaluate_base(text: &str, ctx: &ExpressionContext) -> Value {
    if let Some(path) = Path::parse(text) {
        return path.evaluate(ctx);
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn parse_call(segment: &str) -> Result<(&str, Vec<Value>), EngineError> {
    match segment.find('(') {
        Some(open) => {
            let name = segment[..open].trim();
            let close = segment.rfind(')').ok_or_else(|| {
                EngineError::new(ErrorKind::FilterArgumentError, format!("unterminated argument list in '{segment}'"))
            })?;
            let args = parse_args(&segment[open + 1..close]);
            Ok((name, args))
        }
        None => Ok((segment, Vec::new())),
    }
}

fn parse_args(body: &str) -> Vec<Value> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    split_top_level(body, ',')
        .into_iter()
        .map(|raw| {
            let raw = raw.trim();
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.trim_matches('"').to_string()))
        })
        .collect()
}

/// Split `text` on `sep` at nesting depth 0, never inside a quoted string
/// or parenthesized argument list.
fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_quotes = false;

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '(' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_quotes => {
                depth -= 1;
                current.push(c);
            }
            c if c == sep && !in_quotes && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> ExpressionContext {
        ExpressionContext::builder().input(json!({"age": 16})).build()
    }

    #[test]
    fn bare_path_with_no_filters() {
        let outcome = evaluate("$input.age", &ctx()).unwrap();
        assert!(matches!(outcome, PipelineOutcome::Value(v) if v == json!(16)));
    }

    #[test]
    fn single_filter_no_args() {
        let outcome = evaluate("$input.age | abs", &ctx()).unwrap();
        assert!(matches!(outcome, PipelineOutcome::Value(v) if v == json!(16.0)));
    }

    #[test]
    fn filter_chain_with_args() {
        let ctx = ExpressionContext::builder().input(json!({"name": "hello world"})).build();
        let outcome = evaluate(r#"$input.name | upper_case | truncate(8, "..")"#, &ctx).unwrap();
        assert!(matches!(outcome, PipelineOutcome::Value(Value::String(ref s)) if s == "HELLO.."));
    }

    #[test]
    fn unknown_filter_signals_pass_through() {
        let outcome = evaluate("$input.age | not_a_real_filter", &ctx()).unwrap();
        assert!(matches!(outcome, PipelineOutcome::UnknownFilter));
    }

    #[test]
    fn commas_inside_string_args_do_not_split() {
        let ctx = ExpressionContext::builder().input(json!(["a", "b"])).build();
        let outcome = evaluate(r#"$input | join(", ")"#, &ctx).unwrap();
        assert!(matches!(outcome, PipelineOutcome::Value(Value::String(ref s)) if s == "a, b"));
    }
}
