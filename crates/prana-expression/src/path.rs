//! Bare path expressions: `$input.users[0].name`, `$nodes.api.output.id`,
//! `$vars.base`, `$input.users.*.name` (wildcard), `$input.users.{role:
//! "admin"}` (filter by field).

use serde_json::Value;

use crate::context::ExpressionContext;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Field(String),
    Index(usize),
    Wildcard,
    FieldFilter { field: String, value: Value },
}

/// A bare path expression, parsed once and evaluated many times.
#[derive(Debug, Clone)]
pub struct Path {
    namespace: String,
    segments: Vec<Segment>,
}

impl Path {
    /// Parse `raw` (which must start with `$`) into a namespace plus a
    /// sequence of segments. Returns `None` if `raw` does not start with
    /// `$` — callers use that to fall back to treating the text as a
    /// literal.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix('$')?;
        let tokens = tokenize(rest);
        let mut iter = tokens.into_iter();
        let namespace = iter.next()?;
        let segments = iter.map(parse_segment).collect();
        Some(Self { namespace, segments })
    }

    /// Evaluate the path against `ctx`. Missing fields resolve to
    /// `Value::Null` rather than erroring — `default()` and friends depend
    /// on this never raising.
    #[must_use]
    pub fn evaluate(&self, ctx: &ExpressionContext) -> Value {
        let Some(root) = ctx.namespace(&self.namespace) else {
            return Value::Null;
        };
        apply_segments(root, &self.segments)
    }
}

fn apply_segments(value: Value, segments: &[Segment]) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return value;
    };
    match head {
        Segment::Field(name) => {
            let next = match value {
                Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            };
            apply_segments(next, rest)
        }
        Segment::Index(idx) => {
            let next = match value {
                Value::Array(items) => items.get(*idx).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            };
            apply_segments(next, rest)
        }
        Segment::Wildcard => {
            let items: Vec<Value> = match value {
                Value::Array(items) => items,
                Value::Object(map) => map.into_values().collect(),
                _ => Vec::new(),
            };
            Value::Array(items.into_iter().map(|item| apply_segments(item, rest)).collect())
        }
        Segment::FieldFilter { field, value: want } => {
            let items: Vec<Value> = match value {
                Value::Array(items) => items,
                _ => Vec::new(),
            };
            let matched: Vec<Value> = items
                .into_iter()
                .filter(|item| item.get(field) == Some(want))
                .collect();
            apply_segments(Value::Array(matched), rest)
        }
    }
}

/// Split a path (with the leading `$` and namespace already stripped from
/// the caller's perspective — the namespace is the first token produced
/// here) into dotted segments, treating `[n]` as `.n` and keeping `{...}`
/// filter clauses intact even though they may contain `.`, `:`, spaces.
fn tokenize(rest: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut brace_depth: i32 = 0;
    let mut chars = rest.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                brace_depth += 1;
                current.push(c);
            }
            '}' => {
                brace_depth -= 1;
                current.push(c);
            }
            '.' if brace_depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '[' if brace_depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                let mut idx = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    idx.push(c);
                }
                tokens.push(idx);
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_segment(token: String) -> Segment {
    if token == "*" {
        return Segment::Wildcard;
    }
    if let Ok(idx) = token.parse::<usize>() {
        return Segment::Index(idx);
    }
    if token.starts_with('{') && token.ends_with('}') {
        if let Some((field, value)) = parse_field_filter(&token[1..token.len() - 1]) {
            return Segment::FieldFilter { field, value };
        }
    }
    Segment::Field(token)
}

fn parse_field_filter(body: &str) -> Option<(String, Value)> {
    let (field, value) = body.split_once(':')?;
    let field = field.trim().to_string();
    let value = value.trim();
    let parsed = if let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Value::String(inner.to_string())
    } else if let Ok(n) = value.parse::<f64>() {
        serde_json::json!(n)
    } else if value == "true" || value == "false" {
        Value::Bool(value == "true")
    } else {
        Value::String(value.to_string())
    };
    Some((field, parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx_with_input(input: Value) -> ExpressionContext {
        ExpressionContext::builder().input(input).build()
    }

    #[test]
    fn simple_field_access() {
        let ctx = ctx_with_input(json!({"user_id": "u1"}));
        let path = Path::parse("$input.user_id").unwrap();
        assert_eq!(path.evaluate(&ctx), json!("u1"));
    }

    #[test]
    fn bracket_index_access() {
        let ctx = ctx_with_input(json!({"users": [{"name": "Ann"}, {"name": "Bo"}]}));
        let path = Path::parse("$input.users[0].name").unwrap();
        assert_eq!(path.evaluate(&ctx), json!("Ann"));
    }

    #[test]
    fn dotted_index_access() {
        let ctx = ctx_with_input(json!({"users": ["a", "b", "c"]}));
        let path = Path::parse("$input.users.1").unwrap();
        assert_eq!(path.evaluate(&ctx), json!("b"));
    }

    #[test]
    fn wildcard_returns_sequence() {
        let ctx = ctx_with_input(json!({"users": [{"name": "Ann"}, {"name": "Bo"}]}));
        let path = Path::parse("$input.users.*.name").unwrap();
        assert_eq!(path.evaluate(&ctx), json!(["Ann", "Bo"]));
    }

    #[test]
    fn field_filter_selects_matching_elements() {
        let ctx = ctx_with_input(json!({
            "users": [
                {"name": "Ann", "role": "admin"},
                {"name": "Bo", "role": "member"},
            ]
        }));
        let path = Path::parse(r#"$input.users.{role: "admin"}"#).unwrap();
        assert_eq!(path.evaluate(&ctx), json!([{"name": "Ann", "role": "admin"}]));
    }

    #[test]
    fn missing_path_resolves_to_null() {
        let ctx = ctx_with_input(json!({}));
        let path = Path::parse("$input.nope.deep").unwrap();
        assert_eq!(path.evaluate(&ctx), Value::Null);
    }

    #[test]
    fn non_dollar_text_is_not_a_path() {
        assert!(Path::parse("plain text").is_none());
    }

    #[test]
    fn bare_namespace_returns_whole_object() {
        let ctx = ctx_with_input(json!({"a": 1}));
        let path = Path::parse("$input").unwrap();
        assert_eq!(path.evaluate(&ctx), json!({"a": 1}));
    }
}
