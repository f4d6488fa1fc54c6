//! Template rendering: text containing `{{ expr | filter | ... }}`
//! regions rendered against an [`ExpressionContext`].

use prana_error::EngineError;
use serde_json::Value;

use crate::context::ExpressionContext;
use crate::eval::{self, PipelineOutcome};
use crate::filters::collection::to_display_string;

/// Caps the number of expression regions in one template, mirroring the
/// DoS guard every template engine in this space carries.
const MAX_TEMPLATE_EXPRESSIONS: usize = 1000;

#[derive(Debug, PartialEq)]
enum Part {
    Literal(String),
    /// `(expr, original_region)` — `original_region` includes the `{{`/`}}`
    /// delimiters, used verbatim when a filter in the pipeline is unknown.
    Expression(String, String),
}

/// A parsed template, ready to render repeatedly against different
/// contexts.
#[derive(Debug)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Parse `source`. Never fails — an unterminated `{{` is treated as
    /// literal text, matching the "never raises on malformed input" goal
    /// for rendering (malformed *expressions* still error at render time).
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut rest = source;
        let mut count = 0;

        while let Some(start) = rest.find("{{") {
            if !rest[..start].is_empty() {
                parts.push(Part::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + 2..];
            match after_open.find("}}") {
                Some(end) if count < MAX_TEMPLATE_EXPRESSIONS => {
                    let expr = after_open[..end].trim().to_string();
                    let original = format!("{{{{{}}}}}", &after_open[..end]);
                    parts.push(Part::Expression(expr, original));
                    rest = &after_open[end + 2..];
                    count += 1;
                }
                _ => {
                    // Unterminated, or we've hit the expression cap: treat
                    // the rest of the source as literal text.
                    parts.push(Part::Literal(rest[start..].to_string()));
                    rest = "";
                    break;
                }
            }
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }
        Self { parts }
    }

    /// Whether this template is exactly one expression region with no
    /// surrounding literal text — such templates render to their
    /// expression's native value rather than a string.
    fn single_expression(&self) -> Option<(&str, &str)> {
        match self.parts.as_slice() {
            [Part::Expression(expr, original)] => Some((expr, original)),
            _ => None,
        }
    }

    /// Render against `ctx`. A single bare expression region yields its
    /// native JSON value; otherwise the result is a string with each
    /// region's value coerced via default string conversion.
    pub fn render(&self, ctx: &ExpressionContext) -> Result<Value, EngineError> {
        if let Some((expr, original)) = self.single_expression() {
            return match eval::evaluate(expr, ctx)? {
                PipelineOutcome::Value(v) => Ok(v),
                PipelineOutcome::UnknownFilter => Ok(Value::String(original.to_string())),
            };
        }

        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Expression(expr, original) => match eval::evaluate(expr, ctx)? {
                    PipelineOutcome::Value(v) => out.push_str(&to_display_string(&v)),
                    PipelineOutcome::UnknownFilter => out.push_str(original),
                },
            }
        }
        Ok(Value::String(out))
    }
}

/// Render every string value inside `params` (recursing into nested
/// objects and arrays) through [`Template`].
pub fn render_params(params: &Value, ctx: &ExpressionContext) -> Result<Value, EngineError> {
    match params {
        Value::String(s) => Template::parse(s).render(ctx),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), render_params(v, ctx)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(render_params(item, ctx)?);
            }
            Ok(Value::Array(out))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_text_passes_through() {
        let template = Template::parse("hello world");
        let ctx = ExpressionContext::builder().build();
        assert_eq!(template.render(&ctx).unwrap(), json!("hello world"));
    }

    #[test]
    fn single_expression_yields_native_value() {
        let ctx = ExpressionContext::builder().input(json!({"age": 25})).build();
        let template = Template::parse("{{ $input.age }}");
        assert_eq!(template.render(&ctx).unwrap(), json!(25));
    }

    #[test]
    fn mixed_content_yields_string() {
        let ctx = ExpressionContext::builder().input(json!({"name": "Jo"})).build();
        let template = Template::parse("Hello, {{ $input.name }}!");
        assert_eq!(template.render(&ctx).unwrap(), json!("Hello, Jo!"));
    }

    #[test]
    fn multiple_expressions_concatenate_as_strings() {
        let ctx = ExpressionContext::builder().input(json!({"a": 1, "b": 2})).build();
        let template = Template::parse("{{ $input.a }}-{{ $input.b }}");
        assert_eq!(template.render(&ctx).unwrap(), json!("1-2"));
    }

    #[test]
    fn missing_path_in_mixed_template_renders_empty_string() {
        let ctx = ExpressionContext::builder().build();
        let template = Template::parse("value=[{{ $input.missing }}]");
        assert_eq!(template.render(&ctx).unwrap(), json!("value=[]"));
    }

    #[test]
    fn missing_path_in_single_expression_template_renders_null() {
        let ctx = ExpressionContext::builder().build();
        let template = Template::parse("{{ $input.missing }}");
        assert_eq!(template.render(&ctx).unwrap(), Value::Null);
    }

    #[test]
    fn unknown_filter_passes_original_region_through() {
        let ctx = ExpressionContext::builder().input(json!({"a": 1})).build();
        let template = Template::parse("{{ $input.a | not_real }}");
        assert_eq!(template.render(&ctx).unwrap(), json!("{{ $input.a | not_real }}"));
    }

    #[test]
    fn unterminated_expression_is_treated_as_literal() {
        let template = Template::parse("broken {{ $input.a");
        let ctx = ExpressionContext::builder().build();
        assert_eq!(template.render(&ctx).unwrap(), json!("broken {{ $input.a"));
    }

    #[test]
    fn render_params_recurses_into_nested_maps_and_arrays() {
        let ctx = ExpressionContext::builder().input(json!({"user_id": "u1", "age": 25})).build();
        let params = json!({
            "data": {"user_id": "{{ $input.user_id }}", "age": "{{ $input.age }}"},
            "tags": ["{{ $input.user_id }}"],
        });
        let rendered = render_params(&params, &ctx).unwrap();
        assert_eq!(rendered, json!({"data": {"user_id": "u1", "age": 25}, "tags": ["u1"]}));
    }
}
