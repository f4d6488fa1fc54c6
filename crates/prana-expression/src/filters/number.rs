//! Number filters: `round`, `format_currency`.

use prana_error::EngineError;
use serde_json::Value;

use super::{argument_error, number_arg, string_arg};

/// `round(precision?=0)`.
pub fn round(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let num = value
        .as_f64()
        .ok_or_else(|| argument_error("round", "value must be a number"))?;
    let precision = number_arg("round", args, 0, Some(0.0))? as i32;
    let multiplier = 10f64.powi(precision);
    Ok(serde_json::json!((num * multiplier).round() / multiplier))
}

/// `format_currency(code?="USD")`. Always prints exactly two fractional
/// digits.
pub fn format_currency(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let num = value
        .as_f64()
        .ok_or_else(|| argument_error("format_currency", "value must be a number"))?;
    let code = string_arg("format_currency", args, 0, Some("USD"))?;
    let symbol = match code.as_str() {
        "USD" => "$",
        "EUR" => "\u{20ac}",
        "GBP" => "\u{a3}",
        other => return Err(argument_error("format_currency", format!("unsupported currency code '{other}'"))),
    };
    Ok(Value::String(format!("{symbol}{num:.2}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_defaults_to_nearest_integer() {
        assert_eq!(round(&json!(3.6), &[]).unwrap(), json!(4.0));
    }

    #[test]
    fn round_honors_precision() {
        assert_eq!(round(&json!(3.14159), &[json!(2)]).unwrap(), json!(3.14));
    }

    #[test]
    fn format_currency_always_two_decimals() {
        assert_eq!(format_currency(&json!(5), &[]).unwrap(), json!("$5.00"));
        assert_eq!(format_currency(&json!(5.1), &[json!("EUR")]).unwrap(), json!("\u{20ac}5.10"));
    }

    #[test]
    fn format_currency_rejects_unknown_code() {
        assert!(format_currency(&json!(5), &[json!("XYZ")]).is_err());
    }
}
