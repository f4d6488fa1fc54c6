//! Math filters: `abs`, `ceil`, `floor`, `max`, `min`, `power`, `sqrt`,
//! `mod`, `clamp`.

use prana_error::EngineError;
use serde_json::Value;

use super::{argument_error, domain_error, number_arg};

fn this(value: &Value, name: &str) -> Result<f64, EngineError> {
    value.as_f64().ok_or_else(|| argument_error(name, "value must be a number"))
}

pub fn abs(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    Ok(serde_json::json!(this(value, "abs")?.abs()))
}

pub fn ceil(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    Ok(serde_json::json!(this(value, "ceil")?.ceil()))
}

pub fn floor(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    Ok(serde_json::json!(this(value, "floor")?.floor()))
}

pub fn max(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let base = this(value, "max")?;
    let other = number_arg("max", args, 0, None)?;
    Ok(serde_json::json!(base.max(other)))
}

pub fn min(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let base = this(value, "min")?;
    let other = number_arg("min", args, 0, None)?;
    Ok(serde_json::json!(base.min(other)))
}

/// `power(n)`.
pub fn power(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let base = this(value, "power")?;
    let exp = number_arg("power", args, 0, None)?;
    Ok(serde_json::json!(base.powf(exp)))
}

/// `sqrt` — domain error on negative input.
pub fn sqrt(value: &Value, _args: &[Value]) -> Result<Value, EngineError> {
    let num = this(value, "sqrt")?;
    if num < 0.0 {
        return Err(domain_error("sqrt", "cannot take square root of a negative number"));
    }
    Ok(serde_json::json!(num.sqrt()))
}

/// `mod(n)` — domain error when `n == 0`.
pub fn modulo(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let num = this(value, "mod")?;
    let divisor = number_arg("mod", args, 0, None)?;
    if divisor == 0.0 {
        return Err(domain_error("mod", "division by zero"));
    }
    Ok(serde_json::json!(num % divisor))
}

/// `clamp(min, max)` — argument error when `min > max`.
pub fn clamp(value: &Value, args: &[Value]) -> Result<Value, EngineError> {
    let num = this(value, "clamp")?;
    let min = number_arg("clamp", args, 0, None)?;
    let max = number_arg("clamp", args, 1, None)?;
    if min > max {
        return Err(argument_error("clamp", "min must not be greater than max"));
    }
    Ok(serde_json::json!(num.clamp(min, max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn abs_ceil_floor() {
        assert_eq!(abs(&json!(-4.5), &[]).unwrap(), json!(4.5));
        assert_eq!(ceil(&json!(1.1), &[]).unwrap(), json!(2.0));
        assert_eq!(floor(&json!(1.9), &[]).unwrap(), json!(1.0));
    }

    #[test]
    fn min_max_against_argument() {
        assert_eq!(max(&json!(3), &[json!(7)]).unwrap(), json!(7.0));
        assert_eq!(min(&json!(3), &[json!(7)]).unwrap(), json!(3.0));
    }

    #[test]
    fn power_and_sqrt() {
        assert_eq!(power(&json!(2), &[json!(10)]).unwrap(), json!(1024.0));
        assert_eq!(sqrt(&json!(16), &[]).unwrap(), json!(4.0));
    }

    #[test]
    fn sqrt_of_negative_is_domain_error() {
        let err = sqrt(&json!(-1), &[]).unwrap_err();
        assert_eq!(err.kind().as_str(), "filter_domain_error");
    }

    #[test]
    fn mod_by_zero_is_domain_error() {
        let err = modulo(&json!(10), &[json!(0)]).unwrap_err();
        assert_eq!(err.kind().as_str(), "filter_domain_error");
    }

    #[test]
    fn mod_computes_remainder() {
        assert_eq!(modulo(&json!(10), &[json!(3)]).unwrap(), json!(1.0));
    }

    #[test]
    fn clamp_bounds_the_value() {
        assert_eq!(clamp(&json!(15), &[json!(0), json!(10)]).unwrap(), json!(10.0));
        assert_eq!(clamp(&json!(-5), &[json!(0), json!(10)]).unwrap(), json!(0.0));
    }

    #[test]
    fn clamp_with_min_greater_than_max_is_argument_error() {
        let err = clamp(&json!(5), &[json!(10), json!(0)]).unwrap_err();
        assert_eq!(err.kind().as_str(), "filter_argument_error");
    }
}
