//! The filter taxonomy: string, number, math, and collection filters piped
//! over a value with `{{ value | filter(args) }}`.

pub(crate) mod collection;
mod math;
mod number;
mod string;

use prana_error::{EngineError, ErrorKind};
use serde_json::Value;

/// Signature every filter implements: the piped-in value, literal
/// arguments, and a result (typed `filter_argument_error` /
/// `filter_domain_error` on failure).
pub type FilterFn = fn(&Value, &[Value]) -> Result<Value, EngineError>;

/// Look up a filter by name. Returns `None` for unknown filters so the
/// template renderer can pass the literal region through unchanged.
#[must_use]
pub fn lookup(name: &str) -> Option<FilterFn> {
    match name {
        "upper_case" => Some(string::upper_case),
        "lower_case" => Some(string::lower_case),
        "capitalize" => Some(string::capitalize),
        "truncate" => Some(string::truncate),
        "default" => Some(string::default_filter),
        "round" => Some(number::round),
        "format_currency" => Some(number::format_currency),
        "abs" => Some(math::abs),
        "ceil" => Some(math::ceil),
        "floor" => Some(math::floor),
        "max" => Some(math::max),
        "min" => Some(math::min),
        "power" => Some(math::power),
        "sqrt" => Some(math::sqrt),
        "mod" => Some(math::modulo),
        "clamp" => Some(math::clamp),
        "length" => Some(collection::length),
        "first" => Some(collection::first),
        "last" => Some(collection::last),
        "join" => Some(collection::join),
        "keys" => Some(collection::keys),
        "values" => Some(collection::values),
        "sort" => Some(collection::sort),
        "reverse" => Some(collection::reverse),
        "uniq" => Some(collection::uniq),
        "slice" => Some(collection::slice),
        "contains" => Some(collection::contains),
        "compact" => Some(collection::compact),
        "flatten" => Some(collection::flatten),
        "sum" => Some(collection::sum),
        "group_by" => Some(collection::group_by),
        "map" => Some(collection::map_field),
        "filter" => Some(collection::filter_field),
        "reject" => Some(collection::reject_field),
        "dump" => Some(collection::dump),
        _ => None,
    }
}

fn argument_error(filter: &str, message: impl Into<String>) -> EngineError {
    EngineError::new(ErrorKind::FilterArgumentError, message.into()).with_detail("filter", filter)
}

fn domain_error(filter: &str, message: impl Into<String>) -> EngineError {
    EngineError::new(ErrorKind::FilterDomainError, message.into()).with_detail("filter", filter)
}

fn number_arg(filter: &str, args: &[Value], index: usize, default: Option<f64>) -> Result<f64, EngineError> {
    match args.get(index) {
        Some(v) => v
            .as_f64()
            .ok_or_else(|| argument_error(filter, format!("argument {index} must be a number"))),
        None => default.ok_or_else(|| argument_error(filter, format!("missing argument {index}"))),
    }
}

fn string_arg(filter: &str, args: &[Value], index: usize, default: Option<&str>) -> Result<String, EngineError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(argument_error(filter, format!("argument {index} must be a string"))),
        None => default
            .map(str::to_string)
            .ok_or_else(|| argument_error(filter, format!("missing argument {index}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_filter_returns_none() {
        assert!(lookup("does_not_exist").is_none());
    }

    #[test]
    fn known_filters_resolve() {
        assert!(lookup("upper_case").is_some());
        assert!(lookup("clamp").is_some());
        assert!(lookup("group_by").is_some());
    }
}
