use serde_json::{Number, Value};

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(num) => num.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) => array_to_string(items),
        other => other.to_string(),
    }
}

pub(crate) fn array_to_string(items: &[Value]) -> String {
    items
        .iter()
        .map(value_to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Short name of a JSON type for warning messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dictionary",
    }
}

/// Parses integers first so that `"3"` stays an integer number.
pub(crate) fn parse_number(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Integer view of a number, accepting floats without a fractional part.
pub(crate) fn as_integer(number: &Number) -> Option<Number> {
    if number.is_i64() || number.is_u64() {
        return Some(number.clone());
    }
    let float = number.as_f64()?;
    if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        Some(Number::from(float as i64))
    } else {
        None
    }
}

/// Structural equality that treats `1` and `1.0` as the same number.
pub(crate) fn same_value(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_value(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| same_value(value, other)))
        }
        _ => left == right,
    }
}

/// Strings from a raw value: a single string, or the string items of a list.
/// Non-string scalars are stringified; the flag reports whether any was.
pub(crate) fn string_items(value: &Value) -> (Vec<String>, bool) {
    match value {
        Value::String(text) => (vec![text.clone()], false),
        Value::Number(_) | Value::Bool(_) => (vec![value_to_string(value)], true),
        Value::Array(items) => {
            let mut converted = false;
            let strings = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.clone()),
                    Value::Number(_) | Value::Bool(_) => {
                        converted = true;
                        Some(value_to_string(item))
                    }
                    _ => {
                        converted = true;
                        None
                    }
                })
                .collect();
            (strings, converted)
        }
        _ => (Vec::new(), true),
    }
}

pub(crate) fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
