use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Outcome of a single validator: `Err` carries the user-facing message.
pub type ValidationResult = Result<(), String>;

/// Signature of a host-supplied validator: `(name, label, value)`.
pub type ValidatorFn = Arc<dyn Fn(&str, &str, &Value) -> ValidationResult + Send + Sync>;

/// Pure per-field check. Validators never mutate the value they inspect.
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Validator {
    /// Rejects `null`, empty strings and empty collections.
    Required,
    Range {
        #[serde(default)]
        minimum: Option<f64>,
        #[serde(default)]
        maximum: Option<f64>,
    },
    /// Matches string values (and every string item of an array).
    Pattern { pattern: String },
    /// Bounds the length of strings and arrays.
    Length {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
    UniqueItems,
    /// Checks the value against an inline JSON Schema.
    Schema { schema: Value },
    #[serde(skip)]
    Custom(ValidatorFn),
}

impl Validator {
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&str, &str, &Value) -> ValidationResult + Send + Sync + 'static,
    {
        Validator::Custom(Arc::new(check))
    }

    pub fn range(minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Validator::Range { minimum, maximum }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Validator::Pattern {
            pattern: pattern.into(),
        }
    }

    pub fn check(&self, name: &str, label: &str, value: &Value) -> ValidationResult {
        match self {
            Validator::Required => {
                if is_blank(value) {
                    Err(format!("The field '{label}' is required"))
                } else {
                    Ok(())
                }
            }
            Validator::Range { minimum, maximum } => check_range(label, value, *minimum, *maximum),
            Validator::Pattern { pattern } => check_pattern(label, value, pattern),
            Validator::Length { min, max } => check_length(label, value, *min, *max),
            Validator::UniqueItems => check_unique(label, value),
            Validator::Schema { schema } => check_schema(label, value, schema),
            Validator::Custom(check) => check(name, label, value),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Required => write!(f, "Required"),
            Validator::Range { minimum, maximum } => f
                .debug_struct("Range")
                .field("minimum", minimum)
                .field("maximum", maximum)
                .finish(),
            Validator::Pattern { pattern } => {
                f.debug_struct("Pattern").field("pattern", pattern).finish()
            }
            Validator::Length { min, max } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .finish(),
            Validator::UniqueItems => write!(f, "UniqueItems"),
            Validator::Schema { schema } => f.debug_struct("Schema").field("schema", schema).finish(),
            Validator::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// `null`, empty strings, empty arrays and empty objects count as blank.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

pub(crate) fn check_range(
    label: &str,
    value: &Value,
    minimum: Option<f64>,
    maximum: Option<f64>,
) -> ValidationResult {
    let numbers: Vec<f64> = match value {
        Value::Number(num) => num.as_f64().into_iter().collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_f64).collect(),
        _ => return Ok(()),
    };
    for number in numbers {
        if let Some(min) = minimum
            && number < min
        {
            return Err(format!(
                "The value {number} of '{label}' must be greater than or equal to {min}"
            ));
        }
        if let Some(max) = maximum
            && number > max
        {
            return Err(format!(
                "The value {number} of '{label}' must be smaller than or equal to {max}"
            ));
        }
    }
    Ok(())
}

fn check_pattern(label: &str, value: &Value, pattern: &str) -> ValidationResult {
    let regex = Regex::new(pattern)
        .map_err(|err| format!("The pattern configured for '{label}' is invalid: {err}"))?;
    let texts: Vec<&str> = match value {
        Value::String(text) => vec![text.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => return Ok(()),
    };
    match texts.into_iter().find(|text| !regex.is_match(text)) {
        Some(text) => Err(format!("'{text}' is not a valid value for '{label}'")),
        None => Ok(()),
    }
}

fn check_length(
    label: &str,
    value: &Value,
    min: Option<usize>,
    max: Option<usize>,
) -> ValidationResult {
    let len = match value {
        Value::String(text) => text.chars().count(),
        Value::Array(items) => items.len(),
        _ => return Ok(()),
    };
    if let Some(min) = min
        && len < min
    {
        return Err(format!(
            "The field '{label}' must contain at least {min} item(s), {len} given"
        ));
    }
    if let Some(max) = max
        && len > max
    {
        return Err(format!(
            "The field '{label}' must contain at most {max} item(s), {len} given"
        ));
    }
    Ok(())
}

pub(crate) fn check_unique(label: &str, value: &Value) -> ValidationResult {
    let Value::Array(items) = value else {
        return Ok(());
    };
    for (index, item) in items.iter().enumerate() {
        if items[..index].contains(item) {
            return Err(format!(
                "The values in '{label}' must be unique, {item} is repeated"
            ));
        }
    }
    Ok(())
}

fn check_schema(label: &str, value: &Value, schema: &Value) -> ValidationResult {
    let validator = jsonschema::validator_for(schema)
        .map_err(|err| format!("The schema configured for '{label}' is invalid: {err}"))?;
    match validator.iter_errors(value).next() {
        Some(error) => Err(format!("The field '{label}' is not valid: {error}")),
        None => Ok(()),
    }
}
