use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::validators::{check_unique, is_blank};

/// A cross-field rule failure, optionally pinned to the field it concerns.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleViolation {
    pub field: Option<String>,
    pub message: String,
}

impl RuleViolation {
    pub fn new(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}

pub type RuleFn = Arc<dyn Fn(&Map<String, Value>) -> Result<(), RuleViolation> + Send + Sync>;

pub type FilterFn = Arc<dyn Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync>;

/// Section- or form-level check spanning several fields.
///
/// Rules read the collected values of the active fields only; a hidden or
/// disabled field reads as absent.
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Exactly one of `fields` must be provided. Zero counts as not provided.
    ExactlyOneOf {
        fields: Vec<String>,
        #[serde(default)]
        message: Option<String>,
    },
    /// `field` must be an exact multiple of `divisor` when both are set.
    DivisibleBy {
        field: String,
        divisor: String,
        #[serde(default)]
        message: Option<String>,
    },
    /// Items of the array in `field` must not repeat.
    Unique { field: String },
    /// The array in `field` must have as many items as the array in `other`.
    LengthMatches { field: String, other: String },
    #[serde(skip)]
    Custom(RuleFn),
}

impl Rule {
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<(), RuleViolation> + Send + Sync + 'static,
    {
        Rule::Custom(Arc::new(check))
    }

    pub fn exactly_one_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::ExactlyOneOf {
            fields: fields.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    pub fn divisible_by(field: impl Into<String>, divisor: impl Into<String>) -> Self {
        Rule::DivisibleBy {
            field: field.into(),
            divisor: divisor.into(),
            message: None,
        }
    }

    pub fn evaluate(&self, values: &Map<String, Value>) -> Result<(), RuleViolation> {
        match self {
            Rule::ExactlyOneOf { fields, message } => {
                let provided = fields
                    .iter()
                    .filter(|name| values.get(name.as_str()).is_some_and(is_provided))
                    .collect::<Vec<_>>();
                match provided.len() {
                    1 => Ok(()),
                    0 => Err(RuleViolation::new(
                        fields.first().map(String::as_str),
                        message
                            .clone()
                            .unwrap_or_else(|| format!("You must provide one of {}", fields.join(" or "))),
                    )),
                    _ => Err(RuleViolation::new(
                        provided.get(1).map(|name| name.as_str()),
                        message.clone().unwrap_or_else(|| {
                            format!("You can provide only one of {}", fields.join(" or "))
                        }),
                    )),
                }
            }
            Rule::DivisibleBy {
                field,
                divisor,
                message,
            } => {
                let Some(dividend) = values.get(field).and_then(Value::as_f64) else {
                    return Ok(());
                };
                let Some(by) = values.get(divisor).and_then(Value::as_f64) else {
                    return Ok(());
                };
                if dividend == 0.0 || by == 0.0 || (dividend % by).abs() < f64::EPSILON {
                    return Ok(());
                }
                Err(RuleViolation::new(
                    Some(field),
                    message.clone().unwrap_or_else(|| {
                        format!(
                            "The value of '{field}' ({dividend}) must be exactly divisible by '{divisor}' ({by})"
                        )
                    }),
                ))
            }
            Rule::Unique { field } => match values.get(field) {
                Some(value) => check_unique(field, value)
                    .map_err(|message| RuleViolation::new(Some(field), message)),
                None => Ok(()),
            },
            Rule::LengthMatches { field, other } => {
                let left = values.get(field).and_then(Value::as_array).map(Vec::len);
                let right = values.get(other).and_then(Value::as_array).map(Vec::len);
                match (left, right) {
                    (Some(left), Some(right)) if left != right => Err(RuleViolation::new(
                        Some(field),
                        format!(
                            "The number of values in '{field}' ({left}) must match the number of values in '{other}' ({right})"
                        ),
                    )),
                    _ => Ok(()),
                }
            }
            Rule::Custom(check) => check(values),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::ExactlyOneOf { fields, .. } => {
                f.debug_struct("ExactlyOneOf").field("fields", fields).finish()
            }
            Rule::DivisibleBy { field, divisor, .. } => f
                .debug_struct("DivisibleBy")
                .field("field", field)
                .field("divisor", divisor)
                .finish(),
            Rule::Unique { field } => f.debug_struct("Unique").field("field", field).finish(),
            Rule::LengthMatches { field, other } => f
                .debug_struct("LengthMatches")
                .field("field", field)
                .field("other", other)
                .finish(),
            Rule::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

fn is_provided(value: &Value) -> bool {
    match value {
        Value::Number(num) => num.as_f64().is_some_and(|n| n != 0.0),
        other => !is_blank(other),
    }
}

/// Section transform from UI-shaped values to the persisted shape.
///
/// Filters run after validation succeeded and before default suppression.
/// Key order is kept: a replaced key is emitted where the original was.
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Splits `[[x, y], ...]` in `field` into two arrays under `x` and `y`.
    SplitPoints { field: String, x: String, y: String },
    Drop { fields: Vec<String> },
    Rename { from: String, to: String },
    /// Moves `fields` into a nested object stored under `into`.
    Nest { fields: Vec<String>, into: String },
    #[serde(skip)]
    Custom(FilterFn),
}

impl Filter {
    pub fn custom<F>(transform: F) -> Self
    where
        F: Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync + 'static,
    {
        Filter::Custom(Arc::new(transform))
    }

    pub fn split_points(
        field: impl Into<String>,
        x: impl Into<String>,
        y: impl Into<String>,
    ) -> Self {
        Filter::SplitPoints {
            field: field.into(),
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn apply(&self, values: Map<String, Value>) -> Map<String, Value> {
        match self {
            Filter::SplitPoints { field, x, y } => {
                let mut out = Map::with_capacity(values.len() + 1);
                for (key, value) in values {
                    if &key != field {
                        out.insert(key, value);
                        continue;
                    }
                    let Value::Array(points) = value else {
                        continue;
                    };
                    let mut xs = Vec::with_capacity(points.len());
                    let mut ys = Vec::with_capacity(points.len());
                    for point in points {
                        if let Value::Array(pair) = point
                            && pair.len() == 2
                        {
                            xs.push(pair[0].clone());
                            ys.push(pair[1].clone());
                        }
                    }
                    out.insert(x.clone(), Value::Array(xs));
                    out.insert(y.clone(), Value::Array(ys));
                }
                out
            }
            Filter::Drop { fields } => values
                .into_iter()
                .filter(|(key, _)| !fields.contains(key))
                .collect(),
            Filter::Rename { from, to } => values
                .into_iter()
                .map(|(key, value)| if &key == from { (to.clone(), value) } else { (key, value) })
                .collect(),
            Filter::Nest { fields, into } => {
                let mut nested = Map::new();
                let mut out = Map::with_capacity(values.len());
                let mut placed = false;
                for (key, value) in values {
                    if fields.contains(&key) {
                        nested.insert(key, value);
                        if !placed {
                            out.insert(into.clone(), Value::Null);
                            placed = true;
                        }
                    } else {
                        out.insert(key, value);
                    }
                }
                if placed {
                    out.insert(into.clone(), Value::Object(nested));
                }
                out
            }
            Filter::Custom(transform) => transform(values),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::SplitPoints { field, x, y } => f
                .debug_struct("SplitPoints")
                .field("field", field)
                .field("x", x)
                .field("y", y)
                .finish(),
            Filter::Drop { fields } => f.debug_struct("Drop").field("fields", fields).finish(),
            Filter::Rename { from, to } => f
                .debug_struct("Rename")
                .field("from", from)
                .field("to", to)
                .finish(),
            Filter::Nest { fields, into } => f
                .debug_struct("Nest")
                .field("fields", fields)
                .field("into", into)
                .finish(),
            Filter::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}
