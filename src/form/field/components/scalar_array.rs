use serde_json::Value;

use crate::domain::{FieldSpec, ValidationResult, check_range, check_unique};
use crate::form::field::convert::{parse_number, type_name, value_to_string};

use super::{ComponentKind, FieldComponent};

/// Lists of numbers or strings. Comma separated text is the editing form
/// and is accepted as input without a warning.
#[derive(Debug, Clone)]
pub struct ScalarArrayComponent {
    items: Vec<Value>,
    numeric: bool,
}

impl ScalarArrayComponent {
    pub fn numbers(spec: &FieldSpec) -> Self {
        Self::with_mode(spec, true)
    }

    pub fn strings(spec: &FieldSpec) -> Self {
        Self::with_mode(spec, false)
    }

    fn with_mode(spec: &FieldSpec, numeric: bool) -> Self {
        let mut component = Self {
            items: Vec::new(),
            numeric,
        };
        if let Some(Value::Array(items)) = &spec.default {
            let (items, _) = component.coerce_items(items);
            component.items = items;
        }
        component
    }

    /// Coerces every item, returning the kept items and the rejected ones.
    fn coerce_items(&self, items: &[Value]) -> (Vec<Value>, Vec<String>) {
        let mut kept = Vec::with_capacity(items.len());
        let mut rejected = Vec::new();
        for item in items {
            match self.coerce_item(item) {
                Some(value) => kept.push(value),
                None => rejected.push(value_to_string(item)),
            }
        }
        (kept, rejected)
    }

    fn coerce_item(&self, item: &Value) -> Option<Value> {
        match (self.numeric, item) {
            (true, Value::Number(_)) => Some(item.clone()),
            (true, Value::String(text)) => parse_number(text).map(Value::Number),
            (false, Value::String(text)) => Some(Value::String(text.trim().to_string())),
            (false, Value::Number(_) | Value::Bool(_)) => Some(Value::String(value_to_string(item))),
            _ => None,
        }
    }
}

impl FieldComponent for ScalarArrayComponent {
    fn kind(&self) -> ComponentKind {
        if self.numeric {
            ComponentKind::NumberList
        } else {
            ComponentKind::TextList
        }
    }

    fn sanitise(&mut self, spec: &FieldSpec, raw: &Value) -> Option<String> {
        let label = spec.display_label();
        match raw {
            Value::Null => {
                self.reset(spec);
                None
            }
            Value::String(text) => {
                let parts = text
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| Value::String(part.to_string()))
                    .collect::<Vec<_>>();
                let (items, rejected) = self.coerce_items(&parts);
                self.items = items;
                rejected_warning(label, &rejected)
            }
            Value::Array(items) => {
                let (items, rejected) = self.coerce_items(items);
                self.items = items;
                rejected_warning(label, &rejected)
            }
            Value::Number(_) | Value::Bool(_) => match self.coerce_item(raw) {
                Some(item) => {
                    self.items = vec![item];
                    Some(format!("The single value of '{label}' was converted to a list"))
                }
                None => {
                    self.reset(spec);
                    Some(format!(
                        "A {} is not a valid value for '{label}', the default was restored",
                        type_name(raw)
                    ))
                }
            },
            Value::Object(_) => {
                self.reset(spec);
                Some(format!(
                    "A dictionary is not a valid value for '{label}', the default was restored"
                ))
            }
        }
    }

    fn current_value(&self, spec: &FieldSpec) -> Value {
        if self.items.is_empty() && spec.default.is_none() {
            Value::Null
        } else {
            Value::Array(self.items.clone())
        }
    }

    fn reset(&mut self, spec: &FieldSpec) {
        *self = Self::with_mode(spec, self.numeric);
    }

    fn check(&self, spec: &FieldSpec) -> ValidationResult {
        let label = spec.display_label();
        let constraints = &spec.constraints;
        let len = self.items.len();
        if let Some(min) = constraints.min_items
            && len < min
        {
            return Err(format!(
                "The field '{label}' must contain at least {min} value(s), {len} given"
            ));
        }
        if let Some(max) = constraints.max_items
            && len > max
        {
            return Err(format!(
                "The field '{label}' must contain at most {max} value(s), {len} given"
            ));
        }
        let value = Value::Array(self.items.clone());
        if constraints.unique {
            check_unique(label, &value)?;
        }
        check_range(label, &value, constraints.minimum, constraints.maximum)
    }
}

fn rejected_warning(label: &str, rejected: &[String]) -> Option<String> {
    if rejected.is_empty() {
        None
    } else {
        Some(format!(
            "The following values of '{label}' are not valid and were removed: {}",
            rejected.join(", ")
        ))
    }
}
