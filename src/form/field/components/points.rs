use serde_json::{Number, Value};

use crate::domain::{FieldSpec, ValidationResult};
use crate::form::field::convert::parse_number;

use super::{ComponentKind, FieldComponent};

/// Composite x/y table edited as one widget.
///
/// Accepts either a list of `[x, y]` pairs or an object holding two parallel
/// arrays under the field's `value_keys` (defaults `x` and `y`). The output is
/// always the list of pairs; a split filter turns it back into two keys.
#[derive(Debug, Clone, Default)]
pub struct PointsComponent {
    points: Vec<(Number, Number)>,
}

impl PointsComponent {
    pub fn new(spec: &FieldSpec) -> Self {
        let mut component = Self::default();
        if let Some(default) = &spec.default {
            let _ = component.load(spec, default);
        }
        component
    }

    fn axis_keys(spec: &FieldSpec) -> (String, String) {
        match spec.value_keys.as_slice() {
            [x, y, ..] => (x.clone(), y.clone()),
            _ => ("x".to_string(), "y".to_string()),
        }
    }

    fn load(&mut self, spec: &FieldSpec, raw: &Value) -> Result<Vec<String>, String> {
        let mut notes = Vec::new();
        let points = match raw {
            Value::Array(pairs) => {
                let mut points = Vec::with_capacity(pairs.len());
                let mut dropped = 0usize;
                for pair in pairs {
                    match as_pair(pair) {
                        Some(point) => points.push(point),
                        None => dropped += 1,
                    }
                }
                if dropped > 0 {
                    notes.push(format!("{dropped} invalid point(s) were removed"));
                }
                points
            }
            Value::Object(map) => {
                let (x_key, y_key) = Self::axis_keys(spec);
                let xs = map.get(&x_key).and_then(Value::as_array);
                let ys = map.get(&y_key).and_then(Value::as_array);
                match (xs, ys) {
                    (Some(xs), Some(ys)) => {
                        if xs.len() != ys.len() {
                            notes.push(format!(
                                "'{x_key}' and '{y_key}' have different lengths, extra values were removed"
                            ));
                        }
                        xs.iter()
                            .zip(ys)
                            .filter_map(|(x, y)| Some((as_number(x)?, as_number(y)?)))
                            .collect()
                    }
                    (None, None) => Vec::new(),
                    _ => return Err(format!("both '{x_key}' and '{y_key}' must be provided")),
                }
            }
            Value::Null => Vec::new(),
            _ => return Err("the value must be a list of [x, y] pairs".to_string()),
        };
        self.points = points;
        Ok(notes)
    }
}

impl FieldComponent for PointsComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Points
    }

    fn sanitise(&mut self, spec: &FieldSpec, raw: &Value) -> Option<String> {
        if raw.is_null() {
            self.reset(spec);
            return None;
        }
        let label = spec.display_label();
        match self.load(spec, raw) {
            Ok(notes) if notes.is_empty() => None,
            Ok(notes) => Some(format!("In '{label}': {}", notes.join("; "))),
            Err(reason) => {
                self.reset(spec);
                Some(format!("In '{label}': {reason}, the default was restored"))
            }
        }
    }

    fn current_value(&self, _spec: &FieldSpec) -> Value {
        if self.points.is_empty() {
            return Value::Null;
        }
        Value::Array(
            self.points
                .iter()
                .map(|(x, y)| Value::Array(vec![Value::Number(x.clone()), Value::Number(y.clone())]))
                .collect(),
        )
    }

    fn reset(&mut self, spec: &FieldSpec) {
        *self = Self::new(spec);
    }

    fn display_value(&self, _spec: &FieldSpec) -> String {
        format!("{} point(s)", self.points.len())
    }

    fn check(&self, spec: &FieldSpec) -> ValidationResult {
        let label = spec.display_label();
        if let Some(min) = spec.constraints.min_items
            && self.points.len() < min
        {
            return Err(format!(
                "The field '{label}' must contain at least {min} point(s)"
            ));
        }
        let increasing = spec
            .constraints
            .extra
            .get("increasing_x")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if increasing {
            let xs = self
                .points
                .iter()
                .filter_map(|(x, _)| x.as_f64())
                .collect::<Vec<_>>();
            if xs.windows(2).any(|pair| pair[1] <= pair[0]) {
                return Err(format!(
                    "The x values of '{label}' must be strictly increasing"
                ));
            }
        }
        Ok(())
    }
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(num) => Some(num.clone()),
        Value::String(text) => parse_number(text),
        _ => None,
    }
}

fn as_pair(value: &Value) -> Option<(Number, Number)> {
    match value.as_array()?.as_slice() {
        [x, y] => Some((as_number(x)?, as_number(y)?)),
        _ => None,
    }
}
