use serde_json::{Number, Value};

use crate::domain::{FieldSpec, ValidationResult, check_range};
use crate::form::field::convert::{as_integer, parse_number, type_name};

use super::{ComponentKind, FieldComponent};

/// Integer and float fields. Range constraints are reported at validation
/// time so that an out-of-range entry stays visible to the user.
#[derive(Debug, Clone)]
pub struct NumberComponent {
    value: Option<Number>,
    integer: bool,
}

impl NumberComponent {
    pub fn integer(spec: &FieldSpec) -> Self {
        Self::with_mode(spec, true)
    }

    pub fn float(spec: &FieldSpec) -> Self {
        Self::with_mode(spec, false)
    }

    fn with_mode(spec: &FieldSpec, integer: bool) -> Self {
        let value = match &spec.default {
            Some(Value::Number(num)) if integer => as_integer(num),
            Some(Value::Number(num)) => Some(num.clone()),
            _ => None,
        };
        Self { value, integer }
    }

    fn accept(&mut self, spec: &FieldSpec, number: Number) -> Option<String> {
        let label = spec.display_label();
        let number = if self.integer {
            match as_integer(&number) {
                Some(int) => int,
                None => {
                    self.reset(spec);
                    return Some(format!(
                        "'{label}' expects an integer but {number} was given, the default was restored"
                    ));
                }
            }
        } else {
            number
        };
        let outside = check_range(
            label,
            &Value::Number(number.clone()),
            spec.constraints.minimum,
            spec.constraints.maximum,
        )
        .err();
        self.value = Some(number);
        outside
    }
}

impl FieldComponent for NumberComponent {
    fn kind(&self) -> ComponentKind {
        if self.integer {
            ComponentKind::Integer
        } else {
            ComponentKind::Float
        }
    }

    fn sanitise(&mut self, spec: &FieldSpec, raw: &Value) -> Option<String> {
        match raw {
            Value::Null => {
                self.reset(spec);
                None
            }
            Value::String(text) if text.trim().is_empty() => {
                self.reset(spec);
                None
            }
            Value::Number(num) => self.accept(spec, num.clone()),
            Value::String(text) => match parse_number(text) {
                Some(number) => {
                    let label = spec.display_label();
                    let range = self.accept(spec, number);
                    range.or_else(|| {
                        Some(format!(
                            "The text '{text}' of '{label}' was converted to a number"
                        ))
                    })
                }
                None => {
                    self.reset(spec);
                    Some(format!(
                        "'{text}' is not a valid number for '{}', the default was restored",
                        spec.display_label()
                    ))
                }
            },
            other => {
                self.reset(spec);
                Some(format!(
                    "A {} is not a valid number for '{}', the default was restored",
                    type_name(other),
                    spec.display_label()
                ))
            }
        }
    }

    fn current_value(&self, _spec: &FieldSpec) -> Value {
        self.value.clone().map(Value::Number).unwrap_or(Value::Null)
    }

    fn reset(&mut self, spec: &FieldSpec) {
        *self = Self::with_mode(spec, self.integer);
    }

    fn check(&self, spec: &FieldSpec) -> ValidationResult {
        check_range(
            spec.display_label(),
            &self.current_value(spec),
            spec.constraints.minimum,
            spec.constraints.maximum,
        )
    }
}
