use serde_json::Value;

use crate::domain::FieldSpec;
use crate::form::field::convert::type_name;

use super::{ComponentKind, FieldComponent};

#[derive(Debug, Clone)]
pub struct BoolComponent {
    value: bool,
}

impl BoolComponent {
    pub fn new(spec: &FieldSpec) -> Self {
        let value = spec
            .default
            .as_ref()
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        Self { value }
    }
}

impl FieldComponent for BoolComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Bool
    }

    fn sanitise(&mut self, spec: &FieldSpec, raw: &Value) -> Option<String> {
        let label = spec.display_label();
        match raw {
            Value::Null => {
                self.reset(spec);
                None
            }
            Value::Bool(flag) => {
                self.value = *flag;
                None
            }
            Value::String(text) if text.eq_ignore_ascii_case("true") => {
                self.value = true;
                Some(format!("The value '{text}' of '{label}' was corrected to true"))
            }
            Value::String(text) if text.eq_ignore_ascii_case("false") => {
                self.value = false;
                Some(format!("The value '{text}' of '{label}' was corrected to false"))
            }
            Value::Number(num) if num.as_f64() == Some(0.0) || num.as_f64() == Some(1.0) => {
                self.value = num.as_f64() == Some(1.0);
                Some(format!(
                    "The value {num} of '{label}' was corrected to {}",
                    self.value
                ))
            }
            other => {
                self.reset(spec);
                Some(format!(
                    "The {} {} is not a valid value for '{label}', the default was restored",
                    type_name(other),
                    other
                ))
            }
        }
    }

    fn current_value(&self, _spec: &FieldSpec) -> Value {
        Value::Bool(self.value)
    }

    fn reset(&mut self, spec: &FieldSpec) {
        *self = Self::new(spec);
    }
}
