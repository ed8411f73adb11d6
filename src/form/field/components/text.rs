use serde_json::Value;

use crate::domain::FieldSpec;
use crate::form::field::convert::{type_name, value_to_string};

use super::{ComponentKind, FieldComponent};

#[derive(Debug, Clone)]
pub struct TextComponent {
    buffer: String,
}

impl TextComponent {
    pub fn new(spec: &FieldSpec) -> Self {
        let buffer = spec
            .default
            .as_ref()
            .map(value_to_string)
            .unwrap_or_default();
        Self { buffer }
    }
}

impl FieldComponent for TextComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Text
    }

    fn sanitise(&mut self, spec: &FieldSpec, raw: &Value) -> Option<String> {
        match raw {
            Value::Null => {
                self.reset(spec);
                None
            }
            Value::String(text) if text.is_empty() => {
                self.reset(spec);
                None
            }
            Value::String(text) => {
                self.buffer = text.clone();
                None
            }
            Value::Number(_) | Value::Bool(_) => {
                self.buffer = value_to_string(raw);
                Some(format!(
                    "The {} value of '{}' was converted to text",
                    type_name(raw),
                    spec.display_label()
                ))
            }
            other => {
                self.reset(spec);
                Some(format!(
                    "A {} is not a valid value for '{}', the default was restored",
                    type_name(other),
                    spec.display_label()
                ))
            }
        }
    }

    fn current_value(&self, _spec: &FieldSpec) -> Value {
        if self.buffer.is_empty() {
            Value::Null
        } else {
            Value::String(self.buffer.clone())
        }
    }

    fn reset(&mut self, spec: &FieldSpec) {
        *self = Self::new(spec);
    }

    fn display_value(&self, _spec: &FieldSpec) -> String {
        self.buffer.clone()
    }
}
