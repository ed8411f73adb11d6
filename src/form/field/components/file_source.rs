use std::path::Path;

use serde_json::Value;

use crate::domain::{FieldSpec, ValidationResult};
use crate::form::field::convert::{type_name, value_to_string};

use super::{ComponentKind, FieldComponent};

/// Path to an external table. Producing field: a change re-derives the
/// resource shared with its consumers.
#[derive(Debug, Clone)]
pub struct FileSourceComponent {
    location: String,
}

impl FileSourceComponent {
    pub fn new(spec: &FieldSpec) -> Self {
        let location = spec
            .default
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { location }
    }

    fn allowed_extensions(spec: &FieldSpec) -> Vec<String> {
        spec.constraints
            .extra
            .get("extensions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FieldComponent for FileSourceComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::FileSource
    }

    fn sanitise(&mut self, spec: &FieldSpec, raw: &Value) -> Option<String> {
        match raw {
            Value::Null => {
                self.reset(spec);
                None
            }
            Value::String(text) => {
                self.location = text.trim().to_string();
                None
            }
            other => {
                self.reset(spec);
                Some(format!(
                    "A {} ({}) is not a valid file path for '{}', the default was restored",
                    type_name(other),
                    value_to_string(other),
                    spec.display_label()
                ))
            }
        }
    }

    fn current_value(&self, _spec: &FieldSpec) -> Value {
        if self.location.is_empty() {
            Value::Null
        } else {
            Value::String(self.location.clone())
        }
    }

    fn reset(&mut self, spec: &FieldSpec) {
        *self = Self::new(spec);
    }

    fn check(&self, spec: &FieldSpec) -> ValidationResult {
        let allowed = Self::allowed_extensions(spec);
        if self.location.is_empty() || allowed.is_empty() {
            return Ok(());
        }
        let extension = Path::new(&self.location)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if allowed.contains(&extension) {
            Ok(())
        } else {
            Err(format!(
                "The file extension of '{}' is not supported, use one of: {}",
                self.location,
                allowed.join(", ")
            ))
        }
    }

    fn produces_resource(&self) -> bool {
        true
    }
}
