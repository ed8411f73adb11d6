use serde_json::Value;

use crate::domain::{FieldSpec, TableResource};
use crate::form::field::convert::{quote_list, value_to_string};

use super::{ComponentKind, FieldComponent};

/// Picks values of the index of the bound table. Matching is done on the
/// textual form so that a persisted `"2"` selects the index value `2`.
#[derive(Debug, Clone)]
pub struct IndexSelectComponent {
    options: Vec<Value>,
    labels: Vec<String>,
    selected: Vec<Value>,
    multiple: bool,
    loaded: bool,
}

impl IndexSelectComponent {
    pub fn new(spec: &FieldSpec) -> Self {
        let selected = match &spec.default {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other.clone()],
        };
        Self {
            options: Vec::new(),
            labels: Vec::new(),
            selected,
            multiple: spec.constraints.multiple,
            loaded: false,
        }
    }

    /// Canonicalises selections against the index, returning the missing ones.
    fn retain_known(&mut self) -> Vec<String> {
        if !self.loaded {
            return Vec::new();
        }
        let mut kept = Vec::with_capacity(self.selected.len());
        let mut missing = Vec::new();
        for value in self.selected.drain(..) {
            let label = value_to_string(&value);
            match self.labels.iter().position(|known| known == &label) {
                Some(position) => kept.push(self.options[position].clone()),
                None => missing.push(label),
            }
        }
        self.selected = kept;
        missing
    }
}

impl FieldComponent for IndexSelectComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::IndexSelect
    }

    fn sanitise(&mut self, spec: &FieldSpec, raw: &Value) -> Option<String> {
        let label = spec.display_label();
        let mut notes = Vec::new();
        self.selected = match raw {
            Value::Null => {
                self.reset(spec);
                return None;
            }
            Value::Object(_) => {
                self.reset(spec);
                return Some(format!(
                    "A dictionary is not a valid index value for '{label}', the default was restored"
                ));
            }
            Value::Array(items) => items.iter().filter(|item| !item.is_null()).cloned().collect(),
            other => vec![other.clone()],
        };
        if !self.multiple && self.selected.len() > 1 {
            self.selected.truncate(1);
            notes.push("only one index value can be selected, the first was kept".to_string());
        }
        let missing = self.retain_known();
        if !missing.is_empty() {
            notes.push(format!(
                "the index value(s) {} do not exist in the table",
                quote_list(&missing)
            ));
        }
        if notes.is_empty() {
            None
        } else {
            Some(format!("In '{label}': {}", notes.join("; ")))
        }
    }

    fn current_value(&self, spec: &FieldSpec) -> Value {
        if self.multiple {
            if self.selected.is_empty() && spec.default.is_none() {
                Value::Null
            } else {
                Value::Array(self.selected.clone())
            }
        } else {
            self.selected.first().cloned().unwrap_or(Value::Null)
        }
    }

    fn reset(&mut self, spec: &FieldSpec) {
        let fresh = Self::new(spec);
        self.selected = fresh.selected;
        self.multiple = fresh.multiple;
        let _ = self.retain_known();
    }

    fn options(&self) -> Option<&[String]> {
        Some(&self.labels)
    }

    fn reload(&mut self, spec: &FieldSpec, resource: &TableResource) -> Option<String> {
        self.options = resource.index_values.clone();
        self.labels = self.options.iter().map(value_to_string).collect();
        self.loaded = true;
        let missing = self.retain_known();
        if missing.is_empty() {
            None
        } else {
            Some(format!(
                "The index value(s) {} no longer exist in the table and were removed from '{}'",
                quote_list(&missing),
                spec.display_label()
            ))
        }
    }
}
