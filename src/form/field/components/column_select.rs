use serde_json::Value;

use crate::domain::{FieldSpec, TableResource};
use crate::form::field::convert::{quote_list, string_items};

use super::{ComponentKind, FieldComponent};

/// Picks one or more columns of the table derived by the field named in
/// `constraints.source`.
///
/// Until the first resource arrives any column name is accepted; afterwards
/// selections are checked against the table and vanished columns are dropped
/// with a single warning naming all of them.
#[derive(Debug, Clone)]
pub struct ColumnSelectComponent {
    options: Vec<String>,
    selected: Vec<String>,
    multiple: bool,
    loaded: bool,
}

impl ColumnSelectComponent {
    pub fn new(spec: &FieldSpec) -> Self {
        let selected = spec
            .default
            .as_ref()
            .map(|value| string_items(value).0)
            .unwrap_or_default();
        Self {
            options: Vec::new(),
            selected,
            multiple: spec.constraints.multiple,
            loaded: false,
        }
    }

    fn excludes_index(spec: &FieldSpec) -> bool {
        spec.constraints
            .extra
            .get("exclude_index")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Removes selections missing from the table, returning them.
    fn retain_known(&mut self) -> Vec<String> {
        if !self.loaded {
            return Vec::new();
        }
        let (kept, missing): (Vec<_>, Vec<_>) = self
            .selected
            .drain(..)
            .partition(|column| self.options.contains(column));
        self.selected = kept;
        missing
    }
}

impl FieldComponent for ColumnSelectComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::ColumnSelect
    }

    fn sanitise(&mut self, spec: &FieldSpec, raw: &Value) -> Option<String> {
        let label = spec.display_label();
        if raw.is_null() {
            self.reset(spec);
            return None;
        }
        if raw.is_object() {
            self.reset(spec);
            return Some(format!(
                "A dictionary is not a valid column for '{label}', the default was restored"
            ));
        }
        let (mut columns, converted) = string_items(raw);
        columns.retain(|column| !column.is_empty());
        let mut notes = Vec::new();
        if converted {
            notes.push("some values were converted to column names".to_string());
        }
        if !self.multiple && columns.len() > 1 {
            columns.truncate(1);
            notes.push("only one column can be selected, the first was kept".to_string());
        }
        self.selected = columns;
        let missing = self.retain_known();
        if !missing.is_empty() {
            notes.push(format!(
                "the column(s) {} do not exist in the table",
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
                Value::Array(self.selected.iter().cloned().map(Value::String).collect())
            }
        } else {
            self.selected
                .first()
                .cloned()
                .map(Value::String)
                .unwrap_or(Value::Null)
        }
    }

    fn reset(&mut self, spec: &FieldSpec) {
        let fresh = Self::new(spec);
        self.selected = fresh.selected;
        self.multiple = fresh.multiple;
        let _ = self.retain_known();
    }

    fn options(&self) -> Option<&[String]> {
        Some(&self.options)
    }

    fn set_options(&mut self, spec: &FieldSpec, options: Vec<String>) -> Option<String> {
        self.options = options;
        self.loaded = true;
        let missing = self.retain_known();
        if missing.is_empty() {
            None
        } else {
            Some(format!(
                "The column(s) {} no longer exist in the table and were removed from '{}'",
                quote_list(&missing),
                spec.display_label()
            ))
        }
    }

    fn reload(&mut self, spec: &FieldSpec, resource: &TableResource) -> Option<String> {
        let options = if Self::excludes_index(spec) {
            resource.data_columns()
        } else {
            resource.columns.clone()
        };
        self.set_options(spec, options)
    }
}
