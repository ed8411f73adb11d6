use serde_json::Value;

use crate::domain::{FieldSpec, TableResource, ValidationResult};
use crate::form::field::convert::{quote_list, value_to_string};

use super::{ComponentKind, FieldComponent};

/// Single choice among string options.
///
/// The same state backs plain choices, source selectors, type selectors and
/// table selectors; they differ in where the options come from and whether
/// an empty selection is allowed.
#[derive(Debug, Clone)]
pub struct EnumComponent {
    kind: ComponentKind,
    options: Vec<String>,
    selected: Option<String>,
}

impl EnumComponent {
    pub fn choice(spec: &FieldSpec) -> Self {
        Self::build(ComponentKind::Choice, spec, spec.constraints.options.clone())
    }

    /// Options are the group names of the field spec. One group is always selected.
    pub fn source_select(spec: &FieldSpec) -> Self {
        let options = if spec.constraints.options.is_empty() {
            spec.constraints.groups.keys().cloned().collect()
        } else {
            spec.constraints.options.clone()
        };
        Self::build(ComponentKind::SourceSelect, spec, options)
    }

    /// Options are filled in by the form from its variant set.
    pub fn type_select(spec: &FieldSpec) -> Self {
        Self::build(ComponentKind::TypeSelect, spec, spec.constraints.options.clone())
    }

    /// Options are the sheets or keys of the bound resource.
    pub fn table_select(spec: &FieldSpec) -> Self {
        Self::build(ComponentKind::TableSelect, spec, Vec::new())
    }

    fn build(kind: ComponentKind, spec: &FieldSpec, options: Vec<String>) -> Self {
        let mut component = Self {
            kind,
            options,
            selected: None,
        };
        component.selected = component.default_selection(spec);
        component
    }

    fn always_selected(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::SourceSelect | ComponentKind::TypeSelect
        )
    }

    fn default_selection(&self, spec: &FieldSpec) -> Option<String> {
        let default = spec
            .default
            .as_ref()
            .map(value_to_string)
            .filter(|value| !value.is_empty());
        match default {
            Some(value) if self.options.is_empty() || self.options.contains(&value) => Some(value),
            _ if self.always_selected() => self.options.first().cloned(),
            _ => None,
        }
    }

    fn select(&mut self, spec: &FieldSpec, text: &str) -> Option<String> {
        let label = spec.display_label();
        if self.options.is_empty() || self.options.iter().any(|option| option == text) {
            self.selected = Some(text.to_string());
            return None;
        }
        if let Some(option) = self
            .options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(text))
        {
            self.selected = Some(option.clone());
            return Some(format!(
                "The value '{text}' of '{label}' was corrected to '{option}'"
            ));
        }
        self.selected = self.default_selection(spec);
        Some(format!(
            "'{text}' is not a valid option for '{label}' (valid options are {}), the default was restored",
            quote_list(&self.options)
        ))
    }
}

impl FieldComponent for EnumComponent {
    fn kind(&self) -> ComponentKind {
        self.kind
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
            Value::String(text) => self.select(spec, text),
            Value::Number(_) | Value::Bool(_) => self.select(spec, &value_to_string(raw)),
            other => {
                self.reset(spec);
                Some(format!(
                    "{other} is not a valid option for '{}', the default was restored",
                    spec.display_label()
                ))
            }
        }
    }

    fn current_value(&self, _spec: &FieldSpec) -> Value {
        self.selected
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null)
    }

    fn reset(&mut self, spec: &FieldSpec) {
        self.selected = self.default_selection(spec);
    }

    fn check(&self, spec: &FieldSpec) -> ValidationResult {
        if self.always_selected() && self.selected.is_none() {
            return Err(format!(
                "You must select an option for '{}'",
                spec.display_label()
            ));
        }
        Ok(())
    }

    fn options(&self) -> Option<&[String]> {
        Some(&self.options)
    }

    fn set_options(&mut self, spec: &FieldSpec, options: Vec<String>) -> Option<String> {
        self.options = options;
        let label = spec.display_label();
        let Some(current) = self.selected.take() else {
            self.selected = self.default_selection(spec);
            return None;
        };
        if self.options.contains(&current) {
            self.selected = Some(current);
            return None;
        }
        if let Some(option) = self
            .options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(&current))
        {
            self.selected = Some(option.clone());
            return Some(format!(
                "The value '{current}' of '{label}' was corrected to '{option}'"
            ));
        }
        self.selected = self.default_selection(spec);
        Some(format!("'{current}' is no longer available for '{label}'"))
    }

    fn reload(&mut self, spec: &FieldSpec, resource: &TableResource) -> Option<String> {
        if self.kind == ComponentKind::TableSelect {
            self.set_options(spec, resource.tables.clone())
        } else {
            None
        }
    }

    fn ui_only(&self) -> bool {
        self.kind == ComponentKind::SourceSelect
    }
}
