use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::validators::Validator;

/// Declarative description of one editable value.
///
/// A spec never changes once a form is built; runtime state (current value,
/// visibility, messages) lives on the [`FieldInstance`](crate::form::FieldInstance)
/// bound to it.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Key resolved against the host's [`ComponentRegistry`](crate::form::ComponentRegistry).
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    /// Persisted value supplied with the schema. A value provider passed to
    /// the form takes precedence.
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub validators: Vec<Validator>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Preserved across a type swap when the incoming variant declares a
    /// field with the same name.
    #[serde(default)]
    pub shared: bool,
    /// Excluded from the output dictionary. `None` lets the kind decide.
    #[serde(default)]
    pub ui_only: Option<bool>,
    /// Provider keys merged into a single raw object for composite kinds.
    #[serde(default)]
    pub value_keys: Vec<String>,
}

fn default_visible() -> bool {
    true
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind: kind.into(),
            description: None,
            default: None,
            value: None,
            constraints: Constraints::default(),
            validators: Vec::new(),
            visible: true,
            shared: false,
            ui_only: None,
            value_keys: Vec::new(),
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// The value a field falls back to. A missing default reads as `null`.
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.constraints.minimum = minimum;
        self.constraints.maximum = maximum;
        self
    }

    pub fn with_items(mut self, min_items: Option<usize>, max_items: Option<usize>) -> Self {
        self.constraints.min_items = min_items;
        self.constraints.max_items = max_items;
        self
    }

    pub fn with_unique_items(mut self) -> Self {
        self.constraints.unique = true;
        self
    }

    /// Binds a resource consumer to the field producing its resource.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.constraints.source = Some(source.into());
        self
    }

    /// Fields whose values parametrise the resource a producer derives.
    pub fn with_option_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.option_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a mutually-exclusive group to a source selector.
    pub fn with_group<I, S>(mut self, choice: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints
            .groups
            .insert(choice.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_value_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_constraint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.constraints.extra.insert(key.into(), value);
        self
    }

    pub fn multiple(mut self) -> Self {
        self.constraints.multiple = true;
        self
    }

    pub fn shared(mut self) -> Self {
        self.shared = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn ui_only(mut self, ui_only: bool) -> Self {
        self.ui_only = Some(ui_only);
        self
    }
}

/// Kind-specific limits. Unused entries are ignored by kinds that do not
/// understand them; unknown keys land in `extra` for host kinds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub options: Vec<String>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique: bool,
    pub multiple: bool,
    pub source: Option<String>,
    pub option_fields: Vec<String>,
    pub groups: IndexMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}
