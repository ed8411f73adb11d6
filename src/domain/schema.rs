use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::rules::{Filter, Rule};
use super::spec::FieldSpec;

/// Ordered description of a whole form as supplied by the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub title: Option<String>,
    pub sections: Vec<SectionSchema>,
    /// Type-swapped sections appended after the static ones.
    #[serde(default)]
    pub variants: Option<VariantSet>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn section(mut self, section: SectionSchema) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_variants(mut self, variants: VariantSet) -> Self {
        self.variants = Some(variants);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn edge(mut self, edge: EdgeSpec) -> Self {
        self.edges.push(edge);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionSchema {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

impl SectionSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            fields: Vec::new(),
            rules: Vec::new(),
            filters: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn edge(mut self, edge: EdgeSpec) -> Self {
        self.edges.push(edge);
        self
    }
}

/// Sections keyed by the value of a type selector field.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantSet {
    pub selector: String,
    pub types: IndexMap<String, Vec<SectionSchema>>,
}

impl VariantSet {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            types: IndexMap::new(),
        }
    }

    pub fn variant(mut self, key: impl Into<String>, sections: Vec<SectionSchema>) -> Self {
        self.types.insert(key.into(), sections);
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }
}

/// Explicit dependency declared by the schema author.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub action: CascadeAction,
}

impl EdgeSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>, action: CascadeAction) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            action,
        }
    }
}

/// What happens to a listener when its source changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CascadeAction {
    /// Re-derive a resource producer, or repopulate a consumer from the
    /// freshest resource of the field it is bound to.
    ReloadValueSource,
    /// Show the target while `when` holds on the source value, hide it otherwise.
    ToggleVisibility {
        #[serde(default = "Condition::truthy")]
        when: Condition,
    },
    /// Reset the target to its default while `when` holds on the source value.
    ResetToDefault {
        #[serde(default)]
        when: Condition,
    },
}

impl CascadeAction {
    pub fn label(&self) -> &'static str {
        match self {
            CascadeAction::ReloadValueSource => "reload_value_source",
            CascadeAction::ToggleVisibility { .. } => "toggle_visibility",
            CascadeAction::ResetToDefault { .. } => "reset_to_default",
        }
    }
}

/// Predicate evaluated on the value of an edge's source field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Always,
    Equals {
        value: Value,
    },
    NotEquals {
        value: Value,
    },
    OneOf {
        values: Vec<Value>,
    },
    NoneOf {
        values: Vec<Value>,
    },
    Truthy,
}

impl Condition {
    pub fn truthy() -> Self {
        Condition::Truthy
    }

    pub fn holds(&self, value: &Value) -> bool {
        match self {
            Condition::Always => true,
            Condition::Equals { value: expected } => value == expected,
            Condition::NotEquals { value: expected } => value != expected,
            Condition::OneOf { values } => values.contains(value),
            Condition::NoneOf { values } => !values.contains(value),
            Condition::Truthy => match value {
                Value::Null => false,
                Value::Bool(flag) => *flag,
                Value::Number(num) => num.as_f64().is_some_and(|n| n != 0.0),
                Value::String(text) => !text.is_empty(),
                Value::Array(items) => !items.is_empty(),
                Value::Object(map) => !map.is_empty(),
            },
        }
    }
}
