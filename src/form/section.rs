use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::domain::{EdgeSpec, Filter, Rule, SectionSchema};

use super::{
    error::FormError,
    field::{FieldInstance, components::ComponentRegistry},
    provider::{ValueProvider, raw_value},
};

/// Ordered group of field instances.
///
/// Sections built from a variant of the form's type selector are `dynamic`
/// and get replaced wholesale when the selected type changes.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub title: Option<String>,
    pub(crate) fields: IndexMap<String, FieldInstance>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) filters: Vec<Filter>,
    pub(crate) edges: Vec<EdgeSpec>,
    pub(crate) dynamic: bool,
}

impl Section {
    /// Creates the section's instances. `provided` collects the names of the
    /// fields that received a persisted value.
    pub(crate) fn build(
        schema: &SectionSchema,
        provider: &dyn ValueProvider,
        registry: &ComponentRegistry,
        dynamic: bool,
        provided: &mut Vec<String>,
    ) -> Result<Self, FormError> {
        let mut fields = IndexMap::with_capacity(schema.fields.len());
        for spec in &schema.fields {
            if fields.contains_key(&spec.name) {
                return Err(FormError::DuplicateField(spec.name.clone()));
            }
            let raw = raw_value(provider, spec);
            if raw.is_some() || spec.value.is_some() {
                provided.push(spec.name.clone());
            }
            let instance = FieldInstance::create(spec.clone(), raw.as_ref(), registry)?;
            fields.insert(spec.name.clone(), instance);
        }
        Ok(Self {
            name: schema.name.clone(),
            title: schema.title.clone(),
            fields,
            rules: schema.rules.clone(),
            filters: schema.filters.clone(),
            edges: schema.edges.clone(),
            dynamic,
        })
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn field(&self, name: &str) -> Option<&FieldInstance> {
        self.fields.get(name)
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FieldInstance> {
        self.fields.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldInstance> {
        self.fields.values()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Values of the active fields, UI-only ones included, for cross-field
    /// rules.
    pub(crate) fn active_values(&self) -> Map<String, Value> {
        self.fields
            .values()
            .filter(|field| field.is_active())
            .map(|field| (field.spec.name.clone(), field.get_value()))
            .collect()
    }

    /// Values of the active fields that are persisted.
    pub(crate) fn output_values(&self) -> Map<String, Value> {
        self.fields
            .values()
            .filter(|field| field.is_active() && !field.is_ui_only())
            .map(|field| (field.spec.name.clone(), field.get_value()))
            .collect()
    }
}
