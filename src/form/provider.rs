use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::domain::FieldSpec;

/// Supplies the persisted raw value of each field when a form is built.
pub trait ValueProvider {
    fn value(&self, key: &str) -> Option<Value>;
}

impl ValueProvider for Map<String, Value> {
    fn value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl ValueProvider for IndexMap<String, Value> {
    fn value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// Only objects provide values.
impl ValueProvider for Value {
    fn value(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.get(key)).cloned()
    }
}

impl<T: ValueProvider + ?Sized> ValueProvider for &T {
    fn value(&self, key: &str) -> Option<Value> {
        (**self).value(key)
    }
}

/// Provides nothing; every field starts from its spec.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValues;

impl ValueProvider for NoValues {
    fn value(&self, _key: &str) -> Option<Value> {
        None
    }
}

/// Raw input for `spec`. Composite fields listing `value_keys` receive an
/// object merged from those keys when any of them is provided.
pub(crate) fn raw_value(provider: &dyn ValueProvider, spec: &FieldSpec) -> Option<Value> {
    if !spec.value_keys.is_empty() {
        let merged = spec
            .value_keys
            .iter()
            .filter_map(|key| provider.value(key).map(|value| (key.clone(), value)))
            .collect::<Map<_, _>>();
        if !merged.is_empty() {
            return Some(Value::Object(merged));
        }
    }
    provider.value(&spec.name)
}
