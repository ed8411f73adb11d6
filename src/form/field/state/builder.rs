use serde_json::Value;

use crate::domain::FieldSpec;
use crate::form::error::FormError;
use crate::form::field::components::ComponentRegistry;

use super::FieldInstance;

impl FieldInstance {
    /// Builds the component for `spec.kind` and populates it from `raw`,
    /// falling back to the persisted `FieldSpec::value` and then its default.
    ///
    /// Only an unregistered kind fails; unusable input degrades to a usable
    /// value and a warning.
    pub fn create(
        spec: FieldSpec,
        raw: Option<&Value>,
        registry: &ComponentRegistry,
    ) -> Result<Self, FormError> {
        let component = registry.build(&spec)?;
        let visible = spec.visible;
        let mut instance = Self {
            spec,
            component,
            visible,
            enabled: true,
            dirty: false,
            initialized: false,
            warning: None,
            error: None,
        };
        let raw = raw.cloned().or_else(|| instance.spec.value.clone());
        if let Some(raw) = raw {
            instance.populate(&raw);
        }
        Ok(instance)
    }
}
