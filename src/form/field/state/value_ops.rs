use serde_json::Value;

use crate::domain::{TableResource, ValidationResult};
use crate::form::field::convert::same_value;

use super::FieldInstance;

impl FieldInstance {
    pub fn get_value(&self) -> Value {
        self.component.current_value(&self.spec)
    }

    pub fn display_value(&self) -> String {
        self.component.display_value(&self.spec)
    }

    pub fn is_default(&self) -> bool {
        same_value(&self.get_value(), &self.spec.default_value())
    }

    /// Sanitises `raw` into the field without marking it edited.
    pub(crate) fn populate(&mut self, raw: &Value) {
        self.warning = self.component.sanitise(&self.spec, raw);
    }

    /// Applies an edit. Returns the sanitisation warning, if any.
    pub fn set_value(&mut self, raw: &Value) -> Option<&str> {
        let before = self.get_value();
        self.populate(raw);
        self.error = None;
        self.mark_dirty_if_changed(&before);
        self.warning.as_deref()
    }

    /// Restores the default and clears messages.
    pub fn reset(&mut self) {
        let before = self.get_value();
        self.component.reset(&self.spec);
        self.warning = None;
        self.error = None;
        self.mark_dirty_if_changed(&before);
    }

    /// Runs the kind's checks then the field's validators, returning the
    /// first failure. A recorded error (e.g. a resource that failed to load)
    /// fails first.
    pub fn validate(&self) -> ValidationResult {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        self.component.check(&self.spec)?;
        let value = self.get_value();
        let label = self.label();
        for validator in &self.spec.validators {
            validator.check(&self.spec.name, label, &value)?;
        }
        Ok(())
    }

    /// Repopulates from a freshly derived resource. A warning from the
    /// reload replaces the previous one.
    pub(crate) fn reload(&mut self, resource: &TableResource) -> Option<String> {
        let before = self.get_value();
        let warning = self.component.reload(&self.spec, resource);
        if warning.is_some() {
            self.warning = warning.clone();
        }
        self.mark_dirty_if_changed(&before);
        warning
    }

    pub(crate) fn set_options(&mut self, options: Vec<String>) -> Option<String> {
        let warning = self.component.set_options(&self.spec, options);
        if warning.is_some() {
            self.warning = warning.clone();
        }
        warning
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_warning(&mut self, warning: Option<String>) {
        self.warning = warning;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_messages(&mut self) {
        self.warning = None;
        self.error = None;
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty_if_changed(&mut self, before: &Value) {
        if self.initialized && !same_value(before, &self.get_value()) {
            self.dirty = true;
        }
    }
}
