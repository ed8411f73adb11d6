use serde_json::Value;

use crate::domain::{FieldSpec, TableResource, ValidationResult};
use crate::form::field::convert::value_to_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Text,
    Bool,
    Integer,
    Float,
    Choice,
    NumberList,
    TextList,
    Points,
    SourceSelect,
    FileSource,
    TableSelect,
    ColumnSelect,
    IndexSelect,
    TypeSelect,
    /// Host-registered kinds.
    Custom,
}

/// Behaviour behind one field kind.
///
/// A component starts at its spec's default and is then populated through
/// [`sanitise`](FieldComponent::sanitise). Sanitising never fails: invalid
/// input degrades to the default or an empty value and the returned message
/// becomes the field's warning.
pub trait FieldComponent: FieldComponentClone + std::fmt::Debug {
    fn kind(&self) -> ComponentKind;

    fn sanitise(&mut self, spec: &FieldSpec, raw: &Value) -> Option<String>;

    /// Value in the canonical output type; `null` when nothing is set.
    fn current_value(&self, spec: &FieldSpec) -> Value;

    fn reset(&mut self, spec: &FieldSpec);

    fn display_value(&self, spec: &FieldSpec) -> String {
        value_to_string(&self.current_value(spec))
    }

    /// Checks intrinsic to the kind (range, item counts...), run before the
    /// spec's own validators.
    fn check(&self, _spec: &FieldSpec) -> ValidationResult {
        Ok(())
    }

    /// Choices currently offered, for selector kinds.
    fn options(&self) -> Option<&[String]> {
        None
    }

    /// Replaces the offered choices, revalidating the current selection.
    fn set_options(&mut self, _spec: &FieldSpec, _options: Vec<String>) -> Option<String> {
        None
    }

    /// Repopulates a consumer from a freshly derived resource.
    fn reload(&mut self, _spec: &FieldSpec, _resource: &TableResource) -> Option<String> {
        None
    }

    /// Whether the kind derives a shared resource from its value.
    fn produces_resource(&self) -> bool {
        false
    }

    /// Whether the value is UI state only and never persisted.
    fn ui_only(&self) -> bool {
        false
    }
}

pub trait FieldComponentClone {
    fn clone_box(&self) -> Box<dyn FieldComponent>;
}

impl<T> FieldComponentClone for T
where
    T: 'static + FieldComponent + Clone,
{
    fn clone_box(&self) -> Box<dyn FieldComponent> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn FieldComponent> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
