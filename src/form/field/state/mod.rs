mod builder;
mod value_ops;

use crate::domain::FieldSpec;

use super::components::{ComponentKind, FieldComponent};

/// A [`FieldSpec`] bound to a live value.
///
/// `visible` is driven by visibility edges and source selectors, `enabled`
/// by the availability of the resource a consumer is bound to. Only fields
/// that are both are validated and written to the output.
#[derive(Debug, Clone)]
pub struct FieldInstance {
    pub(crate) spec: FieldSpec,
    pub(crate) component: Box<dyn FieldComponent>,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) dirty: bool,
    pub(crate) initialized: bool,
    pub(crate) warning: Option<String>,
    pub(crate) error: Option<String>,
}

impl FieldInstance {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn label(&self) -> &str {
        self.spec.display_label()
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn component_kind(&self) -> ComponentKind {
        self.component.kind()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.visible && self.enabled
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn options(&self) -> Option<&[String]> {
        self.component.options()
    }

    pub fn produces_resource(&self) -> bool {
        self.component.produces_resource()
    }

    /// Excluded from the output dictionary.
    pub fn is_ui_only(&self) -> bool {
        self.spec
            .ui_only
            .unwrap_or_else(|| self.component.ui_only())
    }
}
