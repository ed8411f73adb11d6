use std::{fmt, sync::Arc};

use crate::domain::FieldSpec;
use crate::io::ResourceLoader;

use super::field::components::{ComponentRegistry, FieldComponent};

/// Behaviour switches for a [`Form`](super::Form).
#[derive(Clone)]
pub struct FormOptions {
    /// Omit fields equal to their default from the output.
    pub suppress_defaults: bool,
    /// Queue resource requests for the host instead of loading inline.
    pub deferred_loading: bool,
    /// Pick a source selector's group from the provided values when the
    /// selector itself has none.
    pub infer_source_choice: bool,
    pub(crate) loader: Option<Arc<dyn ResourceLoader>>,
    pub(crate) registry: Arc<ComponentRegistry>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            suppress_defaults: true,
            deferred_loading: false,
            infer_source_choice: true,
            loader: None,
            registry: Arc::new(ComponentRegistry::default()),
        }
    }
}

impl FormOptions {
    pub fn with_suppress_defaults(mut self, enabled: bool) -> Self {
        self.suppress_defaults = enabled;
        self
    }

    pub fn with_deferred_loading(mut self, enabled: bool) -> Self {
        self.deferred_loading = enabled;
        self
    }

    pub fn with_infer_source_choice(mut self, enabled: bool) -> Self {
        self.infer_source_choice = enabled;
        self
    }

    pub fn with_loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn with_shared_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn registry(&self) -> Arc<ComponentRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn loader(&self) -> Option<Arc<dyn ResourceLoader>> {
        self.loader.clone()
    }

    fn map_registry(mut self, map: impl FnOnce(ComponentRegistry) -> ComponentRegistry) -> Self {
        let updated = map((*self.registry).clone());
        self.registry = Arc::new(updated);
        self
    }

    /// Registers an extra field kind on top of the current registry.
    pub fn with_kind<F>(self, kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&FieldSpec) -> Box<dyn FieldComponent> + Send + Sync + 'static,
    {
        let kind = kind.into();
        self.map_registry(|registry| registry.register(kind, factory))
    }
}

impl fmt::Debug for FormOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("suppress_defaults", &self.suppress_defaults)
            .field("deferred_loading", &self.deferred_loading)
            .field("infer_source_choice", &self.infer_source_choice)
            .field("loader", &self.loader.as_ref().map(|_| "<loader>"))
            .field("registry", &self.registry)
            .finish()
    }
}
