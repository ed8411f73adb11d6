use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use crate::domain::FieldSpec;
use crate::form::error::FormError;

use super::{
    BoolComponent, ColumnSelectComponent, EnumComponent, FieldComponent, FileSourceComponent,
    IndexSelectComponent, NumberComponent, PointsComponent, ScalarArrayComponent, TextComponent,
    kinds,
};

pub type ComponentFactory = Arc<dyn Fn(&FieldSpec) -> Box<dyn FieldComponent> + Send + Sync>;

/// Maps `kind` strings to component factories.
///
/// `Default` registers every built-in kind; hosts add their own with
/// [`register`](Self::register), which also replaces a built-in of the same
/// name.
#[derive(Clone)]
pub struct ComponentRegistry {
    factories: IndexMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// A registry without any kinds.
    pub fn empty() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    pub fn register<F>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&FieldSpec) -> Box<dyn FieldComponent> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn build(&self, spec: &FieldSpec) -> Result<Box<dyn FieldComponent>, FormError> {
        let factory = self
            .factories
            .get(&spec.kind)
            .ok_or_else(|| FormError::UnknownKind {
                field: spec.name.clone(),
                kind: spec.kind.clone(),
            })?;
        Ok(factory(spec))
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::empty()
            .register(kinds::TEXT, |spec| Box::new(TextComponent::new(spec)))
            .register(kinds::BOOLEAN, |spec| Box::new(BoolComponent::new(spec)))
            .register(kinds::INTEGER, |spec| Box::new(NumberComponent::integer(spec)))
            .register(kinds::FLOAT, |spec| Box::new(NumberComponent::float(spec)))
            .register(kinds::CHOICE, |spec| Box::new(EnumComponent::choice(spec)))
            .register(kinds::NUMBER_LIST, |spec| {
                Box::new(ScalarArrayComponent::numbers(spec))
            })
            .register(kinds::TEXT_LIST, |spec| {
                Box::new(ScalarArrayComponent::strings(spec))
            })
            .register(kinds::POINTS, |spec| Box::new(PointsComponent::new(spec)))
            .register(kinds::SOURCE_SELECT, |spec| {
                Box::new(EnumComponent::source_select(spec))
            })
            .register(kinds::FILE, |spec| Box::new(FileSourceComponent::new(spec)))
            .register(kinds::TABLE_SELECT, |spec| {
                Box::new(EnumComponent::table_select(spec))
            })
            .register(kinds::COLUMN_SELECT, |spec| {
                Box::new(ColumnSelectComponent::new(spec))
            })
            .register(kinds::INDEX_SELECT, |spec| {
                Box::new(IndexSelectComponent::new(spec))
            })
            .register(kinds::TYPE_SELECT, |spec| {
                Box::new(EnumComponent::type_select(spec))
            })
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
