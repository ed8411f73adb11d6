use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::domain::{EdgeSpec, FormSchema, SectionSchema, TableResource};

use super::{
    cascade::{CascadeReport, Pass},
    error::{FormError, ValidationFailure},
    field::{FieldInstance, convert::value_to_string},
    graph::DependencyGraph,
    options::FormOptions,
    provider::{NoValues, ValueProvider},
    resources::{ResourceSlot, ResourceState, ResourceTicket},
    section::Section,
    validation,
};

/// Lifecycle of a [`Form`]. `Validating` and `Rejected` are only observable
/// while [`Form::save`] runs; a rejected save returns to `Rendered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Constructed,
    FieldsBuilt,
    Rendered,
    Validating,
    Saved,
    Rejected,
    Closed,
}

impl FormPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FormPhase::Constructed => "constructed",
            FormPhase::FieldsBuilt => "fields_built",
            FormPhase::Rendered => "rendered",
            FormPhase::Validating => "validating",
            FormPhase::Saved => "saved",
            FormPhase::Rejected => "rejected",
            FormPhase::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Map<String, Value>),
    Rejected(ValidationFailure),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }

    pub fn into_result(self) -> Result<Map<String, Value>, ValidationFailure> {
        match self {
            SaveOutcome::Saved(output) => Ok(output),
            SaveOutcome::Rejected(failure) => Err(failure),
        }
    }
}

/// Owns the sections, the dependency graph and the resources derived by
/// producer fields of one editing session.
#[derive(Debug)]
pub struct Form {
    pub(crate) schema: FormSchema,
    pub(crate) options: FormOptions,
    pub(crate) phase: FormPhase,
    pub(crate) initialized: bool,
    pub(crate) sections: IndexMap<String, Section>,
    pub(crate) graph: DependencyGraph,
    pub(crate) active_variant: Option<String>,
    pub(crate) resources: HashMap<String, ResourceSlot>,
    pub(crate) pending: Vec<ResourceTicket>,
    pub(crate) structure_changed: bool,
    output: Option<Map<String, Value>>,
    last_failure: Option<ValidationFailure>,
}

impl Form {
    pub fn new(schema: FormSchema, options: FormOptions) -> Self {
        Self {
            schema,
            options,
            phase: FormPhase::Constructed,
            initialized: false,
            sections: IndexMap::new(),
            graph: DependencyGraph::new(),
            active_variant: None,
            resources: HashMap::new(),
            pending: Vec::new(),
            structure_changed: false,
            output: None,
            last_failure: None,
        }
    }

    /// Builds the fields from `provider` and runs the initial population.
    pub fn open(
        schema: FormSchema,
        provider: &dyn ValueProvider,
        options: FormOptions,
    ) -> Result<Self, FormError> {
        let mut form = Self::new(schema, options);
        form.build(provider)?;
        form.render()?;
        Ok(form)
    }

    /// Creates every field instance and registers the dependency edges.
    /// Values set before [`render`](Self::render) do not cascade.
    pub fn build(&mut self, provider: &dyn ValueProvider) -> Result<(), FormError> {
        self.expect_phase(&[FormPhase::Constructed], "build fields")?;
        let registry = self.options.registry();
        let mut provided = Vec::new();
        for schema in &self.schema.sections {
            let section = Section::build(schema, provider, &registry, false, &mut provided)?;
            insert_section(&mut self.sections, section)?;
        }

        if let Some(variants) = self.schema.variants.clone() {
            self.check_variants()?;
            let selector = self
                .field_mut(&variants.selector)
                .ok_or_else(|| FormError::UnknownField(variants.selector.clone()))?;
            selector.set_options(variants.keys());
            let chosen = value_to_string(&selector.get_value());
            if let Some(sections) = variants.types.get(&chosen) {
                for schema in sections {
                    let section = Section::build(schema, provider, &registry, true, &mut provided)?;
                    insert_section(&mut self.sections, section)?;
                }
                self.active_variant = Some(chosen);
            }
        }

        if self.options.infer_source_choice {
            self.infer_source_choices(&provided);
        }

        let names: Vec<String> = self.sections.keys().cloned().collect();
        for name in &names {
            self.register_section_edges(name)?;
        }
        self.register_edges(self.schema.edges.clone())?;
        self.phase = FormPhase::FieldsBuilt;
        debug!(
            sections = self.sections.len(),
            edges = self.graph.len(),
            variant = ?self.active_variant,
            "form fields built"
        );
        Ok(())
    }

    /// Runs the initial population with resets suppressed, then enables
    /// cascades.
    pub fn render(&mut self) -> Result<(), FormError> {
        self.expect_phase(&[FormPhase::FieldsBuilt], "render")?;
        let names = self.field_names();
        let mut report = CascadeReport::new("");
        self.populate(&names, &mut report)?;
        self.initialized = true;
        self.phase = FormPhase::Rendered;
        debug!(fields = names.len(), warnings = report.warnings.len(), "form rendered");
        Ok(())
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn title(&self) -> Option<&str> {
        self.schema.title.as_deref()
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldInstance> {
        self.sections.values().flat_map(Section::fields)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInstance> {
        self.sections.values().find_map(|section| section.field(name))
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FieldInstance> {
        self.sections
            .values_mut()
            .find_map(|section| section.field_mut(name))
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.field(name).map(FieldInstance::get_value)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.sections
            .values()
            .flat_map(|section| section.fields.keys().cloned())
            .collect()
    }

    /// Key of the variant currently shown by the type selector.
    pub fn active_variant(&self) -> Option<&str> {
        self.active_variant.as_deref()
    }

    /// Freshest resource derived by a producer field, if it loaded.
    pub fn resource(&self, field: &str) -> Option<&TableResource> {
        self.resources.get(field).and_then(ResourceSlot::ready)
    }

    /// Every current warning as `(field, message)`.
    pub fn warnings(&self) -> Vec<(String, String)> {
        self.fields()
            .filter_map(|field| {
                field
                    .warning()
                    .map(|warning| (field.name().to_string(), warning.to_string()))
            })
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.structure_changed || self.fields().any(FieldInstance::is_dirty)
    }

    pub fn output(&self) -> Option<&Map<String, Value>> {
        self.output.as_ref()
    }

    pub fn last_failure(&self) -> Option<&ValidationFailure> {
        self.last_failure.as_ref()
    }

    /// Applies an edit and runs the cascade it triggers.
    pub fn set_value(&mut self, name: &str, raw: Value) -> Result<CascadeReport, FormError> {
        self.begin_edit("set a value")?;
        let field = self
            .field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let warning = field.set_value(&raw).map(str::to_string);
        let initialized = field.is_initialized();
        let mut report = CascadeReport::new(name);
        if let Some(warning) = warning {
            report.warn(name, warning);
        }
        if !self.initialized || !initialized {
            trace!(field = name, "cascade suppressed before initial population");
            return Ok(report);
        }
        self.react(name, &mut report)?;
        Ok(report)
    }

    /// Re-runs the cascade of `name` without changing its value.
    pub fn trigger(&mut self, name: &str) -> Result<CascadeReport, FormError> {
        self.begin_edit("trigger a cascade")?;
        if !self.contains_field(name) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        let mut report = CascadeReport::new(name);
        if self.initialized {
            self.react(name, &mut report)?;
        }
        Ok(report)
    }

    pub fn reset_field(&mut self, name: &str) -> Result<CascadeReport, FormError> {
        self.begin_edit("reset a field")?;
        let field = self
            .field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        field.reset();
        let mut report = CascadeReport::new(name);
        if self.initialized {
            self.react(name, &mut report)?;
        }
        Ok(report)
    }

    /// Restores every field to its default and repopulates the form.
    pub fn reset_all(&mut self) -> Result<CascadeReport, FormError> {
        self.begin_edit("reset the form")?;
        for section in self.sections.values_mut() {
            for field in section.fields.values_mut() {
                field.reset();
            }
        }
        let mut report = CascadeReport::new("");
        self.swap_variant(&mut report)?;
        let names = self.field_names();
        self.populate(&names, &mut report)?;
        debug!("form reset to defaults");
        Ok(report)
    }

    /// Registers an additional edge; both endpoints must exist.
    pub fn register_edge(&mut self, edge: EdgeSpec) -> Result<(), FormError> {
        self.ensure_open()?;
        let sections = &self.sections;
        self.graph.register(edge, |name| {
            sections.values().any(|section| section.contains(name))
        })
    }

    /// Adds a section while the form is interactive. Its fields are
    /// populated from `provider` without triggering resets.
    pub fn add_section(
        &mut self,
        schema: &SectionSchema,
        provider: &dyn ValueProvider,
    ) -> Result<CascadeReport, FormError> {
        self.expect_phase(&[FormPhase::Rendered], "add a section")?;
        let registry = self.options.registry();
        let section = Section::build(schema, provider, &registry, false, &mut Vec::new())?;
        let names = section.field_names();
        insert_section(&mut self.sections, section)?;
        if let Err(err) = self.register_section_edges(&schema.name) {
            self.detach_section(&schema.name);
            return Err(err);
        }
        let mut report = CascadeReport::new("");
        self.populate(&names, &mut report)?;
        self.structure_changed = true;
        debug!(section = %schema.name, fields = names.len(), "section added");
        Ok(report)
    }

    /// Removes a section, releasing its fields and their edges.
    pub fn remove_section(&mut self, name: &str) -> Result<Section, FormError> {
        self.expect_phase(&[FormPhase::Rendered], "remove a section")?;
        let section = self
            .detach_section(name)
            .ok_or_else(|| FormError::UnknownSection(name.to_string()))?;
        self.structure_changed = true;
        debug!(section = name, "section removed");
        Ok(section)
    }

    pub fn validate(&self) -> Result<Map<String, Value>, ValidationFailure> {
        validation::validate(self)
    }

    /// Validates and, on success, stores the output dictionary. Field values
    /// are never modified by a save.
    pub fn save(&mut self) -> Result<SaveOutcome, FormError> {
        self.expect_phase(&[FormPhase::Rendered, FormPhase::Saved], "save")?;
        self.phase = FormPhase::Validating;
        match validation::validate(self) {
            Ok(output) => {
                self.phase = FormPhase::Saved;
                self.output = Some(output.clone());
                self.last_failure = None;
                self.structure_changed = false;
                for section in self.sections.values_mut() {
                    for field in section.fields.values_mut() {
                        field.mark_clean();
                    }
                }
                debug!(keys = output.len(), "form saved");
                Ok(SaveOutcome::Saved(output))
            }
            Err(failure) => {
                self.phase = FormPhase::Rejected;
                debug!(field = ?failure.field, message = %failure.message, "save rejected");
                self.last_failure = Some(failure.clone());
                self.phase = FormPhase::Rendered;
                Ok(SaveOutcome::Rejected(failure))
            }
        }
    }

    /// Releases the fields. Outstanding resource requests are discarded when
    /// they complete.
    pub fn close(&mut self) {
        if self.phase == FormPhase::Closed {
            return;
        }
        if !self.pending.is_empty() {
            debug!(pending = self.pending.len(), "closing form with pending requests");
        }
        self.sections.clear();
        self.graph = DependencyGraph::new();
        self.resources.clear();
        self.pending.clear();
        self.phase = FormPhase::Closed;
    }

    /// Requests queued while `deferred_loading` is enabled.
    pub fn take_pending_requests(&mut self) -> Vec<ResourceTicket> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending_requests(&self) -> bool {
        self.resources
            .values()
            .any(|slot| matches!(slot.state, ResourceState::Pending))
    }

    /// Delivers the result of a deferred request and resumes the cascade.
    ///
    /// Returns `None` when the completion is discarded: the form was closed,
    /// the producer was removed, or a newer request superseded this one.
    pub fn complete_request(
        &mut self,
        ticket: ResourceTicket,
        result: anyhow::Result<TableResource>,
    ) -> Result<Option<CascadeReport>, FormError> {
        if self.phase == FormPhase::Closed {
            warn!(source = %ticket.source, "discarding resource for a closed form");
            return Ok(None);
        }
        let Some(slot) = self.resources.get(&ticket.source) else {
            warn!(source = %ticket.source, "discarding resource for a removed field");
            return Ok(None);
        };
        let pending = matches!(slot.state, ResourceState::Pending);
        if slot.generation != ticket.generation || !pending {
            warn!(
                source = %ticket.source,
                generation = ticket.generation,
                current = slot.generation,
                "discarding stale resource"
            );
            return Ok(None);
        }
        let initial = slot.initial || !self.initialized;
        let mut report = CascadeReport::new(&ticket.source);
        self.store_resource(&ticket.source, result, &mut report);
        let pass = if initial {
            Pass::Initial
        } else {
            Pass::Interactive
        };
        self.run_cascade(&ticket.source, pass, &mut report)?;
        Ok(Some(report))
    }

    fn ensure_open(&self) -> Result<(), FormError> {
        if self.phase == FormPhase::Closed {
            Err(FormError::Closed)
        } else {
            Ok(())
        }
    }

    fn expect_phase(&self, allowed: &[FormPhase], operation: &'static str) -> Result<(), FormError> {
        self.ensure_open()?;
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(FormError::InvalidPhase {
                operation,
                phase: self.phase.name(),
            })
        }
    }

    /// Editing a saved form makes it interactive again.
    fn begin_edit(&mut self, operation: &'static str) -> Result<(), FormError> {
        self.expect_phase(
            &[FormPhase::FieldsBuilt, FormPhase::Rendered, FormPhase::Saved],
            operation,
        )?;
        if self.phase == FormPhase::Saved {
            self.phase = FormPhase::Rendered;
        }
        Ok(())
    }

    /// Every variant must build with the registry and must not redeclare a
    /// field of the static sections.
    fn check_variants(&self) -> Result<(), FormError> {
        let Some(variants) = &self.schema.variants else {
            return Ok(());
        };
        let registry = self.options.registry();
        let static_names: HashSet<String> = self.field_names().into_iter().collect();
        for sections in variants.types.values() {
            let mut seen = HashSet::new();
            for schema in sections {
                let section = Section::build(schema, &NoValues, &registry, true, &mut Vec::new())?;
                for name in section.field_names() {
                    if static_names.contains(&name) || !seen.insert(name.clone()) {
                        return Err(FormError::DuplicateField(name));
                    }
                }
            }
        }
        Ok(())
    }

    fn infer_source_choices(&mut self, provided: &[String]) {
        for section in self.sections.values_mut() {
            for field in section.fields.values_mut() {
                let groups = &field.spec.constraints.groups;
                if groups.is_empty() || provided.contains(&field.spec.name) {
                    continue;
                }
                let choice = groups
                    .iter()
                    .find(|(_, members)| members.iter().any(|member| provided.contains(member)))
                    .map(|(choice, _)| choice.clone());
                if let Some(choice) = choice {
                    trace!(field = %field.spec.name, %choice, "inferred source choice");
                    field.populate(&Value::String(choice));
                }
            }
        }
    }

    /// Removes a section with its edges, resources and queued requests.
    pub(crate) fn detach_section(&mut self, name: &str) -> Option<Section> {
        let section = self.sections.shift_remove(name)?;
        let names = section.field_names();
        self.graph.unregister_fields(&names);
        self.resources.retain(|field, _| !names.contains(field));
        self.pending.retain(|ticket| !names.contains(&ticket.source));
        Some(section)
    }
}

pub(crate) fn insert_section(
    sections: &mut IndexMap<String, Section>,
    section: Section,
) -> Result<(), FormError> {
    if sections.contains_key(&section.name) {
        return Err(FormError::DuplicateSection(section.name));
    }
    for name in section.fields.keys() {
        if sections.values().any(|existing| existing.contains(name)) {
            return Err(FormError::DuplicateField(name.clone()));
        }
    }
    sections.insert(section.name.clone(), section);
    Ok(())
}
