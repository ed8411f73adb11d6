use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

use anyhow::anyhow;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::domain::{CascadeAction, Condition, EdgeSpec, ResourceRequest, TableResource};

use super::{
    error::FormError,
    field::{FieldInstance, convert::value_to_string},
    resources::{ResourceState, ResourceTicket},
    section::Section,
    state::{Form, insert_section},
};

/// Whether resets run. The initial population of fields only applies
/// visibility and reloads so that persisted values survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    Initial,
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSwap {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// What one interaction changed beyond the edited field itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub origin: String,
    /// Listeners acted upon, in processing order.
    pub touched: Vec<String>,
    pub warnings: Vec<(String, String)>,
    /// Resource errors recorded on producer fields.
    pub errors: Vec<(String, String)>,
    pub swapped: Option<VariantSwap>,
}

impl CascadeReport {
    pub(crate) fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
            && self.warnings.is_empty()
            && self.errors.is_empty()
            && self.swapped.is_none()
    }

    pub fn warnings_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.warnings
            .iter()
            .filter(move |(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub(crate) fn touch(&mut self, field: &str) {
        if !self.touched.iter().any(|name| name == field) {
            self.touched.push(field.to_string());
        }
    }

    pub(crate) fn warn(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.push((field.to_string(), message.into()));
    }
}

impl Form {
    /// Reacts to a change of `origin`: re-derives its resource, swaps the
    /// variant sections if it is the type selector, then runs its listeners.
    pub(crate) fn react(&mut self, origin: &str, report: &mut CascadeReport) -> Result<(), FormError> {
        if self.is_producer(origin) {
            self.derive_resource(origin, Pass::Interactive, report);
        }
        if self.is_type_selector(origin) {
            self.swap_variant(report)?;
        }
        self.run_cascade(origin, Pass::Interactive, report)
    }

    /// Processes every field reachable from `origin` exactly once, each after
    /// the reachable fields it depends on. Only edges whose source already
    /// ran in this pass are applied.
    pub(crate) fn run_cascade(
        &mut self,
        origin: &str,
        pass: Pass,
        report: &mut CascadeReport,
    ) -> Result<(), FormError> {
        let reachable = self.reachable_from(origin);
        if reachable.is_empty() {
            return Ok(());
        }
        let order = self.dependency_order(&reachable);
        debug!(origin, targets = ?order, ?pass, "dispatching cascade");
        let mut done: HashSet<String> = HashSet::from([origin.to_string()]);
        for target in order {
            let edges: Vec<EdgeSpec> = self
                .graph
                .edges_into(&target)
                .filter(|edge| done.contains(&edge.source))
                .cloned()
                .collect();
            done.insert(target.clone());
            let Some(field) = self.field(&target) else {
                trace!(%target, "listener no longer exists");
                continue;
            };
            if pass == Pass::Interactive && !field.is_initialized() {
                trace!(%target, "cascade suppressed for uninitialized field");
                continue;
            }
            self.process_target(&target, &edges, pass, false, report)?;
        }
        Ok(())
    }

    /// Initial population of `names`: producers derive their resources,
    /// consumers reload and visibility is applied; nothing is reset.
    pub(crate) fn populate(
        &mut self,
        names: &[String],
        report: &mut CascadeReport,
    ) -> Result<(), FormError> {
        let mut done: HashSet<String> = HashSet::new();
        for target in self.dependency_order(names) {
            let edges: Vec<EdgeSpec> = self
                .graph
                .edges_into(&target)
                .filter(|edge| {
                    edge.source != target
                        && (done.contains(&edge.source) || !names.contains(&edge.source))
                })
                .cloned()
                .collect();
            done.insert(target.clone());
            if self.contains_field(&target) {
                self.process_target(&target, &edges, Pass::Initial, true, report)?;
            }
        }

        let mut outside: Vec<String> = Vec::new();
        for edge in self.graph.edges() {
            if names.contains(&edge.source)
                && !names.contains(&edge.target)
                && !outside.contains(&edge.target)
            {
                outside.push(edge.target.clone());
            }
        }
        for target in outside {
            let edges: Vec<EdgeSpec> = self
                .graph
                .edges_into(&target)
                .filter(|edge| names.contains(&edge.source))
                .cloned()
                .collect();
            self.process_target(&target, &edges, Pass::Initial, false, report)?;
        }

        for name in names {
            if let Some(field) = self.field_mut(name) {
                field.mark_initialized();
            }
        }
        Ok(())
    }

    fn process_target(
        &mut self,
        target: &str,
        edges: &[EdgeSpec],
        pass: Pass,
        derive_producers: bool,
        report: &mut CascadeReport,
    ) -> Result<(), FormError> {
        let producer = self.is_producer(target);
        let mut derive = derive_producers && producer;
        for edge in edges {
            let source_value = self.value(&edge.source).unwrap_or(Value::Null);
            match &edge.action {
                CascadeAction::ReloadValueSource => {
                    if producer {
                        derive = true;
                    } else {
                        self.reload_consumer(target, report);
                    }
                }
                CascadeAction::ToggleVisibility { when } => {
                    let visible = when.holds(&source_value);
                    if let Some(field) = self.field_mut(target) {
                        field.set_visible(visible);
                    }
                }
                CascadeAction::ResetToDefault { when } => {
                    if pass == Pass::Initial || !when.holds(&source_value) {
                        continue;
                    }
                    if let Some(field) = self.field_mut(target) {
                        field.reset();
                    }
                    derive |= producer;
                }
            }
            report.touch(target);
        }
        if derive {
            self.derive_resource(target, pass, report);
            report.touch(target);
        }
        if pass == Pass::Interactive && self.is_type_selector(target) {
            self.swap_variant(report)?;
        }
        Ok(())
    }

    fn reachable_from(&self, origin: &str) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::from([origin.to_string()]);
        let mut queue = VecDeque::from([origin.to_string()]);
        let mut reachable = Vec::new();
        while let Some(node) = queue.pop_front() {
            for edge in self.graph.edges_from(&node) {
                if seen.insert(edge.target.clone()) {
                    reachable.push(edge.target.clone());
                    queue.push_back(edge.target.clone());
                }
            }
        }
        reachable
    }

    /// Orders `nodes` so that each comes after the members it listens to.
    /// A cycle is broken at its earliest member.
    fn dependency_order(&self, nodes: &[String]) -> Vec<String> {
        let members: HashSet<&str> = nodes.iter().map(String::as_str).collect();
        let mut remaining: Vec<&str> = nodes.iter().map(String::as_str).collect();
        let mut placed: HashSet<&str> = HashSet::new();
        let mut order = Vec::with_capacity(nodes.len());
        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .position(|node| {
                    self.graph.edges_into(node).all(|edge| {
                        let source = edge.source.as_str();
                        source == *node || !members.contains(source) || placed.contains(source)
                    })
                })
                .unwrap_or(0);
            let node = remaining.remove(ready);
            placed.insert(node);
            order.push(node.to_string());
        }
        order
    }

    fn is_producer(&self, name: &str) -> bool {
        self.field(name)
            .is_some_and(FieldInstance::produces_resource)
    }

    fn is_type_selector(&self, name: &str) -> bool {
        self.schema
            .variants
            .as_ref()
            .is_some_and(|variants| variants.selector == name)
    }

    /// Repopulates a consumer from the freshest resource of the field it is
    /// bound to. Consumers of a missing or broken resource are disabled,
    /// except the producer's own option fields which stay editable.
    fn reload_consumer(&mut self, target: &str, report: &mut CascadeReport) {
        let Some(source) = self
            .field(target)
            .and_then(|field| field.spec.constraints.source.clone())
        else {
            trace!(target, "reload requested for a field without a bound resource");
            return;
        };
        let is_option = self.field(&source).is_some_and(|producer| {
            producer
                .spec
                .constraints
                .option_fields
                .iter()
                .any(|option| option == target)
        });
        let state = self
            .resources
            .get(&source)
            .map(|slot| slot.state.clone())
            .unwrap_or_default();
        let Some(field) = self.field_mut(target) else {
            return;
        };
        match state {
            ResourceState::Ready(resource) => {
                if !field.is_enabled() {
                    field.set_enabled(true);
                    field.set_warning(None);
                }
                if let Some(warning) = field.reload(&resource) {
                    report.warn(target, warning);
                }
            }
            ResourceState::Failed(reason) => {
                if is_option {
                    return;
                }
                field.set_enabled(false);
                let warning = format!("'{}' is unavailable: {reason}", field.label());
                field.set_warning(Some(warning.clone()));
                report.warn(target, warning);
            }
            ResourceState::Pending => {
                if !is_option {
                    field.set_enabled(false);
                }
            }
            ResourceState::Empty => {
                if !is_option {
                    field.set_enabled(false);
                    field.set_warning(None);
                }
            }
        }
    }

    /// Issues a new request for the resource of producer `name`. Each call
    /// supersedes the previous request of the same producer.
    pub(crate) fn derive_resource(&mut self, name: &str, pass: Pass, report: &mut CascadeReport) {
        let Some(field) = self.field(name) else {
            return;
        };
        let location = match field.get_value() {
            Value::String(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        };
        let mut options = Map::new();
        for option in &field.spec.constraints.option_fields {
            if let Some(option_field) = self.field(option)
                && option_field.is_active()
            {
                let value = option_field.get_value();
                if !value.is_null() {
                    options.insert(option.clone(), value);
                }
            }
        }

        let slot = self.resources.entry(name.to_string()).or_default();
        let generation = slot.next_generation();
        slot.initial = pass == Pass::Initial;
        let Some(location) = location else {
            slot.state = ResourceState::Empty;
            if let Some(field) = self.field_mut(name) {
                field.set_error(None);
            }
            trace!(field = name, "producer has no location");
            return;
        };
        let request = ResourceRequest {
            field: name.to_string(),
            location,
            options,
        };
        if self.options.deferred_loading {
            slot.state = ResourceState::Pending;
            self.pending.retain(|ticket| ticket.source != name);
            debug!(field = name, generation, location = %request.location, "resource request queued");
            self.pending.push(ResourceTicket {
                source: name.to_string(),
                generation,
                request,
            });
            return;
        }
        let result = match &self.options.loader {
            Some(loader) => loader.load(&request),
            None => Err(anyhow!("no resource loader is configured")),
        };
        self.store_resource(name, result, report);
    }

    /// Records a loaded resource, or the load failure as an error on the
    /// producer.
    pub(crate) fn store_resource(
        &mut self,
        name: &str,
        result: anyhow::Result<TableResource>,
        report: &mut CascadeReport,
    ) {
        let (state, failure) = match result {
            Ok(resource) => {
                debug!(
                    field = name,
                    columns = resource.columns.len(),
                    rows = resource.row_count,
                    "resource derived"
                );
                (ResourceState::Ready(Arc::new(resource)), None)
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(field = name, error = %reason, "resource could not be loaded");
                (ResourceState::Failed(reason.clone()), Some(reason))
            }
        };
        self.resources.entry(name.to_string()).or_default().state = state;
        let Some(field) = self.field_mut(name) else {
            return;
        };
        match failure {
            Some(reason) => {
                let error = format!("The data for '{}' could not be loaded: {reason}", field.label());
                field.set_error(Some(error.clone()));
                report.errors.push((name.to_string(), error));
            }
            None => field.set_error(None),
        }
    }

    /// Replaces the dynamic sections with those of the selected variant.
    /// Shared fields carry their value into a same-named field of the new
    /// variant and every other field starts from its default. Static
    /// sections are left alone, but their edges into the new variant are
    /// registered again.
    pub(crate) fn swap_variant(&mut self, report: &mut CascadeReport) -> Result<(), FormError> {
        let Some(variants) = self.schema.variants.clone() else {
            return Ok(());
        };
        let Some(selector) = self.field(&variants.selector) else {
            return Ok(());
        };
        let chosen = Some(value_to_string(&selector.get_value())).filter(|key| !key.is_empty());
        if chosen == self.active_variant {
            return Ok(());
        }
        let schemas = match &chosen {
            Some(key) => variants
                .types
                .get(key)
                .cloned()
                .ok_or_else(|| FormError::UnknownVariant {
                    selector: variants.selector.clone(),
                    variant: key.clone(),
                })?,
            None => Vec::new(),
        };

        let carried: Map<String, Value> = self
            .sections
            .values()
            .filter(|section| section.dynamic)
            .flat_map(Section::fields)
            .filter(|field| field.spec.shared)
            .map(|field| (field.spec.name.clone(), field.get_value()))
            .collect();
        let dynamic: Vec<String> = self
            .sections
            .values()
            .filter(|section| section.dynamic)
            .map(|section| section.name.clone())
            .collect();
        for name in &dynamic {
            self.detach_section(name);
        }

        let registry = self.options.registry();
        let mut added = Vec::new();
        for schema in &schemas {
            // A swap starts from defaults; only carried values survive it.
            let mut schema = schema.clone();
            for spec in &mut schema.fields {
                spec.value = None;
            }
            let section = Section::build(&schema, &carried, &registry, true, &mut Vec::new())?;
            added.extend(section.field_names());
            insert_section(&mut self.sections, section)?;
        }
        for schema in &schemas {
            self.register_section_edges(&schema.name)?;
        }
        self.register_static_edges()?;
        let from = std::mem::replace(&mut self.active_variant, chosen.clone());
        self.populate(&added, report)?;
        self.structure_changed = true;
        debug!(
            ?from,
            to = ?chosen,
            removed = dynamic.len(),
            carried = carried.len(),
            "variant sections swapped"
        );
        report.swapped = Some(VariantSwap { from, to: chosen });
        Ok(())
    }

    /// Registers the implicit edges of the section's fields followed by its
    /// declared edges.
    ///
    /// - a consumer listens to the producer named by `constraints.source`;
    /// - a producer listens to its option fields;
    /// - a source selector resets the members of the groups it does not
    ///   select and shows only the members of the selected group.
    pub(crate) fn register_section_edges(&mut self, section: &str) -> Result<(), FormError> {
        let section = self
            .sections
            .get(section)
            .ok_or_else(|| FormError::UnknownSection(section.to_string()))?;
        let mut edges = Vec::new();
        for field in section.fields() {
            let spec = &field.spec;
            if let Some(source) = &spec.constraints.source {
                edges.push(EdgeSpec::new(
                    source,
                    &spec.name,
                    CascadeAction::ReloadValueSource,
                ));
            }
            if field.produces_resource() {
                for option in &spec.constraints.option_fields {
                    edges.push(EdgeSpec::new(
                        option,
                        &spec.name,
                        CascadeAction::ReloadValueSource,
                    ));
                }
            }
            let mut members: IndexMap<&str, Vec<Value>> = IndexMap::new();
            for (choice, fields) in &spec.constraints.groups {
                for member in fields {
                    members
                        .entry(member.as_str())
                        .or_default()
                        .push(Value::String(choice.clone()));
                }
            }
            for (member, choices) in members {
                edges.push(EdgeSpec::new(
                    &spec.name,
                    member,
                    CascadeAction::ResetToDefault {
                        when: Condition::NoneOf {
                            values: choices.clone(),
                        },
                    },
                ));
                edges.push(EdgeSpec::new(
                    &spec.name,
                    member,
                    CascadeAction::ToggleVisibility {
                        when: Condition::OneOf { values: choices },
                    },
                ));
            }
        }
        edges.extend(section.edges.iter().cloned());
        self.register_edges(edges)
    }

    /// Registers the edges of the static sections and of the form. Edges
    /// into an inactive variant are skipped and picked up again by the swap
    /// that brings the variant back.
    pub(crate) fn register_static_edges(&mut self) -> Result<(), FormError> {
        let statics: Vec<String> = self
            .sections
            .values()
            .filter(|section| !section.dynamic)
            .map(|section| section.name.clone())
            .collect();
        for name in &statics {
            self.register_section_edges(name)?;
        }
        self.register_edges(self.schema.edges.clone())
    }

    pub(crate) fn register_edges(&mut self, edges: Vec<EdgeSpec>) -> Result<(), FormError> {
        for edge in edges {
            let parked = [&edge.source, &edge.target]
                .into_iter()
                .any(|name| !self.contains_field(name) && self.is_variant_field(name));
            if parked {
                trace!(source = %edge.source, target = %edge.target, "edge waits for its variant");
                continue;
            }
            self.register_edge(edge)?;
        }
        Ok(())
    }

    fn is_variant_field(&self, name: &str) -> bool {
        self.schema.variants.as_ref().is_some_and(|variants| {
            variants
                .types
                .values()
                .flatten()
                .flat_map(|section| &section.fields)
                .any(|spec| spec.name == name)
        })
    }
}
