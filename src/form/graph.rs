use crate::domain::{CascadeAction, EdgeSpec};

use super::error::FormError;

/// Explicit table of `source -> target` cascade edges.
///
/// Edges are kept in registration order, which is the order listeners run
/// in. Registration fails when either endpoint is not a field of the form.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Vec<EdgeSpec>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `edge`, ignoring an identical edge registered earlier.
    pub fn register(
        &mut self,
        edge: EdgeSpec,
        exists: impl Fn(&str) -> bool,
    ) -> Result<(), FormError> {
        for endpoint in [&edge.source, &edge.target] {
            if !exists(endpoint) {
                return Err(FormError::UnknownField(endpoint.clone()));
            }
        }
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        Ok(())
    }

    /// Drops every edge touching one of `fields`, returning how many went.
    pub fn unregister_fields(&mut self, fields: &[String]) -> usize {
        let before = self.edges.len();
        self.edges
            .retain(|edge| !fields.contains(&edge.source) && !fields.contains(&edge.target));
        before - self.edges.len()
    }

    pub fn edges_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a EdgeSpec> + 'a {
        self.edges.iter().filter(move |edge| edge.source == source)
    }

    pub fn edges_into<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a EdgeSpec> + 'a {
        self.edges.iter().filter(move |edge| edge.target == target)
    }

    pub fn has_edge(&self, source: &str, target: &str, action: &CascadeAction) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.source == source && edge.target == target && &edge.action == action)
    }

    pub fn edges(&self) -> &[EdgeSpec] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
