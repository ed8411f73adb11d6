use std::sync::Arc;

use crate::domain::{ResourceRequest, TableResource};

/// A resource request the host must fulfil with
/// [`Form::complete_request`](super::Form::complete_request).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceTicket {
    pub source: String,
    pub generation: u64,
    pub request: ResourceRequest,
}

#[derive(Debug, Clone, Default)]
pub(crate) enum ResourceState {
    /// The producer has no location.
    #[default]
    Empty,
    Pending,
    Ready(Arc<TableResource>),
    Failed(String),
}

/// Freshest resource derived by one producer field.
///
/// Every request bumps `generation`; only a completion carrying the current
/// generation may update the slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResourceSlot {
    pub(crate) generation: u64,
    pub(crate) state: ResourceState,
    /// The outstanding request was issued while populating the form.
    pub(crate) initial: bool,
}

impl ResourceSlot {
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub(crate) fn ready(&self) -> Option<&TableResource> {
        match &self.state {
            ResourceState::Ready(resource) => Some(resource),
            _ => None,
        }
    }
}
