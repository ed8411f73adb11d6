mod cascade;
mod error;
pub mod field;
mod graph;
mod options;
mod provider;
mod resources;
mod section;
mod state;
pub mod validation;

pub use cascade::{CascadeReport, VariantSwap};
pub use error::{FailureScope, FormError, ValidationFailure};
pub use field::FieldInstance;
pub use field::components::{ComponentKind, ComponentRegistry, FieldComponent, kinds};
pub use graph::DependencyGraph;
pub use options::FormOptions;
pub use provider::{NoValues, ValueProvider};
pub use resources::ResourceTicket;
pub use section::Section;
pub use state::{Form, FormPhase, SaveOutcome};
