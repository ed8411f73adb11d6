#![deny(rust_2018_idioms)]

pub mod domain;
pub mod form;
pub mod io;

pub mod prelude {
    pub use crate::domain::{
        CascadeAction, Condition, EdgeSpec, FieldSpec, Filter, FormSchema, Rule, SectionSchema,
        TableResource, Validator, VariantSet,
    };
    pub use crate::form::{
        CascadeReport, ComponentRegistry, Form, FormError, FormOptions, FormPhase, SaveOutcome,
        ValidationFailure, ValueProvider,
    };
    pub use crate::io::{DocumentFormat, MemoryLoader, ResourceLoader};
}
