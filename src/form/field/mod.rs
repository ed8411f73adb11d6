pub mod components;
pub(crate) mod convert;
mod state;

pub use state::FieldInstance;
