mod format;
mod input;
mod loader;

pub use format::DocumentFormat;
pub use input::{form_schema_from_value, load_form_schema, parse_document_str};
pub use loader::{DocumentTableLoader, MemoryLoader, ResourceLoader, table_from_document};
