use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::FormSchema;

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Parse a form schema document (sections, variants, rules and edges).
pub fn load_form_schema(contents: &str, format: DocumentFormat) -> Result<FormSchema> {
    let document = parse_document_str(contents, format)?;
    form_schema_from_value(document)
}

pub fn form_schema_from_value(document: Value) -> Result<FormSchema> {
    serde_json::from_value(document).with_context(|| "document is not a valid form schema")
}
