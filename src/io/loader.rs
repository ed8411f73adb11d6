use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use tracing::debug;

use crate::domain::{ResourceRequest, TableResource};

use super::{DocumentFormat, parse_document_str};

/// Derives the shared table a file-source field points at.
///
/// Loaders are invoked synchronously by the cascade, or by the host when the
/// form defers loading. Errors are recorded on the source field.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, request: &ResourceRequest) -> Result<TableResource>;
}

impl<F> ResourceLoader for F
where
    F: Fn(&ResourceRequest) -> Result<TableResource> + Send + Sync,
{
    fn load(&self, request: &ResourceRequest) -> Result<TableResource> {
        self(request)
    }
}

/// Tables registered up front, keyed by location.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    tables: HashMap<String, TableResource>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, location: impl Into<String>, table: TableResource) -> Self {
        self.insert(location, table);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, table: TableResource) {
        self.tables.insert(location.into(), table);
    }

    pub fn remove(&mut self, location: &str) -> Option<TableResource> {
        self.tables.remove(location)
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&self, request: &ResourceRequest) -> Result<TableResource> {
        self.tables
            .get(&request.location)
            .cloned()
            .ok_or_else(|| anyhow!("no table is available at '{}'", request.location))
    }
}

/// Reads record tables from JSON, YAML or TOML documents on disk.
///
/// A document is either a list of records or an object whose array members
/// are named tables. The `table` option (alias `sheet_name` or `key`) picks
/// one of them; `index_col` names the index column(s).
#[derive(Debug, Clone, Default)]
pub struct DocumentTableLoader {
    root: Option<PathBuf>,
}

impl DocumentTableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative locations against `root`.
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResourceLoader for DocumentTableLoader {
    fn load(&self, request: &ResourceRequest) -> Result<TableResource> {
        let path = self.resolve(&request.location);
        let format = DocumentFormat::from_path(&path)
            .with_context(|| format!("unsupported table document '{}'", path.display()))?;
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read table document '{}'", path.display()))?;
        let document = parse_document_str(&contents, format)?;
        debug!(location = %request.location, %format, "loaded table document");
        table_from_document(&document, request)
            .with_context(|| format!("failed to read a table from '{}'", path.display()))
    }
}

const TABLE_OPTIONS: [&str; 3] = ["table", "sheet_name", "key"];

/// Builds a [`TableResource`] from a parsed document.
pub fn table_from_document(document: &Value, request: &ResourceRequest) -> Result<TableResource> {
    let (tables, records) = match document {
        Value::Array(records) => (Vec::new(), records),
        Value::Object(map) => {
            let tables: Vec<String> = map
                .iter()
                .filter(|(_, value)| value.is_array())
                .map(|(key, _)| key.clone())
                .collect();
            let Some(first) = tables.first() else {
                bail!("the document does not contain any table");
            };
            let wanted = TABLE_OPTIONS
                .iter()
                .find_map(|key| request.option_str(key))
                .filter(|name| tables.iter().any(|table| table == name))
                .unwrap_or(first.as_str());
            let records = map
                .get(wanted)
                .and_then(Value::as_array)
                .ok_or_else(|| anyhow!("table '{wanted}' is not a list of records"))?;
            (tables, records)
        }
        _ => bail!("the document must be a list of records or an object of tables"),
    };

    let mut columns: Vec<String> = Vec::new();
    for (row, record) in records.iter().enumerate() {
        let Value::Object(record) = record else {
            bail!("row {row} is not a record");
        };
        for key in record.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let index_columns = request.index_columns();
    if let Some(missing) = index_columns.iter().find(|name| !columns.contains(name)) {
        bail!("index column '{missing}' does not exist");
    }
    let index_values = index_values(records, &index_columns);

    Ok(TableResource {
        tables,
        columns,
        index_columns,
        index_values,
        row_count: records.len(),
    })
}

/// Distinct index entries in row order. Multi-column indexes yield arrays.
fn index_values(records: &[Value], index_columns: &[String]) -> Vec<Value> {
    if index_columns.is_empty() {
        return Vec::new();
    }
    let mut values: Vec<Value> = Vec::new();
    for record in records {
        let mut key = index_columns
            .iter()
            .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
            .collect::<Vec<_>>();
        let entry = if key.len() == 1 {
            key.remove(0)
        } else {
            Value::Array(key)
        };
        if !values.contains(&entry) {
            values.push(entry);
        }
    }
    values
}
