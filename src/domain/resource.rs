use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed shape of an external table, as seen by consumer fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableResource {
    /// Sheets or keys the underlying file offers.
    pub tables: Vec<String>,
    pub columns: Vec<String>,
    pub index_columns: Vec<String>,
    pub index_values: Vec<Value>,
    pub row_count: usize,
}

impl TableResource {
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Columns that are not part of the index.
    pub fn data_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| !self.index_columns.contains(column))
            .cloned()
            .collect()
    }
}

/// What a producer asks a loader for: where the data lives and how to read it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequest {
    /// Name of the producing field.
    pub field: String,
    pub location: String,
    /// Current values of the producer's option fields.
    pub options: Map<String, Value>,
}

impl ResourceRequest {
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Index columns requested through `index_col`, as a string or a list.
    pub fn index_columns(&self) -> Vec<String> {
        match self.options.get("index_col") {
            Some(Value::String(name)) if !name.is_empty() => vec![name.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}
