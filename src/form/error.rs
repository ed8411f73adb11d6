use std::fmt;

use thiserror::Error;

/// Schema-authoring and lifecycle mistakes. These indicate a bug in the
/// caller, never a problem with user data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{field}' uses unregistered kind '{kind}'")]
    UnknownKind { field: String, kind: String },
    #[error("field name '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("section name '{0}' is declared more than once")]
    DuplicateSection(String),
    #[error("type selector '{selector}' has no variant '{variant}'")]
    UnknownVariant { selector: String, variant: String },
    #[error("cannot {operation} while the form is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: &'static str,
    },
    #[error("the form has been closed")]
    Closed,
}

/// Where a validation failure was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureScope {
    Field,
    Section(String),
    Form,
}

/// The first problem that blocked a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: Option<String>,
    pub label: Option<String>,
    pub message: String,
    pub scope: FailureScope,
}

impl ValidationFailure {
    pub fn field(name: &str, label: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(name.to_string()),
            label: Some(label.to_string()),
            message: message.into(),
            scope: FailureScope::Field,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationFailure {}
