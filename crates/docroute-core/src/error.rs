//! Error types for docroute

use std::fmt;

use thiserror::Error;

/// Core error type for docroute operations
///
/// `Clone` so that a single in-flight establishment can hand the same failure
/// to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocrouteError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{0}")]
    Validation(ValidationFailure),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DocrouteError {
    /// True for failures caused by the caller's input rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DocrouteError::Validation(_) | DocrouteError::Store(_) | DocrouteError::InvalidName(_)
        )
    }
}

impl From<ValidationFailure> for DocrouteError {
    fn from(failure: ValidationFailure) -> Self {
        DocrouteError::Validation(failure)
    }
}

/// Result type alias for docroute operations
pub type Result<T> = std::result::Result<T, DocrouteError>;

/// What went wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// A required field was missing, null or an empty string
    Required,
    /// The value could not be cast to the declared type
    Cast,
    /// The value is not one of the allowed enum values
    Enum,
}

/// A failed constraint on one field of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

/// All field failures collected while validating one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Model name of the predefined schema that rejected the document
    pub model: String,
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            errors: Vec::new(),
        }
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the error recorded for a field, if any
    pub fn field(&self, path: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.path == path)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed", self.model)?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{}: {}", sep, error.path, error.message)?;
        }
        Ok(())
    }
}
