use std::time::Duration;
use thiserror::Error;

/// Failure reported by an identifier generator.
///
/// Always fatal for the current save invocation; never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Invalid generator options: {0}")]
    InvalidOptions(String),

    #[error("Generator failed: {0}")]
    Failed(String),

    #[error("Generator produced an empty identifier")]
    EmptyIdentifier,

    #[error("Generation cancelled")]
    Cancelled,
}

/// Structured failure of the underlying record write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// Duplicate value on a unique key. `keys` names the key's fields when
    /// the store can report them and is empty otherwise.
    #[error("{message}")]
    UniqueViolation { keys: Vec<String>, message: String },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Write timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Write cancelled")]
    Cancelled,
}

/// Borrowed view of a write failure classified as a uniqueness conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueConflict<'a> {
    pub keys: &'a [String],
    pub message: &'a str,
}

impl UniqueConflict<'_> {
    pub fn has_structured_keys(&self) -> bool {
        !self.keys.is_empty()
    }
}

impl WriteError {
    /// Classifies this failure as a uniqueness conflict.
    ///
    /// Stores that cannot report a structured violation are recognized by
    /// their message text. Returns `None` for every other failure.
    pub fn unique_conflict(&self) -> Option<UniqueConflict<'_>> {
        match self {
            Self::UniqueViolation { keys, message } => Some(UniqueConflict {
                keys,
                message,
            }),
            Self::ConstraintViolation(message) => {
                let lower = message.to_lowercase();
                if lower.contains("unique constraint")
                    || lower.contains("unique index violation")
                    || lower.contains("duplicate key")
                {
                    return Some(UniqueConflict {
                        keys: &[],
                        message,
                    });
                }
                None
            }
            _ => None,
        }
    }

    pub fn is_unique_conflict(&self) -> bool {
        self.unique_conflict().is_some()
    }
}

/// Terminal outcome of a failed save invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("Generator for field '{field}' failed: {source}")]
    Generation {
        field: String,
        #[source]
        source: GenerationError,
    },

    /// Conflict attributed to generated fields whose retry budget ran out.
    #[error("Uniqueness conflict on {fields:?} with no retries left: {source}")]
    UniquenessConflict {
        fields: Vec<String>,
        #[source]
        source: WriteError,
    },

    /// Write failure not attributable to a generated field.
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl SaveError {
    /// The underlying write failure, if the loop ended on one.
    pub fn write_error(&self) -> Option<&WriteError> {
        match self {
            Self::UniquenessConflict { source, .. } => Some(source),
            Self::Write(err) => Some(err),
            Self::Generation { .. } => None,
        }
    }

    pub fn is_uniqueness_conflict(&self) -> bool {
        matches!(self, Self::UniquenessConflict { .. })
    }

    pub fn conflicting_fields(&self) -> &[String] {
        match self {
            Self::UniquenessConflict { fields, .. } => fields,
            _ => &[],
        }
    }
}

/// Record-type registration and configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown generator '{generator}' for field '{field}'")]
    UnknownGenerator { field: String, generator: String },

    #[error("Field '{0}' declared more than once")]
    DuplicateField(String),

    #[error("Field name cannot be empty")]
    EmptyFieldName,
}

pub type Result<T, E = SaveError> = std::result::Result<T, E>;
