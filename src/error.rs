//! Error types for Trellis.

use thiserror::Error;

/// Main error type for Trellis operations.
#[derive(Error, Debug)]
pub enum TrellisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Validation errors raised by graph mutations and analytics lookups.
///
/// All variants carry the offending identifier; the type/value variants
/// also list the legal values so callers can surface them directly.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Entity with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Entity '{0}' not found")]
    UnknownEntity(String),

    #[error("Invalid entity type: {given}. Valid types are: {valid}")]
    InvalidEntityType { given: String, valid: String },

    #[error("Invalid relation type: {given}. Valid types are: {valid}")]
    InvalidRelationType { given: String, valid: String },

    #[error("Relation from '{from}' to '{to}' with type '{relation_type}' already exists")]
    DuplicateRelation {
        from: String,
        to: String,
        relation_type: String,
    },

    #[error("Invalid status value: {given}. Valid values are: {valid}")]
    InvalidStatus { given: String, valid: String },

    #[error("Invalid priority value: {given}. Valid values are: {valid}")]
    InvalidPriority { given: String, valid: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
}

impl GraphError {
    /// Analytics root-entity lookup failure.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        GraphError::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// Storage-related errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read graph file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write graph file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Trellis operations.
pub type Result<T> = std::result::Result<T, TrellisError>;
