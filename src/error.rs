//! Error types for model building and job-data generation

use thiserror::Error;

/// Taxonomy class of a [`ModelError`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateEntity,
    ReferentialIntegrity,
    MissingDependency,
    InvalidArgument,
    UnsupportedOperation,
    Io,
}

/// Main error type for model operations
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    #[error("Referential integrity violated: {0}")]
    ReferentialIntegrity(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Node {0} not found in part")]
    NodeNotFound(usize),

    #[error("Element {0} not found in part")]
    ElementNotFound(usize),

    #[error("Section '{0}' not found in part")]
    SectionNotFound(String),

    #[error("Part '{0}' not found in model")]
    PartNotFound(String),

    #[error("Instance '{0}' not found in model")]
    InstanceNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ModelError {
    /// Classify the error. Lookup failures count as referential integrity
    /// violations, config parse failures as invalid arguments.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateEntity(_) => ErrorKind::DuplicateEntity,
            Self::ReferentialIntegrity(_)
            | Self::NodeNotFound(_)
            | Self::ElementNotFound(_)
            | Self::SectionNotFound(_)
            | Self::PartNotFound(_)
            | Self::InstanceNotFound(_) => ErrorKind::ReferentialIntegrity,
            Self::MissingDependency(_) => ErrorKind::MissingDependency,
            Self::InvalidArgument(_) | Self::SerializationError(_) => ErrorKind::InvalidArgument,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::IoError(_) => ErrorKind::Io,
        }
    }
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
