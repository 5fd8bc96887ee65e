//! Error types for task execution

use cdm_client::ClientError;
use thiserror::Error;

/// Errors that end a task invocation
///
/// Every variant renders its message verbatim so it can be handed to the
/// host runtime as the failure `msg`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// Task parameters failed validation
    #[error("{0}")]
    Argument(String),

    /// Credentials are missing or inconsistent
    #[error("{0}")]
    Configuration(String),

    /// The client handle could not be opened
    #[error("{0}")]
    Connection(String),

    /// The cluster operation failed
    #[error("{0}")]
    Operation(String),

    /// The task's argument schema is malformed
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ModuleError {
    /// Wrap a client failure raised while opening the handle
    #[must_use]
    pub fn connection(err: ClientError) -> Self {
        ModuleError::Connection(err.to_string())
    }

    /// Wrap a client failure raised by a cluster operation
    #[must_use]
    pub fn operation(err: ClientError) -> Self {
        ModuleError::Operation(err.to_string())
    }

    /// Short category name, used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleError::Argument(_) => "argument",
            ModuleError::Configuration(_) => "configuration",
            ModuleError::Connection(_) => "connection",
            ModuleError::Operation(_) => "operation",
            ModuleError::Schema(_) => "schema",
        }
    }
}

/// Errors raised while composing argument schemas
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A parameter name or alias is declared twice
    #[error("parameter '{0}' is declared by both the task and the shared credential schema")]
    Collision(String),
}
