//! Error types for volscope
//!
//! Every cluster call is wrapped into one of these variants so the CLI can
//! print a short message and pick an exit code.

use thiserror::Error;

/// Unified error type for the inspection commands
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Kubernetes Errors
    // =========================================================================
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("failed to list {resource}: {reason}")]
    ListFailed { resource: String, reason: String },

    #[error("Resource not found: {kind}/{name}")]
    ResourceNotFound { kind: String, name: String },

    #[error("volume {name} is not managed by a supported plugin (driver: {driver})")]
    UnsupportedVolume { name: String, driver: String },

    // =========================================================================
    // Rendering Errors
    // =========================================================================
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a failed list call with the resource it was listing
    pub fn list_failed(resource: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Error::ListFailed {
            resource: resource.into(),
            reason: source.to_string(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // EX_CONFIG
            Error::Configuration(_) => 78,
            // EX_IOERR
            Error::Io(_) => 74,
            _ => 1,
        }
    }

    /// Check if this error means the object simply is not there
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::ResourceNotFound { .. } => true,
            Error::Kube(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }
}

/// Result type alias for volscope
pub type Result<T> = std::result::Result<T, Error>;
