//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use ubikial_github::RemoteError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Persona not found
    #[error("Persona not found: {0}")]
    PersonaNotFound(String),

    /// A persona with this id already exists in the collection
    #[error("Persona already exists: {0}")]
    DuplicatePersona(String),

    /// No linked account for the platform
    #[error("No linked account for platform: {0}")]
    CredentialNotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Encryption/decryption failure (wrong passphrase, tampered envelope)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// The session has been closed
    #[error("Session is closed")]
    SessionClosed,

    /// Operation not supported by the selected storage backend
    #[error("Operation '{operation}' is not supported by the {backend} backend")]
    BackendUnsupported { backend: String, operation: String },

    /// Remote repository host error (converting from library)
    #[error("{0}")]
    Remote(#[from] RemoteError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::PersonaNotFound(_)
            | Self::DuplicatePersona(_)
            | Self::CredentialNotFound(_)
            | Self::ValidationError(_)
            | Self::SessionClosed
            | Self::BackendUnsupported { .. } => true,
            Self::Remote(e) => e.is_expected(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
