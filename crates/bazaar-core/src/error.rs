//! Error types for the Bazaar engine.

use thiserror::Error;

/// A shared error type for the whole engine.
///
/// Each variant corresponds to one recovery strategy: validation errors are
/// re-requested from the user, not-found errors become terminal screens,
/// domain rejections are surfaced verbatim, and transport failures are logged
/// and otherwise ignored.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BazaarError {
    /// User input was malformed or out of range
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Referenced entity, session or message no longer exists
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business-rule rejection from a domain service
    #[error("{message}")]
    Domain {
        service: &'static str,
        message: String,
    },

    /// Outbound channel call failed
    #[error("Channel transport error: {0}")]
    Transport(String),

    /// A context-bag entry exists but does not decode as the declared type
    #[error("Context entry '{key}': {message}")]
    Context { key: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BazaarError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a Domain error carrying the rejecting service's message
    pub fn domain(service: &'static str, message: impl Into<String>) -> Self {
        Self::Domain {
            service,
            message: message.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Context error
    pub fn context(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Context {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Domain error
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain { .. })
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<toml::de::Error> for BazaarError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A type alias for `Result<T, BazaarError>`.
pub type Result<T> = std::result::Result<T, BazaarError>;
