use thiserror::Error;

use crate::adapter::AdapterId;

/// Unified error type for adapter resolution and gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Invalid gateway configuration, including retired connection-string selectors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The adapter was not registered and loading its unit failed
    #[error("Failed to load adapter '{adapter}' from '{path}': {reason}")]
    AdapterLoad {
        adapter: AdapterId,
        path: String,
        reason: String,
    },

    /// The adapter unit loaded but did not register the requested adapter
    #[error("Adapter '{adapter}' was loaded from '{path}' but is still not registered")]
    AdapterDefect { adapter: AdapterId, path: String },

    /// Adapter lookup without a load attempt (migrator resolution)
    #[error("Adapter '{0}' is not registered")]
    AdapterNotRegistered(AdapterId),

    /// Adapter namespace exposes neither a Gateway nor a Repository type
    #[error("Adapter '{0}' does not expose a Gateway or Repository type")]
    MissingGatewayType(AdapterId),

    /// Gateway type never declared which adapter it belongs to
    #[error("{type_name} is missing the adapter identifier")]
    MissingAdapterIdentifier { type_name: String },

    /// Adapter has no Migrator type registered
    #[error("Adapter '{0}' does not provide a migrator")]
    MigratorNotPresent(AdapterId),

    /// Arguments supplied in a combination the resolver cannot accept
    #[error("Argument error: {0}")]
    Argument(String),

    /// Operation not supported by this gateway
    #[error("Operation not supported: {0}")]
    OperationNotSupported(String),

    /// Dataset or other named resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Gateway was used after disconnect
    #[error("Gateway disconnected: {0}")]
    Disconnected(String),

    /// Record could not be interpreted as a tuple
    #[error("Invalid tuple: {0}")]
    InvalidTuple(String),

    /// Generic backend error
    #[error("Backend error: {0}")]
    Backend(String),
}

impl GatewayError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        GatewayError::Configuration(msg.into())
    }

    /// Create an argument error
    pub fn argument(msg: impl Into<String>) -> Self {
        GatewayError::Argument(msg.into())
    }

    /// Create an operation not supported error
    pub fn operation_not_supported(msg: impl Into<String>) -> Self {
        GatewayError::OperationNotSupported(msg.into())
    }

    /// Create a "not found" error with custom message
    pub fn not_found(msg: impl Into<String>) -> Self {
        GatewayError::NotFound(msg.into())
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        GatewayError::Backend(msg.into())
    }

    /// Create a missing adapter identifier error for the given type
    pub fn missing_adapter_identifier(type_name: impl Into<String>) -> Self {
        GatewayError::MissingAdapterIdentifier {
            type_name: type_name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
