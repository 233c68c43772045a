//! Error types for messenger construction and delivery.

use thiserror::Error;

/// Boxed error produced by an external provider SDK.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for messenger operations.
pub type MessengerResult<T> = Result<T, MessengerError>;

/// Errors that can occur while building a messenger or pushing a message.
///
/// `Config` and `Credential` are only produced at construction time, so a
/// caller never holds a half-initialized messenger. The remaining variants
/// abort a single push and leave the messenger usable.
#[derive(Debug, Error)]
pub enum MessengerError {
    /// The configuration blob is malformed or incomplete.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The identity check against the provider account failed.
    #[error("Credential check failed: {0}")]
    Credential(#[source] BoxError),

    /// A required per-message attribute is absent or has the wrong type.
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// The message could not be encoded to its wire format.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The provider call itself failed.
    #[error(transparent)]
    Transport(BoxError),

    /// No constructor is registered under the requested provider name.
    #[error("Unknown messenger provider: {0}")]
    UnknownProvider(String),
}

impl MessengerError {
    /// Wrap a provider SDK error without altering it.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transport(err.into())
    }

    /// Whether the error was raised while constructing a messenger.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Credential(_) | Self::UnknownProvider(_)
        )
    }
}

impl From<serde_json::Error> for MessengerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<lettre::error::Error> for MessengerError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<lettre::address::AddressError> for MessengerError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::Serialization(err.to_string())
    }
}
