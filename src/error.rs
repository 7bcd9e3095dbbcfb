//! Error types for nui-events.
//!
//! The subscription hook itself never fails; errors only arise at the host
//! boundary, where raw messages are decoded and queued, and while loading
//! configuration.

use thiserror::Error;

/// Errors raised while decoding a host envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Malformed host message: {message}")]
    Malformed {
        message: String,
    },

    #[error("Host message field '{field}' cannot be empty")]
    EmptyField {
        field: &'static str,
    },
}

/// Errors raised by the host inbox.
#[derive(Debug, Error)]
pub enum InboxError {
    #[error("Host inbox is full (capacity {capacity})")]
    Full {
        capacity: usize,
    },

    #[error("Host inbox is closed")]
    Closed,
}

/// Top-level error type for nui-events.
#[derive(Debug, Error)]
pub enum NuiError {
    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("Inbox error: {0}")]
    Inbox(#[from] InboxError),

    #[error("Payload for '{event}' could not be decoded: {message}")]
    Payload {
        event: String,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },
}

impl NuiError {
    /// Creates a payload decoding error for the given event name.
    #[must_use]
    pub fn payload(event: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::Payload {
            event: event.into(),
            message: err.to_string(),
        }
    }

    /// Returns true if this is an envelope error.
    #[must_use]
    pub const fn is_envelope(&self) -> bool {
        matches!(self, Self::Envelope(_))
    }

    /// Returns true if this is an inbox error.
    #[must_use]
    pub const fn is_inbox(&self) -> bool {
        matches!(self, Self::Inbox(_))
    }

    /// Returns true if this is a payload error.
    #[must_use]
    pub const fn is_payload(&self) -> bool {
        matches!(self, Self::Payload { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if this error is retryable.
    ///
    /// Only a full inbox clears up on its own once the control thread pumps.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Inbox(InboxError::Full { .. }))
    }
}

/// Result type alias for nui-events operations.
pub type NuiResult<T> = Result<T, NuiError>;
