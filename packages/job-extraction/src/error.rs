//! Typed errors for the job extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Lookup misses and retry exhaustion are deliberately absent here: both
//! resolve to absent fields rather than errors.

use thiserror::Error;

/// Errors raised while configuring extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A site pattern failed to compile as a regular expression
    #[error("invalid site pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration value could not be parsed
    #[error("config error: {0}")]
    Config(String),
}

/// Errors surfaced to the caller of the relay.
///
/// These end up as the `error` field of a response payload, never as a
/// fault in the hosting process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The request did not come from an addressable tab
    #[error("Tab ID is undefined")]
    TabIdUndefined,

    /// No content receiver in the tab, even after injecting it
    #[error("Could not establish connection. Receiving end does not exist.")]
    NoReceiver,

    /// Injecting the content logic into the tab failed
    #[error("injection failed: {0}")]
    Injection(String),

    /// Forwarding the message failed for another reason
    #[error("{0}")]
    Send(String),
}

/// Failure of a tab-addressed message send.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// No content-side handler is registered in the tab
    #[error("no receiver in tab")]
    NoReceiver,

    /// Any other transport failure (closed tab, dropped channel)
    #[error("send failed: {0}")]
    Other(String),
}

/// Failure of a script injection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot inject into tab: {reason}")]
pub struct InjectError {
    pub reason: String,
}

impl InjectError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<SendError> for RelayError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::NoReceiver => RelayError::NoReceiver,
            SendError::Other(msg) => RelayError::Send(msg),
        }
    }
}

impl From<InjectError> for RelayError {
    fn from(err: InjectError) -> Self {
        RelayError::Injection(err.reason)
    }
}

/// Result type alias for extraction setup operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for relay operations.
pub type RelayResult<T> = std::result::Result<T, RelayError>;
