//! Error type shared by every sequence, pull and producer.
//!
//! A single failure has to reach every pending and future pull of a failed
//! dispatcher, so [`SeqError`] is cheaply cloneable: foreign error payloads are
//! held behind an [`Arc`].

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for sequence operations.
pub type Result<T> = std::result::Result<T, SeqError>;

/// Every way a sequence can fail.
#[derive(Error, Debug, Clone)]
pub enum SeqError {
    /// A constructor was given input it cannot build a sequence from.
    #[error("cannot construct sequence: {0}")]
    Construction(String),

    /// A producer or a combinator callback failed.
    #[error("producer failed: {0}")]
    Producer(Arc<dyn StdError + Send + Sync + 'static>),

    /// A producer failed with a plain message.
    #[error("{0}")]
    Message(String),

    /// The producer task was aborted or panicked before finishing.
    #[error("producer task aborted before finishing")]
    Aborted,

    /// The producer emitted into a sequence nobody consumes any more.
    #[error("sequence consumer is gone")]
    Detached,

    /// A pending pull lost its dispatcher.
    #[error("dispatcher disconnected while a pull was pending")]
    Disconnected,
}

impl SeqError {
    /// Wrap any error as a producer failure.
    pub fn producer<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(error))
    }

    /// A producer failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Whether this is the error a producer sees after its consumer went away.
    pub fn is_detached(&self) -> bool {
        matches!(self, Self::Detached)
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for SeqError {
    fn from(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self::Producer(Arc::from(error))
    }
}

impl From<String> for SeqError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for SeqError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<std::convert::Infallible> for SeqError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Two errors are equal when they are the same failure: same variant and same
/// message, or for wrapped errors the very same allocation.
impl PartialEq for SeqError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Construction(a), Self::Construction(b)) => a == b,
            (Self::Producer(a), Self::Producer(b)) => Arc::ptr_eq(a, b),
            (Self::Message(a), Self::Message(b)) => a == b,
            (Self::Aborted, Self::Aborted)
            | (Self::Detached, Self::Detached)
            | (Self::Disconnected, Self::Disconnected) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_clone_keeps_wrapped_identity() {
        let error = SeqError::producer(io::Error::new(io::ErrorKind::Other, "boom"));
        let copy = error.clone();
        assert_eq!(error, copy);
        assert_eq!(copy.to_string(), "producer failed: boom");
    }

    #[test]
    fn test_distinct_wrapped_errors_differ() {
        let a = SeqError::producer(io::Error::new(io::ErrorKind::Other, "boom"));
        let b = SeqError::producer(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_message_conversions() {
        assert_eq!(SeqError::from("nope"), SeqError::msg("nope"));
        assert_eq!(SeqError::from(String::from("nope")).to_string(), "nope");
        assert!(SeqError::Detached.is_detached());
    }
}
