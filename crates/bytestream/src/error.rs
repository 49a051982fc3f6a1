use thiserror::Error;

/// Failure of a [`Stream`](crate::Stream) operation over a source whose own
/// failures are of type `E`.
#[derive(Error, Debug, PartialEq)]
pub enum StreamError<E> {
    /// The source ran out before a fixed-size request could be satisfied.
    ///
    /// Whatever the source did deliver stays buffered in the stream.
    #[error("insufficient data")]
    InsufficientData,
    /// The source failed.
    #[error("source error: {0}")]
    Source(E),
}

impl<E> StreamError<E> {
    /// Whether this is the end-of-input condition rather than a source failure.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData)
    }

    /// The underlying source error, if any.
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::InsufficientData => None,
            Self::Source(err) => Some(err),
        }
    }
}

/// Result of a [`Stream`](crate::Stream) operation.
pub type StreamResult<T, E> = Result<T, StreamError<E>>;
