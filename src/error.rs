use thiserror::Error;

/// Failure taxonomy for one enumeration or toggle pass.
///
/// Nothing here is fatal to the host: callers degrade to partial or
/// placeholder data and the event loop keeps running.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Correlation or matching found nothing. An expected outcome, not a
    /// fault: callers treat it as "no display to report".
    #[error("no matching display")]
    NotFound,

    /// An OS query or mutation returned failure.
    #[error("{call} failed with code {code}")]
    OsCallFailed { call: &'static str, code: i32 },

    /// A state change was requested on a display without HDR capability.
    #[error("display does not support HDR")]
    HdrUnsupported,

    /// The serialized display list would exceed its size ceiling.
    #[error("display list exceeds the {limit} byte ceiling")]
    BufferExceeded { limit: usize },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
