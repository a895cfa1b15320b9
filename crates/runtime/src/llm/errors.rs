use thiserror::Error;

/// Errors from completion endpoint calls.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// The request never got a response.
    #[error("network: {0}")]
    Network(String),

    /// The provider answered with an error status.
    #[error("provider api: {0}")]
    Api(String),

    /// The provider's response could not be understood.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
