use thiserror::Error;

/// Failure of a single backend call.
///
/// `Rejected` is the only application-level failure: the server answered and
/// put an `error` field in the body. Everything else means the request never
/// produced a usable answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("could not reach server: {0}")]
    Transport(String),
    #[error("server responded with HTTP {status}")]
    Http { status: u16 },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// `true` for network, HTTP status and decode failures.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}
