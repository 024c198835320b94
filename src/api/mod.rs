//! Backend API surface consumed by the dashboard.
//!
//! [`Backend`] is the seam between the sync layer and the network: the
//! production implementation is [`HttpBackend`] (blocking `ureq` agent with a
//! cookie store, so the session established by `/api/auth` rides along on
//! later calls). Tests substitute scripted implementations.

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpBackend;
pub use error::ApiError;
pub use types::{ApiReply, AuthCheck, ControlAction, StatusReply, StreamMap, StreamRecord};

/// One method per backend endpoint.
///
/// Implementations must be shareable across the poller threads.
pub trait Backend: Send + Sync {
    /// `GET /api/check-auth`
    fn check_auth(&self) -> Result<AuthCheck, ApiError>;

    /// `POST /api/auth`; returns the server's success message.
    fn authenticate(&self, password: &str) -> Result<String, ApiError>;

    /// `POST /api/control`; returns the server's success message.
    fn control(&self, action: ControlAction) -> Result<String, ApiError>;

    /// `GET /api/status`
    fn status(&self) -> Result<StatusReply, ApiError>;

    /// `GET /api/detailed_streams`
    fn detailed_streams(&self) -> Result<StreamMap, ApiError>;
}
