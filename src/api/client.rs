/// Blocking HTTP implementation of [`Backend`].
///
/// Uses a single `ureq::Agent` for the lifetime of the dashboard. The agent's
/// cookie store is the "ambient credential": whatever session cookie the
/// server sets on `/api/auth` is sent back on `/api/control` and
/// `/api/check-auth` without the sync layer knowing about it.
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::types::{ApiReply, AuthCheck, ControlAction, StatusReply, StreamMap};
use super::{ApiError, Backend};
use crate::config::schema::BackendConfig;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.agent.get(&self.url(path)).call().map_err(status_or_transport)?;
        resp.into_json::<T>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// POST a form and interpret the `{message}` / `{error}` reply.
    ///
    /// A non-2xx answer that still carries an `error` field is treated as an
    /// application rejection (the server said no), not a transport failure.
    fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<String, ApiError> {
        match self.agent.post(&self.url(path)).send_form(fields) {
            Ok(resp) => resp
                .into_json::<ApiReply>()
                .map_err(|e| ApiError::Decode(e.to_string()))?
                .into_result(),
            Err(ureq::Error::Status(code, resp)) => match resp.into_json::<ApiReply>() {
                Ok(ApiReply {
                    error: Some(error), ..
                }) => Err(ApiError::Rejected(error)),
                _ => Err(ApiError::Http { status: code }),
            },
            Err(ureq::Error::Transport(transport)) => {
                Err(ApiError::Transport(transport.to_string()))
            }
        }
    }
}

impl Backend for HttpBackend {
    fn check_auth(&self) -> Result<AuthCheck, ApiError> {
        self.get_json("/api/check-auth")
    }

    fn authenticate(&self, password: &str) -> Result<String, ApiError> {
        self.post_form("/api/auth", &[("password", password)])
    }

    fn control(&self, action: ControlAction) -> Result<String, ApiError> {
        self.post_form("/api/control", &[("action", action.as_str())])
    }

    fn status(&self) -> Result<StatusReply, ApiError> {
        self.get_json("/api/status")
    }

    fn detailed_streams(&self) -> Result<StreamMap, ApiError> {
        self.get_json("/api/detailed_streams")
    }
}

fn status_or_transport(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(code, _) => ApiError::Http { status: code },
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

/// Strip trailing slashes and pin `localhost` to IPv4.
///
/// On some hosts "localhost" resolves to `::1` first, which stalls until the
/// connect timeout when the server only binds IPv4.
fn normalize_base_url(raw: &str) -> String {
    raw.trim()
        .trim_end_matches('/')
        .replace("://localhost", "://127.0.0.1")
}
