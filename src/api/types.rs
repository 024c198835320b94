//! Wire types for the bot dashboard endpoints.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::ApiError;

// ---------------------------------------------------------------------------
// Control actions
// ---------------------------------------------------------------------------

/// A bot lifecycle command accepted by `POST /api/control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Start,
    Restart,
    Shutdown,
}

impl ControlAction {
    pub const ALL: [ControlAction; 3] = [Self::Start, Self::Restart, Self::Shutdown];

    /// Form value sent as `action=<value>`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Restart => "restart",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown control action '{0}' (expected start, restart or shutdown)")]
pub struct UnknownAction(pub String);

impl FromStr for ControlAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "restart" => Ok(Self::Restart),
            "shutdown" => Ok(Self::Shutdown),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// `GET /api/check-auth`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthCheck {
    #[serde(default)]
    pub authenticated: bool,
}

/// Body shared by `/api/auth` and `/api/control`: exactly one of the fields
/// is expected to be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiReply {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            error: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(text.into()),
        }
    }

    /// Collapse the reply into the message text or a rejection.
    ///
    /// `message` wins when a server sends both.
    pub fn into_result(self) -> Result<String, ApiError> {
        match (self.message, self.error) {
            (Some(message), _) => Ok(message),
            (None, Some(error)) => Err(ApiError::Rejected(error)),
            (None, None) => Err(ApiError::Decode(
                "reply carried neither 'message' nor 'error'".to_string(),
            )),
        }
    }
}

/// `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReply {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Stream history
// ---------------------------------------------------------------------------

/// One entry of `GET /api/detailed_streams`.
///
/// Any field may be missing, `null` or of an unexpected type; such values
/// decode as absent so one odd record never fails the whole map. Time and
/// duration fields are kept as display strings since the server formats them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(default, deserialize_with = "lenient_name")]
    pub streamer_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub peak_viewers: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub duration: Option<String>,
}

/// Stream history keyed by the server's opaque id. Ordered by id so that
/// rendering is stable between polls.
pub type StreamMap = BTreeMap<String, StreamRecord>;

/// Accept a string, a number, or null for a display field.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Accept a non-negative integer, an integral float, or a numeric string.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(integral_count)),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_count))
        }
        _ => None,
    })
}

fn integral_count(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then(|| f as u64)
}
