/// Configuration schema and defaults for sinon-dash.
///
/// Defines the TOML-serializable configuration: `[backend]`, `[polling]`,
/// `[session]`, `[display]` and `[logging]`. Every field has a built-in
/// default; users only set the values they want to change.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::render::streams::Layout;
use crate::render::theme::Theme;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level dashboard configuration.
///
/// Maps directly to `~/.sinon-dash/config.toml` and `.sinon-dash.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub session: SessionConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where the bot's dashboard API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; endpoint paths (`/api/...`) are appended to it.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [polling]
// ---------------------------------------------------------------------------

/// Intervals of the two independent poll families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub status_interval_secs: u64,
    pub streams_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: 5,
            streams_interval_secs: 30,
        }
    }
}

impl PollingConfig {
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs.max(1))
    }

    pub fn streams_interval(&self) -> Duration {
        Duration::from_secs(self.streams_interval_secs.max(1))
    }
}

// ---------------------------------------------------------------------------
// [session]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Ask `/api/check-auth` for an existing session when the dashboard starts.
    pub check_on_startup: bool,
    /// Let a confirmed existing session hide the login prompt. When `false`
    /// the check result is recorded and logged only.
    pub gate_on_check: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            check_on_startup: true,
            gate_on_check: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub theme: Theme,
    pub layout: Layout,
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Sync-event log (`~/.sinon-dash/events.jsonl`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Mirror every event line to stderr.
    pub echo: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            echo: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl DashConfig {
    /// The commented TOML written by `sinon-dash config init`.
    pub fn default_toml() -> &'static str {
        r#"# sinon-dash configuration
#
# Layers (later wins): built-in defaults, this file, .sinon-dash.toml in the
# working directory, SINON_DASH_* environment variables.

[backend]
# Base URL of the bot dashboard API.
base_url = "http://127.0.0.1:5000"
# Per-request timeout in milliseconds.
timeout_ms = 10000

[polling]
# Bot status refresh interval (seconds).
status_interval_secs = 5
# Stream history refresh interval (seconds).
streams_interval_secs = 30

[session]
# Check for an existing login session on startup.
check_on_startup = true
# Skip the login prompt when that check finds a session.
gate_on_check = true

[display]
# "dark" or "light"
theme = "dark"
# "cards" or "table"
layout = "cards"

[logging]
# Append sync events to ~/.sinon-dash/events.jsonl
enabled = true
# Also print each event to stderr.
echo = false
"#
    }
}
