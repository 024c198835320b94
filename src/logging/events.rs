//! Sync event log: one JSON line per noteworthy sync-layer event.
//!
//! Background poll failures are never shown to the user, so this file is
//! where they go. Transport and application failures get distinct kinds.
//!
//! Log file: `~/.sinon-dash/events.jsonl`

use std::fmt;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// Which operation an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventFamily {
    Session,
    Auth,
    Control,
    Status,
    Streams,
}

impl fmt::Display for EventFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Auth => write!(f, "auth"),
            Self::Control => write!(f, "control"),
            Self::Status => write!(f, "status"),
            Self::Streams => write!(f, "streams"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A response was applied to the display.
    Applied,
    /// A response arrived after a newer one had been applied and was dropped.
    Stale,
    /// A scheduled tick found the previous poll still in flight.
    Skipped,
    /// Network, HTTP status or decode failure.
    TransportError,
    /// The server answered with an `error` field.
    AppError,
    Warning,
}

impl EventKind {
    pub fn for_error(err: &ApiError) -> Self {
        if err.is_transport() {
            Self::TransportError
        } else {
            Self::AppError
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Stale => write!(f, "stale"),
            Self::Skipped => write!(f, "skipped"),
            Self::TransportError => write!(f, "transport-error"),
            Self::AppError => write!(f, "app-error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// One line of `events.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    pub timestamp: String,
    pub family: EventFamily,
    pub kind: EventKind,
    /// Poll sequence number, for poll families.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seq: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Best-effort appender for [`SyncEvent`]s. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
    echo: bool,
}

impl EventLog {
    /// Log to `~/.sinon-dash/events.jsonl` when enabled in config.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            path: if config.enabled { events_log_path() } else { None },
            echo: config.echo,
        }
    }

    /// Log to an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            echo: false,
        }
    }

    /// Drop every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(
        &self,
        family: EventFamily,
        kind: EventKind,
        seq: Option<u64>,
        detail: Option<String>,
    ) {
        if self.path.is_none() && !self.echo {
            return;
        }

        let event = SyncEvent {
            timestamp: Utc::now().to_rfc3339(),
            family,
            kind,
            seq,
            detail,
        };

        if self.echo {
            echo_event(&event);
        }
        let _ = self.append(&event);
    }

    /// Record a failed call with the kind derived from the error.
    pub fn error(&self, family: EventFamily, seq: Option<u64>, err: &ApiError) {
        self.record(family, EventKind::for_error(err), seq, Some(err.to_string()));
    }

    fn append(&self, event: &SyncEvent) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(event)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

fn echo_event(event: &SyncEvent) {
    let line = format!(
        "[{}] {} {}{}",
        event.family,
        event.kind,
        event.seq.map(|s| format!("#{s} ")).unwrap_or_default(),
        event.detail.as_deref().unwrap_or("")
    );
    match event.kind {
        EventKind::TransportError | EventKind::AppError => eprintln!("{}", line.red()),
        EventKind::Warning => eprintln!("{}", line.yellow()),
        _ => eprintln!("{}", line.dimmed()),
    }
}

/// Return the path to the event log file.
pub fn events_log_path() -> Option<PathBuf> {
    crate::config::state_dir().map(|dir| dir.join("events.jsonl"))
}
