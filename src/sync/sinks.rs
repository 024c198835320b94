//! UI sinks the controller writes to.
//!
//! Each sink is injected once at construction; the controller never reaches
//! for UI state any other way. All implementations must be thread-safe since
//! poll results are applied from the poller threads.

use std::sync::Arc;

use crate::render::status::BotStatus;
use crate::render::streams::StreamCard;

use super::session::SessionState;

/// Target of the single bot status indicator.
pub trait StatusSink: Send + Sync {
    fn show_status(&self, status: &BotStatus);
}

/// Container of the rendered stream list. Always receives the complete list.
pub trait StreamsSink: Send + Sync {
    fn show_streams(&self, cards: &[StreamCard]);
}

/// Consumer of the session flag: the login form and the control buttons
/// derive their visibility from it.
pub trait SessionSink: Send + Sync {
    fn show_session(&self, state: SessionState);
}

/// The credential submit control.
pub trait SubmitControl: Send + Sync {
    fn set_submit_enabled(&self, enabled: bool);
}

/// User-visible feedback for user-initiated operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// The full set of sinks handed to a controller.
#[derive(Clone)]
pub struct Sinks {
    pub status: Arc<dyn StatusSink>,
    pub streams: Arc<dyn StreamsSink>,
    pub session: Arc<dyn SessionSink>,
    pub submit: Arc<dyn SubmitControl>,
    pub notifier: Arc<dyn Notifier>,
}

impl Sinks {
    /// Use one object for every sink.
    pub fn shared<T>(ui: Arc<T>) -> Self
    where
        T: StatusSink + StreamsSink + SessionSink + SubmitControl + Notifier + 'static,
    {
        Self {
            status: ui.clone(),
            streams: ui.clone(),
            session: ui.clone(),
            submit: ui.clone(),
            notifier: ui,
        }
    }
}
