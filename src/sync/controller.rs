//! The status/auth/streams synchronization controller.
//!
//! Three kinds of operations run against the backend independently:
//!
//! - **User actions** (`authenticate`, `dispatch_control`): every outcome is
//!   surfaced through the notifier.
//! - **Polls** (`poll_status`, `poll_streams`): failures are logged only and
//!   the last applied result stays on display.
//! - **Session check** (`check_session`): once at startup, logged only.
//!
//! Requests run without holding the state lock. Results are applied to state
//! and sinks under the lock, so display updates are serialized, and each poll
//! family only ever moves forward in sequence number.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{ApiError, Backend, ControlAction, StreamMap};
use crate::logging::{EventFamily, EventKind, EventLog};
use crate::render::status::BotStatus;
use crate::render::streams::{StreamCard, render_cards};

use super::gate::{PollGate, PollTrigger, Ticket};
use super::session::SessionState;
use super::sinks::{Notice, Sinks, SubmitControl};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The two independently scheduled poll families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollFamily {
    Status,
    Streams,
}

impl PollFamily {
    fn event_family(self) -> EventFamily {
        match self {
            Self::Status => EventFamily::Status,
            Self::Streams => EventFamily::Streams,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The response is now on display.
    Applied,
    /// A newer response was already applied; this one was dropped.
    Stale,
    /// Scheduled tick skipped because the previous poll had not settled.
    Skipped,
    /// The request failed; the previous display is untouched.
    Failed(ApiError),
    /// The controller was shut down before the response arrived.
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(String),
    Rejected(String),
    Failed(ApiError),
    /// Refused locally, no request made.
    EmptyPassword,
    /// Another submission is still in flight; no request made.
    AlreadySubmitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    Accepted(String),
    Rejected(String),
    Failed(ApiError),
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    /// Push a session confirmed by `check_session` to the session sink.
    pub gate_on_check: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            gate_on_check: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SyncState {
    session: SessionState,
    status: Option<BotStatus>,
    streams: Option<StreamMap>,
    status_gate: PollGate,
    streams_gate: PollGate,
    torn_down: bool,
}

impl SyncState {
    fn gate_mut(&mut self, family: PollFamily) -> &mut PollGate {
        match family {
            PollFamily::Status => &mut self.status_gate,
            PollFamily::Streams => &mut self.streams_gate,
        }
    }
}

pub struct SyncController {
    backend: Arc<dyn Backend>,
    sinks: Sinks,
    log: EventLog,
    options: ControllerOptions,
    state: Mutex<SyncState>,
    submitting: AtomicBool,
}

impl SyncController {
    pub fn new(backend: Arc<dyn Backend>, sinks: Sinks, log: EventLog) -> Self {
        Self {
            backend,
            sinks,
            log,
            options: ControllerOptions::default(),
            state: Mutex::new(SyncState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        // A panicking sink must not take the whole dashboard down with it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- Accessors --

    pub fn session(&self) -> SessionState {
        self.lock().session
    }

    pub fn status(&self) -> Option<BotStatus> {
        self.lock().status.clone()
    }

    pub fn streams(&self) -> Option<StreamMap> {
        self.lock().streams.clone()
    }

    pub fn cards(&self) -> Vec<StreamCard> {
        self.lock()
            .streams
            .as_ref()
            .map(render_cards)
            .unwrap_or_default()
    }

    pub fn is_torn_down(&self) -> bool {
        self.lock().torn_down
    }

    /// Push the current session flag to the session sink.
    pub fn announce_session(&self) {
        let state = self.lock();
        self.sinks.session.show_session(state.session);
    }

    /// Stop applying results. Responses arriving afterwards are dropped.
    pub fn shutdown(&self) {
        self.lock().torn_down = true;
    }

    // -- Session --

    /// Ask the server whether the ambient credentials already carry a
    /// session. Never fails: on error the state stays as it was.
    pub fn check_session(&self) -> SessionState {
        match self.backend.check_auth() {
            Ok(check) => {
                self.log.record(
                    EventFamily::Session,
                    EventKind::Applied,
                    None,
                    Some(format!("authenticated={}", check.authenticated)),
                );
                let mut state = self.lock();
                if check.authenticated && !state.torn_down {
                    state.session = SessionState::Authenticated;
                    if self.options.gate_on_check {
                        self.sinks.session.show_session(state.session);
                    }
                }
                state.session
            }
            Err(err) => {
                self.log.error(EventFamily::Session, None, &err);
                self.session()
            }
        }
    }

    pub fn authenticate(&self, password: &str) -> AuthOutcome {
        if password.is_empty() {
            self.sinks
                .notifier
                .notify(Notice::Error("Password is required.".to_string()));
            return AuthOutcome::EmptyPassword;
        }

        let Some(_guard) = SubmitGuard::engage(&self.submitting, self.sinks.submit.as_ref())
        else {
            return AuthOutcome::AlreadySubmitting;
        };

        match self.backend.authenticate(password) {
            Ok(message) => {
                {
                    let mut state = self.lock();
                    state.session = SessionState::Authenticated;
                    self.sinks.session.show_session(state.session);
                }
                self.log
                    .record(EventFamily::Auth, EventKind::Applied, None, None);
                self.sinks.notifier.notify(Notice::Info(message.clone()));
                AuthOutcome::Authenticated(message)
            }
            Err(ApiError::Rejected(reason)) => {
                self.log.record(
                    EventFamily::Auth,
                    EventKind::AppError,
                    None,
                    Some(reason.clone()),
                );
                self.sinks.notifier.notify(Notice::Error(reason.clone()));
                AuthOutcome::Rejected(reason)
            }
            Err(err) => {
                self.log.error(EventFamily::Auth, None, &err);
                self.sinks
                    .notifier
                    .notify(Notice::Error(format!("Authentication failed: {err}")));
                AuthOutcome::Failed(err)
            }
        }
    }

    // -- Control --

    /// Send a control command. The server decides whether the session may
    /// use it; this side only warns when no session is known.
    pub fn dispatch_control(&self, action: ControlAction) -> ControlOutcome {
        if !self.session().is_authenticated() {
            self.log.record(
                EventFamily::Control,
                EventKind::Warning,
                None,
                Some(format!("'{action}' sent without an authenticated session")),
            );
        }

        match self.backend.control(action) {
            Ok(message) => {
                self.log.record(
                    EventFamily::Control,
                    EventKind::Applied,
                    None,
                    Some(action.to_string()),
                );
                self.sinks.notifier.notify(Notice::Info(message.clone()));
                ControlOutcome::Accepted(message)
            }
            Err(ApiError::Rejected(reason)) => {
                self.log.record(
                    EventFamily::Control,
                    EventKind::AppError,
                    None,
                    Some(format!("{action}: {reason}")),
                );
                self.sinks.notifier.notify(Notice::Error(reason.clone()));
                ControlOutcome::Rejected(reason)
            }
            Err(err) => {
                self.log.error(EventFamily::Control, None, &err);
                self.sinks
                    .notifier
                    .notify(Notice::Error(format!("Could not send '{action}': {err}")));
                ControlOutcome::Failed(err)
            }
        }
    }

    // -- Polling --

    pub fn poll(&self, family: PollFamily, trigger: PollTrigger) -> PollOutcome {
        match family {
            PollFamily::Status => self.poll_status(trigger),
            PollFamily::Streams => self.poll_streams(trigger),
        }
    }

    pub fn poll_status(&self, trigger: PollTrigger) -> PollOutcome {
        let ticket = match self.begin_poll(PollFamily::Status, trigger) {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };

        let result = self.backend.status();

        self.finish_poll(PollFamily::Status, ticket, result, |state, reply| {
            let status = BotStatus::new(reply.status);
            self.sinks.status.show_status(&status);
            state.status = Some(status);
        })
    }

    pub fn poll_streams(&self, trigger: PollTrigger) -> PollOutcome {
        let ticket = match self.begin_poll(PollFamily::Streams, trigger) {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };

        let result = self.backend.detailed_streams();

        self.finish_poll(PollFamily::Streams, ticket, result, |state, streams| {
            self.sinks.streams.show_streams(&render_cards(&streams));
            state.streams = Some(streams);
        })
    }

    /// Log a timer tick that was missed because a poll outlasted the interval.
    pub fn record_missed_tick(&self, family: PollFamily) {
        self.log.record(
            family.event_family(),
            EventKind::Skipped,
            None,
            Some("tick missed while previous poll was in flight".to_string()),
        );
    }

    fn begin_poll(&self, family: PollFamily, trigger: PollTrigger) -> Result<Ticket, PollOutcome> {
        let mut state = self.lock();
        if state.torn_down {
            return Err(PollOutcome::TornDown);
        }

        match state.gate_mut(family).begin(trigger) {
            Some(ticket) => Ok(ticket),
            None => {
                drop(state);
                self.log.record(
                    family.event_family(),
                    EventKind::Skipped,
                    None,
                    Some("previous poll still in flight".to_string()),
                );
                Err(PollOutcome::Skipped)
            }
        }
    }

    fn finish_poll<T>(
        &self,
        family: PollFamily,
        ticket: Ticket,
        result: Result<T, ApiError>,
        apply: impl FnOnce(&mut SyncState, T),
    ) -> PollOutcome {
        let outcome = {
            let mut state = self.lock();
            state.gate_mut(family).settle(ticket);

            if state.torn_down {
                return PollOutcome::TornDown;
            }

            match result {
                Ok(value) => {
                    if state.gate_mut(family).accept(ticket) {
                        apply(&mut *state, value);
                        PollOutcome::Applied
                    } else {
                        PollOutcome::Stale
                    }
                }
                Err(err) => PollOutcome::Failed(err),
            }
        };

        // Appends can block on the disk; the state lock is released by now.
        let event_family = family.event_family();
        let seq = Some(ticket.seq());
        match &outcome {
            PollOutcome::Applied => self.log.record(event_family, EventKind::Applied, seq, None),
            PollOutcome::Stale => self.log.record(event_family, EventKind::Stale, seq, None),
            PollOutcome::Failed(err) => self.log.error(event_family, seq, err),
            PollOutcome::Skipped | PollOutcome::TornDown => {}
        }
        outcome
    }
}

// ---------------------------------------------------------------------------
// Submit guard
// ---------------------------------------------------------------------------

/// Disables the submit control for as long as it lives. Dropping it, on any
/// exit path including unwinding, re-enables the control and clears the
/// in-flight flag.
struct SubmitGuard<'a> {
    flag: &'a AtomicBool,
    control: &'a dyn SubmitControl,
}

impl<'a> SubmitGuard<'a> {
    fn engage(flag: &'a AtomicBool, control: &'a dyn SubmitControl) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            return None;
        }
        control.set_submit_enabled(false);
        Some(Self { flag, control })
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.control.set_submit_enabled(true);
        self.flag.store(false, Ordering::SeqCst);
    }
}
