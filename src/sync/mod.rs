//! Status/auth/streams synchronization layer.
//!
//! [`SyncController`] owns the session flag and the latest applied result of
//! each poll family and routes every UI update through the injected
//! [`Sinks`]. [`Dashboard`] wires a controller to its poll timers.

pub mod controller;
pub mod dashboard;
pub mod gate;
pub mod scheduler;
pub mod session;
pub mod sinks;

pub use controller::{
    AuthOutcome, ControlOutcome, ControllerOptions, PollFamily, PollOutcome, SyncController,
};
pub use dashboard::Dashboard;
pub use gate::{PollGate, PollTrigger, Ticket};
pub use session::{SessionState, Visibility};
pub use sinks::{Notice, Notifier, SessionSink, Sinks, StatusSink, StreamsSink, SubmitControl};
