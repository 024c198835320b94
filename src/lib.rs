//! sinon-dash: terminal dashboard for a streaming bot's web backend.
//!
//! The [`sync`] layer polls bot status and stream history, authenticates
//! against the backend and dispatches control commands, routing every
//! result to injected UI sinks. [`render`] holds the display model and the
//! terminal sinks, [`api`] the HTTP client, and [`devserver`] a local
//! stand-in backend.

pub mod api;
pub mod cli;
pub mod config;
pub mod devserver;
pub mod logging;
pub mod render;
pub mod sync;
