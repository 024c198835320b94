//! Turning sync-layer data into something a person can read.

pub mod status;
pub mod streams;
pub mod terminal;
pub mod theme;

pub use status::{BotStatus, StatusIndicator};
pub use streams::{Layout, StreamCard};
pub use terminal::TerminalUi;
pub use theme::Theme;
