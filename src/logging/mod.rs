pub mod events;
pub mod report;

pub use events::{EventFamily, EventKind, EventLog, SyncEvent};
