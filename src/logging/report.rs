//! Reading back and summarising the sync event log.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use super::events::{EventFamily, EventKind, SyncEvent};

/// Read every event from a log file.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_events(path: &Path) -> Vec<SyncEvent> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<SyncEvent>(&line).ok())
        .collect()
}

/// Keep events from the last `days` days; `None` keeps everything.
pub fn since_days(events: Vec<SyncEvent>, days: Option<u32>) -> Vec<SyncEvent> {
    let Some(days) = days else {
        return events;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    events
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

/// Count of one (family, kind) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummaryRow {
    pub family: EventFamily,
    pub kind: EventKind,
    pub count: usize,
    pub last_seen: String,
}

/// Group events by family and kind, ordered by family then kind.
pub fn summarize(events: &[SyncEvent]) -> Vec<EventSummaryRow> {
    let mut groups: BTreeMap<(EventFamily, EventKind), (usize, String)> = BTreeMap::new();

    for event in events {
        let entry = groups
            .entry((event.family, event.kind))
            .or_insert_with(|| (0, String::new()));
        entry.0 += 1;
        if event.timestamp > entry.1 {
            entry.1 = event.timestamp.clone();
        }
    }

    groups
        .into_iter()
        .map(|((family, kind), (count, last_seen))| EventSummaryRow {
            family,
            kind,
            count,
            last_seen,
        })
        .collect()
}
