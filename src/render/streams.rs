//! Stream history rendering.
//!
//! Every field of a [`StreamCard`] resolves to a displayable string: missing
//! values are replaced with fixed placeholders here, once, so sinks never
//! deal with `Option`s.

use serde::{Deserialize, Serialize};

use crate::api::{StreamMap, StreamRecord};

pub const UNTITLED: &str = "Untitled Stream";
pub const DEFAULT_THUMBNAIL: &str = "default-thumbnail.png";
pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN: &str = "Unknown";
pub const ONGOING: &str = "Ongoing";

/// How the stream list is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    Cards,
    Table,
}

impl Layout {
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_ascii_lowercase().as_str() {
            "cards" | "card" => Some(Self::Cards),
            "table" => Some(Self::Table),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Cards => Self::Table,
            Self::Table => Self::Cards,
        }
    }
}

/// Display-ready form of one [`StreamRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamCard {
    pub id: String,
    pub streamer: String,
    pub title: String,
    pub thumbnail: String,
    pub peak_viewers: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
}

impl StreamCard {
    pub fn from_record(id: &str, record: &StreamRecord) -> Self {
        Self {
            id: id.to_string(),
            streamer: text_or(Some(&record.streamer_name), UNKNOWN),
            title: text_or(record.title.as_ref(), UNTITLED),
            thumbnail: text_or(record.thumbnail_url.as_ref(), DEFAULT_THUMBNAIL),
            peak_viewers: record
                .peak_viewers
                .map(|n| n.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            start_time: text_or(record.start_time.as_ref(), UNKNOWN),
            end_time: text_or(record.end_time.as_ref(), ONGOING),
            duration: text_or(record.duration.as_ref(), NOT_AVAILABLE),
        }
    }

    pub fn is_ongoing(&self) -> bool {
        self.end_time == ONGOING
    }
}

/// Blank strings count as missing.
fn text_or(value: Option<&String>, placeholder: &str) -> String {
    match value.map(|s| s.trim()) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => placeholder.to_string(),
    }
}

/// Build the full card list for a stream map, in id order.
pub fn render_cards(streams: &StreamMap) -> Vec<StreamCard> {
    streams
        .iter()
        .map(|(id, record)| StreamCard::from_record(id, record))
        .collect()
}

// ---------------------------------------------------------------------------
// Plain-text layouts
// ---------------------------------------------------------------------------

/// One block per stream, mirroring the card fields.
pub fn format_cards(cards: &[StreamCard]) -> String {
    let mut out = String::new();
    for card in cards {
        out.push_str(&format!("{}\n", card.title));
        out.push_str(&format!("  Streamer:    {}\n", card.streamer));
        out.push_str(&format!("  Max Viewers: {}\n", card.peak_viewers));
        out.push_str(&format!("  Start Time:  {}\n", card.start_time));
        out.push_str(&format!("  End Time:    {}\n", card.end_time));
        out.push_str(&format!("  Duration:    {}\n", card.duration));
        out.push_str(&format!("  Thumbnail:   {}\n", card.thumbnail));
        out.push('\n');
    }
    out
}

/// Fixed-width table, one row per stream.
pub fn format_table(cards: &[StreamCard]) -> String {
    let mut out = format!(
        "{:<18} {:<30} {:>8} {:<20} {:<20} {:<10}\n",
        "Streamer", "Title", "Peak", "Start", "End", "Duration"
    );
    out.push_str(&format!("{}\n", "-".repeat(111)));
    for card in cards {
        out.push_str(&format!(
            "{:<18} {:<30} {:>8} {:<20} {:<20} {:<10}\n",
            truncate(&card.streamer, 18),
            truncate(&card.title, 30),
            card.peak_viewers,
            truncate(&card.start_time, 20),
            truncate(&card.end_time, 20),
            truncate(&card.duration, 10),
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
