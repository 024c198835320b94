//! Bot status display model.
//!
//! The status indicator owns a mutually exclusive set of `bot-<status>`
//! classes: applying a new status removes whichever status class was active
//! before adding the new one, so at most one is ever set and it always
//! matches the label.

use std::collections::BTreeSet;
use std::fmt;

/// Status tags the bot is known to report. The server may send others;
/// they are displayed the same way.
pub const KNOWN_STATUSES: [&str; 5] = ["online", "offline", "starting", "restarting", "shutting-down"];

/// Prefix shared by every status class.
pub const STATUS_CLASS_PREFIX: &str = "bot-";

/// Most recently applied bot status tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotStatus(String);

impl BotStatus {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self("unknown".to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display label: first character upper-cased, rest untouched.
    pub fn label(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Style class, e.g. `bot-shutting-down`. Each whitespace character maps
    /// to a single `-`.
    pub fn style_class(&self) -> String {
        let slug: String = self
            .0
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .collect();
        format!("{STATUS_CLASS_PREFIX}{slug}")
    }

    pub fn is_known(&self) -> bool {
        KNOWN_STATUSES.contains(&self.0.as_str())
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A status target: a text label plus the classes currently set on it.
///
/// Non-status classes (anything without the `bot-` prefix) are left alone by
/// [`apply`](Self::apply).
#[derive(Debug, Clone, Default)]
pub struct StatusIndicator {
    text: String,
    classes: BTreeSet<String>,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, status: &BotStatus) {
        self.classes
            .retain(|class| !class.starts_with(STATUS_CLASS_PREFIX));
        self.classes.insert(status.style_class());
        self.text = status.label();
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        self.classes.insert(class.into());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Every status class currently set. Never more than one entry once
    /// [`apply`](Self::apply) has run.
    pub fn status_classes(&self) -> Vec<&str> {
        self.classes
            .iter()
            .filter(|class| class.starts_with(STATUS_CLASS_PREFIX))
            .map(String::as_str)
            .collect()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}
