use serde::{Deserialize, Serialize};

/// Light/dark display mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Text of the toggle control: it names the mode a press switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Dark => "Toggle Light Mode",
            Self::Light => "Toggle Dark Mode",
        }
    }
}
