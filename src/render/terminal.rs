//! Terminal implementation of the UI sinks.
//!
//! Prints each update as it is applied. Keeps its own copy of the display
//! state (status indicator, last card list, session visibility, submit
//! control) so the interactive prompt can redraw on demand.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;
use colored::{ColoredString, Colorize};

use crate::render::status::{BotStatus, StatusIndicator};
use crate::render::streams::{Layout, StreamCard, format_cards, format_table};
use crate::render::theme::Theme;
use crate::sync::{
    Notice, Notifier, SessionSink, SessionState, StatusSink, StreamsSink, SubmitControl,
};

const LIGHT_MODE_CLASS: &str = "light-mode";

#[derive(Debug)]
struct TerminalState {
    indicator: StatusIndicator,
    status: Option<BotStatus>,
    cards: Vec<StreamCard>,
    session: SessionState,
    submit_enabled: bool,
    theme: Theme,
    layout: Layout,
}

#[derive(Debug)]
pub struct TerminalUi {
    state: Mutex<TerminalState>,
}

impl TerminalUi {
    pub fn new(theme: Theme, layout: Layout) -> Self {
        let mut indicator = StatusIndicator::new();
        if theme == Theme::Light {
            indicator.add_class(LIGHT_MODE_CLASS);
        }
        Self {
            state: Mutex::new(TerminalState {
                indicator,
                status: None,
                cards: Vec::new(),
                session: SessionState::default(),
                submit_enabled: true,
                theme,
                layout,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn submit_enabled(&self) -> bool {
        self.lock().submit_enabled
    }

    pub fn session(&self) -> SessionState {
        self.lock().session
    }

    pub fn theme(&self) -> Theme {
        self.lock().theme
    }

    /// Flip light/dark mode and return the new theme.
    pub fn toggle_theme(&self) -> Theme {
        let mut state = self.lock();
        state.theme = state.theme.toggled();
        match state.theme {
            Theme::Light => state.indicator.add_class(LIGHT_MODE_CLASS),
            Theme::Dark => state.indicator.remove_class(LIGHT_MODE_CLASS),
        }
        println!(
            "{} (next: {})",
            heading(state.theme, &format!("Theme: {:?}", state.theme)),
            state.theme.toggle_label()
        );
        state.theme
    }

    /// Switch between card and table layout and redraw the list.
    pub fn toggle_layout(&self) -> Layout {
        let mut state = self.lock();
        state.layout = state.layout.toggled();
        print_streams(&state);
        state.layout
    }

    /// Print the full dashboard: status, session and the current list.
    pub fn redraw(&self) {
        let state = self.lock();
        print_status(&state);
        print_session(state.session);
        print_streams(&state);
    }
}

impl StatusSink for TerminalUi {
    fn show_status(&self, status: &BotStatus) {
        let mut state = self.lock();
        let changed = state.status.as_ref() != Some(status);
        state.indicator.apply(status);
        state.status = Some(status.clone());
        if changed {
            print_status(&state);
        }
    }
}

impl StreamsSink for TerminalUi {
    fn show_streams(&self, cards: &[StreamCard]) {
        let mut state = self.lock();
        state.cards = cards.to_vec();
        print_streams(&state);
    }
}

impl SessionSink for TerminalUi {
    fn show_session(&self, session: SessionState) {
        let mut state = self.lock();
        state.session = session;
        print_session(session);
    }
}

impl SubmitControl for TerminalUi {
    fn set_submit_enabled(&self, enabled: bool) {
        self.lock().submit_enabled = enabled;
    }
}

impl Notifier for TerminalUi {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info(text) => println!("{} {}", "✓".green().bold(), text),
            Notice::Error(text) => println!("{} {}", "✗".red().bold(), text.red()),
        }
    }
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn heading(theme: Theme, text: &str) -> ColoredString {
    match theme {
        Theme::Dark => text.bold().cyan(),
        Theme::Light => text.bold().blue(),
    }
}

fn print_status(state: &TerminalState) {
    let Some(status) = &state.status else {
        println!("[{}] Bot status: {}", timestamp(), "waiting for first poll".dimmed());
        return;
    };
    let note = if status.is_known() {
        String::new()
    } else {
        " unrecognized status".to_string()
    };
    println!(
        "[{}] Bot status: {} {}",
        timestamp(),
        status_colored(status, state.indicator.text()),
        format!("({}){note}", state.indicator.status_classes().join(" ")).dimmed()
    );
}

fn status_colored(status: &BotStatus, label: &str) -> ColoredString {
    match status.as_str() {
        "online" => label.green().bold(),
        "offline" => label.red().bold(),
        "starting" | "restarting" => label.yellow().bold(),
        "shutting-down" => label.magenta().bold(),
        _ => label.normal(),
    }
}

fn print_session(session: SessionState) {
    let visibility = session.visibility();
    if visibility.controls {
        println!(
            "{} controls: {}",
            "Logged in.".green(),
            "start | restart | shutdown".bold()
        );
    }
    if visibility.login_form {
        println!(
            "{} type {} to authenticate",
            "Not logged in.".yellow(),
            "login".bold()
        );
    }
}

fn print_streams(state: &TerminalState) {
    println!();
    println!(
        "{} {}",
        heading(state.theme, "Stream History"),
        format!("[{}] {} stream(s)", timestamp(), state.cards.len()).dimmed()
    );
    if state.cards.is_empty() {
        println!("  {}", "No streams recorded.".dimmed());
        return;
    }
    match state.layout {
        Layout::Cards => print!("{}", format_cards(&state.cards)),
        Layout::Table => print!("{}", format_table(&state.cards)),
    }
}
