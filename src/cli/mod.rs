//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `sinon-dash watch`: live dashboard with an interactive prompt
//! - `sinon-dash status` / `streams`: one-shot fetches
//! - `sinon-dash control <action>`: authenticate, then send one command
//! - `sinon-dash config show|init|path`: configuration management
//! - `sinon-dash events`: summary of the sync-event log
//! - `sinon-dash devserver`: local stand-in backend

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::api::{Backend, ControlAction, HttpBackend};
use crate::config::{self, DashConfig};
use crate::devserver::{DevOptions, DevServer};
use crate::logging::EventLog;
use crate::logging::events::events_log_path;
use crate::logging::report::{self, EventSummaryRow};
use crate::render::streams::{format_cards, format_table, render_cards};
use crate::render::{BotStatus, TerminalUi};
use crate::sync::{
    AuthOutcome, ControlOutcome, Dashboard, PollFamily, PollTrigger, Sinks, SyncController,
};

/// Output format for list commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Cards,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("cards") => Self::Cards,
            _ => Self::Table,
        }
    }
}

fn backend(config: &DashConfig) -> Arc<HttpBackend> {
    Arc::new(HttpBackend::from_config(&config.backend))
}

// ---------------------------------------------------------------------------
// sinon-dash watch
// ---------------------------------------------------------------------------

const PROMPT_HELP: &str = "\
  login              authenticate with the bot password
  refresh            poll status and streams now
  theme              toggle light/dark mode
  layout             toggle card/table layout
  help               show this list
  quit               stop polling and exit";

/// Run the live dashboard until `quit` or end of input.
pub fn run_watch(config: &DashConfig) -> Result<()> {
    let backend = backend(config);
    let ui = Arc::new(TerminalUi::new(config.display.theme, config.display.layout));
    let log = EventLog::from_config(&config.logging);

    println!(
        "{} {}",
        "Sinon dashboard".bold().cyan(),
        format!("({})", backend.base_url()).dimmed()
    );
    println!(
        "{}",
        format!(
            "status every {}s, streams every {}s; type {} for commands",
            config.polling.status_interval().as_secs(),
            config.polling.streams_interval().as_secs(),
            "help".bold()
        )
        .dimmed()
    );

    let dashboard = Dashboard::start(backend, Sinks::shared(ui.clone()), log, config)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        let controller = dashboard.controller();
        match command {
            "quit" | "exit" | "q" => break,
            "help" | "?" => println!("{}", prompt_help()),
            "login" => {
                if !ui.submit_enabled() {
                    println!("{}", "A login is already in progress.".yellow());
                    continue;
                }
                let password = prompt_password()?;
                controller.authenticate(&password);
            }
            "refresh" => {
                controller.poll(PollFamily::Status, PollTrigger::Manual);
                controller.poll(PollFamily::Streams, PollTrigger::Manual);
            }
            "theme" => {
                ui.toggle_theme();
            }
            "layout" => {
                ui.toggle_layout();
            }
            "redraw" => ui.redraw(),
            other => match other.parse::<ControlAction>() {
                Ok(action) => {
                    controller.dispatch_control(action);
                }
                Err(e) => println!("{} {}", e.to_string().yellow(), "(type help)".dimmed()),
            },
        }
    }

    dashboard.stop();
    println!("{}", "Stopped.".dimmed());
    Ok(())
}

fn prompt_help() -> String {
    let actions: Vec<&str> = ControlAction::ALL.iter().map(|a| a.as_str()).collect();
    format!(
        "  {:<18} send a control command\n{PROMPT_HELP}",
        actions.join(" | ")
    )
}

fn prompt_password() -> Result<String> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()
        .context("failed to read password")
}

// ---------------------------------------------------------------------------
// sinon-dash status | streams
// ---------------------------------------------------------------------------

/// Fetch and print the bot status once.
pub fn run_status(config: &DashConfig) -> Result<()> {
    let backend = backend(config);
    let reply = backend
        .status()
        .with_context(|| format!("status request to {} failed", backend.base_url()))?;
    let status = BotStatus::new(reply.status);
    println!(
        "{} {} {}",
        "Bot status:".bold(),
        status.label(),
        format!("({})", status.style_class()).dimmed()
    );
    Ok(())
}

/// Fetch and print the stream history once.
pub fn run_streams(config: &DashConfig, format: OutputFormat) -> Result<()> {
    let backend = backend(config);
    let streams = backend
        .detailed_streams()
        .with_context(|| format!("streams request to {} failed", backend.base_url()))?;
    let cards = render_cards(&streams);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
        _ if cards.is_empty() => println!("{}", "No streams recorded.".yellow()),
        OutputFormat::Cards => print!("{}", format_cards(&cards)),
        OutputFormat::Table => print!("{}", format_table(&cards)),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// sinon-dash control
// ---------------------------------------------------------------------------

/// Authenticate, then send one control command.
pub fn run_control(config: &DashConfig, action: &str, password: Option<String>) -> Result<()> {
    let action: ControlAction = action.parse()?;
    let ui = Arc::new(TerminalUi::new(config.display.theme, config.display.layout));
    let controller = SyncController::new(
        backend(config),
        Sinks::shared(ui),
        EventLog::from_config(&config.logging),
    );

    let password = match password {
        Some(pw) => pw,
        None => prompt_password()?,
    };

    match controller.authenticate(&password) {
        AuthOutcome::Authenticated(_) => {}
        other => bail!("authentication did not succeed: {other:?}"),
    }

    match controller.dispatch_control(action) {
        ControlOutcome::Accepted(_) => Ok(()),
        ControlOutcome::Rejected(reason) => bail!("'{action}' rejected: {reason}"),
        ControlOutcome::Failed(err) => bail!("'{action}' failed: {err}"),
    }
}

// ---------------------------------------------------------------------------
// sinon-dash config show | init | path
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective sinon-dash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(config::global_config_file(), "~/.sinon-dash/config.toml");
    print_source(config::project_config_file(), ".sinon-dash.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "SINON_DASH_* environment variables".dimmed()
    );
    Ok(())
}

fn print_source(path: Option<std::path::PathBuf>, label: &str) {
    if path.is_some_and(|p| p.exists()) {
        println!("  {} {}", "✓".green(), label.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
    }
}

/// Write the default config to `~/.sinon-dash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    println!("  {}", "Edit the file to point at your bot.".dimmed());
    Ok(())
}

/// Print where configuration and the event log live.
pub fn run_config_path() -> Result<()> {
    let show = |label: &str, path: Option<std::path::PathBuf>| match path {
        Some(p) => println!("  {:<16} {}", label.bold(), p.display()),
        None => println!("  {:<16} {}", label.bold(), "unavailable".dimmed()),
    };
    show("global config", config::global_config_file());
    show("project config", config::project_config_file());
    show("event log", events_log_path());
    Ok(())
}

// ---------------------------------------------------------------------------
// sinon-dash events
// ---------------------------------------------------------------------------

/// Summarize the sync-event log per family and kind.
pub fn run_events(days: Option<u32>, format: OutputFormat) -> Result<()> {
    let path = events_log_path().context("could not resolve home directory")?;
    let events = report::since_days(report::read_events(&path), days);
    let rows = report::summarize(&events);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!(
            "{}",
            "No sync events yet. Run `sinon-dash watch` to record some.".yellow()
        );
        return Ok(());
    }

    print_events_table(&rows, events.len());
    Ok(())
}

fn print_events_table(rows: &[EventSummaryRow], total: usize) {
    println!("{}", "Sync Events".bold().cyan());
    println!("{}", "=".repeat(64));
    println!(
        "  {:<10} {:<16} {:>7}  Last seen",
        "Family", "Kind", "Count"
    );
    println!("  {}", "-".repeat(60));
    for (i, row) in rows.iter().enumerate() {
        let line = format!(
            "  {:<10} {:<16} {:>7}  {}",
            row.family.to_string(),
            row.kind.to_string(),
            row.count,
            row.last_seen
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!();
    println!("  {} {}", "Total events:".bold(), total);
}

// ---------------------------------------------------------------------------
// sinon-dash devserver
// ---------------------------------------------------------------------------

/// Run the stand-in backend in the foreground.
pub fn run_devserver(addr: &str, password: &str, transition_secs: u64) -> Result<()> {
    let server = DevServer::bind(
        addr,
        DevOptions {
            password: password.to_string(),
            transition: Duration::from_secs(transition_secs),
            log_requests: true,
        },
    )?;

    println!("sinon-dash devserver running at {}", server.url()?);
    println!("Password: {}", password.bold());
    println!("Press Ctrl+C to stop.\n");
    io::stdout().flush()?;

    server.run();
    Ok(())
}
