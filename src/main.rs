use anyhow::Result;
use clap::{Parser, Subcommand};

use sinon_dash::cli;
use sinon_dash::config;

#[derive(Debug, Parser)]
#[command(name = "sinon-dash")]
#[command(about = "Terminal dashboard for the Sinon stream bot")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Live dashboard: polls status and streams, accepts commands on stdin
    Watch,
    /// Fetch and print the bot status once
    Status,
    /// Fetch and print the stream history once
    Streams {
        /// Output format: table (default), cards, json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Authenticate and send a control command (start, restart, shutdown)
    Control {
        action: String,
        /// Bot password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Summarize the sync-event log
    Events {
        /// Only include the last N days of events
        #[arg(long)]
        days: Option<u32>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Run a local stand-in backend for manual testing
    Devserver {
        #[arg(long, default_value = "127.0.0.1:5000")]
        addr: String,
        #[arg(long, default_value = "letmein")]
        password: String,
        /// Seconds a start/restart/shutdown stays in its transitional state
        #[arg(long, default_value = "3")]
        transition_secs: u64,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective (merged) configuration
    Show,
    /// Write the default config to ~/.sinon-dash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print config and event-log locations
    Path,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Watch => cli::run_watch(&config::load()),
        Commands::Status => cli::run_status(&config::load()),
        Commands::Streams { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_streams(&config::load(), fmt)
        }
        Commands::Control { action, password } => {
            cli::run_control(&config::load(), &action, password)
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => cli::run_config_show(),
            ConfigCommand::Init { force } => cli::run_config_init(force),
            ConfigCommand::Path => cli::run_config_path(),
        },
        Commands::Events { days, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_events(days, fmt)
        }
        Commands::Devserver {
            addr,
            password,
            transition_secs,
        } => cli::run_devserver(&addr, &password, transition_secs),
    }
}
