/// Configuration system for sinon-dash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** from [`schema::DashConfig::default()`]
/// 2. **User global config** at `~/.sinon-dash/config.toml`
/// 3. **Project local config** at `.sinon-dash.toml` in the working directory
/// 4. **Environment variables** `SINON_DASH_*` (highest precedence)
///
/// File layers are merged key by key: a file that only sets
/// `polling.status_interval_secs` leaves every other value from the layer
/// below untouched.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::DashConfig;

use crate::render::streams::Layout;
use crate::render::theme::Theme;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> DashConfig {
    let files: Vec<PathBuf> = [global_config_path(), project_config_path()]
        .into_iter()
        .flatten()
        .collect();

    let mut config = load_layers(&files);
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files over the defaults, in order.
///
/// Missing, unparsable or wrongly typed files are skipped one by one; the
/// other layers still apply.
fn load_layers(paths: &[PathBuf]) -> DashConfig {
    let Ok(mut merged) = toml::Value::try_from(DashConfig::default()) else {
        return DashConfig::default();
    };

    for path in paths {
        let Some(layer) = read_toml_value(path) else {
            continue;
        };
        let mut candidate = merged.clone();
        merge_value(&mut candidate, layer);
        if candidate.clone().try_into::<DashConfig>().is_ok() {
            merged = candidate;
        }
    }

    merged.try_into().unwrap_or_default()
}

fn read_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively overlay `layer` onto `base`. Tables merge; everything else
/// replaces.
fn merge_value(base: &mut toml::Value, layer: toml::Value) {
    match (base, layer) {
        (toml::Value::Table(base_table), toml::Value::Table(layer_table)) => {
            for (key, value) in layer_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding the global config and the event log.
pub fn state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sinon-dash"))
}

fn global_config_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".sinon-dash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `SINON_DASH_URL`: backend base URL
/// - `SINON_DASH_TIMEOUT_MS`: request timeout
/// - `SINON_DASH_STATUS_INTERVAL`: status poll interval (seconds)
/// - `SINON_DASH_STREAMS_INTERVAL`: streams poll interval (seconds)
/// - `SINON_DASH_THEME`: `dark` / `light`
/// - `SINON_DASH_LAYOUT`: `cards` / `table`
/// - `SINON_DASH_LOG`: event log on/off (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut DashConfig) {
    if let Ok(val) = std::env::var("SINON_DASH_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("SINON_DASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("SINON_DASH_STATUS_INTERVAL")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.polling.status_interval_secs = secs;
    }
    if let Ok(val) = std::env::var("SINON_DASH_STREAMS_INTERVAL")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.polling.streams_interval_secs = secs;
    }
    if let Ok(val) = std::env::var("SINON_DASH_THEME")
        && let Some(theme) = Theme::parse(&val)
    {
        config.display.theme = theme;
    }
    if let Ok(val) = std::env::var("SINON_DASH_LAYOUT")
        && let Some(layout) = Layout::parse(&val)
    {
        config.display.layout = layout;
    }
    if let Ok(val) = std::env::var("SINON_DASH_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / show
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.sinon-dash/config.toml`.
///
/// Returns an error if the file already exists and `force` is not set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.sinon-dash/ directory")?;
    }

    fs::write(&path, DashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
