mod config;

pub use config::{Config, Settings, TomlSettings, AUTOSTART_KEY, STOPPED_GROUP, TASKS_SECTION};

use std::path::PathBuf;

/// Returns `~/.config/pomotray[-dev]/` based on POMOTRAY_ENV.
///
/// Set POMOTRAY_ENV=dev to use the development configuration directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOTRAY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomotray-dev")
    } else {
        base_dir.join("pomotray")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
