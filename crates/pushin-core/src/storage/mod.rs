mod config;
pub mod database;

pub use config::{Config, WorkoutPreset, WorkoutsConfig, DEFAULT_GRACE_PERIOD_SECS};
pub use database::{Database, SqliteSessionStore};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `PUSHIN_HOME` overrides the location entirely. Otherwise this is
/// `~/.config/pushin/`, or `~/.config/pushin-dev/` when `PUSHIN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("PUSHIN_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("PUSHIN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pushin-dev")
            } else {
                base_dir.join("pushin")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
