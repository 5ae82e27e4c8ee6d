//! Diagnostics via `tracing`.
//!
//! The filter comes from `RUST_LOG` and defaults to `warn`. Command mode logs
//! to stderr; the terminal UI logs to a file so output never lands on screen.

use anyhow::Context;
use directories::ProjectDirs;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber, writing to `log_file` when given.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr).compact())
                .init();
        }
    }
    Ok(())
}

/// `sheetfill.log` in the platform cache dir.
pub fn default_log_file() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetfill")?;
    Some(proj.cache_dir().join("sheetfill.log"))
}
