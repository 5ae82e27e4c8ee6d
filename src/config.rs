//! User configuration (`config.toml`).
//!
//! Looked up in the platform config dir (e.g. `~/.config/sheetfill/config.toml`)
//! unless a path is given on the command line. Problems with the file never
//! abort startup: they come back as warnings and defaults are used.

use directories::ProjectDirs;
use serde::Deserialize;
use sheetfill_core::DEFAULT_EXPORT_SHEET;
use sheetfill_core::storage::DEFAULT_SHEET_NAME;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// Backing file used when neither the command line nor the config names one.
pub const DEFAULT_FILE: &str = "bd.xlsx";
pub const DEFAULT_EXPORT_FILE: &str = "export.xlsx";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    file: Option<PathBuf>,
    sheet_name: Option<String>,
    export_sheet_name: Option<String>,
    export_file: Option<PathBuf>,
}

/// Resolved settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Backing spreadsheet.
    pub file: PathBuf,
    /// Sheet name written to the backing xlsx file.
    pub sheet_name: String,
    /// Sheet name used in exports.
    pub export_sheet_name: String,
    /// Default export destination.
    pub export_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file: PathBuf::from(DEFAULT_FILE),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            export_sheet_name: DEFAULT_EXPORT_SHEET.to_string(),
            export_file: PathBuf::from(DEFAULT_EXPORT_FILE),
        }
    }
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        let defaults = Config::default();
        Config {
            file: file.file.unwrap_or(defaults.file),
            sheet_name: file.sheet_name.unwrap_or(defaults.sheet_name),
            export_sheet_name: file.export_sheet_name.unwrap_or(defaults.export_sheet_name),
            export_file: file.export_file.unwrap_or(defaults.export_file),
        }
    }
}

/// Parse the contents of a config file.
pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<ConfigFile>(content).map(Config::from)
}

/// Load the config from `explicit` or the user config dir.
///
/// Returns the config plus any warnings to show the user.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = explicit.map(Path::to_path_buf).or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let config = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => match parse_config(&content) {
                Ok(config) => Some(config),
                Err(err) => {
                    warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            None
        }
    };

    (config.unwrap_or_default(), warnings)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetfill")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
