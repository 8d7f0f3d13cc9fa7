//! # Config Module
//!
//! Persisted preferences: the metadata defaults for new reports, the export
//! format and whether to open the output folder after a save.
//!
//! Stored as pretty-printed JSON. A missing file or missing keys fall back
//! to defaults; a file that does not parse is logged and ignored rather
//! than blocking the program.

use crate::core::reporter::{ExportFormat, ReportMetadata};
use crate::error::ConfigError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "origistamp";
const CONFIG_FILE: &str = "config.json";

/// User preferences
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Open the containing folder after saving a report or archive
    pub open_folder: bool,
    pub author: String,
    pub note: String,
    /// GPG fingerprint recorded in reports
    pub gpg: String,
    pub export_format: ExportFormat,
}

impl Config {
    /// `<config dir>/origistamp/config.json`, or the working directory when
    /// the platform has no config dir
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Load from `path`. Never fails: unreadable or malformed files give
    /// the defaults.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No config file, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed config file");
                Self::default()
            }
        }
    }

    /// Save to `path` as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Report metadata from the stored defaults, stamped with `now`
    pub fn metadata(&self, now: NaiveDateTime) -> ReportMetadata {
        ReportMetadata::new(now)
            .with_author(self.author.as_str())
            .with_note(self.note.as_str())
            .with_gpg_fingerprint(self.gpg.as_str())
    }
}
