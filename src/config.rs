use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/settings.example.json";
pub const DEFAULT_INPUT_PATH: &str = "data/sample_inputs.txt";

/// Resolved run settings. Every key is optional in the settings file;
/// missing ones keep their defaults, including keys inside `output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Marketplace UI language (`hl`).
    pub locale: String,
    /// Marketplace country (`gl`).
    pub country: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub base_url: String,
    /// Fixed User-Agent; a random desktop one is used when unset.
    pub user_agent: Option<String>,
    pub respect_robots: bool,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub json_filename: String,
    pub csv_filename: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            country: "us".to_string(),
            timeout: 15,
            base_url: "https://play.google.com/store/apps/details".to_string(),
            user_agent: None,
            respect_robots: false,
            output: OutputSettings::default(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            json_filename: "sample_output.json".to_string(),
            csv_filename: "sample_output.csv".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. A missing or unreadable file is not
    /// fatal: the defaults are returned instead.
    pub fn load(path: &Path) -> Self {
        if !path.is_file() {
            info!("config file {} not found, using built-in defaults", path.display());
            return Self::default();
        }

        match Self::read_file(path) {
            Ok(settings) => {
                debug!(?settings, "loaded settings");
                settings
            }
            Err(e) => {
                warn!("failed to load config {}: {e}. Using defaults.", path.display());
                Self::default()
            }
        }
    }

    /// Strict variant of [`Settings::load`]: read and parse failures are
    /// returned instead of replaced by defaults.
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn json_output_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.unwrap_or_else(|| self.output.directory.join(&self.output.json_filename))
    }

    pub fn csv_output_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.unwrap_or_else(|| self.output.directory.join(&self.output.csv_filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str, contents: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("play_extract_cfg_{}_{name}", std::process::id()));
        std::fs::write(&p, contents).unwrap();
        p
    }

    #[test]
    fn partial_file_merges_with_defaults() {
        let path = scratch("partial.json", r#"{"locale": "fr", "output": {"directory": "out"}}"#);
        let s = Settings::load(&path);
        assert_eq!(s.locale, "fr");
        assert_eq!(s.country, "us");
        assert_eq!(s.timeout, 15);
        assert_eq!(s.output.directory, PathBuf::from("out"));
        assert_eq!(s.output.json_filename, "sample_output.json");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_or_invalid_file_gives_defaults() {
        let missing = std::env::temp_dir().join("play_extract_cfg_does_not_exist.json");
        assert_eq!(Settings::load(&missing), Settings::default());

        let path = scratch("broken.json", "{ locale: ");
        assert_eq!(Settings::load(&path), Settings::default());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn read_file_reports_typed_errors() {
        let missing = std::env::temp_dir().join("play_extract_cfg_strict_missing.json");
        assert!(matches!(Settings::read_file(&missing), Err(ConfigError::Read(_))));

        let path = scratch("strict_broken.json", "{ locale: ");
        assert!(matches!(Settings::read_file(&path), Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn output_paths_prefer_cli_values() {
        let s = Settings::default();
        assert_eq!(s.json_output_path(None), PathBuf::from("data/sample_output.json"));
        assert_eq!(
            s.csv_output_path(Some(PathBuf::from("elsewhere.csv"))),
            PathBuf::from("elsewhere.csv")
        );
    }
}
