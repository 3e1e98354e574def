use crate::annotate::DEFAULT_MARKER_PAD;
use crate::resample::DEFAULT_GRID_SIZE;
use crate::util::ok_or_default;

use iced_core::Color;
use serde::{Deserialize, Serialize};

use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Visualization settings.
///
/// `drivers` must name exactly two drivers for the interactive diff; more
/// are allowed but render as a static overlay without crosshair readout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub year: u16,
    pub grand_prix: String,
    pub session: String,
    pub drivers: Vec<String>,
    pub grid_size: usize,
    pub marker_pad: f32,
    /// Per-driver color overrides; palette order applies otherwise.
    #[serde(deserialize_with = "ok_or_default")]
    pub colors: Vec<(String, Color)>,
    /// Session file to load; `session.json` in the working directory when
    /// unset.
    pub telemetry_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            year: 2024,
            grand_prix: "Chinese Grand Prix".to_string(),
            session: "Q".to_string(),
            drivers: vec!["BOT".to_string(), "ZHO".to_string()],
            grid_size: DEFAULT_GRID_SIZE,
            marker_pad: DEFAULT_MARKER_PAD,
            colors: Vec::new(),
            telemetry_path: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("speed-trace").join("config.json"))
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Reads the config file from the platform config dir, falling back to
    /// defaults when it is missing or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{err}; using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn telemetry_path(&self) -> PathBuf {
        self.telemetry_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("session.json"))
    }

    pub fn session_label(&self) -> String {
        format!("{} {} {}", self.year, self.grand_prix, self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_options() {
        let config = Config::default();
        assert_eq!(config.drivers, vec!["BOT", "ZHO"]);
        assert_eq!(config.grid_size, 1000);
        assert_eq!(config.marker_pad, 20.0);
        assert_eq!(config.telemetry_path(), PathBuf::from("session.json"));
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "drivers": ["VER", "HAM"], "grid_size": 500 }"#)
                .expect("partial config parses");
        assert_eq!(config.drivers, vec!["VER", "HAM"]);
        assert_eq!(config.grid_size, 500);
        assert_eq!(config.session, "Q");
        assert_eq!(config.marker_pad, 20.0);
    }

    #[test]
    fn unreadable_colors_fall_back_to_empty() {
        let config: Config = serde_json::from_str(r#"{ "colors": "not-a-list" }"#)
            .expect("bad colors field is tolerated");
        assert!(config.colors.is_empty());
    }

    #[test]
    fn round_trips_through_json() {
        let config = Config::default();
        let raw = serde_json::to_string(&config).expect("serializes");
        let back: Config = serde_json::from_str(&raw).expect("parses");
        assert_eq!(back.drivers, config.drivers);
        assert_eq!(back.session_label(), "2024 Chinese Grand Prix Q");
    }
}
