//! Application paths and persisted settings.
//!
//! Settings live in `bootseq.json` inside the config directory. Directory
//! resolution priority:
//! 1. `--config-dir` CLI argument
//! 2. `BOOTSEQ_CONFIG_DIR` environment variable
//! 3. Working directory, if it already holds `bootseq.json` or `bootseq.log`
//! 4. Platform config directory from dirs-next (`~/.config/bootseq` on Linux)

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Args;

pub const SETTINGS_FILE: &str = "bootseq.json";
pub const LOG_FILE: &str = "bootseq.log";
const CONFIG_DIR_ENV: &str = "BOOTSEQ_CONFIG_DIR";
const APP_DIR: &str = "bootseq";

/// Override for the default application directory.
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path to a file in the config directory.
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir).join(name)
}

/// Path to a file in the data directory (logs).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir).join(name)
}

/// Create config and data directories if missing.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(config, dirs_next::config_dir);
    let data_dir = resolve_dir(config, dirs_next::data_dir);
    for dir in [&config_dir, &data_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform: fn() -> Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Ok(cwd) = std::env::current_dir()
        && has_local_files(&cwd)
    {
        return cwd;
    }
    platform()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// User settings. Unknown or missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the logical assets.
    pub asset_dir: PathBuf,
    /// Audio cue volume, 0..=1.
    pub volume: f32,
    pub audio_enabled: bool,
    pub gamepad_enabled: bool,
    pub fullscreen: bool,
    pub window_size: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            volume: 1.0,
            audio_enabled: true,
            gamepad_enabled: true,
            fullscreen: false,
            window_size: [1280.0, 720.0],
        }
    }
}

impl Settings {
    /// Read settings from `path`. `Ok(None)` if the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        settings.volume = settings.volume.clamp(0.0, 1.0);
        Ok(Some(settings))
    }

    /// Read settings, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(settings)) => {
                info!("Settings loaded from {}", path.display());
                settings
            }
            Ok(None) => {
                info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }

    /// CLI flags win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(dir) = &args.asset_dir {
            self.asset_dir = dir.clone();
        }
        if let Some(volume) = args.volume {
            self.volume = volume.clamp(0.0, 1.0);
        }
        if args.fullscreen {
            self.fullscreen = true;
        }
        if args.mute {
            self.audio_enabled = false;
        }
        if args.no_gamepad {
            self.gamepad_enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn test_custom_dir_wins() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };
        assert_eq!(config_file("bootseq.json", &config), PathBuf::from("/custom/bootseq.json"));
        assert_eq!(data_file("bootseq.log", &config), PathBuf::from("/custom/bootseq.log"));
    }

    #[test]
    fn test_platform_default_mentions_app() {
        let path = config_file("x.json", &PathConfig::default());
        assert!(path.ends_with("x.json"));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let path = temp_path("bootseq_test_partial_settings.json");
        std::fs::write(&path, r#"{ "volume": 3.5, "fullscreen": true }"#).unwrap();

        let settings = Settings::read(&path).unwrap().unwrap();
        assert_eq!(settings.volume, 1.0);
        assert!(settings.fullscreen);
        assert_eq!(settings.asset_dir, PathBuf::from("assets"));
        assert!(settings.gamepad_enabled);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_settings_fall_back() {
        let path = temp_path("bootseq_test_bad_settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::read(&path).is_err());
        assert_eq!(Settings::load(&path), Settings::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_settings_is_none() {
        let path = temp_path("bootseq_test_no_settings.json");
        let _ = std::fs::remove_file(&path);
        assert!(Settings::read(&path).unwrap().is_none());
    }

    #[test]
    fn test_cli_overrides_file() {
        let args = Args::parse_from(["bootseq", "/srv/boot", "--mute", "--no-gamepad", "-F", "--volume", "0.25"]);
        let mut settings = Settings::default();
        settings.apply_args(&args);
        assert_eq!(settings.asset_dir, PathBuf::from("/srv/boot"));
        assert!(!settings.audio_enabled);
        assert!(!settings.gamepad_enabled);
        assert!(settings.fullscreen);
        assert_eq!(settings.volume, 0.25);
    }
}
