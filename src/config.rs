use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::solve::Event;
use crate::timer::TimerConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Event selected on startup
    pub event: Event,
    pub hold_ms: u64,
    pub debounce_ms: u64,
    pub swipe_min_dy: f64,
    pub swipe_max_dx: f64,
    pub tick_rate_ms: u64,
    /// Approximate pixel size of a terminal cell, used to scale mouse drags
    pub cell_width_px: f64,
    pub cell_height_px: f64,
    pub ready_beep: bool,
}

impl Default for Config {
    fn default() -> Self {
        let timer = TimerConfig::default();
        Self {
            event: Event::default(),
            hold_ms: timer.hold_ms,
            debounce_ms: timer.debounce_ms,
            swipe_min_dy: timer.swipe_min_dy,
            swipe_max_dx: timer.swipe_max_dx,
            tick_rate_ms: 16,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
            ready_beep: true,
        }
    }
}

impl From<&Config> for TimerConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            hold_ms: cfg.hold_ms,
            debounce_ms: cfg.debounce_ms,
            swipe_min_dy: cfg.swipe_min_dy,
            swipe_max_dx: cfg.swipe_max_dx,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> crate::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            event: Event::ThreeSixThree,
            hold_ms: 300,
            debounce_ms: 150,
            swipe_min_dy: 40.0,
            swipe_max_dx: 100.0,
            tick_rate_ms: 10,
            cell_width_px: 10.0,
            cell_height_px: 20.0,
            ready_beep: false,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_or_broken_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "event": "3-3-3", "hold_ms": 250 }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.event, Event::ThreeThreeThree);
        assert_eq!(cfg.hold_ms, 250);
        assert_eq!(cfg.debounce_ms, 300);
    }

    #[test]
    fn timer_config_from_config() {
        let cfg = Config {
            hold_ms: 700,
            ..Config::default()
        };
        let timer = TimerConfig::from(&cfg);
        assert_eq!(timer.hold_ms, 700);
        assert_eq!(timer.swipe_min_dy, 50.0);
    }
}
