use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::placement::Geometry;
use crate::round::Difficulty;
use crate::surface::CellGrid;

/// Round timing in milliseconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Timing {
    /// Lower bound (inclusive) of the random delay before boxes appear
    pub min_delay_ms: u64,
    /// Upper bound (exclusive) of the random delay before boxes appear
    pub max_delay_ms: u64,
    /// Retry interval when the play area cannot be measured yet
    pub retry_ms: u64,
    /// How long the wrong-target message stays on screen
    pub notice_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            min_delay_ms: 500,
            max_delay_ms: 2000,
            retry_ms: 100,
            notice_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub difficulty: u8,
    pub geometry: Geometry,
    pub timing: Timing,
    pub cells: CellGrid,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::MIN,
            geometry: Geometry::default(),
            timing: Timing::default(),
            cells: CellGrid::default(),
        }
    }
}

impl Config {
    /// Check the values a hand-edited file could get wrong
    pub fn validate(&self) -> Result<(), String> {
        Difficulty::new(self.difficulty).ok_or_else(|| {
            format!(
                "difficulty must be between {} and {}, got {}",
                Difficulty::MIN,
                Difficulty::MAX,
                self.difficulty
            )
        })?;

        let g = &self.geometry;
        if !(g.box_size > 0.0 && g.padding >= 0.0 && g.min_distance >= 0.0) {
            return Err(format!(
                "geometry must have a positive box size and non-negative padding/distance, got {:?}",
                g
            ));
        }
        if g.max_attempts == 0 {
            return Err("geometry.max_attempts must be at least 1".to_string());
        }

        let t = &self.timing;
        if t.min_delay_ms > t.max_delay_ms {
            return Err(format!(
                "timing.min_delay_ms ({}) exceeds timing.max_delay_ms ({})",
                t.min_delay_ms, t.max_delay_ms
            ));
        }
        if t.retry_ms == 0 {
            return Err("timing.retry_ms must be at least 1".to_string());
        }

        if !(self.cells.cell_width_px > 0.0 && self.cells.cell_height_px > 0.0) {
            return Err(format!("cell size must be positive, got {:?}", self.cells));
        }

        Ok(())
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::new(self.difficulty).unwrap_or_default()
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path().unwrap_or_else(|| PathBuf::from("boxclick_config.json")),
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
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => cfg,
                Err(reason) => {
                    log::warn!(
                        "ignoring invalid config {}: {}",
                        self.path.display(),
                        reason
                    );
                    Config::default()
                }
            },
            Err(err) => {
                log::warn!("ignoring unreadable config {}: {}", self.path.display(), err);
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
