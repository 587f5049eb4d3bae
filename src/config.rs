//! Game configuration loaded from TOML, falling back to defaults on errors.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/game.toml";

/// Top-level game configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play area width in grid cells.
    pub grid_columns: u32,
    /// Play area height in grid cells.
    pub grid_rows: u32,
    /// Pixel width of one grid cell.
    pub cell_expanse: f32,
    /// Milliseconds between simulation ticks.
    pub tick_interval_ms: u64,
    /// Ticks a headless run simulates before exiting.
    pub sim_ticks: u64,
    /// Seed for worldgen and luck rolls; `None` draws from entropy.
    pub world_seed: Option<u64>,
    /// Optional JSON recipe table overriding the built-in recipes.
    pub recipes_path: Option<PathBuf>,
    /// Optional JSON category table overriding the built-in categories.
    pub categories_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_columns: 32,
            grid_rows: 16,
            cell_expanse: 32.0,
            tick_interval_ms: 15,
            sim_ticks: 2000,
            world_seed: None,
            recipes_path: None,
            categories_path: None,
        }
    }
}

impl GameConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults
    /// on read or parse errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    GameConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                GameConfig::default()
            }
        }
    }

    /// Grid dimensions as a (columns, rows) pair.
    pub fn grid_size(&self) -> (u32, u32) {
        (self.grid_columns, self.grid_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = GameConfig::load_from_path(Path::new("/nonexistent/game.toml"));
        assert_eq!(config.grid_size(), (32, 16));
        assert_eq!(config.cell_expanse, 32.0);
    }

    #[test]
    fn partial_files_keep_defaults_for_missing_fields() {
        let config: GameConfig = toml::from_str("grid_columns = 64\n").unwrap();
        assert_eq!(config.grid_columns, 64);
        assert_eq!(config.grid_rows, 16);
        assert_eq!(config.tick_interval_ms, 15);
    }

    #[test]
    fn malformed_files_fall_back_to_defaults() {
        let dir = std::env::temp_dir().join("flatcraft_config_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        fs::write(&path, "grid_columns = \"lots\"").unwrap();

        let config = GameConfig::load_from_path(&path);
        assert_eq!(config.grid_columns, 32);

        let _ = fs::remove_dir_all(&dir);
    }
}
