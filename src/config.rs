use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;
use wildgrove_world::{GrowthConfig, SimClock, WorldProfile};

use crate::content_packs;

pub const DEFAULT_CONFIG_PATH: &str = "config/wildgrove.toml";
const DEFAULT_SAVES_DIR: &str = "saves";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    /// World seed; a random one is picked when unset.
    pub world_seed: Option<u64>,
    /// Grid width in chunks.
    pub width: i32,
    /// Grid height in chunks.
    pub height: i32,
    /// Ticks simulated by `simulate` when no count is given.
    pub ticks: u64,
    pub ticks_per_day: u64,
    pub days_per_season: u64,
    /// Root directory of save slots.
    pub saves_dir: PathBuf,
    /// Root directory of content packs.
    pub content_packs_dir: PathBuf,
    pub growth: GrowthConfig,
    pub profile: WorldProfile,
}

impl Default for SimConfig {
    fn default() -> Self {
        let clock = SimClock::default();
        Self {
            world_seed: None,
            width: 8,
            height: 8,
            ticks: 1_000,
            ticks_per_day: clock.ticks_per_day,
            days_per_season: clock.days_per_season,
            saves_dir: PathBuf::from(DEFAULT_SAVES_DIR),
            content_packs_dir: PathBuf::from(content_packs::CONTENT_PACKS_DIR),
            growth: GrowthConfig::default(),
            profile: WorldProfile::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SimConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SimConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Simulation config not found at {}. Using defaults",
                        path.display()
                    );
                }
                SimConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, toml).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Clock described by this configuration.
    pub fn clock(&self) -> SimClock {
        SimClock::new(self.ticks_per_day, self.days_per_season)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(label: &str) -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("wildgrove_config_{label}_{timestamp}.toml"))
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let path = unique_temp_file("partial");
        fs::write(
            &path,
            "world_seed = 42\nwidth = 3\n\n[growth]\nmaxPlantsPerChunk = 4\n",
        )
        .expect("write config");

        let cfg = SimConfig::load_from_path(&path);
        assert_eq!(cfg.world_seed, Some(42));
        assert_eq!(cfg.width, 3);
        assert_eq!(cfg.height, SimConfig::default().height);
        assert_eq!(cfg.growth.max_plants_per_chunk, 4);
        assert_eq!(
            cfg.growth.max_events_per_chunk,
            GrowthConfig::default().max_events_per_chunk
        );

        fs::remove_file(&path).ok();
    }

    #[test]
    fn invalid_or_missing_file_falls_back_to_defaults() {
        let path = unique_temp_file("invalid");
        fs::write(&path, "width = \"wide\"").expect("write config");
        assert_eq!(SimConfig::load_from_path(&path), SimConfig::default());
        fs::remove_file(&path).ok();

        assert_eq!(
            SimConfig::load_from_path(&unique_temp_file("missing")),
            SimConfig::default()
        );
    }

    #[test]
    fn saved_config_loads_back() {
        let path = unique_temp_file("roundtrip");
        let cfg = SimConfig {
            world_seed: Some(7),
            ticks_per_day: 48,
            profile: WorldProfile {
                moisture_offset: -15.0,
                ..WorldProfile::default()
            },
            ..SimConfig::default()
        };
        cfg.save_to_path(&path).expect("save config");
        assert_eq!(SimConfig::load_from_path(&path), cfg);
        assert_eq!(cfg.clock().ticks_per_day, 48);
        fs::remove_file(&path).ok();
    }
}
