//! Ship Configuration
//!
//! Tunables for assembly, floating and cannons. `Default` holds the values
//! the game ships with; any subset can be overridden from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors raised while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which blocks form a cannon and where its muzzle sits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannonConfig {
    /// Material of the block that fires
    pub firing_material: String,
    /// Material that must sit directly behind the firing block
    pub anchor_material: String,
    /// Distance from the firing block's center to the muzzle, along its facing
    pub muzzle_distance: f32,
}

impl Default for CannonConfig {
    fn default() -> Self {
        Self {
            firing_material: "dispenser".to_string(),
            anchor_material: "obsidian".to_string(),
            muzzle_distance: 0.6,
        }
    }
}

/// Central configuration for ship assembly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    /// Mean density at which a ship hangs in the air with its keel at the surface
    pub air_density: f32,
    /// Mean density at which a ship sinks to its center of volume
    pub water_density: f32,
    /// Largest number of blocks the connectivity search may collect
    pub max_ship_size: usize,
    /// Health restored per second while undamaged
    pub health_regen_per_second: f32,
    /// Upper bound on ship health
    pub max_health: f32,
    /// Float offset for ships with no mass-bearing blocks
    pub fallback_float_offset: f32,
    pub cannon: CannonConfig,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            air_density: 0.0,
            water_density: 2.5,
            max_ship_size: 1000,
            health_regen_per_second: 0.5,
            max_health: 1024.0,
            fallback_float_offset: 0.25,
            cannon: CannonConfig::default(),
        }
    }
}

impl ShipConfig {
    /// Parses a JSON override; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ShipConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        info!(path = %path.display(), max_ship_size = config.max_ship_size, "loaded ship config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let numbers = [
            ("air_density", self.air_density),
            ("water_density", self.water_density),
            ("health_regen_per_second", self.health_regen_per_second),
            ("max_health", self.max_health),
            ("fallback_float_offset", self.fallback_float_offset),
            ("cannon.muzzle_distance", self.cannon.muzzle_distance),
        ];
        if let Some((name, value)) = numbers.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
        }
        if !(self.air_density < self.water_density) {
            return Err(ConfigError::Invalid(format!(
                "air_density ({}) must be below water_density ({})",
                self.air_density, self.water_density
            )));
        }
        if self.max_ship_size == 0 {
            return Err(ConfigError::Invalid("max_ship_size must be positive".to_string()));
        }
        if self.max_health < 1.0 {
            return Err(ConfigError::Invalid("max_health must be at least 1".to_string()));
        }
        if self.cannon.firing_material.is_empty() || self.cannon.anchor_material.is_empty() {
            return Err(ConfigError::Invalid("cannon materials must be named".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ShipConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_ship_size, 1000);
        assert_eq!(config.cannon.anchor_material, "obsidian");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ShipConfig::from_json(r#"{"water_density": 4.0, "cannon": {"anchor_material": "iron_block"}}"#)
            .expect("valid override");
        assert_eq!(config.water_density, 4.0);
        assert_eq!(config.air_density, 0.0);
        assert_eq!(config.cannon.anchor_material, "iron_block");
        assert_eq!(config.cannon.firing_material, "dispenser");
    }

    #[test]
    fn inverted_densities_are_rejected() {
        let err = ShipConfig::from_json(r#"{"air_density": 3.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = ShipConfig::from_json(r#"{"max_ship_size": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let config = ShipConfig {
            max_health: f32::NAN,
            ..ShipConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_health"));

        let mut config = ShipConfig::default();
        config.cannon.muzzle_distance = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ShipConfig::load("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
