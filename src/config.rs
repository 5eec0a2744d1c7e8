use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("{name} density must be within [0, 1], got {value}")]
    InvalidDensity { name: &'static str, value: f64 },

    #[error("view radius must be non-negative, got {0}")]
    InvalidViewRadius(i32),

    #[error("invalid value for {var}: {value}")]
    InvalidEnvVar { var: String, value: String },

    #[error("no stick reachable from spawn after {attempts} generation attempts")]
    NoReachableStick { attempts: u32 },
}

/// Rock placement mode. Easy validates each placement against a
/// region-connectivity check so sticks never become unreachable;
/// Normal places rocks anywhere empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
}

/// Generation-time configuration surface. The view radius is carried for
/// presentation layers only and is never consulted by planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    /// Seed for grid generation and procedural respawns (None = random).
    pub seed: Option<u64>,
    pub rock_density: f64,
    pub stick_density: f64,
    pub view_radius: i32,
    pub difficulty: Difficulty,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            seed: None,
            rock_density: 0.15,
            stick_density: 0.05,
            view_radius: 4,
            difficulty: Difficulty::Easy,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 1 || self.height < 1 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        for (name, value) in [
            ("rock", self.rock_density),
            ("stick", self.stick_density),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(ConfigError::InvalidDensity { name, value });
            }
        }
        if self.view_radius < 0 {
            return Err(ConfigError::InvalidViewRadius(self.view_radius));
        }
        Ok(())
    }

    /// Builds a config from `CAVEBOT_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(width) = parse_env_var("CAVEBOT_WIDTH")? {
            config.width = width;
        }
        if let Some(height) = parse_env_var("CAVEBOT_HEIGHT")? {
            config.height = height;
        }
        if let Some(seed) = parse_env_var("CAVEBOT_SEED")? {
            config.seed = Some(seed);
        }
        if let Some(density) = parse_env_var("CAVEBOT_ROCK_DENSITY")? {
            config.rock_density = density;
        }
        if let Some(density) = parse_env_var("CAVEBOT_STICK_DENSITY")? {
            config.stick_density = density;
        }
        if let Some(radius) = parse_env_var("CAVEBOT_VIEW_RADIUS")? {
            config.view_radius = radius;
        }
        if let Ok(value) = env::var("CAVEBOT_DIFFICULTY") {
            config.difficulty = match value.to_lowercase().as_str() {
                "easy" => Difficulty::Easy,
                "normal" => Difficulty::Normal,
                _ => {
                    return Err(ConfigError::InvalidEnvVar {
                        var: "CAVEBOT_DIFFICULTY".into(),
                        value,
                    });
                }
            };
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_env_var<T: std::str::FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvVar {
                var: var.into(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let config = GameConfig {
            width: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_density_outside_unit_interval() {
        let config = GameConfig {
            rock_density: 1.5,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDensity { name: "rock", .. })
        ));

        let config = GameConfig {
            stick_density: -0.1,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDensity { name: "stick", .. })
        ));
    }
}
