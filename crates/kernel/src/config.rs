use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a simulation config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for the scene and its animation.
///
/// Every field has a default; a YAML file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Seed for every random choice (wave phases, cloud layout).
    pub seed: u64,
    /// Fraction of the remaining distance the airplane covers each step.
    pub ease_factor: f32,
    /// Pointer interval mapped onto the travel bounds.
    pub pointer_range: [f32; 2],
    pub travel_x: [f32; 2],
    pub travel_y: [f32; 2],
    /// Banking applied per unit of remaining vertical distance.
    pub roll_factor: f32,
    pub pitch_factor: f32,
    pub sea_rotation_speed: f32,
    pub sky_rotation_speed: f32,
    pub propeller_speed: f32,
    pub hair_speed: f32,
    pub cloud_count: u32,
    /// Animation steps per second in the windowed host.
    pub step_rate_hz: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ease_factor: 0.1,
            pointer_range: [-1.0, 1.0],
            travel_x: [-100.0, 100.0],
            travel_y: [25.0, 175.0],
            roll_factor: 0.0128,
            pitch_factor: 0.0064,
            sea_rotation_speed: 0.005,
            sky_rotation_speed: 0.01,
            propeller_speed: 0.3,
            hair_speed: 0.16,
            cloud_count: 20,
            step_rate_hz: 60.0,
        }
    }
}

impl SimConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded sim config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ease_factor > 0.0 && self.ease_factor <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "ease_factor",
                reason: format!("{} is outside (0, 1]", self.ease_factor),
            });
        }
        for (field, [lo, hi]) in [
            ("pointer_range", self.pointer_range),
            ("travel_x", self.travel_x),
            ("travel_y", self.travel_y),
        ] {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("[{lo}, {hi}] has a non-finite bound"),
                });
            }
        }
        let [lo, hi] = self.pointer_range;
        if lo >= hi {
            return Err(ConfigError::Invalid {
                field: "pointer_range",
                reason: format!("[{lo}, {hi}] is empty"),
            });
        }
        for (field, value) in [
            ("roll_factor", self.roll_factor),
            ("pitch_factor", self.pitch_factor),
            ("sea_rotation_speed", self.sea_rotation_speed),
            ("sky_rotation_speed", self.sky_rotation_speed),
            ("propeller_speed", self.propeller_speed),
            ("hair_speed", self.hair_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not finite"),
                });
            }
        }
        if self.cloud_count == 0 {
            return Err(ConfigError::Invalid {
                field: "cloud_count",
                reason: "at least one cloud is required".into(),
            });
        }
        if !self.step_rate_hz.is_finite() || self.step_rate_hz <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "step_rate_hz",
                reason: format!("{} is not positive", self.step_rate_hz),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(yaml: &str) -> &'static str {
        match SimConfig::from_yaml_str(yaml) {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected an invalid field, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn yaml_overrides_selected_fields() {
        let yaml = "seed: 7\npointer_range: [-0.75, 0.75]\n";
        let config = SimConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.pointer_range, [-0.75, 0.75]);
        assert_eq!(config.ease_factor, 0.1);
        assert_eq!(config.cloud_count, 20);
    }

    #[test]
    fn empty_pointer_range_is_rejected() {
        assert_eq!(rejected_field("pointer_range: [1.0, 1.0]"), "pointer_range");
    }

    #[test]
    fn non_finite_travel_bounds_are_rejected() {
        assert_eq!(rejected_field("travel_x: [.nan, 100.0]"), "travel_x");
        assert_eq!(rejected_field("travel_y: [25.0, .inf]"), "travel_y");
    }

    #[test]
    fn unbounded_pointer_range_is_rejected() {
        let field = rejected_field("pointer_range: [-.inf, .inf]");
        assert_eq!(field, "pointer_range");
    }

    #[test]
    fn non_finite_speeds_are_rejected() {
        assert_eq!(rejected_field("propeller_speed: .nan"), "propeller_speed");
        assert_eq!(rejected_field("roll_factor: -.inf"), "roll_factor");
        assert_eq!(rejected_field("step_rate_hz: .inf"), "step_rate_hz");
        assert_eq!(rejected_field("ease_factor: .nan"), "ease_factor");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SimConfig::from_yaml_str("sead: 1").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SimConfig::load("/nonexistent/aviator.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/aviator.yaml"));
    }
}
