use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One tick at 60 Hz, in microseconds.
pub const DEFAULT_FRAME_US: u64 = 16_667;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_frame_us")]
    pub frame_us: u64,
    /// Euler step applied to motion each tick. Authored speeds are in
    /// pixels per 50ms, hence frame length / 50.
    #[serde(default = "default_motion_dt")]
    pub motion_dt: f64,
    #[serde(default = "default_transition_frames")]
    pub transition_frames: u32,
    #[serde(default = "default_starting_lives")]
    pub starting_lives: i64,
    #[serde(default)]
    pub level_select: bool,
    #[serde(default = "default_max_steps_per_frame")]
    pub max_steps_per_frame: u32,
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.frame_us == 0 {
            return Err(EngineError::Validation(
                "config frame_us must be > 0".to_string(),
            ));
        }
        if !self.motion_dt.is_finite() || self.motion_dt <= 0.0 {
            return Err(EngineError::Validation(
                "config motion_dt must be a positive number".to_string(),
            ));
        }
        if self.starting_lives < 1 {
            return Err(EngineError::Validation(
                "config starting_lives must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_us: default_frame_us(),
            motion_dt: default_motion_dt(),
            transition_frames: default_transition_frames(),
            starting_lives: default_starting_lives(),
            level_select: false,
            max_steps_per_frame: default_max_steps_per_frame(),
        }
    }
}

const fn default_frame_us() -> u64 {
    DEFAULT_FRAME_US
}

fn default_motion_dt() -> f64 {
    DEFAULT_FRAME_US as f64 / 1000.0 / 50.0
}

const fn default_transition_frames() -> u32 {
    150
}

const fn default_starting_lives() -> i64 {
    5
}

const fn default_max_steps_per_frame() -> u32 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.transition_frames, 150);
        assert!((config.motion_dt - 0.33334).abs() < 1e-9);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "transition_frames": 0, "level_select": true }"#)
                .expect("parse");
        assert_eq!(config.transition_frames, 0);
        assert!(config.level_select);
        assert_eq!(config.frame_us, DEFAULT_FRAME_US);
    }

    #[test]
    fn validate_rejects_non_positive_motion_step() {
        let config = EngineConfig {
            motion_dt: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(EngineConfig::default().validate().is_ok());
    }
}
