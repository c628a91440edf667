use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cv::Cv2Mode;
use crate::sequencing::Scale;

pub const DEFAULT_BPM: f32 = 120.0;
pub const MIN_BPM: f32 = 2.0;
pub const MAX_BPM: f32 = 200.0;

pub const DEFAULT_ZOOM: f32 = 2.0;
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;

pub const MAX_BASE: i32 = 12;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bpm must be a finite value, got {0}")]
    InvalidBpm(f32),

    #[error("zoom must be a finite value, got {0}")]
    InvalidZoom(f32),

    #[error("{name} must be positive, got {value}")]
    InvalidRate { name: &'static str, value: f32 },

    #[error("block size must be at least one frame")]
    EmptyBlock,

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Musical parameters the control layer may change between ticks.
///
/// The sequencer core reads these as-is; the setters and `sanitize` are where
/// range limits are enforced, so a zero or negative bpm never reaches it from
/// here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub bpm: f32,
    pub zoom: f32,
    /// Scale-index offset for the chaos melody
    pub base: i32,
    pub scale: Scale,
    /// Replace the generative melody with a fixed ascending scale
    pub test_mode: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            zoom: DEFAULT_ZOOM,
            base: 0,
            scale: Scale::Major,
            test_mode: false,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config.sanitized())
    }

    /// Reject values that cannot be clamped into range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bpm.is_finite() {
            return Err(ConfigError::InvalidBpm(self.bpm));
        }
        if !self.zoom.is_finite() {
            return Err(ConfigError::InvalidZoom(self.zoom));
        }
        Ok(())
    }

    pub fn sanitized(mut self) -> Self {
        self.set_bpm(self.bpm);
        self.set_zoom(self.zoom);
        self.set_base(self.base);
        self
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_base(&mut self, base: i32) {
        self.base = base.clamp(0, MAX_BASE);
    }
}

/// Host-side settings fixed when the system is built
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub audio_rate: f32,
    /// Frames per audio block; one control tick per block
    pub block_size: usize,
    pub seed: u64,
    pub cv2_mode: Cv2Mode,
    pub mod_gain: f32,
    /// LFO frequency in Hz when CV2 runs in LFO mode
    pub mod_freq: f32,
    pub session: SessionConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            audio_rate: 48000.0,
            block_size: 48,
            seed: 0x5eed,
            cv2_mode: Cv2Mode::Lfo,
            mod_gain: 0.5,
            mod_freq: 0.2,
            session: SessionConfig::default(),
        }
    }
}

impl HostConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: HostConfig = serde_json::from_str(json)?;
        config.validate()?;
        config.session = config.session.sanitized();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.audio_rate.is_finite() && self.audio_rate > 0.0) {
            return Err(ConfigError::InvalidRate {
                name: "audio_rate",
                value: self.audio_rate,
            });
        }
        if self.block_size == 0 {
            return Err(ConfigError::EmptyBlock);
        }
        if !(self.mod_freq.is_finite() && self.mod_freq > 0.0) {
            return Err(ConfigError::InvalidRate {
                name: "mod_freq",
                value: self.mod_freq,
            });
        }
        self.session.validate()
    }

    /// Control ticks per second
    pub fn control_rate(&self) -> f32 {
        self.audio_rate / self.block_size.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_front_panel() {
        let config = SessionConfig::default();
        assert_eq!(config.bpm, 120.0);
        assert_eq!(config.zoom, 2.0);
        assert_eq!(config.base, 0);
        assert_eq!(config.scale, Scale::Major);
        assert!(!config.test_mode);
    }

    #[test]
    fn test_setters_clamp() {
        let mut config = SessionConfig::default();
        config.set_bpm(0.0);
        assert_eq!(config.bpm, MIN_BPM);
        config.set_bpm(1000.0);
        assert_eq!(config.bpm, MAX_BPM);
        config.set_zoom(-3.0);
        assert_eq!(config.zoom, MIN_ZOOM);
        config.set_base(40);
        assert_eq!(config.base, MAX_BASE);
        config.set_base(-2);
        assert_eq!(config.base, 0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SessionConfig::from_json(r#"{ "bpm": 90, "scale": "phrygian" }"#).unwrap();
        assert_eq!(config.bpm, 90.0);
        assert_eq!(config.scale, Scale::Phrygian);
        assert_eq!(config.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn test_json_values_are_clamped() {
        let config = SessionConfig::from_json(r#"{ "bpm": 0, "zoom": 9.5, "base": 20 }"#).unwrap();
        assert_eq!(config.bpm, MIN_BPM);
        assert_eq!(config.zoom, MAX_ZOOM);
        assert_eq!(config.base, MAX_BASE);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let result = SessionConfig::from_json(r#"{ "bpm": "fast" }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));

        let result = SessionConfig::from_json(r#"{ "scale": "lydian" }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_host_config() {
        let config = HostConfig::from_json(
            r#"{
                "audio_rate": 48000,
                "block_size": 4,
                "seed": 7,
                "cv2_mode": "bassline",
                "session": { "test_mode": true }
            }"#,
        )
        .unwrap();
        assert_eq!(config.control_rate(), 12000.0);
        assert_eq!(config.cv2_mode, Cv2Mode::Bassline);
        assert!(config.session.test_mode);
        assert_eq!(config.mod_gain, 0.5);
    }

    #[test]
    fn test_host_config_rejects_bad_rates() {
        let result = HostConfig::from_json(r#"{ "audio_rate": -1 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidRate { name: "audio_rate", .. })));

        let result = HostConfig::from_json(r#"{ "block_size": 0 }"#);
        assert!(matches!(result, Err(ConfigError::EmptyBlock)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::InvalidBpm(f32::NAN).to_string(),
            "bpm must be a finite value, got NaN"
        );
        assert_eq!(ConfigError::EmptyBlock.to_string(), "block size must be at least one frame");
    }
}
