//! Perception tuning loaded from JSON, with clamping and hot reload.
//!
//! Every document goes through [`PerceptionConfig::sanitised`] before the
//! core sees it, so downstream code never re-validates. [`ConfigFile`]
//! re-reads its file whenever the modification time changes and keeps the
//! last good configuration when the new contents fail to parse.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_DETECTION_RADIUS, DEFAULT_FOV_HALF_ANGLE, DEFAULT_HEARING_RADIUS,
    DEFAULT_POLL_INTERVAL, HUD_COOLDOWN, MAX_DETECTION_RADIUS, MAX_POLL_INTERVAL,
    MESSAGE_DURATION, MIN_DETECTION_RADIUS, MIN_POLL_INTERVAL,
};
use crate::numeric::{clamp_or, clamp_seconds_or, positive_radius_or};
use crate::perception::EvaluationParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid perception config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tuning parameters for the perception layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    pub detection_radius: f32,
    /// Validated and carried but not used by the aggregate.
    pub hearing_radius: f32,
    pub fov_half_angle: f32,
    /// Seconds between spatial polls.
    pub poll_interval: f64,
    /// Minimum seconds between two textual HUD reports.
    pub hud_cooldown: f64,
    /// Seconds a queued HUD message stays visible.
    pub message_duration: f32,
    pub debug: bool,
    pub enable_hud: bool,
    pub enable_event_hook: bool,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            detection_radius: DEFAULT_DETECTION_RADIUS,
            hearing_radius: DEFAULT_HEARING_RADIUS,
            fov_half_angle: DEFAULT_FOV_HALF_ANGLE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            hud_cooldown: HUD_COOLDOWN,
            message_duration: MESSAGE_DURATION,
            debug: false,
            enable_hud: true,
            enable_event_hook: true,
        }
    }
}

impl PerceptionConfig {
    /// Parses a JSON document and sanitises it.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] when the document is not valid JSON
    /// or a field has the wrong type. Missing fields take their defaults.
    ///
    /// # Examples
    /// ```
    /// use lurk::config::PerceptionConfig;
    /// let config = PerceptionConfig::from_json_str(r#"{ "poll_interval": 4.0 }"#).unwrap();
    /// assert_eq!(config.poll_interval, 1.0);
    /// assert_eq!(config.detection_radius, 30.0);
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: Self = serde_json::from_str(text)?;
        Ok(raw.sanitised())
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    /// See [`ConfigError`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Folds every field back into its valid range.
    #[must_use]
    pub fn sanitised(self) -> Self {
        Self {
            detection_radius: positive_radius_or(
                self.detection_radius,
                MIN_DETECTION_RADIUS,
                MAX_DETECTION_RADIUS,
                DEFAULT_DETECTION_RADIUS,
            ),
            hearing_radius: clamp_or(self.hearing_radius, 0.0, f32::MAX, DEFAULT_HEARING_RADIUS),
            fov_half_angle: clamp_or(self.fov_half_angle, 0.0, 180.0, DEFAULT_FOV_HALF_ANGLE),
            poll_interval: clamp_seconds_or(
                self.poll_interval,
                MIN_POLL_INTERVAL,
                MAX_POLL_INTERVAL,
                DEFAULT_POLL_INTERVAL,
            ),
            hud_cooldown: clamp_seconds_or(self.hud_cooldown, 0.0, f64::MAX, HUD_COOLDOWN),
            message_duration: if self.message_duration.is_finite() && self.message_duration > 0.0
            {
                self.message_duration
            } else {
                MESSAGE_DURATION
            },
            ..self
        }
    }

    #[must_use]
    pub const fn evaluation_params(&self) -> EvaluationParams {
        EvaluationParams {
            detection_radius: self.detection_radius,
            fov_half_angle: self.fov_half_angle,
        }
    }
}

/// Somewhere the current configuration can be read from, once per tick.
pub trait ConfigSource {
    fn current(&mut self) -> PerceptionConfig;
}

impl ConfigSource for PerceptionConfig {
    fn current(&mut self) -> PerceptionConfig {
        self.clone()
    }
}

/// A JSON file reloaded whenever its modification time changes.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    modified: Option<SystemTime>,
    config: PerceptionConfig,
}

impl ConfigFile {
    /// Loads `path` for the first time.
    ///
    /// # Errors
    /// Fails when the initial read or parse fails; later failures keep the
    /// last good configuration instead.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = PerceptionConfig::load(&path)?;
        let modified = modified_time(&path);
        info!("perception config loaded from {}", path.display());
        Ok(Self {
            path,
            modified,
            config,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reload_if_changed(&mut self) {
        let modified = modified_time(&self.path);
        if modified.is_none() || modified == self.modified {
            return;
        }
        self.modified = modified;
        match PerceptionConfig::load(&self.path) {
            Ok(config) => {
                info!("perception config reloaded from {}", self.path.display());
                self.config = config;
            }
            Err(err) => warn!("keeping previous perception config: {err}"),
        }
    }
}

impl ConfigSource for ConfigFile {
    fn current(&mut self) -> PerceptionConfig {
        self.reload_if_changed();
        self.config.clone()
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_shipped_values() {
        let config = PerceptionConfig::default();
        assert_eq!(config.detection_radius, 30.0);
        assert_eq!(config.hearing_radius, 20.0);
        assert_eq!(config.poll_interval, 0.3);
        assert_eq!(config.hud_cooldown, 1.25);
        assert!(config.enable_hud && config.enable_event_hook && !config.debug);
    }

    #[rstest]
    #[case::negative_radius(r#"{ "detection_radius": -3 }"#, 30.0, 0.3)]
    #[case::huge_radius(r#"{ "detection_radius": 500 }"#, 60.0, 0.3)]
    #[case::tiny_radius(r#"{ "detection_radius": 1 }"#, 5.0, 0.3)]
    #[case::fast_poll(r#"{ "poll_interval": 0.01 }"#, 30.0, 0.1)]
    #[case::slow_poll(r#"{ "poll_interval": 9 }"#, 30.0, 1.0)]
    fn loading_clamps_values(#[case] json: &str, #[case] radius: f32, #[case] interval: f64) {
        let config = PerceptionConfig::from_json_str(json).expect("valid document");
        assert_eq!(config.detection_radius, radius);
        assert_eq!(config.poll_interval, interval);
    }

    #[rstest]
    fn non_finite_values_fall_back() {
        let raw = PerceptionConfig {
            poll_interval: f64::NAN,
            hud_cooldown: f64::INFINITY,
            message_duration: -1.0,
            fov_half_angle: f32::NAN,
            ..PerceptionConfig::default()
        };
        let config = raw.sanitised();
        assert_eq!(config.poll_interval, 0.3);
        assert_eq!(config.hud_cooldown, 1.25);
        assert_eq!(config.message_duration, 3.5);
        assert_eq!(config.fov_half_angle, 85.0);
    }

    #[rstest]
    fn malformed_json_is_a_parse_error() {
        let err = PerceptionConfig::from_json_str("{ nope").expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[rstest]
    fn missing_file_is_an_io_error() {
        let err = ConfigFile::open("/definitely/not/here.json").expect_err("should fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
