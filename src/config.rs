//! Configuration for the qibla compass pipeline.
//!
//! All tuning lives in one immutable [`CompassConfig`] value threaded into
//! each component at construction time. There is no global mutable config;
//! presets are factory functions returning ordinary values.
//!
//! ```
//! use mihrab::config::CompassConfig;
//!
//! let mut config = CompassConfig::default();
//! config.smoothing.window_size = 8;
//! config.alignment.tolerance_degrees = 5.0;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CompassError, Result};
use crate::smoothing::{MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};

/// Which heading strategy the pipeline is built around.
///
/// Selection happens once at pipeline construction based on platform
/// capability, not per update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingSourceKind {
    /// OS heading service with declination already applied (preferred).
    Platform,
    /// Raw 3-axis magnetometer vector, bearing derived in-crate.
    Magnetometer,
}

/// Declination handling for the magnetometer path.
///
/// The platform heading service applies the proper magnetic model itself, so
/// this only matters for [`HeadingSourceKind::Magnetometer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DeclinationMode {
    /// No correction; headings are magnetic.
    #[default]
    None,
    /// Coarse per-region lookup table. A documented approximation, only a
    /// fallback for when the platform service is unavailable.
    Regional,
}

/// System-wide compass configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompassConfig {
    /// Heading sensor configuration
    pub sensor: SensorConfig,
    /// Heading smoothing configuration
    pub smoothing: SmoothingConfig,
    /// Confidence estimation and calibration-hint configuration
    pub confidence: ConfidenceConfig,
    /// Dial rotation and alignment configuration
    pub alignment: AlignmentConfig,
    /// Debug flag for the presentation layer; never branches core math
    pub debug_mode: bool,
}

/// Heading sensor configuration.
///
/// The invert/offset corrections exist for devices whose magnetometer axes
/// or mounting disagree with the expected orientation; both apply uniformly
/// to either source kind so switching strategies never changes calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Which heading strategy to build
    pub source: HeadingSourceKind,
    /// Magnetometer poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Add 180° to every raw heading
    pub invert_heading: bool,
    /// Fixed correction added to every raw heading, in degrees
    pub heading_offset_degrees: f32,
    /// Declination handling for the magnetometer path
    pub declination: DeclinationMode,
}

/// Heading smoothing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Circular-mean window size in samples (1-20)
    pub window_size: usize,
}

/// Confidence estimation configuration.
///
/// The weights and thresholds are empirically tuned defaults, not
/// invariants; override freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Trailing jitter window in milliseconds
    pub jitter_window_ms: u64,
    /// Circular stddev (degrees) at which the jitter score reaches zero
    pub jitter_bad_degrees: f32,
    /// Weight of the sensor-accuracy sub-score in the blend
    pub accuracy_weight: f32,
    /// Weight of the jitter sub-score in the blend
    pub jitter_weight: f32,
    /// Below this composite confidence the heading is flagged low-confidence
    pub low_threshold: f32,
    /// Confidence must stay low this long before a calibration hint fires (ms)
    pub hint_hold_ms: u64,
    /// After dismissal, suppress the hint for this long (ms)
    pub hint_snooze_ms: u64,
}

/// Dial rotation and alignment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Heading counts as aligned within this many degrees of the bearing
    pub tolerance_degrees: f32,
    /// Skip dial updates smaller than this, in degrees
    pub min_change_degrees: f32,
    /// Swap left/right turn instructions
    pub invert_instructions: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            source: HeadingSourceKind::Platform,
            poll_interval_ms: 150,
            invert_heading: false,
            heading_offset_degrees: 0.0,
            declination: DeclinationMode::None,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { window_size: 5 }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            jitter_window_ms: 1500,
            jitter_bad_degrees: 10.0,
            accuracy_weight: 0.6,
            jitter_weight: 0.4,
            low_threshold: 0.5,
            hint_hold_ms: 3000,
            hint_snooze_ms: 120_000,
        }
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            tolerance_degrees: 10.0,
            min_change_degrees: 1.5,
            invert_instructions: false,
        }
    }
}

impl CompassConfig {
    /// Preset favoring responsiveness: short window, eager dial updates.
    pub fn responsive() -> Self {
        let mut config = Self::default();
        config.smoothing.window_size = 3;
        config.alignment.min_change_degrees = 0.5;
        config
    }

    /// Preset favoring stability: long window, stricter hint gating.
    pub fn steady() -> Self {
        let mut config = Self::default();
        config.smoothing.window_size = 10;
        config.alignment.min_change_degrees = 2.0;
        config.confidence.hint_hold_ms = 5000;
        config
    }

    /// Parse a configuration from TOML text. Missing fields take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CompassError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CompassError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Reject values the pipeline cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&self.smoothing.window_size) {
            return Err(CompassError::Config(format!(
                "smoothing window must be {MIN_WINDOW_SIZE}-{MAX_WINDOW_SIZE}, got {}",
                self.smoothing.window_size
            )));
        }
        if self.sensor.poll_interval_ms == 0 {
            return Err(CompassError::Config(
                "poll interval must be positive".to_string(),
            ));
        }
        if self.alignment.tolerance_degrees <= 0.0 {
            return Err(CompassError::Config(
                "alignment tolerance must be positive".to_string(),
            ));
        }
        let weight_sum = self.confidence.accuracy_weight + self.confidence.jitter_weight;
        if self.confidence.accuracy_weight < 0.0
            || self.confidence.jitter_weight < 0.0
            || weight_sum <= 0.0
        {
            return Err(CompassError::Config(
                "confidence weights must be non-negative and sum above zero".to_string(),
            ));
        }
        Ok(())
    }
}
