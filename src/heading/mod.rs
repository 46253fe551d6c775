//! Heading acquisition strategies.
//!
//! Two interchangeable adapters produce the same [`HeadingFix`] shape: a raw
//! magnetometer path that derives the bearing in-crate, and a platform
//! heading-service path that arrives with declination already applied.
//! Selection happens once at construction from [`SensorConfig`]; callers
//! only ever see [`HeadingSource`].

mod declination;
mod magnetometer;
mod platform;

pub use declination::regional_declination;
pub use magnetometer::MagnetometerSource;
pub use platform::{PlatformHeading, PlatformHeadingSource};

use crate::config::{HeadingSourceKind, SensorConfig};
use crate::geo::Coordinates;

/// A raw timestamped heading observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSample {
    /// Bearing in degrees, `[0, 360)`.
    pub degrees: f32,
    /// Wall-clock milliseconds.
    pub timestamp_ms: u64,
}

/// Raw 3-axis magnetic field reading in microtesla.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticVector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MagneticVector {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Total field strength in microtesla.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// One push event from the sensor collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    /// Raw magnetometer sample (magnetometer strategy).
    MagneticField(MagneticVector),
    /// Platform heading-service update (platform strategy).
    Heading(PlatformHeading),
}

/// Smoothed heading output common to both strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingFix {
    /// Smoothed heading in degrees, `[0, 360)`.
    pub heading: f32,
    /// Unsmoothed heading from the same sample, `[0, 360)`.
    pub raw_heading: f32,
    /// Sensor accuracy normalized to `[0, 1]`.
    pub accuracy: f32,
}

/// Heading strategy selected at pipeline construction.
///
/// `available` reflects the collaborator's capability check for the chosen
/// sensor. It is distinct from "no fix yet": an available source simply has
/// not received its first sample, which is not an error.
pub enum HeadingSource {
    Magnetometer(MagnetometerSource),
    Platform(PlatformHeadingSource),
}

impl HeadingSource {
    /// Build the strategy named by the configuration.
    ///
    /// `available` comes from the platform capability check for that sensor.
    pub fn new(config: &SensorConfig, window_size: usize, available: bool) -> Self {
        match config.source {
            HeadingSourceKind::Magnetometer => {
                Self::Magnetometer(MagnetometerSource::new(config, window_size, available))
            }
            HeadingSourceKind::Platform => {
                Self::Platform(PlatformHeadingSource::new(config, window_size, available))
            }
        }
    }

    /// Feed one sensor event. Returns the updated fix, or `None` when the
    /// event kind does not match the strategy (logged and dropped, never an
    /// error: mixed streams can happen during strategy switchover).
    pub fn ingest(&mut self, event: SensorEvent) -> Option<HeadingFix> {
        match (self, event) {
            (Self::Magnetometer(source), SensorEvent::MagneticField(vector)) => {
                Some(source.push_vector(vector))
            }
            (Self::Platform(source), SensorEvent::Heading(heading)) => {
                Some(source.push_heading(heading))
            }
            (_, event) => {
                log::warn!("dropping sensor event not matching active strategy: {event:?}");
                None
            }
        }
    }

    /// Whether the underlying sensor hardware exists on this device.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Magnetometer(source) => source.is_available(),
            Self::Platform(source) => source.is_available(),
        }
    }

    /// Latest fix, if any sample has been processed yet.
    pub fn last_fix(&self) -> Option<HeadingFix> {
        match self {
            Self::Magnetometer(source) => source.last_fix(),
            Self::Platform(source) => source.last_fix(),
        }
    }

    /// Inform the magnetometer path of the current location, for the
    /// regional declination fallback. No-op for the platform path, which
    /// corrects declination itself.
    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        if let Self::Magnetometer(source) = self {
            source.set_coordinates(coordinates);
        }
    }

    /// Clear smoothing state and the last fix.
    pub fn reset(&mut self) {
        match self {
            Self::Magnetometer(source) => source.reset(),
            Self::Platform(source) => source.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SensorConfig;

    #[test]
    fn test_mismatched_event_dropped() {
        let config = SensorConfig {
            source: HeadingSourceKind::Platform,
            ..SensorConfig::default()
        };
        let mut source = HeadingSource::new(&config, 5, true);
        let fix = source.ingest(SensorEvent::MagneticField(MagneticVector::new(
            30.0, 0.0, -20.0,
        )));
        assert!(fix.is_none());
        assert!(source.last_fix().is_none());
    }

    #[test]
    fn test_availability_distinct_from_no_data() {
        let config = SensorConfig::default();
        let source = HeadingSource::new(&config, 5, true);
        assert!(source.is_available());
        assert!(source.last_fix().is_none());

        let unavailable = HeadingSource::new(&config, 5, false);
        assert!(!unavailable.is_available());
    }

    #[test]
    fn test_magnitude() {
        let v = MagneticVector::new(3.0, 4.0, 12.0);
        assert!((v.magnitude() - 13.0).abs() < 1e-5);
    }
}
