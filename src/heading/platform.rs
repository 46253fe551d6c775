//! OS heading-service strategy.
//!
//! The platform stream already corrects for magnetic declination using the
//! device location, so this is the preferred source. True heading needs a
//! location; when the service has none it reports the -1 sentinel and we
//! fall back to the magnetic heading from the same event.

use crate::angle::normalize;
use crate::config::SensorConfig;
use crate::heading::HeadingFix;
use crate::smoothing::CircularSmoother;

/// Sentinel the platform reports when true heading is unavailable.
pub const TRUE_HEADING_UNAVAILABLE: f32 = -1.0;

/// Highest level of the platform's discrete accuracy enum (0-3).
const MAX_ACCURACY_LEVEL: u8 = 3;

/// One event from the platform heading stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformHeading {
    /// Heading relative to true north, or [`TRUE_HEADING_UNAVAILABLE`].
    pub true_heading: f32,
    /// Heading relative to magnetic north; always present.
    pub magnetic_heading: f32,
    /// Platform accuracy enum, 0 (unreliable) to 3 (high).
    pub accuracy_level: u8,
}

impl PlatformHeading {
    /// Event with a valid true heading.
    pub fn with_true(true_heading: f32, magnetic_heading: f32, accuracy_level: u8) -> Self {
        Self {
            true_heading,
            magnetic_heading,
            accuracy_level,
        }
    }

    /// Event carrying only a magnetic heading (e.g. no location permission).
    pub fn magnetic_only(magnetic_heading: f32, accuracy_level: u8) -> Self {
        Self {
            true_heading: TRUE_HEADING_UNAVAILABLE,
            magnetic_heading,
            accuracy_level,
        }
    }
}

pub struct PlatformHeadingSource {
    smoother: CircularSmoother,
    invert_heading: bool,
    offset_degrees: f32,
    available: bool,
    last_fix: Option<HeadingFix>,
    using_true: bool,
}

impl PlatformHeadingSource {
    pub fn new(config: &SensorConfig, window_size: usize, available: bool) -> Self {
        Self {
            smoother: CircularSmoother::new(window_size),
            invert_heading: config.invert_heading,
            offset_degrees: config.heading_offset_degrees,
            available,
            last_fix: None,
            using_true: false,
        }
    }

    /// Process one heading event into an updated fix.
    pub fn push_heading(&mut self, event: PlatformHeading) -> HeadingFix {
        let has_true = event.true_heading >= 0.0;
        if has_true != self.using_true {
            self.using_true = has_true;
            log::debug!(
                "platform heading source now using {} heading",
                if has_true { "true" } else { "magnetic" }
            );
        }
        let mut raw = if has_true {
            event.true_heading
        } else {
            event.magnetic_heading
        };
        if self.invert_heading {
            raw += 180.0;
        }
        raw = normalize(raw + self.offset_degrees);

        let accuracy = event.accuracy_level.min(MAX_ACCURACY_LEVEL) as f32
            / MAX_ACCURACY_LEVEL as f32;

        let fix = HeadingFix {
            heading: self.smoother.add_value(raw),
            raw_heading: raw,
            accuracy,
        };
        self.last_fix = Some(fix);
        fix
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn last_fix(&self) -> Option<HeadingFix> {
        self.last_fix
    }

    pub fn reset(&mut self) {
        self.smoother.reset();
        self.last_fix = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn source() -> PlatformHeadingSource {
        PlatformHeadingSource::new(&SensorConfig::default(), 5, true)
    }

    #[test]
    fn test_prefers_true_heading() {
        let mut source = source();
        let fix = source.push_heading(PlatformHeading::with_true(120.0, 131.0, 3));
        assert_abs_diff_eq!(fix.raw_heading, 120.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sentinel_falls_back_to_magnetic() {
        let mut source = source();
        let fix = source.push_heading(PlatformHeading::magnetic_only(131.0, 2));
        assert_abs_diff_eq!(fix.raw_heading, 131.0, epsilon = 1e-3);
    }

    #[test]
    fn test_accuracy_level_mapping() {
        let mut source = source();
        assert_abs_diff_eq!(
            source.push_heading(PlatformHeading::with_true(0.0, 0.0, 0)).accuracy,
            0.0
        );
        assert_abs_diff_eq!(
            source.push_heading(PlatformHeading::with_true(0.0, 0.0, 2)).accuracy,
            2.0 / 3.0
        );
        assert_abs_diff_eq!(
            source.push_heading(PlatformHeading::with_true(0.0, 0.0, 3)).accuracy,
            1.0
        );
        // Out-of-range level clamps rather than overflowing past 1.
        assert_abs_diff_eq!(
            source.push_heading(PlatformHeading::with_true(0.0, 0.0, 9)).accuracy,
            1.0
        );
    }

    #[test]
    fn test_invert_and_offset_consistent_with_magnetometer() {
        let config = SensorConfig {
            invert_heading: true,
            heading_offset_degrees: -5.0,
            ..SensorConfig::default()
        };
        let mut source = PlatformHeadingSource::new(&config, 5, true);
        let fix = source.push_heading(PlatformHeading::with_true(30.0, 30.0, 3));
        assert_abs_diff_eq!(fix.raw_heading, 205.0, epsilon = 1e-3);
    }

    #[test]
    fn test_smoothed_across_seam() {
        let mut source = source();
        for h in [358.0, 359.0, 0.0, 1.0, 2.0] {
            source.push_heading(PlatformHeading::with_true(h, h, 3));
        }
        let fix = source.last_fix().unwrap();
        assert!(fix.heading < 2.0 || fix.heading > 358.0, "got {}", fix.heading);
    }
}
