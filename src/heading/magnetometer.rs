//! Raw magnetometer heading strategy.
//!
//! Used when no OS heading service is available. The bearing is derived
//! directly from the horizontal field components, so it is a *magnetic*
//! heading unless the regional declination fallback is enabled, and its
//! accuracy must be guessed from field strength because raw magnetometer
//! APIs carry no calibration indicator.

use crate::angle::normalize;
use crate::config::{DeclinationMode, SensorConfig};
use crate::geo::Coordinates;
use crate::heading::declination::regional_declination;
use crate::heading::{HeadingFix, MagneticVector};
use crate::smoothing::CircularSmoother;

/// Earth's magnetic field is roughly 25-65 µT at the surface. Readings well
/// outside that band mean local interference or an uncalibrated sensor.
const EARTH_FIELD_MIN_UT: f32 = 25.0;
const EARTH_FIELD_MAX_UT: f32 = 65.0;

pub struct MagnetometerSource {
    smoother: CircularSmoother,
    invert_heading: bool,
    offset_degrees: f32,
    declination: DeclinationMode,
    coordinates: Option<Coordinates>,
    available: bool,
    last_fix: Option<HeadingFix>,
}

impl MagnetometerSource {
    pub fn new(config: &SensorConfig, window_size: usize, available: bool) -> Self {
        Self {
            smoother: CircularSmoother::new(window_size),
            invert_heading: config.invert_heading,
            offset_degrees: config.heading_offset_degrees,
            declination: config.declination,
            coordinates: None,
            available,
            last_fix: None,
        }
    }

    /// Process one field vector into an updated heading fix.
    pub fn push_vector(&mut self, vector: MagneticVector) -> HeadingFix {
        let mut raw = normalize(vector.y.atan2(vector.x).to_degrees());
        if self.invert_heading {
            raw += 180.0;
        }
        raw += self.offset_degrees;
        if self.declination == DeclinationMode::Regional {
            if let Some(coords) = self.coordinates {
                raw += regional_declination(coords);
            }
        }
        let raw = normalize(raw);

        let fix = HeadingFix {
            heading: self.smoother.add_value(raw),
            raw_heading: raw,
            accuracy: field_accuracy(vector.magnitude()),
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

    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.coordinates = Some(coordinates);
    }

    pub fn reset(&mut self) {
        self.smoother.reset();
        self.last_fix = None;
    }
}

/// Accuracy heuristic from total field strength.
///
/// Full trust inside the Earth-field band; linear falloff to zero at 0 µT
/// below the band and at twice the band maximum above it (a nearby magnet
/// or speaker easily triples the measured field).
fn field_accuracy(magnitude_ut: f32) -> f32 {
    if magnitude_ut <= 0.0 {
        return 0.0;
    }
    if magnitude_ut < EARTH_FIELD_MIN_UT {
        magnitude_ut / EARTH_FIELD_MIN_UT
    } else if magnitude_ut <= EARTH_FIELD_MAX_UT {
        1.0
    } else {
        (1.0 - (magnitude_ut - EARTH_FIELD_MAX_UT) / EARTH_FIELD_MAX_UT).clamp(0.0, 1.0)
    }
}
