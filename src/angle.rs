//! Compass angle arithmetic on the circular topology.
//!
//! All public angles in this crate are degrees clockwise from North,
//! normalized to `[0, 360)`. Signed deltas live in `(-180, 180]`. Any
//! averaging or differencing of bearings must go through these helpers (or
//! the circular smoother) rather than raw linear arithmetic, which breaks
//! at the 0°/360° seam.

use std::fmt;

/// Normalize an angle in degrees to `[0, 360)`.
///
/// Handles negative inputs and inputs beyond a full turn:
/// `normalize(-45.0) == 315.0`, `normalize(450.0) == 90.0`.
///
/// NaN normalizes to 0.0 so a bad sensor sample stalls the compass instead
/// of poisoning every downstream computation.
pub fn normalize(degrees: f32) -> f32 {
    if degrees.is_nan() {
        return 0.0;
    }
    ((degrees % 360.0) + 360.0) % 360.0
}

/// Signed shortest rotation from `from` to `to`, in `(-180, 180]` degrees.
///
/// Positive means clockwise. Round-trips: `normalize(from + shortest_delta(from, to))`
/// equals `normalize(to)`.
pub fn shortest_delta(from: f32, to: f32) -> f32 {
    let delta = normalize(to - from);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Whether `angle` is within `tolerance` degrees of `target` on the circle.
pub fn is_within_tolerance(angle: f32, target: f32, tolerance: f32) -> bool {
    shortest_delta(angle, target).abs() <= tolerance
}

/// Eight-point compass rose direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinal {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Cardinal {
    /// Map a bearing to the nearest of the 8 rose points.
    ///
    /// Each point owns a 45° sector centered on its nominal bearing, so
    /// 337.5°..22.5° is North, 22.5°..67.5° is NorthEast, and so on.
    pub fn from_degrees(degrees: f32) -> Self {
        const ROSE: [Cardinal; 8] = [
            Cardinal::North,
            Cardinal::NorthEast,
            Cardinal::East,
            Cardinal::SouthEast,
            Cardinal::South,
            Cardinal::SouthWest,
            Cardinal::West,
            Cardinal::NorthWest,
        ];
        let sector = (normalize(degrees) / 45.0).round() as usize % 8;
        ROSE[sector]
    }

    /// Short label, e.g. "NE".
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Cardinal::North => "N",
            Cardinal::NorthEast => "NE",
            Cardinal::East => "E",
            Cardinal::SouthEast => "SE",
            Cardinal::South => "S",
            Cardinal::SouthWest => "SW",
            Cardinal::West => "W",
            Cardinal::NorthWest => "NW",
        }
    }
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Format a bearing as fixed-point degrees with a degree sign.
///
/// The value is normalized first, so `format_degrees(-45.0, 0)` is `"315°"`.
pub fn format_degrees(degrees: f32, decimals: usize) -> String {
    format!("{:.*}°", decimals, normalize(degrees))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normalize_range() {
        assert_abs_diff_eq!(normalize(-45.0), 315.0);
        assert_abs_diff_eq!(normalize(450.0), 90.0);
        assert_abs_diff_eq!(normalize(0.0), 0.0);
        assert_abs_diff_eq!(normalize(360.0), 0.0);
        assert_abs_diff_eq!(normalize(-720.5), 359.5);

        for x in [-1080.0f32, -359.9, -0.1, 0.0, 179.9, 359.9, 360.1, 7200.25] {
            let n = normalize(x);
            assert!((0.0..360.0).contains(&n), "normalize({x}) = {n}");
        }
    }

    #[test]
    fn test_normalize_nan_sentinel() {
        assert_eq!(normalize(f32::NAN), 0.0);
    }

    #[test]
    fn test_shortest_delta_seam() {
        assert_abs_diff_eq!(shortest_delta(10.0, 350.0), -20.0);
        assert_abs_diff_eq!(shortest_delta(350.0, 10.0), 20.0);
        assert_abs_diff_eq!(shortest_delta(0.0, 0.0), 0.0);
        // Boundary: exactly opposite pins to +180.
        assert_abs_diff_eq!(shortest_delta(90.0, 270.0), 180.0);
    }

    #[test]
    fn test_shortest_delta_round_trip() {
        for from in [0.0f32, 10.0, 90.0, 179.0, 181.0, 350.0] {
            for to in [0.0f32, 45.0, 180.0, 270.0, 359.0] {
                let delta = shortest_delta(from, to);
                assert!((-180.0..=180.0).contains(&delta));
                assert_abs_diff_eq!(
                    normalize(from + delta),
                    normalize(to),
                    epsilon = 1e-3
                );
            }
        }
    }

    #[test]
    fn test_within_tolerance() {
        assert!(is_within_tolerance(92.0, 90.0, 5.0));
        assert!(!is_within_tolerance(96.0, 90.0, 5.0));
        // Across the seam.
        assert!(is_within_tolerance(358.0, 2.0, 5.0));
        assert!(!is_within_tolerance(352.0, 2.0, 5.0));
    }

    #[test]
    fn test_cardinal_sectors() {
        assert_eq!(Cardinal::from_degrees(0.0), Cardinal::North);
        assert_eq!(Cardinal::from_degrees(359.0), Cardinal::North);
        assert_eq!(Cardinal::from_degrees(45.0), Cardinal::NorthEast);
        assert_eq!(Cardinal::from_degrees(100.0), Cardinal::East);
        assert_eq!(Cardinal::from_degrees(157.6), Cardinal::South);
        assert_eq!(Cardinal::from_degrees(292.4), Cardinal::West);
        assert_eq!(Cardinal::from_degrees(-45.0), Cardinal::NorthWest);
    }

    #[test]
    fn test_format_degrees() {
        assert_eq!(format_degrees(90.0, 0), "90°");
        assert_eq!(format_degrees(123.456, 1), "123.5°");
        assert_eq!(format_degrees(-45.0, 0), "315°");
    }
}
