//! Coarse regional magnetic declination fallback.
//!
//! A handful of continent-scale boxes with a single declination value each.
//! This is a deliberately rough approximation (real declination varies by
//! tens of degrees within some of these boxes and drifts year over year);
//! it exists only so the magnetometer-only path can offer *roughly* true
//! headings on devices without a platform heading service. Anything needing
//! real accuracy should use the platform source, which applies a proper
//! magnetic model.

use crate::geo::Coordinates;

struct Region {
    lat: (f32, f32),
    lon: (f32, f32),
    declination: f32,
}

const REGIONS: &[Region] = &[
    // Australia
    Region {
        lat: (-45.0, -10.0),
        lon: (110.0, 155.0),
        declination: 10.0,
    },
    // Middle East
    Region {
        lat: (12.0, 42.0),
        lon: (25.0, 60.0),
        declination: 4.0,
    },
    // North America
    Region {
        lat: (15.0, 72.0),
        lon: (-170.0, -50.0),
        declination: -8.0,
    },
    // Europe
    Region {
        lat: (35.0, 72.0),
        lon: (-10.0, 40.0),
        declination: 3.0,
    },
];

/// Approximate declination in degrees for the given position.
///
/// Positive means magnetic north lies east of true north, so the value is
/// *added* to a magnetic heading to approximate a true heading. Positions
/// outside every region get 0 (no correction).
pub fn regional_declination(position: Coordinates) -> f32 {
    for region in REGIONS {
        if (region.lat.0..=region.lat.1).contains(&position.latitude)
            && (region.lon.0..=region.lon.1).contains(&position.longitude)
        {
            return region.declination;
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_lookup() {
        assert_eq!(regional_declination(Coordinates::new(-33.9, 151.2)), 10.0); // Sydney
        assert_eq!(regional_declination(Coordinates::new(21.4, 39.8)), 4.0); // Mecca
        assert_eq!(regional_declination(Coordinates::new(40.7, -74.0)), -8.0); // New York
        assert_eq!(regional_declination(Coordinates::new(51.5, -0.13)), 3.0); // London
    }

    #[test]
    fn test_outside_all_regions() {
        assert_eq!(regional_declination(Coordinates::new(-6.2, 106.8)), 0.0); // Jakarta
        assert_eq!(regional_declination(Coordinates::new(0.0, -30.0)), 0.0); // mid-Atlantic
    }

    #[test]
    fn test_middle_east_wins_over_europe_overlap() {
        // Turkey sits in both boxes; region order pins the answer.
        assert_eq!(regional_declination(Coordinates::new(39.9, 32.9)), 4.0); // Ankara
    }
}
