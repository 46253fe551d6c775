//! Synthetic sensor traces for tests and the CLI.
//!
//! Generates timestamped heading or magnetometer event streams with a
//! deterministic seeded RNG, so a given seed always reproduces the same
//! trace.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::angle::normalize;
use crate::heading::{MagneticVector, PlatformHeading, SensorEvent};

/// Options for a synthetic heading walk.
#[derive(Debug, Clone)]
pub struct TraceOptions {
    /// Total trace duration in milliseconds.
    pub duration_ms: u64,
    /// Sample interval in milliseconds.
    pub interval_ms: u64,
    /// Heading at t = 0, degrees.
    pub start_degrees: f32,
    /// Constant device turn rate, degrees per second (signed).
    pub turn_rate_deg_per_s: f32,
    /// Gaussian heading jitter, degrees (standard deviation).
    pub jitter_degrees: f32,
    /// RNG seed.
    pub seed: u64,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            duration_ms: 10_000,
            interval_ms: 150,
            start_degrees: 90.0,
            turn_rate_deg_per_s: -9.0,
            jitter_degrees: 2.0,
            seed: 7,
        }
    }
}

/// The true (noise-free) heading of the walk at time `t_ms`.
pub fn true_heading_at(options: &TraceOptions, t_ms: u64) -> f32 {
    normalize(options.start_degrees + options.turn_rate_deg_per_s * t_ms as f32 / 1000.0)
}

/// Generate timestamped platform heading events.
pub fn platform_trace(options: &TraceOptions, accuracy_level: u8) -> Vec<(u64, SensorEvent)> {
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let noise = Normal::new(0.0f32, options.jitter_degrees.max(1e-6)).unwrap();

    sample_times(options)
        .map(|t_ms| {
            let heading = normalize(true_heading_at(options, t_ms) + noise.sample(&mut rng));
            (
                t_ms,
                SensorEvent::Heading(PlatformHeading::with_true(heading, heading, accuracy_level)),
            )
        })
        .collect()
}

/// Generate timestamped raw magnetometer events for the same walk.
///
/// The horizontal field points along the heading with an Earth-typical
/// magnitude; per-axis Gaussian noise is scaled so the angular jitter is
/// comparable to the platform trace.
pub fn magnetometer_trace(options: &TraceOptions, field_ut: f32) -> Vec<(u64, SensorEvent)> {
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let horizontal = field_ut * 0.7;
    let vertical = field_ut * 0.7;
    let axis_noise = Normal::new(
        0.0f32,
        (options.jitter_degrees.max(1e-6).to_radians() * horizontal).max(1e-6),
    )
    .unwrap();

    sample_times(options)
        .map(|t_ms| {
            let radians = true_heading_at(options, t_ms).to_radians();
            let vector = MagneticVector::new(
                horizontal * radians.cos() + axis_noise.sample(&mut rng),
                horizontal * radians.sin() + axis_noise.sample(&mut rng),
                -vertical + axis_noise.sample(&mut rng),
            );
            (t_ms, SensorEvent::MagneticField(vector))
        })
        .collect()
}

fn sample_times(options: &TraceOptions) -> impl Iterator<Item = u64> + use<> {
    let interval = options.interval_ms.max(1);
    let steps = options.duration_ms / interval;
    (0..=steps).map(move |i| i * interval)
}
