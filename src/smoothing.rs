//! Sliding-window circular mean for heading smoothing.

use std::collections::VecDeque;

use crate::angle::normalize;

/// Smallest accepted smoothing window.
pub const MIN_WINDOW_SIZE: usize = 1;
/// Largest useful smoothing window; beyond this the dial lags visibly.
pub const MAX_WINDOW_SIZE: usize = 20;

/// Moving average over compass headings.
///
/// A naive arithmetic mean fails at the 0°/360° seam: averaging
/// `{359°, 1°, 2°}` linearly gives 120.67° instead of ≈0.67°. This smoother
/// stores each sample as its (sin, cos) unit-vector components and recovers
/// the mean direction with `atan2`, which is correct on the circle.
///
/// Same shape as a windowed moving-average filter: `add_value` pushes a
/// sample and returns the updated smoothed heading.
#[derive(Debug, Clone)]
pub struct CircularSmoother {
    window: VecDeque<(f32, f32)>,
    capacity: usize,
}

impl CircularSmoother {
    /// Create a smoother holding the last `window_size` samples.
    ///
    /// `window_size` is clamped to `[MIN_WINDOW_SIZE, MAX_WINDOW_SIZE]`.
    pub fn new(window_size: usize) -> Self {
        let capacity = window_size.clamp(MIN_WINDOW_SIZE, MAX_WINDOW_SIZE);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a heading in degrees and return the new circular mean in `[0, 360)`.
    pub fn add_value(&mut self, degrees: f32) -> f32 {
        let radians = normalize(degrees).to_radians();
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back((radians.sin(), radians.cos()));
        self.smoothed()
    }

    /// Current circular mean in `[0, 360)`, or 0° when empty.
    pub fn smoothed(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        let n = self.window.len() as f32;
        let (sin_sum, cos_sum) = self
            .window
            .iter()
            .fold((0.0f32, 0.0f32), |(s, c), &(sin, cos)| (s + sin, c + cos));
        normalize((sin_sum / n).atan2(cos_sum / n).to_degrees())
    }

    /// Number of samples currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Drop all samples; the smoother behaves as newly constructed.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Change the window capacity, keeping the freshest samples if the
    /// buffer already holds more than the new capacity allows.
    pub fn set_window_size(&mut self, window_size: usize) {
        self.capacity = window_size.clamp(MIN_WINDOW_SIZE, MAX_WINDOW_SIZE);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }
}
