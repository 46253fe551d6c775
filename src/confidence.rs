//! Heading trust estimation and calibration-hint gating.
//!
//! Two independent signals are blended into one `[0, 1]` score:
//!
//! - the sensor's own accuracy report, already normalized to `[0, 1]` by the
//!   heading source, and
//! - a jitter score derived from the circular standard deviation of the
//!   heading over a short trailing time window.
//!
//! A separate [`HintGate`] turns the low-confidence flag into a calmed
//! user-facing "calibrate your compass" signal with hold and snooze timers,
//! so the hint neither flaps with sensor noise nor nags after dismissal.

use std::collections::VecDeque;

use crate::config::ConfidenceConfig;

/// Worst-case circular standard deviation, used when the mean resultant
/// length collapses to zero (uniformly scattered headings).
const MAX_STDDEV_DEGREES: f32 = 180.0;

/// Result of one confidence update.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceUpdate {
    /// Composite confidence in `[0, 1]`.
    pub confidence: f32,
    /// True when confidence is below the configured low threshold.
    pub low_confidence: bool,
    /// Circular standard deviation of the trailing window, in degrees.
    pub jitter_stddev_degrees: f32,
}

/// Estimates heading trust from sensor accuracy plus trailing jitter.
///
/// The jitter buffer is a moving time window, not a fixed-size ring:
/// samples older than `jitter_window_ms` are evicted on every update, so a
/// stalled sensor ages out to an empty window rather than freezing a stale
/// stddev. Confidence is recomputed from scratch each update, never cached.
#[derive(Debug, Clone)]
pub struct ConfidenceEstimator {
    config: ConfidenceConfig,
    window: VecDeque<(u64, f32)>,
    accuracy: f32,
}

impl ConfidenceEstimator {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self {
            config,
            window: VecDeque::new(),
            accuracy: 0.0,
        }
    }

    /// Feed one smoothed heading plus the sensor's accuracy report.
    ///
    /// `accuracy` is clamped to `[0, 1]`; absent sensor data should be
    /// passed as 0 (neutral), never skipped, so the window keeps moving.
    pub fn update(
        &mut self,
        heading_degrees: f32,
        accuracy: f32,
        timestamp_ms: u64,
    ) -> ConfidenceUpdate {
        self.accuracy = accuracy.clamp(0.0, 1.0);

        let cutoff = timestamp_ms.saturating_sub(self.config.jitter_window_ms);
        while let Some(&(ts, _)) = self.window.front() {
            if ts < cutoff {
                self.window.pop_front();
            } else {
                break;
            }
        }
        self.window
            .push_back((timestamp_ms, heading_degrees.to_radians()));

        let stddev = self.jitter_stddev_degrees();
        let jitter_score = (1.0 - stddev / self.config.jitter_bad_degrees).clamp(0.0, 1.0);

        let weight_sum = self.config.accuracy_weight + self.config.jitter_weight;
        let confidence = ((self.config.accuracy_weight * self.accuracy
            + self.config.jitter_weight * jitter_score)
            / weight_sum)
            .clamp(0.0, 1.0);

        ConfidenceUpdate {
            confidence,
            low_confidence: confidence < self.config.low_threshold,
            jitter_stddev_degrees: stddev,
        }
    }

    /// Circular standard deviation of the current window, in degrees.
    ///
    /// Uses the mean resultant length `R` of the unit vectors:
    /// `stddev = sqrt(-2 ln R)`. An empty window or fully scattered
    /// directions (`R -> 0`) report the worst case of 180°.
    pub fn jitter_stddev_degrees(&self) -> f32 {
        if self.window.is_empty() {
            return MAX_STDDEV_DEGREES;
        }
        let n = self.window.len() as f32;
        let (sin_sum, cos_sum) = self
            .window
            .iter()
            .fold((0.0f32, 0.0f32), |(s, c), &(_, rad)| {
                (s + rad.sin(), c + rad.cos())
            });
        let r = (sin_sum * sin_sum + cos_sum * cos_sum).sqrt() / n;
        if r <= f32::EPSILON {
            return MAX_STDDEV_DEGREES;
        }
        let stddev = (-2.0 * r.min(1.0).ln()).sqrt().to_degrees();
        stddev.min(MAX_STDDEV_DEGREES)
    }

    /// Number of samples currently inside the jitter window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Clear the window and the last accuracy report.
    pub fn reset(&mut self) {
        self.window.clear();
        self.accuracy = 0.0;
    }
}

/// Calibration-hint state machine with hold and snooze hysteresis.
///
/// The hint fires only after confidence has stayed continuously below the
/// low threshold for `hint_hold_ms`. Once the user dismisses it, re-firing
/// is suppressed for `hint_snooze_ms`. Both timers reset the moment
/// confidence recovers above threshold.
#[derive(Debug, Clone, Default)]
pub struct HintGate {
    low_since_ms: Option<u64>,
    snoozed_until_ms: Option<u64>,
}

impl HintGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the gate with the latest low-confidence flag.
    ///
    /// Returns true while the hint should be visible.
    pub fn update(&mut self, low_confidence: bool, now_ms: u64, config: &ConfidenceConfig) -> bool {
        if !low_confidence {
            // Recovery clears both the hold timer and any active snooze.
            if self.low_since_ms.take().is_some() || self.snoozed_until_ms.take().is_some() {
                log::debug!("confidence recovered, hint timers reset");
            }
            return false;
        }

        if let Some(until) = self.snoozed_until_ms {
            if now_ms < until {
                return false;
            }
            self.snoozed_until_ms = None;
        }

        let since = *self.low_since_ms.get_or_insert(now_ms);
        now_ms.saturating_sub(since) >= config.hint_hold_ms
    }

    /// User dismissed the hint; suppress it for the snooze window.
    pub fn dismiss(&mut self, now_ms: u64, config: &ConfidenceConfig) {
        self.snoozed_until_ms = Some(now_ms + config.hint_snooze_ms);
        self.low_since_ms = None;
        log::debug!("calibration hint snoozed for {} ms", config.hint_snooze_ms);
    }

    /// Forget all timers, as after a pipeline reinitialization.
    pub fn reset(&mut self) {
        self.low_since_ms = None;
        self.snoozed_until_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config() -> ConfidenceConfig {
        ConfidenceConfig::default()
    }

    #[test]
    fn test_steady_accurate_heading_converges_high() {
        let mut est = ConfidenceEstimator::new(config());
        let mut last = 0.0;
        for i in 0..20 {
            last = est.update(90.0, 1.0, i * 150).confidence;
        }
        assert!(last > 0.95, "expected near-1 confidence, got {last}");
    }

    #[test]
    fn test_oscillating_heading_drops_confidence() {
        let mut est = ConfidenceEstimator::new(config());
        let mut last = ConfidenceUpdate {
            confidence: 1.0,
            low_confidence: false,
            jitter_stddev_degrees: 0.0,
        };
        for i in 0..20 {
            let heading = if i % 2 == 0 { 40.0 } else { 140.0 };
            last = est.update(heading, 0.0, i * 150);
        }
        assert!(last.confidence < 0.1, "got {}", last.confidence);
        assert!(last.low_confidence);
        assert!(last.jitter_stddev_degrees > 10.0);
    }

    #[test]
    fn test_jitter_window_eviction() {
        let mut est = ConfidenceEstimator::new(config());
        // Noisy burst, then steady samples far enough apart in time that
        // the burst ages out of the 1500 ms window.
        for i in 0..5 {
            est.update((i * 70) as f32, 0.5, i * 100);
        }
        for i in 0..10 {
            est.update(10.0, 0.5, 2000 + i * 100);
        }
        assert!(est.window_len() <= 16);
        assert!(est.jitter_stddev_degrees() < 1.0);
    }

    #[test]
    fn test_single_sample_has_zero_jitter() {
        let mut est = ConfidenceEstimator::new(config());
        let update = est.update(200.0, 0.0, 0);
        assert_abs_diff_eq!(update.jitter_stddev_degrees, 0.0, epsilon = 0.1);
    }

    #[test]
    fn test_empty_window_is_worst_case() {
        let est = ConfidenceEstimator::new(config());
        assert_abs_diff_eq!(est.jitter_stddev_degrees(), MAX_STDDEV_DEGREES);
    }

    #[test]
    fn test_accuracy_clamped() {
        let mut est = ConfidenceEstimator::new(config());
        let update = est.update(0.0, 7.5, 0);
        assert!(update.confidence <= 1.0);
    }

    #[test]
    fn test_hint_fires_only_after_hold() {
        let cfg = config();
        let mut gate = HintGate::new();
        assert!(!gate.update(true, 0, &cfg));
        assert!(!gate.update(true, 1500, &cfg));
        assert!(gate.update(true, 3000, &cfg));
    }

    #[test]
    fn test_hint_hold_resets_on_recovery() {
        let cfg = config();
        let mut gate = HintGate::new();
        gate.update(true, 0, &cfg);
        gate.update(false, 2000, &cfg);
        // Hold restarts from scratch.
        assert!(!gate.update(true, 2500, &cfg));
        assert!(!gate.update(true, 5000, &cfg));
        assert!(gate.update(true, 5500, &cfg));
    }

    #[test]
    fn test_hint_snooze_after_dismiss() {
        let cfg = config();
        let mut gate = HintGate::new();
        gate.update(true, 0, &cfg);
        assert!(gate.update(true, 3000, &cfg));
        gate.dismiss(3000, &cfg);
        // Still low, but snoozed.
        assert!(!gate.update(true, 4000, &cfg));
        assert!(!gate.update(true, 100_000, &cfg));
        // Snooze expires; hold timer starts over.
        assert!(!gate.update(true, 123_001, &cfg));
        assert!(gate.update(true, 126_001, &cfg));
    }

    #[test]
    fn test_snooze_cleared_by_recovery() {
        let cfg = config();
        let mut gate = HintGate::new();
        gate.update(true, 0, &cfg);
        gate.dismiss(3000, &cfg);
        gate.update(false, 4000, &cfg);
        // Recovery lifted the snooze; a fresh low spell only needs the hold.
        assert!(!gate.update(true, 10_000, &cfg));
        assert!(gate.update(true, 13_000, &cfg));
    }
}
