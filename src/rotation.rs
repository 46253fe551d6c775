//! Continuous dial rotation and alignment state.
//!
//! The on-screen dial angle is deliberately *not* a normalized bearing: it
//! accumulates past ±360° so that crossing the 0°/360° seam animates as a
//! small turn in the right direction instead of a near-full spin the wrong
//! way. Behaviorally the controller has two states, Settling (interpolating
//! toward a new target) and Aligned (heading within tolerance of the
//! bearing); the Settling→Aligned edge is reported exactly once so a haptic
//! cue does not buzz repeatedly while the user holds steady.

use crate::angle::{is_within_tolerance, normalize, shortest_delta};
use crate::config::AlignmentConfig;

/// Which way the user should turn to face the bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnInstruction {
    TurnLeft,
    TurnRight,
    Aligned,
}

/// Output of one rotation-controller update.
#[derive(Debug, Clone, Copy)]
pub struct RotationUpdate {
    /// Unnormalized dial rotation in degrees; may exceed 360 or go negative.
    pub rotation_value: f32,
    /// Heading is within tolerance of the bearing.
    pub is_aligned: bool,
    /// True only on the Settling→Aligned transition (edge-triggered).
    pub just_aligned: bool,
    /// Turn direction derived from the signed heading→bearing delta.
    pub instruction: TurnInstruction,
}

/// Advance a continuous rotation value toward a target angle along the
/// shortest arc.
///
/// The returned value is `current + shortest_delta(normalize(current),
/// target)`, so a dial at 350° asked to show 10° moves to ≈370°, not back
/// to 10°.
pub fn next_rotation(current: f32, target_degrees: f32) -> f32 {
    current + shortest_delta(normalize(current), target_degrees)
}

pub struct RotationController {
    config: AlignmentConfig,
    rotation_value: f32,
    previous_target: Option<f32>,
    aligned: bool,
}

impl RotationController {
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            config,
            rotation_value: 0.0,
            previous_target: None,
            aligned: false,
        }
    }

    /// Update from the current smoothed heading and target bearing, both in
    /// degrees `[0, 360)`.
    pub fn update(&mut self, heading: f32, bearing: f32) -> RotationUpdate {
        // Dial target: rotate the rose so the qibla marker sits where the
        // bearing is relative to the device's current heading.
        let target = normalize(bearing - heading);

        let churn = self
            .previous_target
            .map(|prev| shortest_delta(prev, target).abs())
            .unwrap_or(f32::INFINITY);
        if churn >= self.config.min_change_degrees {
            self.rotation_value = next_rotation(self.rotation_value, target);
            self.previous_target = Some(target);
        }

        let is_aligned = is_within_tolerance(heading, bearing, self.config.tolerance_degrees);
        let just_aligned = is_aligned && !self.aligned;
        if just_aligned {
            log::debug!("aligned with qibla at heading {heading:.1}°");
        }
        self.aligned = is_aligned;

        RotationUpdate {
            rotation_value: self.rotation_value,
            is_aligned,
            just_aligned,
            instruction: self.instruction(heading, bearing),
        }
    }

    fn instruction(&self, heading: f32, bearing: f32) -> TurnInstruction {
        let delta = shortest_delta(heading, bearing);
        if delta.abs() <= self.config.tolerance_degrees {
            TurnInstruction::Aligned
        } else {
            let left = (delta < 0.0) != self.config.invert_instructions;
            if left {
                TurnInstruction::TurnLeft
            } else {
                TurnInstruction::TurnRight
            }
        }
    }

    /// Current accumulated dial rotation.
    pub fn rotation_value(&self) -> f32 {
        self.rotation_value
    }

    pub fn is_aligned(&self) -> bool {
        self.aligned
    }

    /// Back to initial state, as after a pipeline reinitialization. The next
    /// update always animates (no suppression against a stale target).
    pub fn reset(&mut self) {
        self.rotation_value = 0.0;
        self.previous_target = None;
        self.aligned = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn controller() -> RotationController {
        RotationController::new(AlignmentConfig::default())
    }

    #[test]
    fn test_next_rotation_crosses_seam_forward() {
        assert_abs_diff_eq!(next_rotation(350.0, 10.0), 370.0, epsilon = 1e-3);
    }

    #[test]
    fn test_next_rotation_crosses_seam_backward() {
        assert_abs_diff_eq!(next_rotation(10.0, 350.0), -10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_next_rotation_accumulates_past_full_turn() {
        let mut rotation = 0.0;
        // Four quarter turns clockwise keep accumulating instead of wrapping.
        for target in [90.0, 180.0, 270.0, 0.0, 90.0] {
            rotation = next_rotation(rotation, target);
        }
        assert_abs_diff_eq!(rotation, 450.0, epsilon = 1e-3);
    }

    #[test]
    fn test_small_changes_suppressed() {
        let mut ctrl = controller();
        let first = ctrl.update(100.0, 200.0).rotation_value;
        // 0.5° of heading micro-noise is below the 1.5° default threshold.
        let second = ctrl.update(100.5, 200.0).rotation_value;
        assert_abs_diff_eq!(first, second);
        // A real turn is not suppressed.
        let third = ctrl.update(110.0, 200.0).rotation_value;
        assert!((third - first).abs() > 5.0);
    }

    #[test]
    fn test_alignment_edge_fires_once() {
        let mut ctrl = controller();
        let update = ctrl.update(90.0, 0.0);
        assert!(!update.is_aligned);

        let update = ctrl.update(5.0, 0.0);
        assert!(update.is_aligned);
        assert!(update.just_aligned);

        // Holding steady: still aligned, no second event.
        let update = ctrl.update(4.0, 0.0);
        assert!(update.is_aligned);
        assert!(!update.just_aligned);

        // Drift out and back in: a fresh edge.
        let update = ctrl.update(40.0, 0.0);
        assert!(!update.is_aligned);
        let update = ctrl.update(2.0, 0.0);
        assert!(update.just_aligned);
    }

    #[test]
    fn test_turn_instructions() {
        let mut ctrl = controller();
        // Bearing 20° to the right of heading.
        assert_eq!(ctrl.update(100.0, 120.0).instruction, TurnInstruction::TurnRight);
        // Bearing 20° to the left.
        assert_eq!(ctrl.update(140.0, 120.0).instruction, TurnInstruction::TurnLeft);
        // Within tolerance.
        assert_eq!(ctrl.update(125.0, 120.0).instruction, TurnInstruction::Aligned);
        // Across the seam: from 350° the short way to 10° is a right turn.
        assert_eq!(ctrl.update(350.0, 30.0).instruction, TurnInstruction::TurnRight);
    }

    #[test]
    fn test_inverted_instructions() {
        let config = AlignmentConfig {
            invert_instructions: true,
            ..AlignmentConfig::default()
        };
        let mut ctrl = RotationController::new(config);
        assert_eq!(ctrl.update(100.0, 120.0).instruction, TurnInstruction::TurnLeft);
        assert_eq!(ctrl.update(140.0, 120.0).instruction, TurnInstruction::TurnRight);
    }

    #[test]
    fn test_reset() {
        let mut ctrl = controller();
        ctrl.update(100.0, 300.0);
        ctrl.update(5.0, 0.0);
        ctrl.reset();
        assert_abs_diff_eq!(ctrl.rotation_value(), 0.0);
        assert!(!ctrl.is_aligned());
        // First update after reset is never suppressed.
        let update = ctrl.update(0.5, 0.0);
        assert!(update.just_aligned);
    }
}
