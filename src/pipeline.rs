//! The compass pipeline: sensor events in, dial state out.
//!
//! Owns one heading source, the confidence estimator, the hint gate and the
//! rotation controller, and wires them together synchronously: each sensor
//! event is one non-overlapping handler invocation that updates every stage
//! in order. Location and heading are independent input streams; the qibla
//! bearing is recomputed from the latest coordinates whenever they change
//! and never cached across different coordinates.
//!
//! Collaborator failures (permission denials, acquisition errors, sensor
//! absence) are absorbed into state fields here at the boundary; the math
//! chain below never sees an error.

use crate::config::CompassConfig;
use crate::confidence::{ConfidenceEstimator, HintGate};
use crate::error::{CompassError, Result};
use crate::geo::{Coordinates, qibla_bearing};
use crate::heading::{HeadingSource, SensorEvent};
use crate::rotation::{RotationController, TurnInstruction};

/// Location collaborator state, as reported from outside the core.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationState {
    /// Waiting on permission or a first fix.
    Pending,
    /// Have a position.
    Granted(Coordinates),
    /// Permission refused; idle until the user acts.
    Denied,
    /// One-shot acquisition failed; retryable.
    Error(String),
}

/// Everything the presentation layer needs, refreshed on every sensor tick.
#[derive(Debug, Clone, Copy)]
pub struct CompassSnapshot {
    /// Smoothed heading in degrees `[0, 360)`.
    pub smoothed_heading: f32,
    /// Raw heading from the same sample.
    pub raw_heading: f32,
    /// Great-circle bearing to the Kaaba, once a location is known.
    pub qibla_bearing: Option<f32>,
    /// Unnormalized dial rotation for continuous animation.
    pub rotation_value: f32,
    /// Heading within tolerance of the bearing.
    pub is_aligned: bool,
    /// Settling→Aligned edge; fire haptics on this, not on `is_aligned`.
    pub just_aligned: bool,
    /// Which way to turn.
    pub instruction: TurnInstruction,
    /// Composite heading confidence `[0, 1]`.
    pub confidence: f32,
    /// Confidence below the configured threshold.
    pub low_confidence: bool,
    /// Calibration hint should be visible (hold/snooze already applied).
    pub show_hint: bool,
    /// Sensor-reported accuracy `[0, 1]`.
    pub accuracy: f32,
    /// Timestamp of the sample that produced this snapshot.
    pub timestamp_ms: u64,
}

pub struct CompassPipeline {
    config: CompassConfig,
    source: HeadingSource,
    confidence: ConfidenceEstimator,
    hint: HintGate,
    rotation: RotationController,
    location: LocationState,
    bearing: Option<f32>,
    sensor_error: Option<String>,
    last_snapshot: Option<CompassSnapshot>,
}

impl CompassPipeline {
    /// Build a pipeline. `sensor_available` is the collaborator's capability
    /// check for the configured heading sensor; an unavailable sensor is a
    /// permanent state, not an error on every event.
    pub fn new(config: CompassConfig, sensor_available: bool) -> Result<Self> {
        config.validate()?;
        let source = HeadingSource::new(
            &config.sensor,
            config.smoothing.window_size,
            sensor_available,
        );
        Ok(Self {
            confidence: ConfidenceEstimator::new(config.confidence.clone()),
            hint: HintGate::new(),
            rotation: RotationController::new(config.alignment.clone()),
            source,
            config,
            location: LocationState::Pending,
            bearing: None,
            sensor_error: None,
            last_snapshot: None,
        })
    }

    /// Feed one sensor event. Returns the refreshed snapshot, or `None` if
    /// the sensor is unavailable or the event did not match the strategy.
    pub fn handle_sensor_event(
        &mut self,
        event: SensorEvent,
        timestamp_ms: u64,
    ) -> Option<CompassSnapshot> {
        if !self.source.is_available() {
            log::warn!("sensor event received while sensor marked unavailable");
            return None;
        }
        let fix = self.source.ingest(event)?;
        self.sensor_error = None;

        let confidence = self
            .confidence
            .update(fix.heading, fix.accuracy, timestamp_ms);
        let show_hint = self
            .hint
            .update(confidence.low_confidence, timestamp_ms, &self.config.confidence);

        // Without a location there is no bearing to settle toward; the dial
        // holds still and alignment stays off.
        let (rotation_value, is_aligned, just_aligned, instruction) = match self.bearing {
            Some(bearing) => {
                let update = self.rotation.update(fix.heading, bearing);
                (
                    update.rotation_value,
                    update.is_aligned,
                    update.just_aligned,
                    update.instruction,
                )
            }
            None => (
                self.rotation.rotation_value(),
                false,
                false,
                TurnInstruction::Aligned,
            ),
        };

        let snapshot = CompassSnapshot {
            smoothed_heading: fix.heading,
            raw_heading: fix.raw_heading,
            qibla_bearing: self.bearing,
            rotation_value,
            is_aligned,
            just_aligned,
            instruction,
            confidence: confidence.confidence,
            low_confidence: confidence.low_confidence,
            show_hint,
            accuracy: fix.accuracy,
            timestamp_ms,
        };
        self.last_snapshot = Some(snapshot);
        Some(snapshot)
    }

    /// Report a location collaborator transition.
    ///
    /// A granted fix recomputes the qibla bearing and informs the
    /// magnetometer path for declination; smoothing and confidence state
    /// deliberately survive location churn and retries.
    pub fn set_location_state(&mut self, state: LocationState) {
        if let LocationState::Granted(coords) = state {
            let bearing = qibla_bearing(coords);
            log::debug!(
                "location fix ({:.4}, {:.4}), qibla bearing {bearing:.1}°",
                coords.latitude,
                coords.longitude
            );
            self.bearing = Some(bearing);
            self.source.set_coordinates(coords);
        }
        self.location = state;
    }

    /// Retry after a denial or transient acquisition failure: back to
    /// pending so the collaborator can run another permission prompt or fix.
    pub fn retry_location(&mut self) {
        match self.location {
            LocationState::Denied | LocationState::Error(_) => {
                self.location = LocationState::Pending;
            }
            _ => {}
        }
    }

    /// App returned to the foreground. If the previous attempt failed, the
    /// pipeline restarts rather than silently staying failed: location goes
    /// back to pending and per-session state is reinitialized.
    pub fn on_foreground(&mut self) {
        if matches!(self.location, LocationState::Denied | LocationState::Error(_)) {
            log::debug!("foregrounded after failed location, restarting pipeline");
            self.location = LocationState::Pending;
            self.reset();
        }
    }

    /// Record a sensor collaborator error string (shown by the UI, never
    /// propagated into the math chain).
    pub fn report_sensor_error(&mut self, message: impl Into<String>) {
        self.sensor_error = Some(message.into());
    }

    /// User dismissed the calibration hint.
    pub fn dismiss_hint(&mut self, now_ms: u64) {
        self.hint.dismiss(now_ms, &self.config.confidence);
    }

    /// Clear all per-session state. The configured strategy, location state
    /// and bearing are kept; smoothing, confidence, hint and rotation start
    /// over.
    pub fn reset(&mut self) {
        self.source.reset();
        self.confidence.reset();
        self.hint.reset();
        self.rotation.reset();
        self.last_snapshot = None;
    }

    pub fn location_state(&self) -> &LocationState {
        &self.location
    }

    pub fn qibla(&self) -> Option<f32> {
        self.bearing
    }

    pub fn sensor_available(&self) -> bool {
        self.source.is_available()
    }

    pub fn sensor_error(&self) -> Option<&str> {
        self.sensor_error.as_deref()
    }

    pub fn last_snapshot(&self) -> Option<&CompassSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn config(&self) -> &CompassConfig {
        &self.config
    }

    /// Current blocking condition, if any, as a typed error for the UI.
    ///
    /// Sensor absence is terminal (no retry makes sense); a denied
    /// permission or failed acquisition is non-fatal and clears via
    /// [`CompassPipeline::retry_location`] or a later grant.
    pub fn blocking_error(&self) -> Option<CompassError> {
        if !self.source.is_available() {
            return Some(CompassError::SensorUnavailable(
                "no heading sensor on this device".to_string(),
            ));
        }
        match &self.location {
            LocationState::Denied => Some(CompassError::PermissionDenied),
            LocationState::Error(message) => Some(CompassError::Acquisition(message.clone())),
            LocationState::Pending | LocationState::Granted(_) => None,
        }
    }
}
