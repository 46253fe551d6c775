use serde::Serialize;

use super::{Formatter, instruction_label, iso8601_timestamp};
use crate::pipeline::CompassSnapshot;

#[derive(Serialize)]
struct JsonRecord<'a> {
    ts: String,
    sample_ms: u64,
    heading: f32,
    raw: f32,
    qibla: Option<f32>,
    rotation: f32,
    aligned: bool,
    instruction: &'a str,
    confidence: f32,
    low_confidence: bool,
    accuracy: f32,
    show_hint: bool,
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, snapshot: &CompassSnapshot) -> String {
        let record = JsonRecord {
            ts: iso8601_timestamp(),
            sample_ms: snapshot.timestamp_ms,
            heading: snapshot.smoothed_heading,
            raw: snapshot.raw_heading,
            qibla: snapshot.qibla_bearing,
            rotation: snapshot.rotation_value,
            aligned: snapshot.is_aligned,
            instruction: instruction_label(snapshot.instruction),
            confidence: snapshot.confidence,
            low_confidence: snapshot.low_confidence,
            accuracy: snapshot.accuracy,
            show_hint: snapshot.show_hint,
        };
        serde_json::to_string(&record).unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
    }
}
