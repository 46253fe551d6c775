use super::{Formatter, instruction_label};
use crate::pipeline::CompassSnapshot;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, snapshot: &CompassSnapshot) -> String {
        format!(
            "{},{:.2},{:.2},{},{:.2},{},{},{:.3},{},{:.3},{}",
            snapshot.timestamp_ms,
            snapshot.smoothed_heading,
            snapshot.raw_heading,
            snapshot
                .qibla_bearing
                .map_or(String::new(), |b| format!("{b:.2}")),
            snapshot.rotation_value,
            snapshot.is_aligned,
            instruction_label(snapshot.instruction),
            snapshot.confidence,
            snapshot.low_confidence,
            snapshot.accuracy,
            snapshot.show_hint,
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some(
            "sample_ms,heading,raw,qibla,rotation,aligned,instruction,confidence,low_confidence,accuracy,show_hint",
        )
    }
}
