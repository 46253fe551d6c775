use super::{Formatter, instruction_label};
use crate::angle::Cardinal;
use crate::pipeline::CompassSnapshot;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, snapshot: &CompassSnapshot) -> String {
        let qibla = snapshot
            .qibla_bearing
            .map_or("  --  ".to_string(), |b| format!("{b:>6.1}"));
        if self.verbose {
            format!(
                "Heading: {:>6.1}° {} (raw: {:>6.1}°) qibla: {}° rot: {:>7.1}° {} conf: {:.2} acc: {:.2}{}",
                snapshot.smoothed_heading,
                Cardinal::from_degrees(snapshot.smoothed_heading),
                snapshot.raw_heading,
                qibla,
                snapshot.rotation_value,
                instruction_label(snapshot.instruction),
                snapshot.confidence,
                snapshot.accuracy,
                if snapshot.show_hint { " [calibrate]" } else { "" },
            )
        } else {
            format!(
                "Heading: {:>6.1}° qibla: {}° {} confidence: {:.2}",
                snapshot.smoothed_heading,
                qibla,
                instruction_label(snapshot.instruction),
                snapshot.confidence,
            )
        }
    }
}
