pub mod angle;
pub mod config;
pub mod confidence;
pub mod error;
pub mod geo;
pub mod heading;
pub mod output;
pub mod pipeline;
pub mod rotation;
pub mod smoothing;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::CompassConfig;
pub use error::{CompassError, Result};
pub use pipeline::{CompassPipeline, CompassSnapshot, LocationState};
