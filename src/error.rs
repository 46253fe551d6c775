use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompassError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Heading sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("Location acquisition failed: {0}")]
    Acquisition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Trace parse error at line {line}: {message}")]
    Trace { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, CompassError>;
