//! ═══════════════════════════════════════════════════════════════════════════════
//! ERROR — Unified Error Type for Cribwatch
//! ═══════════════════════════════════════════════════════════════════════════════
//! Centralized error handling. No scattered .unwrap() or .expect() calls.
//! ═══════════════════════════════════════════════════════════════════════════════

use std::fmt;

/// The unified error type for the Cribwatch crate
#[derive(Debug)]
pub enum CribError {
    /// I/O error (feed files, replay input)
    Io(std::io::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// Malformed or unrecognized inbound event
    Ingest(IngestError),
    /// Configuration error
    Config(ConfigError),
    /// Notification channel failure (caught inside the dispatcher)
    Sink(SinkError),
}

impl std::error::Error for CribError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CribError::Io(e) => Some(e),
            CribError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for CribError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CribError::Io(e) => write!(f, "I/O error: {}", e),
            CribError::Json(e) => write!(f, "JSON error: {}", e),
            CribError::Ingest(e) => write!(f, "Ingest error: {}", e),
            CribError::Config(e) => write!(f, "Configuration error: {}", e),
            CribError::Sink(e) => write!(f, "Notification sink error: {}", e),
        }
    }
}

impl From<std::io::Error> for CribError {
    fn from(err: std::io::Error) -> Self {
        CribError::Io(err)
    }
}

impl From<serde_json::Error> for CribError {
    fn from(err: serde_json::Error) -> Self {
        CribError::Json(err)
    }
}

/// Inbound-event errors. These are recovered at the ingest boundary:
/// the offending event is dropped, counted, and logged.
#[derive(Debug, Clone)]
pub enum IngestError {
    /// Wire id does not map to any monitored sensor
    UnknownSensorId(u32),
    /// Wire id is recognized firmware but not part of the alerting set
    /// (e.g. the sound-pitch channel)
    UnsupportedSensor { id: u32, name: &'static str },
    /// Reading value could not be parsed as a finite number
    NonNumericValue { sensor_id: u32, raw: String },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::UnknownSensorId(id) => write!(f, "Unknown sensor id: {}", id),
            IngestError::UnsupportedSensor { id, name } => {
                write!(f, "Sensor id {} ({}) is not monitored", id, name)
            }
            IngestError::NonNumericValue { sensor_id, raw } => {
                write!(f, "Non-numeric value for sensor {}: '{}'", sensor_id, raw)
            }
        }
    }
}

impl std::error::Error for IngestError {}

impl From<IngestError> for CribError {
    fn from(err: IngestError) -> Self {
        CribError::Ingest(err)
    }
}

/// Configuration-specific errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Missing required field
    MissingField(String),
    /// Invalid value
    InvalidValue { field: String, message: String },
    /// Config file not found
    FileNotFound(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingField(field) => write!(f, "Missing required field: {}", field),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{}': {}", field, message)
            }
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for CribError {
    fn from(err: ConfigError) -> Self {
        CribError::Config(err)
    }
}

/// Notification channel failure. A failing channel never blocks the
/// others; the dispatcher logs the error and carries on.
#[derive(Debug, Clone)]
pub struct SinkError {
    /// Which channel failed ("sound", "haptic", "push")
    pub channel: &'static str,
    /// Platform-reported reason
    pub message: String,
}

impl SinkError {
    pub fn new(channel: &'static str, message: impl Into<String>) -> Self {
        Self {
            channel,
            message: message.into(),
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} channel failed: {}", self.channel, self.message)
    }
}

impl std::error::Error for SinkError {}

impl From<SinkError> for CribError {
    fn from(err: SinkError) -> Self {
        CribError::Sink(err)
    }
}

/// Type alias for Result with CribError
pub type CribResult<T> = Result<T, CribError>;
