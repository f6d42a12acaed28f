//! Error types for gmix operations.
//!
//! Numerical degeneracy inside the engine is not an error; it is absorbed by
//! the cluster lifecycle. Errors only describe input the engine refuses:
//! an invalid configuration or a malformed observation.

use std::error::Error;
use std::fmt;

/// Result type for gmix operations.
pub type Result<T> = std::result::Result<T, GmixError>;

/// Errors that can occur during gmix operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GmixError {
    /// Configuration errors.
    Config(ConfigError),
    /// Observation rejected before it touched the model.
    Observation(ObservationError),
    /// Serialization errors.
    Serialization(String),
}

impl fmt::Display for GmixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GmixError::Config(e) => write!(f, "Config error: {}", e),
            GmixError::Observation(e) => write!(f, "Observation error: {}", e),
            GmixError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for GmixError {}

impl From<serde_json::Error> for GmixError {
    fn from(e: serde_json::Error) -> Self {
        GmixError::Serialization(e.to_string())
    }
}

impl From<ConfigError> for GmixError {
    fn from(e: ConfigError) -> Self {
        GmixError::Config(e)
    }
}

/// Observation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationError {
    /// An input or target component is NaN or infinite.
    NonFinite { field: String },
    /// Label does not fit the histogram.
    LabelOutOfRange { label: usize, capacity: usize },
}

impl fmt::Display for ObservationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationError::NonFinite { field } => {
                write!(f, "{} is not a finite number", field)
            }
            ObservationError::LabelOutOfRange { label, capacity } => {
                write!(f, "label {} out of range (capacity {})", label, capacity)
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid value.
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// Out of range.
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value for {}: {} ({})", field, value, reason)
            }
            ConfigError::OutOfRange {
                field,
                min,
                max,
                value,
            } => {
                write!(
                    f,
                    "{} out of range: {} (must be {}-{})",
                    field, value, min, max
                )
            }
        }
    }
}

// Convenience constructors
impl GmixError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GmixError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        GmixError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    pub fn non_finite(field: impl Into<String>) -> Self {
        GmixError::Observation(ObservationError::NonFinite {
            field: field.into(),
        })
    }
}
