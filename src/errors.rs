use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Heading specification error: {0}")]
    HeadingSpecification(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TrajectoryError {
    pub(crate) fn require_finite(name: &str, value: f64) -> Result<f64, TrajectoryError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(TrajectoryError::InvalidInput(format!(
                "{} must be finite, got {}",
                name, value
            )))
        }
    }

    pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64, TrajectoryError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(TrajectoryError::InvalidInput(format!(
                "{} must be positive, got {}",
                name, value
            )))
        }
    }

    // Re-labels an input error raised while resolving a segment config.
    pub(crate) fn in_config(self) -> TrajectoryError {
        match self {
            TrajectoryError::InvalidInput(message) => TrajectoryError::Configuration(message),
            other => other,
        }
    }
}
