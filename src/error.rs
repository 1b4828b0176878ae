//! Error types and handling for bytepool

/// Result type alias for bytepool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Construction-time errors for pools, size sets and configuration.
///
/// Runtime conditions never produce an error: oversized requests are served
/// by direct allocation and counted as overflow.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoolError {
    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// A pool was constructed without any bucket sizes
    #[error("Empty size set: at least one bucket size is required")]
    EmptySizes,

    /// A bucket size below the minimum of one byte
    #[error("Invalid bucket size: {size} (sizes must be >= 1)")]
    InvalidSize { size: usize },
}

impl PoolError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an invalid bucket size error
    pub fn invalid_size(size: usize) -> Self {
        Self::InvalidSize { size }
    }

    /// Name of the offending parameter, when there is one
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::InvalidParameter { parameter, .. } => Some(parameter),
            Self::EmptySizes => Some("sizes"),
            Self::InvalidSize { .. } => Some("sizes"),
        }
    }
}
