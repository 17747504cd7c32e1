//! Error handling for the page builder

#![allow(missing_docs)]

use std::fmt;
use thiserror::Error;

/// Result type alias for page builder operations
pub type Result<T> = std::result::Result<T, OggError>;

/// Error type for page builder operations
#[derive(Error, Debug)]
pub enum OggError {
    /// Page already holds the configured maximum number of segments
    #[error("Segment limit reached: page already holds {limit} segments")]
    SegmentLimitReached { limit: usize },

    /// Packet needs more than one lacing run
    #[error("Packet too large: {size} bytes does not fit a single lacing value")]
    PacketTooLarge { size: usize },

    /// Header packet does not fit a single segment
    #[error("Header too large: {size} bytes exceeds {max}")]
    HeaderTooLarge { size: usize, max: usize },

    /// Header packets must be alone on their page
    #[error("Page not empty: header needs an empty page, found {segments} segments")]
    PageNotEmpty { segments: usize },

    /// Stream configuration out of range
    #[error("Invalid stream configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Encapsulator called out of order
    #[error("Invalid state: expected {expected}, stream is {actual}")]
    InvalidState { expected: String, actual: String },

    /// I/O operation failed
    #[error("I/O operation failed: {reason}")]
    IoError { reason: String },
}

impl OggError {
    /// Create a new invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a new invalid state error
    pub fn invalid_state(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidState {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Check if this error is recoverable
    ///
    /// A full page is the normal flush signal: finalize it, start a new page
    /// and retry the same packet.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::SegmentLimitReached { .. } | Self::IoError { .. } => true,

            Self::PacketTooLarge { .. }
            | Self::HeaderTooLarge { .. }
            | Self::PageNotEmpty { .. }
            | Self::InvalidConfig { .. }
            | Self::InvalidState { .. } => false,
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SegmentLimitReached { .. } => ErrorCategory::Flush,

            Self::PacketTooLarge { .. }
            | Self::HeaderTooLarge { .. }
            | Self::PageNotEmpty { .. } => ErrorCategory::Packet,

            Self::InvalidConfig { .. } | Self::InvalidState { .. } => ErrorCategory::Usage,

            Self::IoError { .. } => ErrorCategory::Io,
        }
    }
}

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Current page must be finalized before continuing
    Flush,
    /// Packet cannot be represented on a page
    Packet,
    /// Caller misuse or bad configuration
    Usage,
    /// I/O related errors
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flush => write!(f, "Flush"),
            Self::Packet => write!(f, "Packet"),
            Self::Usage => write!(f, "Usage"),
            Self::Io => write!(f, "I/O"),
        }
    }
}

impl From<std::io::Error> for OggError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError {
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_limit_is_recoverable() {
        let err = OggError::SegmentLimitReached { limit: 25 };
        assert!(err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::Flush);
        assert!(err.to_string().contains("25 segments"));
    }

    #[test]
    fn test_misuse_is_fatal() {
        let err = OggError::invalid_state("streaming", "awaiting headers");
        assert!(!err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::Usage);
        assert_eq!(
            err.to_string(),
            "Invalid state: expected streaming, stream is awaiting headers"
        );

        let err = OggError::PacketTooLarge { size: 300 };
        assert_eq!(err.category(), ErrorCategory::Packet);
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: OggError = io_err.into();
        assert!(matches!(err, OggError::IoError { .. }));
        assert_eq!(err.category(), ErrorCategory::Io);
    }
}
