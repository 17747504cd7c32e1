//! Error handling for the codec library
//!
//! Every codec failure is reported synchronously from the call that failed.
//! Nothing here retries; the caller decides whether to release the session
//! and abort the stream.

#![allow(missing_docs)]

use std::fmt;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Error type for codec operations
#[derive(Error, Debug)]
pub enum CodecError {
    /// Unrecognized codec/profile name
    #[error("Unsupported codec variant: {name}")]
    UnsupportedVariant { name: String },

    /// Raw buffer does not match the session's frame length
    #[error("Invalid frame size: expected {expected} bytes, got {actual}")]
    InvalidFrameSize { expected: usize, actual: usize },

    /// Compressed payload cannot be described by the family's length prefix
    #[error("Payload too large: {size} bytes exceeds length prefix maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Vendor-framed stream ended in the middle of a frame
    #[error("Truncated frame: need {needed} bytes, {available} available")]
    TruncatedFrame { needed: usize, available: usize },

    /// Encoder or decoder state could not be allocated
    #[error("Codec initialization failed: {reason}")]
    InitializationFailed { reason: String },

    /// Encoding operation failed
    #[error("Encoding failed: {reason}")]
    EncodingFailed { reason: String },

    /// Decoding operation failed
    #[error("Decoding failed: {reason}")]
    DecodingFailed { reason: String },

    /// Feature not enabled
    #[error("Feature not enabled: {feature} (enable with --features {feature})")]
    FeatureNotEnabled { feature: String },
}

impl CodecError {
    /// Create a new unsupported variant error
    pub fn unsupported_variant(name: impl Into<String>) -> Self {
        Self::UnsupportedVariant { name: name.into() }
    }

    /// Create a new initialization failed error
    pub fn initialization_failed(reason: impl Into<String>) -> Self {
        Self::InitializationFailed {
            reason: reason.into(),
        }
    }

    /// Create a new encoding failed error
    pub fn encoding_failed(reason: impl Into<String>) -> Self {
        Self::EncodingFailed {
            reason: reason.into(),
        }
    }

    /// Create a new decoding failed error
    pub fn decoding_failed(reason: impl Into<String>) -> Self {
        Self::DecodingFailed {
            reason: reason.into(),
        }
    }

    /// Create a new feature not enabled error
    pub fn feature_not_enabled(feature: impl Into<String>) -> Self {
        Self::FeatureNotEnabled {
            feature: feature.into(),
        }
    }

    /// Check if this error is recoverable
    ///
    /// Only framing problems on a single buffer are recoverable: the session
    /// itself is still usable. Engine failures mean the stream should be torn down.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidFrameSize { .. }
            | Self::PayloadTooLarge { .. }
            | Self::TruncatedFrame { .. } => true,

            Self::UnsupportedVariant { .. }
            | Self::InitializationFailed { .. }
            | Self::EncodingFailed { .. }
            | Self::DecodingFailed { .. }
            | Self::FeatureNotEnabled { .. } => false,
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedVariant { .. } | Self::FeatureNotEnabled { .. } => {
                ErrorCategory::Configuration
            }

            Self::InitializationFailed { .. }
            | Self::EncodingFailed { .. }
            | Self::DecodingFailed { .. } => ErrorCategory::Engine,

            Self::InvalidFrameSize { .. }
            | Self::PayloadTooLarge { .. }
            | Self::TruncatedFrame { .. } => ErrorCategory::Framing,
        }
    }
}

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Unknown variant or missing build feature; abort setup
    Configuration,
    /// Underlying codec engine failure; abort the stream
    Engine,
    /// Wire framing or buffer length problems
    Framing,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Engine => write!(f, "Engine"),
            Self::Framing => write!(f, "Framing"),
        }
    }
}
