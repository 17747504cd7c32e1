//! # Codec-Core: speech codec sessions and vendor wire framing
//!
//! This crate turns raw 16-bit mono PCM into the length-prefixed compressed
//! frames the speech service accepts, and back again for the synthesis
//! direction.
//!
//! ## Variants
//!
//! | Name       | Family | Rate   | Frame         | Wire prefix            |
//! |------------|--------|--------|---------------|------------------------|
//! | `speex`    | Speex  | 8 kHz  | 160 samples   | 1 byte                 |
//! | `speex-wb` | Speex  | 16 kHz | 320 samples   | 1 byte                 |
//! | `opus`     | Opus   | 8 kHz  | 20 ms (160)   | 2 bytes, big-endian    |
//! | `opus-wb`  | Opus   | 16 kHz | 20 ms (320)   | 2 bytes, big-endian    |
//!
//! ## Usage
//!
//! ```rust
//! use speechwire_codec_core::{CodecSession, DecoderSession, EncoderSession};
//!
//! let mut encoder = EncoderSession::create_by_name("opus-wb")?;
//! assert_eq!(encoder.raw_frame_bytes(), 640);
//!
//! // One frame of silence
//! let frame = encoder.encode(&vec![0u8; 640])?;
//! let declared = u16::from_be_bytes([frame[0], frame[1]]) as usize;
//! assert_eq!(declared, frame.len() - 2);
//!
//! // The decoder takes the payload without the vendor prefix
//! let mut decoder = DecoderSession::create_by_name("opus-wb")?;
//! let pcm = decoder.decode(&frame[2..])?;
//! assert_eq!(pcm.len(), 640);
//!
//! encoder.destroy();
//! decoder.destroy();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `opus`: back the Opus family with libopus through the `opus` crate.
//!   Without it every variant runs on the built-in ADPCM frame engine, which
//!   keeps the vendor framing but not the vendor bitstream. The Speex family
//!   has no native engine and always uses ADPCM; sessions log a warning when
//!   created on the stand-in.

#![deny(missing_docs)]

pub mod codecs;
pub mod error;
pub mod framing;
pub mod session;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{CodecError, ErrorCategory, Result};
pub use framing::{write_frame, FrameReader};
pub use session::{CodecSession, DecoderSession, EncoderSession};
pub use types::{CodecFamily, CodecProfile, CodecVariant, LengthPrefix};

/// Version information for the codec library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported variant names
pub const SUPPORTED_VARIANTS: &[&str] = &["speex", "speex-wb", "opus", "opus-wb"];

/// Initialize the codec library
///
/// Installs a default `tracing` subscriber if none is set yet. Safe to call
/// multiple times.
pub fn init() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    tracing::info!("Codec-Core v{} initialized", VERSION);
    tracing::info!("Supported variants: {:?}", SUPPORTED_VARIANTS);
    tracing::debug!("Opus engine: {}", opus_engine());

    Ok(())
}

/// Name of the engine backing the Opus family in this build
pub fn opus_engine() -> &'static str {
    if cfg!(feature = "opus") {
        "libopus"
    } else {
        "adpcm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }

    #[test]
    fn test_supported_variants_parse() {
        for name in SUPPORTED_VARIANTS {
            let variant: CodecVariant = name.parse().unwrap();
            assert_eq!(variant.name(), *name);
        }
        assert_eq!(SUPPORTED_VARIANTS.len(), CodecVariant::ALL.len());
    }
}
