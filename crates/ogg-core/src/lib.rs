//! # Ogg-Core: Ogg page building for Opus streams
//!
//! Packs compressed Opus packets into Ogg pages for services that accept an
//! Ogg Opus upload instead of raw length-prefixed frames.
//!
//! [`OggOpusEncapsulator`] drives a whole stream. The lower-level page
//! functions ([`put_packet`], [`finalize`], the header writers) are exposed
//! for callers that manage pages themselves.
//!
//! ```rust
//! use speechwire_ogg_core::{CommentHeader, IdHeader, OggOpusEncapsulator, StreamConfig};
//!
//! let mut encapsulator = OggOpusEncapsulator::new(StreamConfig::for_frame_duration_ms(20))?;
//! let mut out = Vec::new();
//!
//! for page in encapsulator.write_headers(&IdHeader::opus(16000), &CommentHeader::new("speechwire"))? {
//!     page.write_to(&mut out)?;
//! }
//! for packet in [[0u8; 40], [1u8; 40]] {
//!     if let Some(page) = encapsulator.push_packet(&packet)? {
//!         page.write_to(&mut out)?;
//!     }
//! }
//! let last = encapsulator.finish()?;
//! assert!(last.is_end_of_stream());
//! last.write_to(&mut out)?;
//! # Ok::<(), speechwire_ogg_core::OggError>(())
//! ```

#![deny(missing_docs)]

pub mod crc;
pub mod encapsulator;
pub mod error;
pub mod opus_header;
pub mod page;
pub mod stream;

pub use encapsulator::{EncapsulatorState, OggOpusEncapsulator};
pub use error::{ErrorCategory, OggError, Result};
pub use opus_header::{put_comment_header, put_identification_header, CommentHeader, IdHeader};
pub use page::{finalize, put_packet, put_packet_with_samples, FinalizedPage, OggPage};
pub use stream::{LogicalStream, PageType, StreamConfig};

/// Version information for the page builder
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the page builder
///
/// Installs a default `tracing` subscriber if none is set yet.
pub fn init() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    tracing::info!("Ogg-Core v{} initialized", VERSION);
    Ok(())
}
