//! Logical stream state
//!
//! A logical stream is the sequence of pages sharing one serial number. It
//! carries the running granule position and page counter, plus the flag the
//! next finalized page will carry.

use std::fmt;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{OggError, Result};
use crate::page::OggPage;

/// Header type flag: page starts with a continued packet
pub const FLAG_CONTINUED: u8 = 0x01;
/// Header type flag: first page of the logical stream
pub const FLAG_BEGINNING_OF_STREAM: u8 = 0x02;
/// Header type flag: last page of the logical stream
pub const FLAG_END_OF_STREAM: u8 = 0x04;

/// Default segment cap per page
pub const DEFAULT_MAX_SEGMENTS: u8 = 25;

/// Ogg Opus granule positions always count 48 kHz samples
pub const GRANULE_RATE: u64 = 48_000;

/// Granule increment for one 20 ms packet
pub const DEFAULT_SAMPLES_PER_PACKET: u64 = 960;

static SERIAL_RNG: Lazy<Mutex<SmallRng>> = Lazy::new(|| Mutex::new(SmallRng::from_entropy()));

/// Draw a serial number from the process-wide generator
pub fn next_serial_number() -> u32 {
    SERIAL_RNG.lock().gen()
}

/// Flag the next finalized page carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// First page of the stream
    BeginningOfStream,
    /// Any page between the first and the last
    Normal,
    /// Last page of the stream
    EndOfStream,
}

impl PageType {
    /// Header type byte written at offset 5
    pub fn header_type(self) -> u8 {
        match self {
            Self::BeginningOfStream => FLAG_BEGINNING_OF_STREAM,
            Self::Normal => 0,
            Self::EndOfStream => FLAG_END_OF_STREAM,
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeginningOfStream => write!(f, "BOS"),
            Self::Normal => write!(f, "normal"),
            Self::EndOfStream => write!(f, "EOS"),
        }
    }
}

/// Stream parameters fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Maximum lacing values per page (1..=255)
    pub max_segments: u8,
    /// Granule increment per packet
    pub samples_per_packet: u64,
    /// Fixed serial number; drawn at random when `None`
    pub serial_number: Option<u32>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_segments: DEFAULT_MAX_SEGMENTS,
            samples_per_packet: DEFAULT_SAMPLES_PER_PACKET,
            serial_number: None,
        }
    }
}

impl StreamConfig {
    /// Config whose granule increment matches packets of `ms` milliseconds
    pub fn for_frame_duration_ms(ms: u32) -> Self {
        Self {
            samples_per_packet: GRANULE_RATE * ms as u64 / 1000,
            ..Self::default()
        }
    }

    /// Set the per-page segment cap
    pub fn with_max_segments(mut self, max_segments: u8) -> Self {
        self.max_segments = max_segments;
        self
    }

    /// Pin the serial number
    pub fn with_serial_number(mut self, serial_number: u32) -> Self {
        self.serial_number = Some(serial_number);
        self
    }

    /// Check the config can produce valid pages
    pub fn validate(&self) -> Result<()> {
        if self.max_segments == 0 {
            return Err(OggError::invalid_config("max_segments must be at least 1"));
        }
        if self.samples_per_packet == 0 {
            return Err(OggError::invalid_config(
                "samples_per_packet must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Running state of one logical stream
#[derive(Debug, Clone)]
pub struct LogicalStream {
    page_type: PageType,
    granule_position: u64,
    serial_number: u32,
    page_counter: u32,
    samples_per_packet: u64,
    max_segments: u8,
}

impl LogicalStream {
    /// Start a stream; the first page will carry the BOS flag
    pub fn new(config: &StreamConfig) -> Result<Self> {
        config.validate()?;
        let serial_number = config.serial_number.unwrap_or_else(next_serial_number);

        debug!(
            "Created logical stream {:#010x}: {} samples/packet, {} segments/page",
            serial_number, config.samples_per_packet, config.max_segments
        );

        Ok(Self {
            page_type: PageType::BeginningOfStream,
            granule_position: 0,
            serial_number,
            page_counter: 0,
            samples_per_packet: config.samples_per_packet,
            max_segments: config.max_segments,
        })
    }

    /// Empty page sized for this stream
    pub fn new_page(&self) -> OggPage {
        OggPage::with_max_segments(self.max_segments)
    }

    /// Set the flag for the next finalized page
    pub fn set_page_type(&mut self, page_type: PageType) {
        self.page_type = page_type;
    }

    /// Flag the next finalized page carries
    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    /// Granule position of the packets accepted so far
    pub fn granule_position(&self) -> u64 {
        self.granule_position
    }

    /// Serial number written on every page
    pub fn serial_number(&self) -> u32 {
        self.serial_number
    }

    /// Sequence number of the next finalized page
    pub fn page_counter(&self) -> u32 {
        self.page_counter
    }

    /// Default granule increment per packet
    pub fn samples_per_packet(&self) -> u64 {
        self.samples_per_packet
    }

    /// Segment cap for pages of this stream
    pub fn max_segments(&self) -> u8 {
        self.max_segments
    }

    pub(crate) fn advance_granule(&mut self, samples: u64) {
        self.granule_position = self.granule_position.wrapping_add(samples);
    }

    pub(crate) fn advance_page_counter(&mut self) {
        self.page_counter = self.page_counter.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.max_segments, 25);
        assert_eq!(config.samples_per_packet, 960);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_frame_duration_derives_increment() {
        assert_eq!(StreamConfig::for_frame_duration_ms(20).samples_per_packet, 960);
        assert_eq!(StreamConfig::for_frame_duration_ms(10).samples_per_packet, 480);
        assert_eq!(StreamConfig::for_frame_duration_ms(60).samples_per_packet, 2880);
    }

    #[test]
    fn test_invalid_config() {
        let config = StreamConfig::default().with_max_segments(0);
        assert!(matches!(
            LogicalStream::new(&config),
            Err(OggError::InvalidConfig { .. })
        ));

        let config = StreamConfig::for_frame_duration_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_new_stream_state() {
        let config = StreamConfig::default().with_serial_number(0xdead_beef);
        let stream = LogicalStream::new(&config).unwrap();
        assert_eq!(stream.serial_number(), 0xdead_beef);
        assert_eq!(stream.page_type(), PageType::BeginningOfStream);
        assert_eq!(stream.granule_position(), 0);
        assert_eq!(stream.page_counter(), 0);
    }

    #[test]
    fn test_serial_numbers_vary() {
        let serials: Vec<u32> = (0..8).map(|_| next_serial_number()).collect();
        assert!(serials.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_header_type_bits() {
        assert_eq!(PageType::BeginningOfStream.header_type(), 0x02);
        assert_eq!(PageType::Normal.header_type(), 0x00);
        assert_eq!(PageType::EndOfStream.header_type(), 0x04);
    }
}
