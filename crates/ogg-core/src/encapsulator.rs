//! Ogg Opus encapsulation driver
//!
//! Enforces the page order for a whole stream: the identification header
//! page (BOS), the comment header page, data pages with no flags, and a final
//! EOS page. Data pages are flushed as they fill up.

use std::fmt;
use std::mem;

use tracing::{debug, warn};

use crate::error::{OggError, Result};
use crate::opus_header::{put_comment_header, put_identification_header, CommentHeader, IdHeader};
use crate::page::{finalize, lacing_len, put_packet_with_samples, FinalizedPage, OggPage};
use crate::stream::{LogicalStream, PageType, StreamConfig};

/// Where the encapsulator is in the page protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncapsulatorState {
    /// Nothing written yet; the two header pages come first
    AwaitingHeaders,
    /// Headers written; accepting data packets
    Streaming,
}

impl fmt::Display for EncapsulatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingHeaders => write!(f, "awaiting headers"),
            Self::Streaming => write!(f, "streaming"),
        }
    }
}

/// Turns a sequence of Opus packets into Ogg pages
#[derive(Debug)]
pub struct OggOpusEncapsulator {
    stream: LogicalStream,
    page: OggPage,
    state: EncapsulatorState,
    packets: u64,
    pages: u64,
}

impl OggOpusEncapsulator {
    /// Start a stream from `config`
    pub fn new(config: StreamConfig) -> Result<Self> {
        let stream = LogicalStream::new(&config)?;
        let page = stream.new_page();
        Ok(Self {
            stream,
            page,
            state: EncapsulatorState::AwaitingHeaders,
            packets: 0,
            pages: 0,
        })
    }

    /// Current protocol state
    pub fn state(&self) -> EncapsulatorState {
        self.state
    }

    /// Logical stream the pages belong to
    pub fn stream(&self) -> &LogicalStream {
        &self.stream
    }

    /// Packets accepted so far
    pub fn packets_written(&self) -> u64 {
        self.packets
    }

    /// Pages handed out so far
    pub fn pages_written(&self) -> u64 {
        self.pages
    }

    /// Build the two header pages
    ///
    /// Both pages are built before either is finalized, so a failure leaves
    /// the stream untouched.
    pub fn write_headers(
        &mut self,
        id: &IdHeader,
        comments: &CommentHeader,
    ) -> Result<[FinalizedPage; 2]> {
        self.expect_state(EncapsulatorState::AwaitingHeaders)?;

        let mut id_page = self.stream.new_page();
        put_identification_header(&mut id_page, id)?;
        let mut comment_page = self.stream.new_page();
        put_comment_header(&mut comment_page, comments)?;

        self.stream.set_page_type(PageType::BeginningOfStream);
        let id_page = finalize(&mut self.stream, id_page);
        self.stream.set_page_type(PageType::Normal);
        let comment_page = finalize(&mut self.stream, comment_page);

        self.state = EncapsulatorState::Streaming;
        self.pages += 2;
        debug!(
            "Wrote Ogg Opus headers for stream {:#010x}",
            self.stream.serial_number()
        );
        Ok([id_page, comment_page])
    }

    /// Add one packet with the stream's default granule increment
    ///
    /// Returns the previous page when it had to be flushed to make room.
    pub fn push_packet(&mut self, data: &[u8]) -> Result<Option<FinalizedPage>> {
        let samples = self.stream.samples_per_packet();
        self.push_packet_with_samples(data, samples)
    }

    /// Add one packet covering `samples` granule units
    pub fn push_packet_with_samples(
        &mut self,
        data: &[u8],
        samples: u64,
    ) -> Result<Option<FinalizedPage>> {
        self.expect_state(EncapsulatorState::Streaming)?;

        let flushed = match put_packet_with_samples(&mut self.stream, &mut self.page, data, samples)
        {
            Ok(()) => None,
            // Only flush when the packet fits a fresh page
            Err(OggError::SegmentLimitReached { limit })
                if !self.page.is_empty() && lacing_len(data.len()) <= limit =>
            {
                debug!("Page full at {} segments, flushing", limit);
                let full = mem::replace(&mut self.page, self.stream.new_page());
                let flushed = finalize(&mut self.stream, full);
                self.pages += 1;
                put_packet_with_samples(&mut self.stream, &mut self.page, data, samples)?;
                Some(flushed)
            }
            Err(e) => return Err(e),
        };

        self.packets += 1;
        Ok(flushed)
    }

    /// Finalize whatever remains as the EOS page
    pub fn finish(mut self) -> Result<FinalizedPage> {
        self.expect_state(EncapsulatorState::Streaming)?;

        if self.page.is_empty() {
            warn!(
                "Stream {:#010x} ends with an empty EOS page",
                self.stream.serial_number()
            );
        }

        self.stream.set_page_type(PageType::EndOfStream);
        let last = mem::take(&mut self.page);
        let page = finalize(&mut self.stream, last);
        debug!(
            "Finished stream {:#010x}: {} packets in {} pages, granule {}",
            self.stream.serial_number(),
            self.packets,
            self.pages + 1,
            self.stream.granule_position()
        );
        Ok(page)
    }

    fn expect_state(&self, expected: EncapsulatorState) -> Result<()> {
        if self.state != expected {
            return Err(OggError::invalid_state(
                expected.to_string(),
                self.state.to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encapsulator(max_segments: u8) -> OggOpusEncapsulator {
        OggOpusEncapsulator::new(
            StreamConfig::default()
                .with_max_segments(max_segments)
                .with_serial_number(42),
        )
        .unwrap()
    }

    #[test]
    fn test_header_pages() {
        let mut enc = encapsulator(25);
        let [id, tags] = enc
            .write_headers(&IdHeader::opus(16000), &CommentHeader::new("speechwire"))
            .unwrap();

        assert!(id.is_beginning_of_stream());
        assert_eq!(id.sequence_number(), 0);
        assert_eq!(&id.body()[..8], b"OpusHead");

        assert_eq!(tags.header_type(), 0);
        assert_eq!(tags.sequence_number(), 1);
        assert_eq!(&tags.body()[..8], b"OpusTags");
        assert_eq!(enc.state(), EncapsulatorState::Streaming);
    }

    #[test]
    fn test_data_before_headers() {
        let mut enc = encapsulator(25);
        let err = enc.push_packet(&[0; 40]).unwrap_err();
        assert!(matches!(err, OggError::InvalidState { .. }));

        let enc = encapsulator(25);
        assert!(enc.finish().is_err());
    }

    #[test]
    fn test_headers_twice() {
        let mut enc = encapsulator(25);
        let id = IdHeader::opus(8000);
        let tags = CommentHeader::new("v");
        enc.write_headers(&id, &tags).unwrap();
        assert!(enc.write_headers(&id, &tags).is_err());
    }

    #[test]
    fn test_failed_headers_leave_stream_untouched() {
        let mut enc = encapsulator(25);
        let tags = CommentHeader::new("v".repeat(400));
        assert!(enc.write_headers(&IdHeader::opus(8000), &tags).is_err());
        assert_eq!(enc.stream().page_counter(), 0);
        assert_eq!(enc.state(), EncapsulatorState::AwaitingHeaders);
    }

    #[test]
    fn test_unfittable_packet_keeps_page() {
        let mut enc = encapsulator(1);
        enc.write_headers(&IdHeader::opus(16000), &CommentHeader::new("v"))
            .unwrap();
        assert!(enc.push_packet(&[1; 30]).unwrap().is_none());

        // Needs two lacing values, never fits a one-segment page
        assert!(matches!(
            enc.push_packet(&[2; 255]),
            Err(OggError::SegmentLimitReached { limit: 1 })
        ));
        assert_eq!(enc.pages_written(), 2);

        let last = enc.finish().unwrap();
        assert_eq!(last.segment_table(), &[30]);
    }

    #[test]
    fn test_flush_and_retry() {
        let mut enc = encapsulator(3);
        enc.write_headers(&IdHeader::opus(16000), &CommentHeader::new("v"))
            .unwrap();

        for _ in 0..3 {
            assert!(enc.push_packet(&[1; 50]).unwrap().is_none());
        }
        let flushed = enc.push_packet(&[2; 60]).unwrap().unwrap();
        assert_eq!(flushed.segment_table(), &[50, 50, 50]);
        assert_eq!(flushed.granule_position(), 3 * 960);
        assert_eq!(flushed.sequence_number(), 2);
        assert_eq!(flushed.header_type(), 0);

        let last = enc.finish().unwrap();
        assert!(last.is_end_of_stream());
        assert_eq!(last.segment_table(), &[60]);
        assert_eq!(last.granule_position(), 4 * 960);
        assert_eq!(last.sequence_number(), 3);
    }
}
