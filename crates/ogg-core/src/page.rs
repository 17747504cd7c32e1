//! Page builder
//!
//! An [`OggPage`] accumulates packets, one lacing value each, until it is
//! handed to [`finalize`]. Finalizing consumes the page and produces an
//! immutable [`FinalizedPage`] with the header fields and checksum filled in:
//!
//! ```text
//! offset 0..4    "OggS"
//! offset 4       version (0)
//! offset 5       header type flags
//! offset 6..14   granule position (u64 LE)
//! offset 14..18  serial number (u32 LE)
//! offset 18..22  page sequence number (u32 LE)
//! offset 22..26  CRC-32 (u32 LE)
//! offset 26      segment count
//! offset 27..    segment table, then the body
//! ```

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::crc;
use crate::error::{OggError, Result};
use crate::stream::{LogicalStream, DEFAULT_MAX_SEGMENTS};

/// Capture pattern opening every page
pub const CAPTURE_PATTERN: &[u8; 4] = b"OggS";

/// Fixed part of the page header, before the segment table
pub const HEADER_PREFIX_LEN: usize = 27;

/// Largest value a single lacing entry can hold
pub const MAX_LACING_VALUE: usize = 255;

/// Largest packet a single lacing run can describe
pub const MAX_PACKET_SIZE: usize = MAX_LACING_VALUE;

const CHECKSUM_OFFSET: usize = 22;

/// Page under construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPage {
    lacing: Vec<u8>,
    body: BytesMut,
    max_segments: u8,
}

impl Default for OggPage {
    fn default() -> Self {
        Self::new()
    }
}

impl OggPage {
    /// Empty page with the default segment cap
    pub fn new() -> Self {
        Self::with_max_segments(DEFAULT_MAX_SEGMENTS)
    }

    /// Empty page holding at most `max_segments` lacing values
    pub fn with_max_segments(max_segments: u8) -> Self {
        Self {
            lacing: Vec::with_capacity(max_segments as usize),
            body: BytesMut::with_capacity(max_segments as usize * MAX_LACING_VALUE),
            max_segments,
        }
    }

    /// Lacing values used so far
    pub fn segment_count(&self) -> usize {
        self.lacing.len()
    }

    /// Lacing values this page may hold
    pub fn max_segments(&self) -> usize {
        self.max_segments as usize
    }

    /// Header length once finalized
    pub fn header_len(&self) -> usize {
        HEADER_PREFIX_LEN + self.lacing.len()
    }

    /// Body bytes appended so far
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// No packet appended yet
    pub fn is_empty(&self) -> bool {
        self.lacing.is_empty()
    }

    /// Every lacing value is taken
    pub fn is_full(&self) -> bool {
        self.lacing.len() >= self.max_segments as usize
    }

    /// Lacing values appended so far
    pub fn segment_table(&self) -> &[u8] {
        &self.lacing
    }

    /// Concatenated packet bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Append one packet; the page is left untouched on error
    pub(crate) fn append_packet(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > MAX_PACKET_SIZE {
            return Err(OggError::PacketTooLarge { size: data.len() });
        }

        if self.lacing.len() + lacing_len(data.len()) > self.max_segments as usize {
            return Err(OggError::SegmentLimitReached {
                limit: self.max_segments as usize,
            });
        }

        if data.len() == MAX_LACING_VALUE {
            self.lacing.extend_from_slice(&[255, 0]);
        } else {
            self.lacing.push(data.len() as u8);
        }
        self.body.extend_from_slice(data);
        Ok(())
    }

    /// Append a header packet, which must be alone on its page in one segment
    pub(crate) fn append_header(&mut self, data: &[u8]) -> Result<()> {
        if !self.is_empty() {
            return Err(OggError::PageNotEmpty {
                segments: self.lacing.len(),
            });
        }
        if data.len() >= MAX_LACING_VALUE {
            return Err(OggError::HeaderTooLarge {
                size: data.len(),
                max: MAX_LACING_VALUE - 1,
            });
        }
        self.append_packet(data)
    }
}

/// Lacing values needed for a packet of `size` bytes (at most 255)
///
/// A packet of exactly 255 bytes needs a terminating zero lacing value.
pub(crate) fn lacing_len(size: usize) -> usize {
    if size == MAX_LACING_VALUE {
        2
    } else {
        1
    }
}

/// Append one packet to `page`, advancing the stream's granule position by
/// its configured per-packet sample count
///
/// Returns [`OggError::SegmentLimitReached`] without touching the page or
/// the stream when the page is full; finalize it and retry on a new page.
pub fn put_packet(stream: &mut LogicalStream, page: &mut OggPage, data: &[u8]) -> Result<()> {
    let samples = stream.samples_per_packet();
    put_packet_with_samples(stream, page, data, samples)
}

/// Like [`put_packet`] with an explicit granule increment for this packet
pub fn put_packet_with_samples(
    stream: &mut LogicalStream,
    page: &mut OggPage,
    data: &[u8],
    samples: u64,
) -> Result<()> {
    page.append_packet(data)?;
    stream.advance_granule(samples);

    trace!(
        "Packet of {} bytes as segment {} (granule {})",
        data.len(),
        page.segment_count(),
        stream.granule_position()
    );
    Ok(())
}

/// Write the header for `page` and checksum it
///
/// The page carries the stream's current flag, granule position, serial
/// number and page counter. The counter is incremented afterwards.
pub fn finalize(stream: &mut LogicalStream, page: OggPage) -> FinalizedPage {
    let mut header = BytesMut::with_capacity(page.header_len());
    header.put_slice(CAPTURE_PATTERN);
    header.put_u8(0);
    header.put_u8(stream.page_type().header_type());
    header.put_u64_le(stream.granule_position());
    header.put_u32_le(stream.serial_number());
    header.put_u32_le(stream.page_counter());
    header.put_u32_le(0);
    header.put_u8(page.lacing.len() as u8);
    header.put_slice(&page.lacing);

    let checksum = crc::update(crc::checksum(&header), &page.body);
    header[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());

    debug!(
        "Finalized {} page {} of stream {:#010x}: {} segments, {} body bytes, granule {}",
        stream.page_type(),
        stream.page_counter(),
        stream.serial_number(),
        page.lacing.len(),
        page.body.len(),
        stream.granule_position()
    );
    stream.advance_page_counter();

    FinalizedPage {
        header: header.freeze(),
        body: page.body.freeze(),
    }
}

/// Immutable page ready for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedPage {
    header: Bytes,
    body: Bytes,
}

impl FinalizedPage {
    /// Serialized header, segment table included
    pub fn header(&self) -> &Bytes {
        &self.header
    }

    /// Packet bytes after the header
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Header length, segment table included
    pub fn header_len(&self) -> usize {
        self.header.len()
    }

    /// Body length
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Total wire length
    pub fn len(&self) -> usize {
        self.header.len() + self.body.len()
    }

    /// Header followed by body
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.len());
        out.put_slice(&self.header);
        out.put_slice(&self.body);
        out.freeze()
    }

    /// Write header then body to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.header)?;
        writer.write_all(&self.body)?;
        Ok(())
    }

    /// Header type flags at offset 5
    pub fn header_type(&self) -> u8 {
        self.header[5]
    }

    /// First page of its stream
    pub fn is_beginning_of_stream(&self) -> bool {
        self.header_type() & crate::stream::FLAG_BEGINNING_OF_STREAM != 0
    }

    /// Last page of its stream
    pub fn is_end_of_stream(&self) -> bool {
        self.header_type() & crate::stream::FLAG_END_OF_STREAM != 0
    }

    /// Granule position after the last packet on the page
    pub fn granule_position(&self) -> u64 {
        u64::from_le_bytes(self.field::<8>(6))
    }

    /// Serial number of the logical stream
    pub fn serial_number(&self) -> u32 {
        u32::from_le_bytes(self.field::<4>(14))
    }

    /// Page sequence number within the stream
    pub fn sequence_number(&self) -> u32 {
        u32::from_le_bytes(self.field::<4>(18))
    }

    /// Stored CRC-32
    pub fn checksum(&self) -> u32 {
        u32::from_le_bytes(self.field::<4>(CHECKSUM_OFFSET))
    }

    /// Lacing values in the segment table
    pub fn segment_count(&self) -> usize {
        self.header[26] as usize
    }

    /// Lacing values of the page
    pub fn segment_table(&self) -> &[u8] {
        &self.header[HEADER_PREFIX_LEN..]
    }

    /// Recompute the checksum with the stored field zeroed
    pub fn compute_checksum(&self) -> u32 {
        let crc = crc::checksum(&self.header[..CHECKSUM_OFFSET]);
        let crc = crc::update(crc, &[0; 4]);
        let crc = crc::update(crc, &self.header[CHECKSUM_OFFSET + 4..]);
        crc::update(crc, &self.body)
    }

    fn field<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.header[offset..offset + N]);
        buf
    }
}
