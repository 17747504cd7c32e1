//! Ogg Opus header packets
//!
//! The identification header (`OpusHead`) and comment header (`OpusTags`)
//! each occupy a page of their own, in one segment.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::error::Result;
use crate::page::OggPage;

/// Identification header magic
pub const OPUS_HEAD_MAGIC: &[u8; 8] = b"OpusHead";

/// Comment header magic
pub const OPUS_TAGS_MAGIC: &[u8; 8] = b"OpusTags";

/// Serialized identification header length
pub const ID_HEADER_LEN: usize = 19;

/// Encoder delay written by default
pub const DEFAULT_PRE_SKIP: u16 = 312;

/// Identification header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdHeader {
    /// Format version (1)
    pub version: u8,
    /// Output channel count
    pub channels: u8,
    /// Samples at 48 kHz to drop from the start of decoded output
    pub pre_skip: u16,
    /// Sample rate of the original input, informational
    pub input_sample_rate: u32,
    /// Q7.8 dB, written as-is
    pub output_gain: i16,
    /// Channel mapping family, 0 for mono/stereo
    pub channel_mapping_family: u8,
}

impl IdHeader {
    /// Mono stream at `sample_rate` with the usual defaults
    pub fn opus(sample_rate: u32) -> Self {
        Self {
            version: 1,
            channels: 1,
            pre_skip: DEFAULT_PRE_SKIP,
            input_sample_rate: sample_rate,
            output_gain: 0,
            channel_mapping_family: 0,
        }
    }

    /// Override the pre-skip
    pub fn with_pre_skip(mut self, pre_skip: u16) -> Self {
        self.pre_skip = pre_skip;
        self
    }

    /// Set the output gain in Q7.8 dB
    pub fn with_output_gain(mut self, output_gain: i16) -> Self {
        self.output_gain = output_gain;
        self
    }

    /// Serialize as the 19-byte `OpusHead` packet
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(ID_HEADER_LEN);
        buf.put_slice(OPUS_HEAD_MAGIC);
        buf.put_u8(self.version);
        buf.put_u8(self.channels);
        buf.put_u16_le(self.pre_skip);
        buf.put_u32_le(self.input_sample_rate);
        buf.put_i16_le(self.output_gain);
        buf.put_u8(self.channel_mapping_family);
        buf.freeze()
    }
}

/// Comment header: vendor string plus `KEY=value` comments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentHeader {
    /// Encoder vendor string
    pub vendor: String,
    /// User comments in `KEY=value` form
    pub comments: Vec<String>,
}

impl CommentHeader {
    /// Header with `vendor` and no comments
    pub fn new(vendor: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            comments: Vec::new(),
        }
    }

    /// Add one comment, e.g. `"ENCODER=speechwire"`
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    /// Serialized length
    pub fn len(&self) -> usize {
        OPUS_TAGS_MAGIC.len()
            + 4
            + self.vendor.len()
            + 4
            + self.comments.iter().map(|c| 4 + c.len()).sum::<usize>()
    }

    /// Serialize as the `OpusTags` packet
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());
        buf.put_slice(OPUS_TAGS_MAGIC);
        buf.put_u32_le(self.vendor.len() as u32);
        buf.put_slice(self.vendor.as_bytes());
        buf.put_u32_le(self.comments.len() as u32);
        for comment in &self.comments {
            buf.put_u32_le(comment.len() as u32);
            buf.put_slice(comment.as_bytes());
        }
        buf.freeze()
    }
}

/// Write the identification header as the only packet of `page`
pub fn put_identification_header(page: &mut OggPage, header: &IdHeader) -> Result<()> {
    page.append_header(&header.to_bytes())?;
    trace!(
        "OpusHead: {} channel(s), {} Hz, pre-skip {}",
        header.channels,
        header.input_sample_rate,
        header.pre_skip
    );
    Ok(())
}

/// Write the comment header as the only packet of `page`
pub fn put_comment_header(page: &mut OggPage, header: &CommentHeader) -> Result<()> {
    page.append_header(&header.to_bytes())?;
    trace!(
        "OpusTags: vendor \"{}\", {} comment(s)",
        header.vendor,
        header.comments.len()
    );
    Ok(())
}
