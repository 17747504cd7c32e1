//! Vendor wire framing
//!
//! The speech service expects every compressed frame to be preceded by its
//! payload length:
//!
//! | Family | Prefix |
//! |--------|--------|
//! | Speex  | 1 byte, raw length |
//! | Opus   | 2 bytes, big-endian length |
//!
//! The prefix is a presentation convention on top of the codec bitstream.
//! Decoders never see it: [`FrameReader`] strips it before payloads are
//! handed to [`DecoderSession::decode`](crate::DecoderSession::decode).

use bytes::{BufMut, BytesMut};

use crate::error::{CodecError, Result};
use crate::types::LengthPrefix;

/// Append `[prefix][payload]` to `dest`, returning the number of bytes written
pub fn write_frame(prefix: LengthPrefix, payload: &[u8], dest: &mut BytesMut) -> Result<usize> {
    if payload.len() > prefix.max_payload() {
        return Err(CodecError::PayloadTooLarge {
            size: payload.len(),
            max: prefix.max_payload(),
        });
    }

    dest.reserve(prefix.width() + payload.len());
    match prefix {
        LengthPrefix::OneByte => dest.put_u8(payload.len() as u8),
        LengthPrefix::TwoByteBigEndian => dest.put_u16(payload.len() as u16),
    }
    dest.put_slice(payload);

    Ok(prefix.width() + payload.len())
}

/// Read the declared payload length at the start of `frame`
pub fn declared_length(prefix: LengthPrefix, frame: &[u8]) -> Result<usize> {
    if frame.len() < prefix.width() {
        return Err(CodecError::TruncatedFrame {
            needed: prefix.width(),
            available: frame.len(),
        });
    }

    Ok(match prefix {
        LengthPrefix::OneByte => frame[0] as usize,
        LengthPrefix::TwoByteBigEndian => u16::from_be_bytes([frame[0], frame[1]]) as usize,
    })
}

/// Iterator over the bare payloads of a vendor-framed byte stream
///
/// Yields `Err(TruncatedFrame)` once if the stream ends inside a frame, then stops.
pub struct FrameReader<'a> {
    prefix: LengthPrefix,
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> FrameReader<'a> {
    /// Create a reader over `data`
    pub fn new(prefix: LengthPrefix, data: &'a [u8]) -> Self {
        Self {
            prefix,
            data,
            pos: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }

        let rest = &self.data[self.pos..];
        let result = declared_length(self.prefix, rest).and_then(|len| {
            let end = self.prefix.width() + len;
            if rest.len() < end {
                Err(CodecError::TruncatedFrame {
                    needed: end,
                    available: rest.len(),
                })
            } else {
                Ok((end, &rest[self.prefix.width()..end]))
            }
        });

        match result {
            Ok((consumed, payload)) => {
                self.pos += consumed;
                Some(Ok(payload))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
