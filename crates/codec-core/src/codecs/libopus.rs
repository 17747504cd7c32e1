//! libopus engine (requires the `opus` feature)

use bytes::BytesMut;
use opus::{Application, Bitrate, Channels};
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::types::CodecProfile;

/// Largest packet the encoder is allowed to produce
pub const MAX_PACKET_BYTES: usize = 255;

/// Opus encoder state owned by one session
pub struct OpusEncoder {
    inner: opus::Encoder,
    frame_samples: usize,
    max_packet: usize,
}

impl OpusEncoder {
    /// Create a VOIP-mode mono encoder for `profile`
    pub fn new(profile: &CodecProfile) -> Result<Self> {
        let mut inner = opus::Encoder::new(profile.sample_rate, Channels::Mono, Application::Voip)
            .map_err(|e| CodecError::initialization_failed(format!("opus encoder: {}", e)))?;

        if let Some(bits) = profile.bitrate {
            inner
                .set_bitrate(Bitrate::Bits(bits as i32))
                .map_err(|e| CodecError::initialization_failed(format!("opus bitrate: {}", e)))?;
        }

        debug!(
            "Created libopus encoder: {}Hz, {} samples/frame",
            profile.sample_rate, profile.frame_samples
        );

        Ok(Self {
            inner,
            frame_samples: profile.frame_samples,
            // Small enough for one Ogg lacing value
            max_packet: profile.raw_frame_bytes().min(MAX_PACKET_BYTES),
        })
    }

    /// Encode exactly one frame, appending the packet to `out`
    pub fn encode(&mut self, samples: &[i16], out: &mut BytesMut) -> Result<usize> {
        if samples.len() != self.frame_samples {
            return Err(CodecError::encoding_failed(format!(
                "opus frame must hold {} samples, got {}",
                self.frame_samples,
                samples.len()
            )));
        }

        let start = out.len();
        out.resize(start + self.max_packet, 0);
        match self.inner.encode(samples, &mut out[start..]) {
            Ok(written) => {
                out.truncate(start + written);
                Ok(written)
            }
            Err(e) => {
                out.truncate(start);
                Err(CodecError::encoding_failed(format!("opus_encode: {}", e)))
            }
        }
    }
}

/// Opus decoder state owned by one session
pub struct OpusDecoder {
    inner: opus::Decoder,
    frame_samples: usize,
}

impl OpusDecoder {
    /// Create a mono decoder for `profile`
    pub fn new(profile: &CodecProfile) -> Result<Self> {
        let inner = opus::Decoder::new(profile.sample_rate, Channels::Mono)
            .map_err(|e| CodecError::initialization_failed(format!("opus decoder: {}", e)))?;

        Ok(Self {
            inner,
            frame_samples: profile.frame_samples,
        })
    }

    /// Decode one packet into `out`, returning the number of samples written
    pub fn decode(&mut self, payload: &[u8], out: &mut [i16]) -> Result<usize> {
        let out = out
            .get_mut(..self.frame_samples)
            .ok_or_else(|| CodecError::decoding_failed("output buffer shorter than one frame"))?;

        self.inner
            .decode(payload, out, false)
            .map_err(|e| CodecError::decoding_failed(format!("opus_decode: {}", e)))
    }
}
