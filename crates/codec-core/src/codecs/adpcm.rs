//! IMA ADPCM frame engine
//!
//! Pure-Rust 4:1 ADPCM used as the built-in engine for both codec families.
//! Each compressed frame is self-contained:
//!
//! ```text
//! offset 0..2  predictor at frame start (i16, little-endian)
//! offset 2     step index at frame start (0..=88)
//! offset 3     reserved (0)
//! offset 4..   two 4-bit codes per byte, low nibble first
//! ```
//!
//! A 20 ms wideband frame (320 samples) compresses to 164 bytes and a
//! narrowband frame (160 samples) to 84 bytes, so every frame fits in a single
//! container lacing value and in the one-byte Speex length prefix.

use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::error::{CodecError, Result};

/// Size of the per-frame state header
pub const FRAME_HEADER_LEN: usize = 4;

/// Compressed payload size for a frame of `frame_samples` samples
pub const fn encoded_frame_len(frame_samples: usize) -> usize {
    FRAME_HEADER_LEN + (frame_samples + 1) / 2
}

const STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408,
    449, 494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630,
    9493, 10442, 11487, 12635, 13899, 15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794,
    32767,
];

const INDEX_TABLE: [i32; 16] = [-1, -1, -1, -1, 2, 4, 6, 8, -1, -1, -1, -1, 2, 4, 6, 8];

const MAX_STEP_INDEX: i32 = STEP_TABLE.len() as i32 - 1;

/// Predictor state shared by encoder and decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AdpcmState {
    predictor: i32,
    step_index: i32,
}

impl AdpcmState {
    /// Reconstruct a sample from a 4-bit code and advance the state
    fn apply(&mut self, code: u8) -> i16 {
        let step = STEP_TABLE[self.step_index as usize];

        let mut diff = step >> 3;
        if code & 4 != 0 {
            diff += step;
        }
        if code & 2 != 0 {
            diff += step >> 1;
        }
        if code & 1 != 0 {
            diff += step >> 2;
        }

        if code & 8 != 0 {
            self.predictor -= diff;
        } else {
            self.predictor += diff;
        }
        self.predictor = self.predictor.clamp(i16::MIN as i32, i16::MAX as i32);
        self.step_index = (self.step_index + INDEX_TABLE[code as usize]).clamp(0, MAX_STEP_INDEX);

        self.predictor as i16
    }

    /// Quantize one sample against the current prediction
    fn quantize(&self, sample: i16) -> u8 {
        let mut step = STEP_TABLE[self.step_index as usize];
        let mut diff = sample as i32 - self.predictor;

        let mut code = 0u8;
        if diff < 0 {
            code = 8;
            diff = -diff;
        }
        if diff >= step {
            code |= 4;
            diff -= step;
        }
        step >>= 1;
        if diff >= step {
            code |= 2;
            diff -= step;
        }
        step >>= 1;
        if diff >= step {
            code |= 1;
        }

        code
    }
}

/// ADPCM encoder for fixed-size frames
#[derive(Debug, Clone)]
pub struct AdpcmEncoder {
    frame_samples: usize,
    state: AdpcmState,
}

impl AdpcmEncoder {
    /// Create an encoder for frames of `frame_samples` samples
    pub fn new(frame_samples: usize) -> Self {
        Self {
            frame_samples,
            state: AdpcmState::default(),
        }
    }

    /// Encode exactly one frame, appending the payload to `out`
    pub fn encode(&mut self, samples: &[i16], out: &mut BytesMut) -> Result<usize> {
        if samples.len() != self.frame_samples {
            return Err(CodecError::encoding_failed(format!(
                "ADPCM frame must hold {} samples, got {}",
                self.frame_samples,
                samples.len()
            )));
        }

        let len = encoded_frame_len(samples.len());
        out.reserve(len);
        out.put_i16_le(self.state.predictor as i16);
        out.put_u8(self.state.step_index as u8);
        out.put_u8(0);

        for pair in samples.chunks(2) {
            let low = self.encode_sample(pair[0]);
            let high = pair.get(1).map_or(0, |&s| self.encode_sample(s));
            out.put_u8(low | (high << 4));
        }

        trace!("ADPCM encoded {} samples to {} bytes", samples.len(), len);
        Ok(len)
    }

    fn encode_sample(&mut self, sample: i16) -> u8 {
        let code = self.state.quantize(sample);
        self.state.apply(code);
        code
    }
}

/// ADPCM decoder for fixed-size frames
#[derive(Debug, Clone)]
pub struct AdpcmDecoder {
    frame_samples: usize,
}

impl AdpcmDecoder {
    /// Create a decoder producing frames of `frame_samples` samples
    pub fn new(frame_samples: usize) -> Self {
        Self { frame_samples }
    }

    /// Decode exactly one frame into `out`, returning the number of samples written
    pub fn decode(&mut self, payload: &[u8], out: &mut [i16]) -> Result<usize> {
        let expected = encoded_frame_len(self.frame_samples);
        if payload.len() != expected {
            return Err(CodecError::decoding_failed(format!(
                "ADPCM payload must be {} bytes, got {}",
                expected,
                payload.len()
            )));
        }
        if out.len() < self.frame_samples {
            return Err(CodecError::decoding_failed(format!(
                "output holds {} samples, frame needs {}",
                out.len(),
                self.frame_samples
            )));
        }

        let step_index = payload[2] as i32;
        if step_index > MAX_STEP_INDEX {
            return Err(CodecError::decoding_failed(format!(
                "invalid ADPCM step index {}",
                step_index
            )));
        }

        let mut state = AdpcmState {
            predictor: i16::from_le_bytes([payload[0], payload[1]]) as i32,
            step_index,
        };

        let codes = payload[FRAME_HEADER_LEN..]
            .iter()
            .flat_map(|byte| [byte & 0x0F, byte >> 4]);
        for (slot, code) in out[..self.frame_samples].iter_mut().zip(codes) {
            *slot = state.apply(code);
        }

        trace!("ADPCM decoded {} bytes to {} samples", payload.len(), self.frame_samples);
        Ok(self.frame_samples)
    }
}
