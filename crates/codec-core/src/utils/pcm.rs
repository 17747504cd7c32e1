//! 16-bit little-endian PCM conversion

use bytes::{BufMut, BytesMut};

/// Convert raw little-endian PCM bytes into samples
///
/// A trailing odd byte is ignored; callers validate lengths first.
pub fn pcm_to_samples(raw: &[u8]) -> Vec<i16> {
    raw.chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Append samples to `out` as little-endian PCM bytes
pub fn samples_to_pcm(samples: &[i16], out: &mut BytesMut) {
    out.reserve(samples.len() * 2);
    for &sample in samples {
        out.put_i16_le(sample);
    }
}
