//! Codec engines
//!
//! Engines are a closed set selected from the variant's family when a
//! session is created. The ADPCM frame engine is always compiled in and
//! stands in for every variant without a native engine: the Speex family
//! always, and the Opus family unless the `opus` feature routes it to libopus.
//! Stand-in frames carry the vendor framing but not the vendor bitstream.

use bytes::BytesMut;

use crate::error::Result;
use crate::types::CodecProfile;

pub mod adpcm;

#[cfg(feature = "opus")]
pub mod libopus;

/// Encoder state for one session
pub enum EncoderEngine {
    /// Built-in ADPCM frame engine
    Adpcm(adpcm::AdpcmEncoder),
    /// libopus
    #[cfg(feature = "opus")]
    Opus(libopus::OpusEncoder),
}

impl EncoderEngine {
    /// Allocate the engine matching `profile`
    pub fn create(profile: &CodecProfile) -> Result<Self> {
        #[cfg(feature = "opus")]
        if profile.variant.family() == crate::types::CodecFamily::Opus {
            return Ok(Self::Opus(libopus::OpusEncoder::new(profile)?));
        }

        Ok(Self::Adpcm(adpcm::AdpcmEncoder::new(profile.frame_samples)))
    }

    /// Engine name, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Adpcm(_) => "adpcm",
            #[cfg(feature = "opus")]
            Self::Opus(_) => "libopus",
        }
    }

    /// Whether this engine stands in for a codec it does not implement
    pub fn is_stand_in(&self) -> bool {
        matches!(self, Self::Adpcm(_))
    }

    /// Encode one frame of samples, appending the compressed payload to `out`
    pub fn encode(&mut self, samples: &[i16], out: &mut BytesMut) -> Result<usize> {
        match self {
            Self::Adpcm(enc) => enc.encode(samples, out),
            #[cfg(feature = "opus")]
            Self::Opus(enc) => enc.encode(samples, out),
        }
    }
}

/// Decoder state for one session
pub enum DecoderEngine {
    /// Built-in ADPCM frame engine
    Adpcm(adpcm::AdpcmDecoder),
    /// libopus
    #[cfg(feature = "opus")]
    Opus(libopus::OpusDecoder),
}

impl DecoderEngine {
    /// Allocate the engine matching `profile`
    pub fn create(profile: &CodecProfile) -> Result<Self> {
        #[cfg(feature = "opus")]
        if profile.variant.family() == crate::types::CodecFamily::Opus {
            return Ok(Self::Opus(libopus::OpusDecoder::new(profile)?));
        }

        Ok(Self::Adpcm(adpcm::AdpcmDecoder::new(profile.frame_samples)))
    }

    /// Engine name, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Adpcm(_) => "adpcm",
            #[cfg(feature = "opus")]
            Self::Opus(_) => "libopus",
        }
    }

    /// Whether this engine stands in for a codec it does not implement
    pub fn is_stand_in(&self) -> bool {
        matches!(self, Self::Adpcm(_))
    }

    /// Decode one compressed payload into `out`, returning samples written
    pub fn decode(&mut self, payload: &[u8], out: &mut [i16]) -> Result<usize> {
        match self {
            Self::Adpcm(dec) => dec.decode(payload, out),
            #[cfg(feature = "opus")]
            Self::Opus(dec) => dec.decode(payload, out),
        }
    }
}
