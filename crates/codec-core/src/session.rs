//! Codec sessions
//!
//! A session owns exactly one encoder or decoder for one variant for its whole
//! lifetime. Creation derives the profile and allocates engine state; the
//! expected raw PCM frame length is available from
//! [`raw_frame_bytes`](CodecSession::raw_frame_bytes) so callers can size
//! their I/O buffers. Engine state is released exactly once, either through
//! [`destroy`](CodecSession::destroy) or when the session is dropped on an
//! error path.
//!
//! Sessions are not shared: callers serialize `encode`/`decode` calls, e.g.
//! one sender task per connection.

use bytes::{Bytes, BytesMut};
use tracing::{debug, error, trace, warn};

use crate::codecs::{DecoderEngine, EncoderEngine};
use crate::error::{CodecError, Result};
use crate::framing::write_frame;
use crate::types::{CodecProfile, CodecVariant};
use crate::utils::{pcm_to_samples, samples_to_pcm, validate_encoded_payload, validate_raw_frame};

/// Operations shared by the encode and decode directions
pub trait CodecSession: Sized {
    /// Allocate a session for `variant`
    fn create(variant: CodecVariant) -> Result<Self>;

    /// Allocate a session from a vendor variant name such as `"opus-wb"`
    fn create_by_name(name: &str) -> Result<Self> {
        let variant = name.parse::<CodecVariant>().map_err(|e| {
            error!("Unsupported codec format \"{}\"", name);
            e
        })?;
        Self::create(variant)
    }

    /// Profile the session was created with
    fn profile(&self) -> &CodecProfile;

    /// Raw PCM bytes per frame (the value callers size buffers with)
    fn raw_frame_bytes(&self) -> usize {
        self.profile().raw_frame_bytes()
    }

    /// Process one unit: a raw frame when encoding, a bare payload when decoding
    fn process(&mut self, input: &[u8]) -> Result<Bytes>;

    /// Release the engine state
    fn destroy(self) {
        drop(self);
    }
}

/// Encoder session producing vendor-framed compressed audio
pub struct EncoderSession {
    profile: CodecProfile,
    engine: EncoderEngine,
    frames: u64,
}

impl EncoderSession {
    /// Encode exactly one raw frame and return `[length prefix][payload]`
    pub fn encode(&mut self, raw: &[u8]) -> Result<Bytes> {
        let mut out = BytesMut::with_capacity(self.raw_frame_bytes() + 2);
        self.encode_into(raw, &mut out)?;
        Ok(out.freeze())
    }

    /// Encode exactly one raw frame, appending the vendor frame to `out`
    ///
    /// Returns the total frame length (prefix + payload). `out` is left
    /// unchanged on failure.
    pub fn encode_into(&mut self, raw: &[u8], out: &mut BytesMut) -> Result<usize> {
        let payload = self.encode_packet(raw)?;
        write_frame(self.profile.length_prefix(), &payload, out).map_err(|e| {
            error!("Failed to frame {} payload: {}", self.profile.variant, e);
            e
        })
    }

    /// Encode exactly one raw frame and return the bare compressed payload
    ///
    /// This is what container encapsulation consumes.
    pub fn encode_packet(&mut self, raw: &[u8]) -> Result<Bytes> {
        validate_raw_frame(raw, self.raw_frame_bytes())?;

        let samples = pcm_to_samples(raw);
        let mut payload = BytesMut::with_capacity(self.raw_frame_bytes());
        let written = self.engine.encode(&samples, &mut payload).map_err(|e| {
            error!("Failed to encode {} raw data: {}", self.profile.variant, e);
            e
        })?;

        self.frames += 1;
        trace!(
            "{} frame {}: {} raw bytes -> {} payload bytes",
            self.profile.variant,
            self.frames,
            raw.len(),
            written
        );
        Ok(payload.freeze())
    }

    /// Number of frames encoded so far
    pub fn frames_encoded(&self) -> u64 {
        self.frames
    }

    /// Variant of this session
    pub fn variant(&self) -> CodecVariant {
        self.profile.variant
    }

    /// Name of the engine producing the payloads
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Whether payloads come from the ADPCM stand-in rather than the variant's codec
    pub fn is_stand_in(&self) -> bool {
        self.engine.is_stand_in()
    }
}

impl CodecSession for EncoderSession {
    fn create(variant: CodecVariant) -> Result<Self> {
        let profile = variant.profile();
        let engine = EncoderEngine::create(&profile).map_err(|e| {
            error!("Failed to create {} encoder: {}", variant, e);
            e
        })?;
        if engine.is_stand_in() {
            warn!(
                "No {} encoder in this build, {} payloads are {} stand-in frames",
                variant.family(),
                variant,
                engine.name()
            );
        }

        debug!(
            "Created {} encoder ({}): {}Hz, {} samples/frame, {} raw bytes/frame",
            variant,
            engine.name(),
            profile.sample_rate,
            profile.frame_samples,
            profile.raw_frame_bytes()
        );

        Ok(Self {
            profile,
            engine,
            frames: 0,
        })
    }

    fn profile(&self) -> &CodecProfile {
        &self.profile
    }

    fn process(&mut self, input: &[u8]) -> Result<Bytes> {
        self.encode(input)
    }
}

impl Drop for EncoderSession {
    fn drop(&mut self) {
        debug!(
            "Released {} encoder after {} frames",
            self.profile.variant, self.frames
        );
    }
}

/// Decoder session turning bare compressed payloads back into raw PCM
pub struct DecoderSession {
    profile: CodecProfile,
    engine: DecoderEngine,
    scratch: Vec<i16>,
    frames: u64,
}

impl DecoderSession {
    /// Decode one payload (vendor prefix already stripped) into one raw frame
    pub fn decode(&mut self, payload: &[u8]) -> Result<Bytes> {
        let mut out = BytesMut::with_capacity(self.raw_frame_bytes());
        self.decode_into(payload, &mut out)?;
        Ok(out.freeze())
    }

    /// Decode one payload, appending the raw frame to `out`; returns the raw length
    pub fn decode_into(&mut self, payload: &[u8], out: &mut BytesMut) -> Result<usize> {
        validate_encoded_payload(payload)?;

        let samples = self.engine.decode(payload, &mut self.scratch).map_err(|e| {
            error!("Failed to decode {} data: {}", self.profile.variant, e);
            e
        })?;

        if samples != self.profile.frame_samples {
            error!(
                "{} decoder produced {} samples, expected {}",
                self.profile.variant, samples, self.profile.frame_samples
            );
            return Err(CodecError::decoding_failed(format!(
                "decoded {} samples, expected {}",
                samples, self.profile.frame_samples
            )));
        }

        samples_to_pcm(&self.scratch[..samples], out);
        self.frames += 1;
        trace!(
            "{} frame {}: {} payload bytes -> {} raw bytes",
            self.profile.variant,
            self.frames,
            payload.len(),
            samples * 2
        );
        Ok(samples * 2)
    }

    /// Number of frames decoded so far
    pub fn frames_decoded(&self) -> u64 {
        self.frames
    }

    /// Variant of this session
    pub fn variant(&self) -> CodecVariant {
        self.profile.variant
    }

    /// Name of the engine reading the payloads
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Whether payloads are read by the ADPCM stand-in rather than the variant's codec
    pub fn is_stand_in(&self) -> bool {
        self.engine.is_stand_in()
    }
}

impl CodecSession for DecoderSession {
    fn create(variant: CodecVariant) -> Result<Self> {
        let profile = variant.profile();
        let engine = DecoderEngine::create(&profile).map_err(|e| {
            error!("Failed to create {} decoder: {}", variant, e);
            e
        })?;
        if engine.is_stand_in() {
            warn!(
                "No {} decoder in this build, {} payloads are read as {} stand-in frames",
                variant.family(),
                variant,
                engine.name()
            );
        }

        debug!(
            "Created {} decoder ({}): {}Hz, {} samples/frame",
            variant,
            engine.name(),
            profile.sample_rate,
            profile.frame_samples
        );

        Ok(Self {
            profile,
            engine,
            scratch: vec![0i16; profile.frame_samples],
            frames: 0,
        })
    }

    fn profile(&self) -> &CodecProfile {
        &self.profile
    }

    fn process(&mut self, input: &[u8]) -> Result<Bytes> {
        self.decode(input)
    }
}

impl Drop for DecoderSession {
    fn drop(&mut self) {
        debug!(
            "Released {} decoder after {} frames",
            self.profile.variant, self.frames
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::declared_length;
    use crate::types::LengthPrefix;

    #[test]
    fn test_create_reports_raw_frame_bytes() {
        let enc = EncoderSession::create(CodecVariant::OpusWb).unwrap();
        assert_eq!(enc.raw_frame_bytes(), 640);

        let enc = EncoderSession::create_by_name("speex").unwrap();
        assert_eq!(enc.raw_frame_bytes(), 320);

        let dec = DecoderSession::create_by_name("speex-wb").unwrap();
        assert_eq!(dec.raw_frame_bytes(), 640);
    }

    #[test]
    fn test_create_rejects_unknown_name() {
        assert!(matches!(
            EncoderSession::create_by_name("amr"),
            Err(CodecError::UnsupportedVariant { .. })
        ));
        assert!(DecoderSession::create_by_name("opus-swb").is_err());
    }

    #[test]
    fn test_encode_rejects_wrong_length() {
        let mut enc = EncoderSession::create(CodecVariant::Opus).unwrap();
        let err = enc.encode(&[0u8; 640]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidFrameSize { expected: 320, actual: 640 }));
        assert_eq!(enc.frames_encoded(), 0);

        // The session is still usable afterwards
        assert!(enc.encode(&[0u8; 320]).is_ok());
    }

    #[test]
    fn test_encode_into_appends() {
        let mut enc = EncoderSession::create(CodecVariant::Speex).unwrap();
        let mut out = BytesMut::from(&b"xx"[..]);
        let n = enc.encode_into(&[0u8; 320], &mut out).unwrap();
        assert_eq!(out.len(), 2 + n);
        assert_eq!(&out[..2], b"xx");
        assert_eq!(declared_length(LengthPrefix::OneByte, &out[2..]).unwrap(), n - 1);
    }

    #[test]
    fn test_process_dispatches_by_direction() {
        let mut enc = EncoderSession::create(CodecVariant::SpeexWb).unwrap();
        let mut dec = DecoderSession::create(CodecVariant::SpeexWb).unwrap();

        let frame = enc.process(&[0u8; 640]).unwrap();
        let payload = &frame[1..];
        let raw = dec.process(payload).unwrap();
        assert_eq!(raw.len(), 640);

        enc.destroy();
        dec.destroy();
    }

    #[test]
    fn test_speex_family_runs_on_stand_in() {
        for variant in [CodecVariant::Speex, CodecVariant::SpeexWb] {
            let enc = EncoderSession::create(variant).unwrap();
            assert!(enc.is_stand_in());
            assert_eq!(enc.engine_name(), "adpcm");
            assert!(DecoderSession::create(variant).unwrap().is_stand_in());
        }
    }

    #[test]
    fn test_opus_engine_follows_feature() {
        let enc = EncoderSession::create(CodecVariant::OpusWb).unwrap();
        let dec = DecoderSession::create(CodecVariant::Opus).unwrap();
        assert_eq!(enc.engine_name(), crate::opus_engine());
        assert_eq!(dec.engine_name(), crate::opus_engine());
        assert_eq!(enc.is_stand_in(), !cfg!(feature = "opus"));
        assert_eq!(dec.is_stand_in(), !cfg!(feature = "opus"));
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        let mut dec = DecoderSession::create(CodecVariant::Opus).unwrap();
        assert!(dec.decode(&[]).is_err());
        assert_eq!(dec.frames_decoded(), 0);
    }
}
