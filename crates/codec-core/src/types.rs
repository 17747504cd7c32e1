//! Core types for the codec library
//!
//! A [`CodecVariant`] names one of the four fixed profiles the speech service
//! accepts. Everything else about a session (sample rate, frame size, wire
//! prefix) is derived from the variant when the session is created.

use crate::error::{CodecError, Result};
use std::fmt;
use std::str::FromStr;

/// Bytes per 16-bit PCM sample
pub const BYTES_PER_SAMPLE: usize = 2;

/// Frame duration used by every profile
pub const FRAME_DURATION_MS: u32 = 20;

/// Codec family
///
/// The family decides the vendor length prefix written in front of each
/// compressed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecFamily {
    /// Speex, one byte length prefix
    Speex,
    /// Opus, two byte big-endian length prefix
    Opus,
}

impl CodecFamily {
    /// Get the family name
    pub fn name(self) -> &'static str {
        match self {
            Self::Speex => "speex",
            Self::Opus => "opus",
        }
    }

    /// Length prefix used on the wire for this family
    pub fn length_prefix(self) -> LengthPrefix {
        match self {
            Self::Speex => LengthPrefix::OneByte,
            Self::Opus => LengthPrefix::TwoByteBigEndian,
        }
    }
}

impl fmt::Display for CodecFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Vendor length prefix placed before every compressed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthPrefix {
    /// Single byte holding the payload length (0-255)
    OneByte,
    /// Two bytes, big-endian payload length (0-65535)
    TwoByteBigEndian,
}

impl LengthPrefix {
    /// Width of the prefix in bytes
    pub fn width(self) -> usize {
        match self {
            Self::OneByte => 1,
            Self::TwoByteBigEndian => 2,
        }
    }

    /// Largest payload length the prefix can describe
    pub fn max_payload(self) -> usize {
        match self {
            Self::OneByte => u8::MAX as usize,
            Self::TwoByteBigEndian => u16::MAX as usize,
        }
    }
}

/// The four concrete codec profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecVariant {
    /// Speex narrowband, 8 kHz
    Speex,
    /// Speex wideband, 16 kHz
    SpeexWb,
    /// Opus narrowband, 8 kHz, 20 ms frames
    Opus,
    /// Opus wideband, 16 kHz, 20 ms frames
    OpusWb,
}

impl CodecVariant {
    /// All variants, in vendor naming order
    pub const ALL: [CodecVariant; 4] = [Self::Speex, Self::SpeexWb, Self::Opus, Self::OpusWb];

    /// Vendor name of the variant, as used in the service's `aue`/`encoding` fields
    pub fn name(self) -> &'static str {
        match self {
            Self::Speex => "speex",
            Self::SpeexWb => "speex-wb",
            Self::Opus => "opus",
            Self::OpusWb => "opus-wb",
        }
    }

    /// Codec family of the variant
    pub fn family(self) -> CodecFamily {
        match self {
            Self::Speex | Self::SpeexWb => CodecFamily::Speex,
            Self::Opus | Self::OpusWb => CodecFamily::Opus,
        }
    }

    /// Whether this is a wideband (16 kHz) profile
    pub fn is_wideband(self) -> bool {
        matches!(self, Self::SpeexWb | Self::OpusWb)
    }

    /// Derive the fixed profile for this variant
    pub fn profile(self) -> CodecProfile {
        let sample_rate = if self.is_wideband() { 16000 } else { 8000 };
        let frame_samples = (sample_rate * FRAME_DURATION_MS / 1000) as usize;
        // The ADPCM engine runs at a fixed 4 bits per sample
        let bitrate = match self {
            Self::Speex | Self::SpeexWb => None,
            Self::Opus => Some(16000),
            Self::OpusWb => Some(24000),
        };

        CodecProfile {
            variant: self,
            sample_rate,
            channels: 1,
            frame_samples,
            bitrate,
        }
    }
}

impl fmt::Display for CodecVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CodecVariant {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "speex" => Ok(Self::Speex),
            "speex-wb" => Ok(Self::SpeexWb),
            "opus" => Ok(Self::Opus),
            "opus-wb" => Ok(Self::OpusWb),
            other => Err(CodecError::unsupported_variant(other)),
        }
    }
}

/// Parameters derived from a variant at session creation; never change afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecProfile {
    /// Variant the profile was derived from
    pub variant: CodecVariant,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (always mono)
    pub channels: u8,
    /// Samples per channel per frame
    pub frame_samples: usize,
    /// Target bitrate in bits per second, for engines that take one
    pub bitrate: Option<u32>,
}

impl CodecProfile {
    /// Raw PCM bytes per frame (16-bit mono)
    pub fn raw_frame_bytes(&self) -> usize {
        self.frame_samples * self.channels as usize * BYTES_PER_SAMPLE
    }

    /// Frame duration in milliseconds
    pub fn frame_duration_ms(&self) -> u32 {
        (self.frame_samples as u64 * 1000 / self.sample_rate as u64) as u32
    }

    /// Length prefix for this profile's family
    pub fn length_prefix(&self) -> LengthPrefix {
        self.variant.family().length_prefix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parsing() {
        for variant in CodecVariant::ALL {
            assert_eq!(variant.name().parse::<CodecVariant>().unwrap(), variant);
        }

        let err = "opus-swb".parse::<CodecVariant>().unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedVariant { ref name } if name == "opus-swb"));
        assert!("OPUS".parse::<CodecVariant>().is_err());
        assert!("".parse::<CodecVariant>().is_err());
    }

    #[test]
    fn test_profiles() {
        let nb = CodecVariant::Speex.profile();
        assert_eq!(nb.sample_rate, 8000);
        assert_eq!(nb.frame_samples, 160);
        assert_eq!(nb.raw_frame_bytes(), 320);
        assert_eq!(nb.bitrate, None);

        let wb = CodecVariant::OpusWb.profile();
        assert_eq!(wb.sample_rate, 16000);
        assert_eq!(wb.frame_samples, 320);
        assert_eq!(wb.raw_frame_bytes(), 640);
        assert_eq!(wb.frame_duration_ms(), 20);
        assert_eq!(wb.bitrate, Some(24000));
    }

    #[test]
    fn test_raw_frame_bytes_is_twice_frame_samples() {
        for variant in CodecVariant::ALL {
            let profile = variant.profile();
            assert_eq!(profile.raw_frame_bytes(), profile.frame_samples * 2);
        }
    }

    #[test]
    fn test_family_prefix() {
        assert_eq!(CodecVariant::Speex.family(), CodecFamily::Speex);
        assert_eq!(CodecVariant::SpeexWb.profile().length_prefix(), LengthPrefix::OneByte);
        assert_eq!(CodecVariant::Opus.family(), CodecFamily::Opus);
        assert_eq!(
            CodecVariant::OpusWb.profile().length_prefix(),
            LengthPrefix::TwoByteBigEndian
        );
        assert_eq!(LengthPrefix::OneByte.max_payload(), 255);
        assert_eq!(LengthPrefix::TwoByteBigEndian.width(), 2);
    }
}
