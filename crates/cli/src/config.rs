//! TOML configuration
//!
//! Every field is optional; command-line flags win over file values and
//! built-in defaults fill the rest.
//!
//! ```toml
//! [codec]
//! variant = "opus-wb"
//!
//! [ogg]
//! max_segments = 25
//! pre_skip = 312
//! output_gain = 0
//! vendor = "speechwire"
//! comments = ["ENCODER=speechwire"]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use speechwire_ogg_core::opus_header::DEFAULT_PRE_SKIP;
use speechwire_ogg_core::stream::DEFAULT_MAX_SEGMENTS;
use speechwire_ogg_core::{CommentHeader, IdHeader, StreamConfig};

/// Default vendor string written to `OpusTags`
pub const DEFAULT_VENDOR: &str = concat!("speechwire ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub codec: CodecSection,
    pub ogg: OggSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecSection {
    /// Variant used when `--variant` is not given
    pub variant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OggSection {
    pub max_segments: u8,
    pub pre_skip: u16,
    pub output_gain: i16,
    pub vendor: String,
    pub comments: Vec<String>,
    pub serial_number: Option<u32>,
}

impl Default for OggSection {
    fn default() -> Self {
        Self {
            max_segments: DEFAULT_MAX_SEGMENTS,
            pre_skip: DEFAULT_PRE_SKIP,
            output_gain: 0,
            vendor: DEFAULT_VENDOR.to_string(),
            comments: Vec::new(),
            serial_number: None,
        }
    }
}

impl Config {
    /// Load from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the variant name: flag, then file
    pub fn variant<'a>(&'a self, flag: Option<&'a str>) -> Result<&'a str> {
        flag.or(self.codec.variant.as_deref())
            .context("No codec variant given; pass --variant or set [codec] variant")
    }
}

impl OggSection {
    /// Stream config for packets of `frame_duration_ms`
    pub fn stream_config(&self, frame_duration_ms: u32) -> StreamConfig {
        let config =
            StreamConfig::for_frame_duration_ms(frame_duration_ms).with_max_segments(self.max_segments);
        match self.serial_number {
            Some(serial) => config.with_serial_number(serial),
            None => config,
        }
    }

    pub fn id_header(&self, sample_rate: u32) -> IdHeader {
        IdHeader::opus(sample_rate)
            .with_pre_skip(self.pre_skip)
            .with_output_gain(self.output_gain)
    }

    pub fn comment_header(&self) -> CommentHeader {
        self.comments
            .iter()
            .fold(CommentHeader::new(self.vendor.clone()), |header, comment| {
                header.with_comment(comment.clone())
            })
    }
}
