//! Command-line interface definition

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use speechwire_codec_core::{opus_engine, CodecFamily, CodecVariant};

use crate::commands::{self, Summary};
use crate::config::Config;

/// speechwire - speech audio encoding for streaming speech services
#[derive(Parser, Debug)]
#[command(name = "speechwire")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log level added on top of RUST_LOG
    #[arg(short = 'l', long = "log-level", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode 16-bit mono PCM into length-prefixed codec frames
    Encode {
        /// Codec variant (speex, speex-wb, opus, opus-wb)
        #[arg(short, long)]
        variant: Option<String>,

        /// Raw 16-bit little-endian PCM
        input: PathBuf,

        /// Framed output
        output: PathBuf,
    },

    /// Decode length-prefixed codec frames back into PCM
    Decode {
        /// Codec variant the stream was encoded with
        #[arg(short, long)]
        variant: Option<String>,

        /// Framed input
        input: PathBuf,

        /// Raw 16-bit little-endian PCM
        output: PathBuf,
    },

    /// Encode 16-bit mono PCM into an Ogg Opus file
    Ogg {
        /// Opus variant (opus, opus-wb)
        #[arg(short, long)]
        variant: Option<String>,

        /// Raw 16-bit little-endian PCM
        input: PathBuf,

        /// Ogg Opus output
        output: PathBuf,

        /// Segments per page, overrides [ogg] max_segments
        #[arg(long)]
        max_segments: Option<u8>,
    },

    /// List codec variants and their frame sizes
    Variants,
}

impl Cli {
    /// Run the selected subcommand
    pub fn execute(&self) -> Result<Option<Summary>> {
        let mut config = Config::load_or_default(self.config.as_deref())?;

        let summary = match &self.command {
            Commands::Encode {
                variant,
                input,
                output,
            } => commands::encode::execute(config.variant(variant.as_deref())?, input, output)?,
            Commands::Decode {
                variant,
                input,
                output,
            } => commands::decode::execute(config.variant(variant.as_deref())?, input, output)?,
            Commands::Ogg {
                variant,
                input,
                output,
                max_segments,
            } => {
                if let Some(max_segments) = max_segments {
                    config.ogg.max_segments = *max_segments;
                }
                let variant = config.variant(variant.as_deref())?.to_string();
                commands::ogg::execute(&variant, input, output, &config.ogg)?
            }
            Commands::Variants => {
                list_variants();
                return Ok(None);
            }
        };

        Ok(Some(summary))
    }
}

fn list_variants() {
    println!("{:<10} {:>6} {:>8} {:>10}  engine", "variant", "rate", "samples", "raw bytes");
    for variant in CodecVariant::ALL {
        let profile = variant.profile();
        let engine = match variant.family() {
            CodecFamily::Opus => opus_engine(),
            CodecFamily::Speex => "adpcm",
        };
        println!(
            "{:<10} {:>6} {:>8} {:>10}  {}",
            variant.name(),
            profile.sample_rate,
            profile.frame_samples,
            profile.raw_frame_bytes(),
            engine
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encode() {
        let cli = Cli::parse_from(["speechwire", "encode", "-v", "opus-wb", "in.pcm", "out.bin"]);
        match cli.command {
            Commands::Encode {
                variant,
                input,
                output,
            } => {
                assert_eq!(variant.as_deref(), Some("opus-wb"));
                assert_eq!(input, PathBuf::from("in.pcm"));
                assert_eq!(output, PathBuf::from("out.bin"));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "speechwire",
            "ogg",
            "in.pcm",
            "out.opus",
            "--log-level",
            "debug",
            "--config",
            "speechwire.toml",
            "--max-segments",
            "10",
        ]);
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.config, Some(PathBuf::from("speechwire.toml")));
        assert!(matches!(
            cli.command,
            Commands::Ogg {
                max_segments: Some(10),
                ..
            }
        ));
    }

    #[test]
    fn test_verify_command() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
