//! Ogg command - raw PCM to an Ogg Opus file

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use speechwire_codec_core::{CodecError, CodecFamily, CodecSession, CodecVariant, EncoderSession};
use speechwire_ogg_core::OggOpusEncapsulator;
use tracing::{error, info};

use super::{pcm_frames, read_input, Summary};
use crate::config::OggSection;

/// Encode PCM from `input` with an Opus variant and write it as Ogg Opus
pub fn execute(variant: &str, input: &Path, output: &Path, settings: &OggSection) -> Result<Summary> {
    let variant: CodecVariant = variant.parse()?;
    if variant.family() != CodecFamily::Opus {
        bail!("Ogg encapsulation needs an Opus variant, got {}", variant);
    }

    let pcm = read_input(input)?;
    let mut session = EncoderSession::create(variant)
        .with_context(|| format!("Failed to create {} encoder", variant))?;
    // OpusHead promises an Opus bitstream
    if session.is_stand_in() {
        error!(
            "Refusing to wrap {} frames from the {} engine as Ogg Opus",
            variant,
            session.engine_name()
        );
        return Err(CodecError::feature_not_enabled("opus").into());
    }
    let profile = *session.profile();

    let mut encapsulator =
        OggOpusEncapsulator::new(settings.stream_config(profile.frame_duration_ms()))?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create output file {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let mut output_bytes = 0;

    let headers = encapsulator.write_headers(
        &settings.id_header(profile.sample_rate),
        &settings.comment_header(),
    )?;
    for page in &headers {
        page.write_to(&mut writer)?;
        output_bytes += page.len();
    }

    for (n, frame) in pcm_frames(&pcm, profile.raw_frame_bytes()).enumerate() {
        let packet = session
            .encode_packet(&frame)
            .with_context(|| format!("Failed to encode frame {}", n))?;
        if let Some(page) = encapsulator
            .push_packet(&packet)
            .with_context(|| format!("Failed to add packet {} to the stream", n))?
        {
            page.write_to(&mut writer)?;
            output_bytes += page.len();
        }
    }
    let frames = session.frames_encoded();
    session.destroy();

    let last = encapsulator.finish()?;
    last.write_to(&mut writer)?;
    output_bytes += last.len();
    writer
        .flush()
        .with_context(|| format!("Failed to write output file {}", output.display()))?;

    // Both header pages, the flushed data pages and the EOS page
    let pages = last.sequence_number() as u64 + 1;
    info!(
        "Wrote {} frames of {} as {} Ogg pages to {}",
        frames,
        variant,
        pages,
        output.display()
    );

    Ok(Summary {
        frames,
        input_bytes: pcm.len(),
        output_bytes,
        pages,
    })
}
