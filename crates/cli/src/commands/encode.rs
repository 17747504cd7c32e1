//! Encode command - raw PCM to a vendor framed stream

use std::path::Path;

use anyhow::{Context, Result};
use bytes::BytesMut;
use speechwire_codec_core::{CodecSession, EncoderSession};
use tracing::info;

use super::{pcm_frames, read_input, write_output, Summary};

/// Encode 16-bit little-endian mono PCM from `input` into `output`
pub fn execute(variant: &str, input: &Path, output: &Path) -> Result<Summary> {
    let pcm = read_input(input)?;

    let mut session = EncoderSession::create_by_name(variant)
        .with_context(|| format!("Failed to create {} encoder", variant))?;
    let frame_bytes = session.raw_frame_bytes();

    let mut out = BytesMut::with_capacity(pcm.len() / 2);
    for (n, frame) in pcm_frames(&pcm, frame_bytes).enumerate() {
        session
            .encode_into(&frame, &mut out)
            .with_context(|| format!("Failed to encode frame {}", n))?;
    }
    let frames = session.frames_encoded();
    session.destroy();

    write_output(output, &out)?;
    info!(
        "Encoded {} frames of {} to {}",
        frames,
        variant,
        output.display()
    );

    Ok(Summary {
        frames,
        input_bytes: pcm.len(),
        output_bytes: out.len(),
        pages: 0,
    })
}
