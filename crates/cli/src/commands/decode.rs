//! Decode command - vendor framed stream back to raw PCM

use std::path::Path;

use anyhow::{Context, Result};
use bytes::BytesMut;
use speechwire_codec_core::{CodecSession, DecoderSession, FrameReader};
use tracing::info;

use super::{read_input, write_output, Summary};

/// Strip the length prefixes from `input`, decode every payload and write PCM to `output`
pub fn execute(variant: &str, input: &Path, output: &Path) -> Result<Summary> {
    let data = read_input(input)?;

    let mut session = DecoderSession::create_by_name(variant)
        .with_context(|| format!("Failed to create {} decoder", variant))?;
    let prefix = session.profile().length_prefix();

    let mut out = BytesMut::new();
    for (n, payload) in FrameReader::new(prefix, &data).enumerate() {
        let payload = payload.with_context(|| format!("Malformed frame {}", n))?;
        session
            .decode_into(payload, &mut out)
            .with_context(|| format!("Failed to decode frame {}", n))?;
    }
    let frames = session.frames_decoded();
    session.destroy();

    write_output(output, &out)?;
    info!(
        "Decoded {} frames of {} to {}",
        frames,
        variant,
        output.display()
    );

    Ok(Summary {
        frames,
        input_bytes: data.len(),
        output_bytes: out.len(),
        pages: 0,
    })
}
