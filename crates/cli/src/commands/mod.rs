//! Subcommand implementations

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

pub mod decode;
pub mod encode;
pub mod ogg;

/// What a subcommand did, printed on success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub frames: u64,
    pub input_bytes: usize,
    pub output_bytes: usize,
    /// Ogg pages written, zero for the framed formats
    pub pages: u64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {} bytes in, {} bytes out",
            self.frames, self.input_bytes, self.output_bytes
        )?;
        if self.pages > 0 {
            write!(f, ", {} pages", self.pages)?;
        }
        Ok(())
    }
}

pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    let data =
        fs::read(path).with_context(|| format!("Failed to read input file {}", path.display()))?;
    debug!("Read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

pub(crate) fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data)
        .with_context(|| format!("Failed to write output file {}", path.display()))?;
    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Split PCM into raw frames, zero-padding a short last frame
pub(crate) fn pcm_frames(pcm: &[u8], frame_bytes: usize) -> impl Iterator<Item = Cow<'_, [u8]>> {
    pcm.chunks(frame_bytes).map(move |chunk| {
        if chunk.len() == frame_bytes {
            Cow::Borrowed(chunk)
        } else {
            warn!(
                "Padding trailing frame of {} bytes to {} with silence",
                chunk.len(),
                frame_bytes
            );
            let mut padded = chunk.to_vec();
            padded.resize(frame_bytes, 0);
            Cow::Owned(padded)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_frames_pads_tail() {
        let pcm: Vec<u8> = (1..=7).collect();
        let frames: Vec<_> = pcm_frames(&pcm, 4).collect();
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], Cow::Borrowed(_)));
        assert_eq!(&frames[0][..], &[1, 2, 3, 4]);
        assert_eq!(&frames[1][..], &[5, 6, 7, 0]);
    }

    #[test]
    fn test_pcm_frames_exact() {
        let frames: Vec<_> = pcm_frames(&[0u8; 640], 320).collect();
        assert_eq!(frames.len(), 2);
        assert!(pcm_frames(&[], 320).next().is_none());
    }

    #[test]
    fn test_summary_display() {
        let summary = Summary {
            frames: 3,
            input_bytes: 960,
            output_bytes: 255,
            pages: 0,
        };
        assert_eq!(summary.to_string(), "3 frames, 960 bytes in, 255 bytes out");
    }
}
