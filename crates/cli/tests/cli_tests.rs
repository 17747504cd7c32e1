//! File round trips through the subcommands

use std::fs;
use std::path::PathBuf;

use speechwire_cli::{Cli, Commands, Summary};
#[cfg(not(feature = "opus"))]
use speechwire_codec_core::CodecError;
use speechwire_ogg_core::crc;
use temp_dir::TempDir;

fn tone(samples: usize) -> Vec<u8> {
    (0..samples)
        .map(|i| ((i as f32 * 0.2).sin() * 6000.0) as i16)
        .flat_map(|s| s.to_le_bytes())
        .collect()
}

fn run(command: Commands, config: Option<PathBuf>) -> anyhow::Result<Option<Summary>> {
    Cli {
        config,
        log_level: "warn".to_string(),
        command,
    }
    .execute()
}

#[test]
fn test_encode_decode_round_trip() {
    let dir = TempDir::new().unwrap();
    let pcm_path = dir.path().join("in.pcm");
    let framed_path = dir.path().join("out.speex");
    let decoded_path = dir.path().join("decoded.pcm");

    // Ten full speex-wb frames
    fs::write(&pcm_path, tone(3200)).unwrap();

    let summary = run(
        Commands::Encode {
            variant: Some("speex-wb".to_string()),
            input: pcm_path.clone(),
            output: framed_path.clone(),
        },
        None,
    )
    .unwrap()
    .unwrap();
    assert_eq!(summary.frames, 10);

    let framed = fs::read(&framed_path).unwrap();
    assert_eq!(framed.len(), summary.output_bytes);
    // One-byte prefix matching the first payload
    assert_eq!(framed[0] as usize, 164);

    let summary = run(
        Commands::Decode {
            variant: Some("speex-wb".to_string()),
            input: framed_path,
            output: decoded_path.clone(),
        },
        None,
    )
    .unwrap()
    .unwrap();
    assert_eq!(summary.frames, 10);
    assert_eq!(fs::read(&decoded_path).unwrap().len(), 6400);
}

#[test]
fn test_short_tail_is_padded() {
    let dir = TempDir::new().unwrap();
    let pcm_path = dir.path().join("in.pcm");
    let out_path = dir.path().join("out.opus-frames");

    fs::write(&pcm_path, vec![0u8; 320 + 100]).unwrap();

    let summary = run(
        Commands::Encode {
            variant: Some("opus".to_string()),
            input: pcm_path,
            output: out_path.clone(),
        },
        None,
    )
    .unwrap()
    .unwrap();
    assert_eq!(summary.frames, 2);

    // Two-byte big-endian prefix on every frame
    let framed = fs::read(&out_path).unwrap();
    let first = u16::from_be_bytes([framed[0], framed[1]]) as usize;
    let second_at = 2 + first;
    let second = u16::from_be_bytes([framed[second_at], framed[second_at + 1]]) as usize;
    assert_eq!(framed.len(), 2 + first + 2 + second);
}

#[test]
fn test_decode_rejects_truncated_stream() {
    let dir = TempDir::new().unwrap();
    let in_path = dir.path().join("broken");
    fs::write(&in_path, [200u8, 1, 2, 3]).unwrap();

    let err = run(
        Commands::Decode {
            variant: Some("speex".to_string()),
            input: in_path,
            output: dir.path().join("out.pcm"),
        },
        None,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("Truncated frame"));
}

#[cfg(feature = "opus")]
#[test]
fn test_ogg_file_layout() {
    let dir = TempDir::new().unwrap();
    let pcm_path = dir.path().join("in.pcm");
    let ogg_path = dir.path().join("out.opus");
    let config_path = dir.path().join("speechwire.toml");

    // 30 opus-wb frames with the default 25 segments per page
    fs::write(&pcm_path, tone(320 * 30)).unwrap();
    fs::write(
        &config_path,
        "[codec]\nvariant = \"opus-wb\"\n\n[ogg]\nserial_number = 4660\ncomments = [\"TITLE=test\"]\n",
    )
    .unwrap();

    let summary = run(
        Commands::Ogg {
            variant: None,
            input: pcm_path,
            output: ogg_path.clone(),
            max_segments: None,
        },
        Some(config_path),
    )
    .unwrap()
    .unwrap();
    assert_eq!(summary.frames, 30);
    assert_eq!(summary.pages, 4);

    let data = fs::read(&ogg_path).unwrap();
    assert_eq!(data.len(), summary.output_bytes);

    // Walk the pages
    let mut pos = 0;
    let mut flags = Vec::new();
    let mut granules = Vec::new();
    while pos < data.len() {
        assert_eq!(&data[pos..pos + 4], b"OggS");
        let segments = data[pos + 26] as usize;
        let header_len = 27 + segments;
        let body_len: usize = data[pos + 27..pos + header_len]
            .iter()
            .map(|&v| v as usize)
            .sum();
        let page = &data[pos..pos + header_len + body_len];

        let mut zeroed = page.to_vec();
        zeroed[22..26].fill(0);
        let stored = u32::from_le_bytes([page[22], page[23], page[24], page[25]]);
        assert_eq!(crc::checksum(&zeroed), stored);
        assert_eq!(u32::from_le_bytes([page[14], page[15], page[16], page[17]]), 4660);

        flags.push(page[5]);
        granules.push(u64::from_le_bytes(page[6..14].try_into().unwrap()));
        pos += page.len();
    }

    assert_eq!(flags, vec![0x02, 0x00, 0x00, 0x04]);
    assert_eq!(granules, vec![0, 0, 25 * 960, 30 * 960]);
    assert_eq!(&data[28..36], b"OpusHead");
}

#[cfg(not(feature = "opus"))]
#[test]
fn test_ogg_refuses_adpcm_payloads() {
    let dir = TempDir::new().unwrap();
    let pcm_path = dir.path().join("in.pcm");
    let ogg_path = dir.path().join("out.opus");
    fs::write(&pcm_path, tone(320 * 3)).unwrap();

    let err = run(
        Commands::Ogg {
            variant: Some("opus-wb".to_string()),
            input: pcm_path,
            output: ogg_path.clone(),
            max_segments: None,
        },
        None,
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<CodecError>(),
        Some(CodecError::FeatureNotEnabled { feature }) if feature == "opus"
    ));
    // Nothing half-written
    assert!(!ogg_path.exists());
}

#[test]
fn test_ogg_needs_opus_variant() {
    let dir = TempDir::new().unwrap();
    let pcm_path = dir.path().join("in.pcm");
    fs::write(&pcm_path, vec![0u8; 640]).unwrap();

    let result = run(
        Commands::Ogg {
            variant: Some("speex-wb".to_string()),
            input: pcm_path,
            output: dir.path().join("out.opus"),
            max_segments: None,
        },
        None,
    );
    assert!(result.is_err());
}

#[test]
fn test_missing_variant() {
    let dir = TempDir::new().unwrap();
    let result = run(
        Commands::Encode {
            variant: None,
            input: dir.path().join("missing.pcm"),
            output: dir.path().join("out"),
        },
        None,
    );
    assert!(result.is_err());
}
