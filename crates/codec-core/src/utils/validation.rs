//! Input validation utilities for codec operations

use crate::error::{CodecError, Result};

/// Validate that a raw PCM buffer holds exactly one frame
pub fn validate_raw_frame(raw: &[u8], expected_len: usize) -> Result<()> {
    if raw.len() != expected_len {
        return Err(CodecError::InvalidFrameSize {
            expected: expected_len,
            actual: raw.len(),
        });
    }

    Ok(())
}

/// Validate a compressed payload before it reaches a decoder
///
/// Payloads arrive without the vendor length prefix, so they are bounded by
/// the widest prefix the wire format allows.
pub fn validate_encoded_payload(payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        return Err(CodecError::decoding_failed("Encoded payload cannot be empty"));
    }

    if payload.len() > u16::MAX as usize {
        return Err(CodecError::PayloadTooLarge {
            size: payload.len(),
            max: u16::MAX as usize,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_raw_frame() {
        assert!(validate_raw_frame(&[0u8; 640], 640).is_ok());

        let err = validate_raw_frame(&[0u8; 639], 640).unwrap_err();
        assert!(matches!(err, CodecError::InvalidFrameSize { expected: 640, actual: 639 }));
    }

    #[test]
    fn test_validate_encoded_payload() {
        assert!(validate_encoded_payload(&[1, 2, 3]).is_ok());
        assert!(validate_encoded_payload(&[]).is_err());
        assert!(matches!(
            validate_encoded_payload(&vec![0u8; 70_000]),
            Err(CodecError::PayloadTooLarge { .. })
        ));
    }
}
