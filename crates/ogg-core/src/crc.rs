//! Ogg page checksum
//!
//! CRC-32 with polynomial 0x04C11DB7, MSB-first, initial value 0 and no
//! final XOR. Input and output are not reflected, so this is not the zlib
//! CRC-32.

/// Generator polynomial
pub const POLYNOMIAL: u32 = 0x04C1_1DB7;

/// Lookup table, one entry per leading byte
pub static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut r = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            r = if r & 0x8000_0000 != 0 {
                (r << 1) ^ POLYNOMIAL
            } else {
                r << 1
            };
            bit += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
}

/// Continue a checksum over `data`
#[inline]
pub fn update(crc: u32, data: &[u8]) -> u32 {
    data.iter().fold(crc, |crc, &byte| {
        (crc << 8) ^ TABLE[((crc >> 24) as u8 ^ byte) as usize]
    })
}

/// Checksum of `data` from a zero initial value
#[inline]
pub fn checksum(data: &[u8]) -> u32 {
    update(0, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_entries() {
        assert_eq!(TABLE[0], 0);
        assert_eq!(TABLE[1], POLYNOMIAL);
        assert_eq!(TABLE[64], 0x3486_7077);
        assert_eq!(TABLE[255], 0xb1f7_40b4);
    }

    #[test]
    fn test_check_value() {
        assert_eq!(checksum(b"123456789"), 0x89A1_897F);
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn test_update_is_incremental() {
        let data = b"OggS header then body bytes";
        let (head, tail) = data.split_at(11);
        assert_eq!(update(checksum(head), tail), checksum(data));
    }
}
