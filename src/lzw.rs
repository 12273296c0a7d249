//! TIFF-variant LZW compression.
//!
//! TIFF strips use MSB-first LZW with 9- to 12-bit codes: the stream opens
//! with a CLEAR code, the dictionary grows one entry per emitted code, the
//! code width grows at the early-change boundary, and a full dictionary at
//! 12 bits forces a CLEAR-driven reset. Both directions reconstruct the
//! dictionary from the code stream alone.

use std::collections::HashMap;

use tracing::trace;

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{Result, TiffError};

/// Dictionary reset code
pub const CLEAR_CODE: u16 = 256;
/// Stream terminator code
pub const END_OF_INFO_CODE: u16 = 257;
/// Initial code width in bits
pub const START_BIT_WIDTH: u8 = 9;
/// Maximum code width in bits
pub const MAX_BIT_WIDTH: u8 = 12;

/// First code assigned to a dictionary entry (256/257 are reserved).
const FIRST_FREE_CODE: u16 = 258;

/// LZW decoder state
struct LzwDecoder {
    /// Entries indexed by code; 256 and 257 hold empty placeholders.
    table: Vec<Vec<u8>>,
    width: u8,
}

impl LzwDecoder {
    fn new() -> Self {
        let mut decoder = LzwDecoder {
            table: Vec::with_capacity(1 << MAX_BIT_WIDTH),
            width: START_BIT_WIDTH,
        };
        decoder.reset();
        decoder
    }

    fn reset(&mut self) {
        self.table.clear();
        for i in 0..256 {
            self.table.push(vec![i as u8]);
        }
        self.table.push(Vec::new()); // 256 = clear
        self.table.push(Vec::new()); // 257 = end of information
        self.width = START_BIT_WIDTH;
    }

    fn add_entry(&mut self, entry: Vec<u8>) {
        self.table.push(entry);

        // Early change: the encoder's table runs one entry ahead, so the
        // width switches one entry before this side's table fills the width.
        if self.table.len() == (1 << self.width) - 1 && self.width < MAX_BIT_WIDTH {
            self.width += 1;
            trace!(width = self.width, "switching code width");
        }
    }
}

/// Decompress a TIFF LZW code stream.
///
/// `expected_size` is a capacity hint; the caller validates the decompressed
/// strip length against the directory.
pub fn decompress(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(TiffError::Decode("empty LZW stream".into()));
    }

    let mut output = Vec::with_capacity(expected_size);
    let mut decoder = LzwDecoder::new();
    let mut reader = BitReader::new(data);
    let mut previous: Option<Vec<u8>> = None;
    let last_byte = data.len() - 1;

    loop {
        let start = reader.position();
        if start / 8 >= last_byte {
            // Only padding bits may live in the final byte.
            return Err(TiffError::Decode(
                "code stream ended without end-of-information".into(),
            ));
        }
        let code = reader.read(decoder.width);

        if code == CLEAR_CODE {
            trace!("dictionary reset");
            decoder.reset();
            previous = None;
            continue;
        }
        if code == END_OF_INFO_CODE {
            // The terminator's last bit must land in the final byte.
            if (start + decoder.width as usize - 1) / 8 != last_byte {
                return Err(TiffError::Decode(
                    "trailing data after end-of-information".into(),
                ));
            }
            break;
        }

        let entry = if (code as usize) < decoder.table.len() {
            decoder.table[code as usize].clone()
        } else if code as usize == decoder.table.len() {
            // The one code the encoder can emit before this side has it:
            // the previous output extended by its own first byte.
            match &previous {
                Some(prev) => {
                    let mut entry = prev.clone();
                    entry.push(prev[0]);
                    entry
                }
                None => {
                    return Err(TiffError::Decode(format!(
                        "code {code} not preceded by any output"
                    )))
                }
            }
        } else {
            return Err(TiffError::Decode(format!("code {code} out of range")));
        };

        if let Some(prev) = previous.take() {
            let mut new_entry = prev;
            new_entry.push(entry[0]);
            decoder.add_entry(new_entry);
        }
        output.extend_from_slice(&entry);
        previous = Some(entry);
    }

    Ok(output)
}

/// LZW encoder state
struct LzwEncoder {
    /// (prefix code, extension byte) -> code. Single bytes are their own
    /// codes and never live in the map.
    table: HashMap<(u16, u8), u16>,
    width: u8,
    next_code: u16,
}

impl LzwEncoder {
    fn new() -> Self {
        LzwEncoder {
            table: HashMap::with_capacity(1 << MAX_BIT_WIDTH),
            width: START_BIT_WIDTH,
            next_code: FIRST_FREE_CODE,
        }
    }

    fn reset(&mut self) {
        self.table.clear();
        self.width = START_BIT_WIDTH;
        self.next_code = FIRST_FREE_CODE;
    }
}

/// Compress bytes into a TIFF LZW code stream.
///
/// `decompress(compress(x)) == x` for every input, including the empty one;
/// the reverse equality is not guaranteed.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    let mut encoder = LzwEncoder::new();
    writer.write(CLEAR_CODE, encoder.width);

    let mut bytes = data.iter().copied();
    let first = match bytes.next() {
        Some(byte) => byte,
        None => {
            writer.write(END_OF_INFO_CODE, encoder.width);
            return writer.finish();
        }
    };
    let mut current: u16 = first as u16;

    for byte in bytes {
        if let Some(&code) = encoder.table.get(&(current, byte)) {
            current = code;
            continue;
        }

        writer.write(current, encoder.width);
        encoder.table.insert((current, byte), encoder.next_code);
        encoder.next_code += 1;

        if encoder.next_code == 1 << encoder.width {
            if encoder.width < MAX_BIT_WIDTH {
                encoder.width += 1;
                trace!(width = encoder.width, "switching code width");
            } else {
                // Table full at maximum width: hand the decoder a reset.
                trace!("dictionary full, emitting clear");
                writer.write(CLEAR_CODE, encoder.width);
                encoder.reset();
            }
        }

        current = byte as u16;
    }

    writer.write(current, encoder.width);
    writer.write(END_OF_INFO_CODE, encoder.width);
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let data = b"TOBEORNOTTOBEORTOBEORNOT".to_vec();
        let compressed = compress(&data);
        let decompressed = decompress(&compressed, data.len()).unwrap();
        assert_eq!(data, decompressed);
    }

    #[test]
    fn test_roundtrip_empty() {
        let compressed = compress(&[]);
        // CLEAR + EOI at 9 bits each, padded: 3 bytes.
        assert_eq!(compressed.len(), 3);
        assert_eq!(decompress(&compressed, 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_roundtrip_single_byte() {
        let compressed = compress(&[42]);
        assert_eq!(decompress(&compressed, 1).unwrap(), vec![42]);
    }

    #[test]
    fn test_compress_aaaa_exact_bytes() {
        // CLEAR, 'A', code 258 ("AA"), 'A', EOI - five 9-bit codes.
        let compressed = compress(b"AAAA");
        assert_eq!(compressed, vec![0x80, 0x10, 0x60, 0x44, 0x18, 0x08]);
        assert_eq!(decompress(&compressed, 4).unwrap(), b"AAAA".to_vec());
    }

    #[test]
    fn test_compress_aaaa_code_sequence() {
        let compressed = compress(b"AAAA");
        let mut reader = BitReader::new(&compressed);
        assert_eq!(reader.read(9), CLEAR_CODE);
        assert_eq!(reader.read(9), 65);
        assert_eq!(reader.read(9), 258);
        assert_eq!(reader.read(9), 65);
        assert_eq!(reader.read(9), END_OF_INFO_CODE);
    }

    #[test]
    fn test_repetitive_compresses() {
        let data = vec![65u8; 1000];
        let compressed = compress(&data);
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_decompress_empty_stream_fails() {
        assert!(decompress(&[], 0).is_err());
    }

    #[test]
    fn test_missing_end_of_information() {
        let compressed = compress(b"some reasonable input data");
        // Drop the tail so the terminator never arrives.
        let truncated = &compressed[..compressed.len() - 2];
        assert!(matches!(
            decompress(truncated, 32),
            Err(TiffError::Decode(_))
        ));
    }

    #[test]
    fn test_trailing_data_after_end_of_information() {
        let mut compressed = compress(b"some reasonable input data");
        compressed.push(0xFF);
        assert!(matches!(
            decompress(&compressed, 32),
            Err(TiffError::Decode(_))
        ));
    }

    #[test]
    fn test_unresolvable_code() {
        // CLEAR then code 300, which no dictionary state can resolve.
        let mut writer = BitWriter::new();
        writer.write(CLEAR_CODE, 9);
        writer.write(300, 9);
        writer.write(0, 9);
        let stream = writer.finish();
        assert!(matches!(
            decompress(&stream, 16),
            Err(TiffError::Decode(_))
        ));
    }

    /// Walk a packed stream with the documented width schedule, checking
    /// every transition lands where the dictionary size dictates.
    fn walk_stream(compressed: &[u8]) -> ([bool; 13], usize) {
        let mut reader = BitReader::new(compressed);
        let mut width = START_BIT_WIDTH;
        let mut table_len: usize = FIRST_FREE_CODE as usize;
        let mut have_previous = false;
        let mut widths_seen = [false; 13];
        let mut resets = 0;

        loop {
            let start = reader.position();
            assert!(
                start / 8 < compressed.len() - 1,
                "stream ended without end-of-information"
            );
            let code = reader.read(width);
            widths_seen[width as usize] = true;

            if code == CLEAR_CODE {
                width = START_BIT_WIDTH;
                table_len = FIRST_FREE_CODE as usize;
                have_previous = false;
                resets += 1;
                continue;
            }
            if code == END_OF_INFO_CODE {
                assert_eq!(
                    (start + width as usize - 1) / 8,
                    compressed.len() - 1,
                    "end-of-information does not close the final byte"
                );
                break;
            }
            assert!(
                (code as usize) <= table_len,
                "code {code} beyond table of {table_len}"
            );
            if have_previous {
                table_len += 1;
                if table_len == (1 << width) - 1 && width < MAX_BIT_WIDTH {
                    width += 1;
                }
            }
            have_previous = true;
        }

        (widths_seen, resets)
    }

    #[test]
    fn test_width_growth_and_reset_boundaries() {
        // High-entropy input: nearly every pair is new, so the dictionary
        // fills through every width and resets several times.
        let mut state = 0x2545_F491u32;
        let data: Vec<u8> = (0..60_000)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 24) as u8
            })
            .collect();

        let compressed = compress(&data);
        let (widths_seen, resets) = walk_stream(&compressed);

        assert!(widths_seen[9] && widths_seen[10] && widths_seen[11] && widths_seen[12]);
        assert!(resets >= 2, "expected a full-table reset beyond the opening clear");
        assert_eq!(decompress(&compressed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_width_growth_first_boundary() {
        // Distinct consecutive pairs: one dictionary entry per input byte,
        // enough to push the table past (1 << 9) - 1 entries.
        let mut data = Vec::new();
        for a in 0u8..=1 {
            for b in 0u8..=255 {
                if a != b {
                    data.push(a);
                    data.push(b);
                }
            }
        }
        let compressed = compress(&data);
        let (widths_seen, _) = walk_stream(&compressed);
        assert!(widths_seen[9] && widths_seen[10]);
        assert_eq!(decompress(&compressed, data.len()).unwrap(), data);
    }
}
