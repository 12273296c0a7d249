//! Floating-point horizontal predictor (TIFF predictor 3).
//!
//! Float samples vary smoothly across a row, but their IEEE-754 bytes do
//! not. The predictor first regroups each row into byte planes (most
//! significant plane first, so exponent bytes sit together), then stores
//! wrapping byte differences instead of raw bytes. Successive plane values
//! cluster near zero difference, which LZW then compresses well.

use crate::error::{Result, TiffError};

/// Bytes per 32-bit float sample.
pub const BYTES_PER_SAMPLE: usize = 4;

fn row_bytes(width: usize, channels: usize, len: usize) -> Result<usize> {
    let row = width * channels * BYTES_PER_SAMPLE;
    if row == 0 || len % row != 0 {
        return Err(TiffError::InvalidDirectory(format!(
            "strip of {len} bytes is not a whole number of {row}-byte rows"
        )));
    }
    Ok(row)
}

/// Apply the forward predictor to a strip of float32 samples.
///
/// Input is interleaved little-endian sample bytes, `width * channels`
/// samples per row; the strip length must be an exact multiple of the row
/// size. Output has the same length.
pub fn forward(data: &[u8], width: usize, channels: usize) -> Result<Vec<u8>> {
    let row = row_bytes(width, channels, data.len())?;
    let plane = width * channels;
    let mut output = vec![0u8; data.len()];

    for (src, dst) in data.chunks_exact(row).zip(output.chunks_exact_mut(row)) {
        // Shuffle into byte planes, most significant plane first.
        for k in 0..plane {
            for b in 0..BYTES_PER_SAMPLE {
                dst[b * plane + k] = src[k * BYTES_PER_SAMPLE + (BYTES_PER_SAMPLE - 1 - b)];
            }
        }
        // Difference against the byte one pixel back in the same plane
        // column, right to left so earlier bytes stay unmodified.
        for i in (channels..row).rev() {
            dst[i] = dst[i].wrapping_sub(dst[i - channels]);
        }
    }

    Ok(output)
}

/// Invert the predictor, recovering interleaved little-endian sample bytes.
pub fn inverse(data: &[u8], width: usize, channels: usize) -> Result<Vec<u8>> {
    let row = row_bytes(width, channels, data.len())?;
    let plane = width * channels;
    let mut output = vec![0u8; data.len()];
    let mut planes = vec![0u8; row];

    for (src, dst) in data.chunks_exact(row).zip(output.chunks_exact_mut(row)) {
        // Wrapping cumulative sum undoes the wrapping difference exactly.
        planes.copy_from_slice(src);
        for i in channels..row {
            planes[i] = planes[i].wrapping_add(planes[i - channels]);
        }
        // Un-shuffle planes back into little-endian sample bytes.
        for k in 0..plane {
            for b in 0..BYTES_PER_SAMPLE {
                dst[k * BYTES_PER_SAMPLE + (BYTES_PER_SAMPLE - 1 - b)] = planes[b * plane + k];
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_row(values: &[f32]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_forward_known_vector() {
        // Two 1.0f32 samples, one channel: planes [63,63,128,128,0,0,0,0],
        // differenced with stride 1.
        let data = float_row(&[1.0, 1.0]);
        let predicted = forward(&data, 2, 1).unwrap();
        assert_eq!(predicted, vec![63, 0, 65, 0, 128, 0, 0, 0]);
    }

    #[test]
    fn test_roundtrip_rgba() {
        let mut samples = Vec::new();
        for y in 0..3 {
            for x in 0..5 {
                for c in 0..4 {
                    samples.push((y * 5 + x) as f32 * 0.25 + c as f32);
                }
            }
        }
        let data = float_row(&samples);
        let predicted = forward(&data, 5, 4).unwrap();
        assert_ne!(predicted, data);
        assert_eq!(inverse(&predicted, 5, 4).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_rgb() {
        let samples: Vec<f32> = (0..2 * 7 * 3).map(|i| (i as f32).sqrt() - 3.5).collect();
        let data = float_row(&samples);
        let predicted = forward(&data, 7, 3).unwrap();
        assert_eq!(inverse(&predicted, 7, 3).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_single_pixel() {
        let data = float_row(&[-0.125, 4096.5, f32::MIN_POSITIVE, 0.0]);
        let predicted = forward(&data, 1, 4).unwrap();
        assert_eq!(inverse(&predicted, 1, 4).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_arbitrary_bytes() {
        // The transform is byte-level: any byte pattern must survive,
        // including ones that are not valid floats.
        let data: Vec<u8> = (0..4 * 6 * 4 * 2).map(|i| (i * 37 % 256) as u8).collect();
        let predicted = forward(&data, 6, 4).unwrap();
        assert_eq!(inverse(&predicted, 6, 4).unwrap(), data);
    }

    #[test]
    fn test_rejects_ragged_strip() {
        let data = vec![0u8; 37];
        assert!(forward(&data, 3, 4).is_err());
        assert!(inverse(&data, 3, 4).is_err());
    }
}
