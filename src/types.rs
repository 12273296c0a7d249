//! Image buffer type for float TIFF data.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, TiffError};

/// A 32-bit float image, row-major with interleaved channels.
///
/// `data` holds `height * width * channels` samples; the buffer belongs to
/// the caller, the codec only produces or consumes it at the read/write
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatImage {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Channels per pixel (3 = RGB, 4 = RGBA)
    pub channels: u16,
    /// Samples, row-major, channels interleaved
    pub data: Vec<f32>,
}

impl FloatImage {
    /// Create a zero-filled image.
    pub fn new(width: u32, height: u32, channels: u16) -> Result<Self> {
        Self::from_vec(
            width,
            height,
            channels,
            vec![0.0; width as usize * height as usize * channels as usize],
        )
    }

    /// Wrap an existing sample buffer, validating its shape.
    pub fn from_vec(width: u32, height: u32, channels: u16, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TiffError::InvalidDimensions { width, height });
        }
        if channels != 3 && channels != 4 {
            return Err(TiffError::Unsupported(format!(
                "{channels} channels (expected 3 or 4)"
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(TiffError::InvalidDirectory(format!(
                "sample buffer has {} samples, shape needs {expected}",
                data.len()
            )));
        }
        Ok(FloatImage {
            width,
            height,
            channels,
            data,
        })
    }

    /// Samples per row
    pub fn row_samples(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Get one sample
    pub fn sample(&self, x: u32, y: u32, channel: u16) -> f32 {
        self.data[y as usize * self.row_samples() + x as usize * self.channels as usize
            + channel as usize]
    }

    /// Serialize a row range to little-endian bytes (strip payload layout).
    pub fn rows_to_bytes(&self, start_row: u32, end_row: u32) -> Vec<u8> {
        let row = self.row_samples();
        let samples = &self.data[start_row as usize * row..end_row as usize * row];
        let mut bytes = vec![0u8; samples.len() * 4];
        LittleEndian::write_f32_into(samples, &mut bytes);
        bytes
    }

    /// Build an image from little-endian sample bytes.
    pub fn from_le_bytes(width: u32, height: u32, channels: u16, bytes: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * channels as usize * 4;
        if bytes.len() != expected {
            return Err(TiffError::InvalidDirectory(format!(
                "sample data has {} bytes, shape needs {expected}",
                bytes.len()
            )));
        }
        let mut data = vec![0f32; bytes.len() / 4];
        LittleEndian::read_f32_into(bytes, &mut data);
        Self::from_vec(width, height, channels, data)
    }
}
