//! TIFF encoder (write path).
//!
//! Emits header, compressed strip data, then the directory with its
//! extra-data region, patching the header's directory pointer once strip
//! sizes are known. Everything written here is readable by this crate's own
//! decoder; that symmetry is the interop contract.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Seek, SeekFrom, Write};
use tracing::debug;

use crate::error::{Result, TiffError};
use crate::ifd::{Ifd, IfdEntry, IfdValue};
use crate::tags::{tag, value};
use crate::types::FloatImage;
use crate::{lzw, predictor, TIFF_MAGIC};

/// Strip height used for output files.
pub const DEFAULT_ROWS_PER_STRIP: u32 = 32;

/// TIFF encoder
#[derive(Debug, Clone)]
pub struct TiffEncoder {
    rows_per_strip: u32,
    date_time: Option<String>,
}

impl Default for TiffEncoder {
    fn default() -> Self {
        TiffEncoder::new()
    }
}

impl TiffEncoder {
    /// Create new encoder with default settings
    pub fn new() -> Self {
        TiffEncoder {
            rows_per_strip: DEFAULT_ROWS_PER_STRIP,
            date_time: None,
        }
    }

    /// Set rows per strip
    pub fn rows_per_strip(mut self, rows: u32) -> Self {
        self.rows_per_strip = rows.max(1);
        self
    }

    /// Override the DateTime tag (format `YYYY:MM:DD HH:MM:SS`).
    ///
    /// Without an override the encoder stamps the local clock, so two
    /// encodes of the same image need this to be byte-identical.
    pub fn date_time(mut self, date_time: impl Into<String>) -> Self {
        self.date_time = Some(date_time.into());
        self
    }

    /// Encode an image to an in-memory TIFF file.
    pub fn encode(&self, image: &FloatImage) -> Result<Vec<u8>> {
        let mut output = Cursor::new(Vec::new());
        self.encode_to(&mut output, image)?;
        Ok(output.into_inner())
    }

    /// Encode an image to a seekable byte sink.
    pub fn encode_to<W: Write + Seek>(&self, writer: &mut W, image: &FloatImage) -> Result<()> {
        if image.channels != 4 {
            return Err(TiffError::Unsupported(format!(
                "writing {}-channel images (output is always RGBA)",
                image.channels
            )));
        }

        writer.write_all(&TIFF_MAGIC)?;

        // Directory offset is patched once the strips are written.
        let ifd_offset_pos = writer.stream_position()?;
        writer.write_u32::<LittleEndian>(0)?;

        let num_strips = image.height.div_ceil(self.rows_per_strip);
        let mut strip_offsets = Vec::with_capacity(num_strips as usize);
        let mut strip_byte_counts = Vec::with_capacity(num_strips as usize);

        for strip_idx in 0..num_strips {
            let start_row = strip_idx * self.rows_per_strip;
            let end_row = (start_row + self.rows_per_strip).min(image.height);

            let raw = image.rows_to_bytes(start_row, end_row);
            let predicted =
                predictor::forward(&raw, image.width as usize, image.channels as usize)?;
            let compressed = lzw::compress(&predicted);

            let offset = writer.stream_position()? as u32;
            strip_offsets.push(offset);
            strip_byte_counts.push(compressed.len() as u32);
            writer.write_all(&compressed)?;
            debug!(
                strip = strip_idx,
                raw = raw.len(),
                compressed = compressed.len(),
                "wrote strip"
            );

            // Keep strips on even offsets.
            if compressed.len() % 2 != 0 {
                writer.write_u8(0)?;
            }
        }

        let ifd = self.build_directory(image, strip_offsets, strip_byte_counts);
        let ifd_offset = ifd.write(writer)?;

        writer.seek(SeekFrom::Start(ifd_offset_pos))?;
        writer.write_u32::<LittleEndian>(ifd_offset)?;
        writer.seek(SeekFrom::End(0))?;

        Ok(())
    }

    fn build_directory(
        &self,
        image: &FloatImage,
        strip_offsets: Vec<u32>,
        strip_byte_counts: Vec<u32>,
    ) -> Ifd {
        let channels = image.channels as usize;
        let date_time = self
            .date_time
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y:%m:%d %H:%M:%S").to_string());

        let mut ifd = Ifd::new();
        ifd.add(IfdEntry::long(tag::IMAGE_WIDTH, image.width));
        ifd.add(IfdEntry::long(tag::IMAGE_LENGTH, image.height));
        ifd.add(IfdEntry::new(
            tag::BITS_PER_SAMPLE,
            IfdValue::Shorts(vec![value::BITS_PER_SAMPLE_FLOAT; channels]),
        ));
        ifd.add(IfdEntry::short(tag::COMPRESSION, value::COMPRESSION_LZW));
        ifd.add(IfdEntry::short(
            tag::PHOTOMETRIC_INTERPRETATION,
            value::PHOTOMETRIC_RGB,
        ));
        ifd.add(IfdEntry::new(
            tag::STRIP_OFFSETS,
            IfdValue::Longs(strip_offsets),
        ));
        ifd.add(IfdEntry::short(tag::ORIENTATION, value::ORIENTATION_TOP_LEFT));
        ifd.add(IfdEntry::short(tag::SAMPLES_PER_PIXEL, image.channels));
        ifd.add(IfdEntry::long(tag::ROWS_PER_STRIP, self.rows_per_strip));
        ifd.add(IfdEntry::new(
            tag::STRIP_BYTE_COUNTS,
            IfdValue::Longs(strip_byte_counts),
        ));
        ifd.add(IfdEntry::short(
            tag::PLANAR_CONFIGURATION,
            value::PLANAR_CHUNKY,
        ));
        ifd.add(IfdEntry::rational(tag::X_POSITION, 0, 1));
        ifd.add(IfdEntry::rational(tag::Y_POSITION, 0, 1));
        ifd.add(IfdEntry::ascii(tag::DATE_TIME, &date_time));
        ifd.add(IfdEntry::short(
            tag::PREDICTOR,
            value::PREDICTOR_FLOATING_POINT,
        ));
        ifd.add(IfdEntry::short(tag::EXTRA_SAMPLES, value::EXTRA_SAMPLE_ALPHA));
        ifd.add(IfdEntry::new(
            tag::SAMPLE_FORMAT,
            IfdValue::Shorts(vec![value::SAMPLE_FORMAT_FLOAT; channels]),
        ));
        ifd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::TiffDecoder;

    fn gradient_image(width: u32, height: u32) -> FloatImage {
        let mut image = FloatImage::new(width, height, 4).unwrap();
        for y in 0..height {
            for x in 0..width {
                let base = (y as usize * width as usize + x as usize) * 4;
                image.data[base] = x as f32 / width as f32;
                image.data[base + 1] = y as f32 / height as f32;
                image.data[base + 2] = -1.25;
                image.data[base + 3] = 1.0;
            }
        }
        image
    }

    #[test]
    fn test_encode_single_strip_roundtrip() {
        let image = gradient_image(16, 8);
        let encoded = TiffEncoder::new().encode(&image).unwrap();

        assert!(TiffDecoder::probe(&encoded));
        let decoded = TiffDecoder::new().decode(&encoded).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_encode_multiple_strips_roundtrip() {
        // 33 rows at the default 32 rows per strip: one full strip plus a
        // single-row tail.
        let image = gradient_image(7, 33);
        let encoded = TiffEncoder::new().encode(&image).unwrap();
        let decoded = TiffDecoder::new().decode(&encoded).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_encode_rejects_rgb() {
        let image = FloatImage::new(4, 4, 3).unwrap();
        assert!(matches!(
            TiffEncoder::new().encode(&image),
            Err(TiffError::Unsupported(_))
        ));
    }

    #[test]
    fn test_encode_deterministic_with_fixed_datetime() {
        let image = gradient_image(5, 5);
        let encoder = TiffEncoder::new().date_time("2024:06:01 00:00:00");
        let a = encoder.encode(&image).unwrap();
        let b = encoder.encode(&image).unwrap();
        assert_eq!(a, b);
    }
}
