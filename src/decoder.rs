//! TIFF decoder (read path).
//!
//! Parses the header and directory, validates the fixed field set against
//! its acceptable values, then decompresses and un-predicts each strip into
//! one contiguous float sample buffer.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::debug;

use crate::error::{Result, TiffError};
use crate::ifd::Ifd;
use crate::predictor::BYTES_PER_SAMPLE;
use crate::tags::{tag, value, FIELDS};
use crate::types::FloatImage;
use crate::{lzw, predictor, TIFF_MAGIC};

/// Validated strip layout extracted from a directory.
struct ImageLayout {
    width: u32,
    height: u32,
    channels: u16,
    rows_per_strip: u32,
    strip_offsets: Vec<u32>,
    strip_byte_counts: Vec<u32>,
}

/// TIFF decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffDecoder;

impl TiffDecoder {
    /// Create new decoder
    pub fn new() -> Self {
        TiffDecoder
    }

    /// Decode a complete TIFF file held in memory.
    pub fn decode(&self, data: &[u8]) -> Result<FloatImage> {
        let mut cursor = Cursor::new(data);
        self.decode_from(&mut cursor)
    }

    /// Decode a TIFF file from a seekable byte source.
    pub fn decode_from<R: Read + Seek>(&self, reader: &mut R) -> Result<FloatImage> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != TIFF_MAGIC {
            return Err(TiffError::InvalidMagic);
        }

        let ifd_offset = reader.read_u32::<LittleEndian>()?;
        debug!(offset = ifd_offset, "reading directory");
        let ifd = Ifd::read(reader, ifd_offset)?;
        if ifd.next_ifd_offset != 0 {
            return Err(TiffError::Unsupported("multi-page TIFF".into()));
        }

        let layout = Self::validate_directory(&ifd)?;
        self.read_strips(reader, &layout)
    }

    /// Cheap header sniff: is this plausibly a file this crate reads?
    pub fn probe(data: &[u8]) -> bool {
        data.len() >= 8 && data[0..4] == TIFF_MAGIC
    }

    /// Check the directory holds exactly the required fields with
    /// acceptable values, and extract the strip layout.
    fn validate_directory(ifd: &Ifd) -> Result<ImageLayout> {
        let channels = single_u16(ifd, tag::SAMPLES_PER_PIXEL, "SamplesPerPixel")?;
        if channels != 3 && channels != 4 {
            return Err(TiffError::UnsupportedValue {
                field: "SamplesPerPixel",
                value: channels as u32,
            });
        }

        for field in FIELDS {
            if !field.required || ifd.contains(field.tag) {
                continue;
            }
            // A 3-channel image has no alpha channel to describe.
            if field.tag == tag::EXTRA_SAMPLES && channels == 3 {
                continue;
            }
            return Err(TiffError::MissingTag(field.name));
        }
        if channels == 3 && ifd.contains(tag::EXTRA_SAMPLES) {
            return Err(TiffError::InvalidDirectory(
                "ExtraSamples present without an alpha channel".into(),
            ));
        }

        let width = single_u32(ifd, tag::IMAGE_WIDTH, "ImageWidth")?;
        let height = single_u32(ifd, tag::IMAGE_LENGTH, "ImageLength")?;
        if width == 0 || height == 0 {
            return Err(TiffError::InvalidDimensions { width, height });
        }

        let compression = single_u16(ifd, tag::COMPRESSION, "Compression")?;
        if compression != value::COMPRESSION_LZW {
            return Err(TiffError::UnsupportedCompression(compression));
        }
        let predictor = single_u16(ifd, tag::PREDICTOR, "Predictor")?;
        if predictor != value::PREDICTOR_FLOATING_POINT {
            return Err(TiffError::UnsupportedPredictor(predictor));
        }
        expect_value(ifd, tag::PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation", value::PHOTOMETRIC_RGB)?;
        expect_value(ifd, tag::ORIENTATION, "Orientation", value::ORIENTATION_TOP_LEFT)?;
        expect_value(ifd, tag::PLANAR_CONFIGURATION, "PlanarConfiguration", value::PLANAR_CHUNKY)?;
        if channels == 4 {
            expect_value(ifd, tag::EXTRA_SAMPLES, "ExtraSamples", value::EXTRA_SAMPLE_ALPHA)?;
        }
        expect_position(ifd, tag::X_POSITION, "XPosition")?;
        expect_position(ifd, tag::Y_POSITION, "YPosition")?;

        expect_per_channel(ifd, tag::BITS_PER_SAMPLE, "BitsPerSample", channels, value::BITS_PER_SAMPLE_FLOAT)?;
        expect_per_channel(ifd, tag::SAMPLE_FORMAT, "SampleFormat", channels, value::SAMPLE_FORMAT_FLOAT)?;

        let rows_per_strip = single_u32(ifd, tag::ROWS_PER_STRIP, "RowsPerStrip")?;
        if rows_per_strip == 0 {
            return Err(TiffError::InvalidDirectory("RowsPerStrip is zero".into()));
        }

        let strip_offsets = ifd
            .get_value(tag::STRIP_OFFSETS)
            .and_then(|v| v.as_u32_vec())
            .ok_or(TiffError::MissingTag("StripOffsets"))?;
        let strip_byte_counts = ifd
            .get_value(tag::STRIP_BYTE_COUNTS)
            .and_then(|v| v.as_u32_vec())
            .ok_or(TiffError::MissingTag("StripByteCounts"))?;

        let expected_strips = height.div_ceil(rows_per_strip) as usize;
        if strip_offsets.len() != expected_strips {
            return Err(TiffError::StripCountMismatch {
                expected: expected_strips,
                actual: strip_offsets.len(),
            });
        }
        if strip_byte_counts.len() != expected_strips {
            return Err(TiffError::StripCountMismatch {
                expected: expected_strips,
                actual: strip_byte_counts.len(),
            });
        }

        Ok(ImageLayout {
            width,
            height,
            channels,
            rows_per_strip,
            strip_offsets,
            strip_byte_counts,
        })
    }

    /// Decompress and un-predict every strip, in file order.
    fn read_strips<R: Read + Seek>(
        &self,
        reader: &mut R,
        layout: &ImageLayout,
    ) -> Result<FloatImage> {
        let row_bytes =
            layout.width as usize * layout.channels as usize * BYTES_PER_SAMPLE;
        let mut bytes = Vec::with_capacity(row_bytes * layout.height as usize);

        for (i, (&offset, &byte_count)) in layout
            .strip_offsets
            .iter()
            .zip(layout.strip_byte_counts.iter())
            .enumerate()
        {
            let strip_start_row = i as u32 * layout.rows_per_strip;
            let strip_rows = layout.rows_per_strip.min(layout.height - strip_start_row);
            let expected = row_bytes * strip_rows as usize;

            reader.seek(SeekFrom::Start(offset as u64))?;
            let mut compressed = vec![0u8; byte_count as usize];
            reader.read_exact(&mut compressed)?;

            let predicted = lzw::decompress(&compressed, expected)?;
            if predicted.len() != expected {
                return Err(TiffError::StripSizeMismatch {
                    strip: i,
                    expected,
                    actual: predicted.len(),
                });
            }

            let raw = predictor::inverse(
                &predicted,
                layout.width as usize,
                layout.channels as usize,
            )?;
            bytes.extend_from_slice(&raw);
            debug!(strip = i, compressed = byte_count, bytes = expected, "decoded strip");
        }

        FloatImage::from_le_bytes(layout.width, layout.height, layout.channels, &bytes)
    }
}

fn single_u16(ifd: &Ifd, tag: u16, name: &'static str) -> Result<u16> {
    ifd.get_value(tag)
        .ok_or(TiffError::MissingTag(name))?
        .as_u16()
        .ok_or_else(|| TiffError::InvalidDirectory(format!("{name} must be a single short")))
}

fn single_u32(ifd: &Ifd, tag: u16, name: &'static str) -> Result<u32> {
    ifd.get_value(tag)
        .ok_or(TiffError::MissingTag(name))?
        .as_u32()
        .ok_or_else(|| TiffError::InvalidDirectory(format!("{name} must be a single value")))
}

fn expect_value(ifd: &Ifd, tag: u16, name: &'static str, expected: u16) -> Result<()> {
    let actual = single_u16(ifd, tag, name)?;
    if actual != expected {
        return Err(TiffError::UnsupportedValue {
            field: name,
            value: actual as u32,
        });
    }
    Ok(())
}

/// Positions must be the rational 0/1.
fn expect_position(ifd: &Ifd, tag: u16, name: &'static str) -> Result<()> {
    let (n, d) = ifd
        .get_value(tag)
        .ok_or(TiffError::MissingTag(name))?
        .as_rational()
        .ok_or_else(|| TiffError::InvalidDirectory(format!("{name} must be a single rational")))?;
    if (n, d) != (0, 1) {
        return Err(TiffError::Unsupported(format!("{name} {n}/{d}")));
    }
    Ok(())
}

/// Per-channel fields must list `expected` once per channel.
fn expect_per_channel(
    ifd: &Ifd,
    tag: u16,
    name: &'static str,
    channels: u16,
    expected: u16,
) -> Result<()> {
    let values = ifd
        .get_value(tag)
        .ok_or(TiffError::MissingTag(name))?
        .as_u16_vec()
        .ok_or_else(|| TiffError::InvalidDirectory(format!("{name} must be shorts")))?;
    if values.len() != channels as usize {
        return Err(TiffError::InvalidDirectory(format!(
            "{name} lists {} channels, SamplesPerPixel says {channels}",
            values.len()
        )));
    }
    if let Some(&v) = values.iter().find(|&&v| v != expected) {
        return Err(TiffError::UnsupportedValue {
            field: name,
            value: v as u32,
        });
    }
    Ok(())
}
