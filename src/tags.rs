//! TIFF tag definitions and the fixed field table.
//!
//! The supported subset is closed: every directory entry must resolve to a
//! tag listed here, and enumerated fields must carry the one value the
//! float/LZW layout uses.

/// Standard TIFF tags
pub mod tag {
    pub const IMAGE_WIDTH: u16 = 0x100;
    pub const IMAGE_LENGTH: u16 = 0x101;
    pub const BITS_PER_SAMPLE: u16 = 0x102;
    pub const COMPRESSION: u16 = 0x103;
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 0x106;
    pub const STRIP_OFFSETS: u16 = 0x111;
    pub const ORIENTATION: u16 = 0x112;
    pub const SAMPLES_PER_PIXEL: u16 = 0x115;
    pub const ROWS_PER_STRIP: u16 = 0x116;
    pub const STRIP_BYTE_COUNTS: u16 = 0x117;
    pub const PLANAR_CONFIGURATION: u16 = 0x11C;
    pub const X_POSITION: u16 = 0x11E;
    pub const Y_POSITION: u16 = 0x11F;
    pub const DATE_TIME: u16 = 0x132;
    pub const PREDICTOR: u16 = 0x13D;
    pub const EXTRA_SAMPLES: u16 = 0x152;
    pub const SAMPLE_FORMAT: u16 = 0x153;
    pub const XMP: u16 = 0x2BC;
}

/// TIFF entry value types
pub mod data_type {
    pub const BYTE: u16 = 1;
    pub const ASCII: u16 = 2;
    pub const SHORT: u16 = 3;
    pub const LONG: u16 = 4;
    pub const RATIONAL: u16 = 5;

    /// Get byte size of a value type, 0 for unsupported types
    pub fn size(type_id: u16) -> usize {
        match type_id {
            BYTE | ASCII => 1,
            SHORT => 2,
            LONG => 4,
            RATIONAL => 8,
            _ => 0,
        }
    }
}

/// Enumerated field values accepted by this codec.
pub mod value {
    /// Compression tag value for LZW
    pub const COMPRESSION_LZW: u16 = 5;
    /// PhotometricInterpretation tag value for RGB
    pub const PHOTOMETRIC_RGB: u16 = 2;
    /// Orientation tag value for row 0 top, column 0 left
    pub const ORIENTATION_TOP_LEFT: u16 = 1;
    /// PlanarConfiguration tag value for interleaved (chunky) samples
    pub const PLANAR_CHUNKY: u16 = 1;
    /// Predictor tag value for floating point horizontal differencing
    pub const PREDICTOR_FLOATING_POINT: u16 = 3;
    /// ExtraSamples tag value marking the fourth channel as alpha
    pub const EXTRA_SAMPLE_ALPHA: u16 = 1;
    /// SampleFormat tag value for IEEE float
    pub const SAMPLE_FORMAT_FLOAT: u16 = 3;
    /// Bits per sample for 32-bit float channels
    pub const BITS_PER_SAMPLE_FLOAT: u16 = 32;
}

/// One row of the fixed field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub tag: u16,
    pub name: &'static str,
    pub required: bool,
}

/// The complete field table, ascending by tag id.
///
/// ExtraSamples is listed as required; the decoder relaxes it for 3-channel
/// images, which have no alpha channel to describe.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec { tag: tag::IMAGE_WIDTH, name: "ImageWidth", required: true },
    FieldSpec { tag: tag::IMAGE_LENGTH, name: "ImageLength", required: true },
    FieldSpec { tag: tag::BITS_PER_SAMPLE, name: "BitsPerSample", required: true },
    FieldSpec { tag: tag::COMPRESSION, name: "Compression", required: true },
    FieldSpec { tag: tag::PHOTOMETRIC_INTERPRETATION, name: "PhotometricInterpretation", required: true },
    FieldSpec { tag: tag::STRIP_OFFSETS, name: "StripOffsets", required: true },
    FieldSpec { tag: tag::ORIENTATION, name: "Orientation", required: true },
    FieldSpec { tag: tag::SAMPLES_PER_PIXEL, name: "SamplesPerPixel", required: true },
    FieldSpec { tag: tag::ROWS_PER_STRIP, name: "RowsPerStrip", required: true },
    FieldSpec { tag: tag::STRIP_BYTE_COUNTS, name: "StripByteCounts", required: true },
    FieldSpec { tag: tag::PLANAR_CONFIGURATION, name: "PlanarConfiguration", required: true },
    FieldSpec { tag: tag::X_POSITION, name: "XPosition", required: true },
    FieldSpec { tag: tag::Y_POSITION, name: "YPosition", required: true },
    FieldSpec { tag: tag::DATE_TIME, name: "DateTime", required: true },
    FieldSpec { tag: tag::PREDICTOR, name: "Predictor", required: true },
    FieldSpec { tag: tag::EXTRA_SAMPLES, name: "ExtraSamples", required: true },
    FieldSpec { tag: tag::SAMPLE_FORMAT, name: "SampleFormat", required: true },
    FieldSpec { tag: tag::XMP, name: "XMP", required: false },
];

/// Look a tag up in the field table.
pub fn field_by_tag(tag: u16) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.tag == tag)
}
