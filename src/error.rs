//! Error types for float TIFF reading and writing.

use thiserror::Error;

/// Result type for TIFF operations
pub type Result<T> = std::result::Result<T, TiffError>;

/// TIFF error types
#[derive(Error, Debug)]
pub enum TiffError {
    /// Header magic does not match little-endian TIFF
    #[error("Invalid TIFF header magic")]
    InvalidMagic,

    /// Tag not in the fixed field table
    #[error("Unknown tag {0:#06x}")]
    UnknownTag(u16),

    /// Tag appears more than once in the directory
    #[error("Duplicate tag {0:#06x}")]
    DuplicateTag(u16),

    /// Required field absent from the directory
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Entry value type outside the supported set
    #[error("Invalid data type {type_id} for tag {tag:#06x}")]
    InvalidDataType { tag: u16, type_id: u16 },

    /// Field value outside its acceptable set, but a valid TIFF elsewhere
    #[error("Unsupported value for {field}: {value}")]
    UnsupportedValue { field: &'static str, value: u32 },

    /// Compression other than LZW (5)
    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(u16),

    /// Predictor other than floating point (3)
    #[error("Unsupported predictor: {0}")]
    UnsupportedPredictor(u16),

    /// Valid TIFF outside the supported subset
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Zero or inconsistent image dimensions
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Structural directory problem
    #[error("Invalid directory: {0}")]
    InvalidDirectory(String),

    /// Strip offset/bytecount arrays disagree with the strip count
    #[error("Strip count mismatch: expected {expected}, got {actual}")]
    StripCountMismatch { expected: usize, actual: usize },

    /// Decompressed strip length disagrees with the directory
    #[error("Strip {strip}: expected {expected} bytes, got {actual}")]
    StripSizeMismatch {
        strip: usize,
        expected: usize,
        actual: usize,
    },

    /// Malformed LZW code stream
    #[error("Decode error: {0}")]
    Decode(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
