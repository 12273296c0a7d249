//! Float TIFF codec.
//!
//! Reads and writes a constrained TIFF variant: 3- or 4-channel images of
//! 32-bit IEEE-754 float samples, stored as LZW-compressed strips with the
//! floating-point horizontal predictor (predictor 3). Anything outside that
//! subset is rejected rather than guessed at.
//!
//! # Example
//!
//! ```no_run
//! use float_tiff::{FloatImage, TiffDecoder, TiffEncoder};
//!
//! # fn main() -> float_tiff::Result<()> {
//! let image = FloatImage::new(640, 480, 4)?;
//! let bytes = TiffEncoder::new().encode(&image)?;
//!
//! let decoded = TiffDecoder::new().decode(&bytes)?;
//! assert_eq!(decoded.width, 640);
//! # Ok(())
//! # }
//! ```

pub mod bitstream;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod ifd;
pub mod lzw;
pub mod predictor;
pub mod tags;
pub mod types;

pub use decoder::TiffDecoder;
pub use encoder::{TiffEncoder, DEFAULT_ROWS_PER_STRIP};
pub use error::{Result, TiffError};
pub use ifd::{Ifd, IfdEntry, IfdValue};
pub use types::FloatImage;

/// TIFF header magic - little endian "II" plus version 42
pub const TIFF_MAGIC: [u8; 4] = [0x49, 0x49, 0x2A, 0x00];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic() {
        assert_eq!(&TIFF_MAGIC[..2], b"II");
        assert_eq!(u16::from_le_bytes([TIFF_MAGIC[2], TIFF_MAGIC[3]]), 42);
    }
}
