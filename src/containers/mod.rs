pub mod compression;

use compression::DecodeError;

/// A compressed block whose decompressed size is declared up front.
pub trait CompressionContainer {
    fn decompressed_len(&self) -> usize;
    fn decompress(&self) -> Result<Vec<u8>, DecodeError>;
}
