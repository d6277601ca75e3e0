//! # Pixel Surfaces
//!
//! Width x height buffers of 8-bit palette indices. The transparency key is
//! carried along untouched for whoever draws the surface.

use serde::{Deserialize, Serialize};

use crate::asset_file::AssetFile;
use crate::error::{AssetError, Result};

/// How the pixel block at the cursor is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceEncoding {
    /// `width * height` bytes as is.
    Raw,
    /// A framed RLE block.
    Rle,
    /// An `i32` compressed length followed by that many LZ bytes.
    Lz,
    /// Four interleaved pixel planes, masked when a key is given.
    Planar,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelSurface {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
    pub transparent_key: Option<u8>,
}

impl PixelSurface {
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }
}

/// Reads a `width * height` surface stored with `encoding`.
pub fn load_pixel_surface(
    file: &mut AssetFile,
    width: usize,
    height: usize,
    encoding: SurfaceEncoding,
    transparent_key: Option<u8>,
) -> Result<PixelSurface> {
    let length = width
        .checked_mul(height)
        .ok_or_else(|| AssetError::InvalidHeader {
            path: file.path().to_path_buf(),
            offset: file.tell(),
            reason: format!("surface {}x{} is too large", width, height),
        })?;

    let pixels = match encoding {
        SurfaceEncoding::Raw => file.read_block(length)?,
        SurfaceEncoding::Rle => file.read_rle(length)?,
        SurfaceEncoding::Lz => {
            let offset = file.tell();
            let compressed_length = file.read_i32_le()?;
            let compressed_length =
                usize::try_from(compressed_length).map_err(|_| AssetError::InvalidHeader {
                    path: file.path().to_path_buf(),
                    offset,
                    reason: format!("negative compressed length {}", compressed_length),
                })?;
            file.read_lz(compressed_length, length)?
        }
        SurfaceEncoding::Planar => load_planar_pixels(file, length, transparent_key)?,
    };

    Ok(PixelSurface {
        width,
        height,
        pixels,
        transparent_key,
    })
}

/// Reads `length` pixels stored as four interleaved planes.
///
/// Without a key the planes are plain bytes. With a key, every group of
/// eight pixels is preceded by a mask byte (most significant bit first);
/// only pixels whose mask bit is set are stored, the rest become `key`.
pub fn load_planar_pixels(
    file: &mut AssetFile,
    length: usize,
    key: Option<u8>,
) -> Result<Vec<u8>> {
    let planar = match key {
        None => file.read_block(length)?,
        Some(key) => {
            // One mask byte covers eight pixels
            let reachable = usize::try_from(file.remaining())
                .unwrap_or(usize::MAX)
                .saturating_mul(8);
            let mut pixels = Vec::with_capacity(length.min(reachable));
            let mut mask = 0u8;
            for i in 0..length {
                if i % 8 == 0 {
                    mask = file.read_u8()?;
                }
                if mask & (0x80 >> (i % 8)) != 0 {
                    pixels.push(file.read_u8()?);
                } else {
                    pixels.push(key);
                }
            }
            pixels
        }
    };

    let plane_len = length / 4;
    Ok((0..length)
        .map(|i| planar[(i % 4) * plane_len + i / 4])
        .collect())
}
