//! # Palette
//!
//! 256 RGB triples mapping an indexed pixel byte to a colour. Components are
//! stored exactly as the file holds them, which for the legacy data is
//! 6-bit VGA DAC values.

use serde::Serialize;

use crate::asset_file::AssetFile;
use crate::error::Result;

pub const PALETTE_COLOURS: usize = 256;
pub const PALETTE_BYTES: usize = PALETTE_COLOURS * 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Widens 6-bit VGA components to 8 bits, replicating the top bits
    /// into the low ones so 0x3F maps to 0xFF.
    pub fn expand_vga(self) -> Rgb {
        let widen = |c: u8| (c << 2) | (c >> 4);
        Rgb {
            r: widen(self.r & 0x3F),
            g: widen(self.g & 0x3F),
            b: widen(self.b & 0x3F),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub colours: [Rgb; PALETTE_COLOURS],
}

impl Palette {
    pub fn from_bytes(data: &[u8; PALETTE_BYTES]) -> Self {
        let mut colours = [Rgb::default(); PALETTE_COLOURS];
        for (colour, chunk) in colours.iter_mut().zip(data.chunks_exact(3)) {
            *colour = Rgb {
                r: chunk[0],
                g: chunk[1],
                b: chunk[2],
            };
        }
        Palette { colours }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.colours.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
    }

    /// The palette with every colour passed through [`Rgb::expand_vga`].
    pub fn to_rgb8(&self) -> Palette {
        Palette {
            colours: self.colours.map(Rgb::expand_vga),
        }
    }
}

/// Reads a palette at the cursor, either 768 raw bytes or a framed RLE
/// block that expands to 768 bytes.
pub fn load_palette(file: &mut AssetFile, rle: bool) -> Result<Palette> {
    let data = if rle {
        file.read_rle(PALETTE_BYTES)?
    } else {
        file.read_block(PALETTE_BYTES)?
    };

    let mut raw = [0u8; PALETTE_BYTES];
    raw.copy_from_slice(&data);
    Ok(Palette::from_bytes(&raw))
}

/// Writes a palette in either of the forms [`load_palette`] reads.
pub fn write_palette(file: &mut AssetFile, palette: &Palette, rle: bool) -> Result<()> {
    let data = palette.to_bytes();
    if rle {
        file.write_rle(&data)
    } else {
        file.write_block(&data)
    }
}
