//! Readers for whole asset shapes, built from [`AssetFile`](crate::asset_file::AssetFile)
//! primitives and the two codecs. None of them keep state between calls.

pub mod palette;
pub mod surface;
pub mod text;

pub use palette::{load_palette, Palette, Rgb};
pub use surface::{load_pixel_surface, PixelSurface, SurfaceEncoding};
pub use text::load_string;
