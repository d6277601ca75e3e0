//! Loading of legacy game asset containers from a directory search path.
//!
//! [`SearchPath`] locates a named file, [`AssetFile`] reads it with
//! bounds-checked little-endian primitives, and the [`formats`] loaders turn
//! blocks (raw, run-length or LZ coded) into palettes, pixel surfaces and
//! strings for a presentation layer to consume.

pub mod asset_file;
pub mod config;
pub mod containers;
pub mod error;
pub mod formats;
pub mod search_path;

pub use asset_file::{AssetFile, SeekOrigin};
pub use config::LoaderConfig;
pub use error::{AssetError, Result};
pub use search_path::SearchPath;
