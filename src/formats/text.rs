//! Length-prefixed text fields such as level names and file references.

use crate::asset_file::AssetFile;
use crate::error::Result;

pub fn load_string(file: &mut AssetFile) -> Result<String> {
    file.read_length_prefixed_string()
}
