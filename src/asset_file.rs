//! Random access little-endian I/O over one opened asset file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::containers::compression::{lz, rle, DecodeError, LzBlock, RleBlock};
use crate::containers::CompressionContainer;
use crate::error::{AssetError, Result};

/// Where a seek offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Start,
    Current,
}

/// An open asset file with a bounds-checked cursor.
///
/// The OS handle is closed when the value is dropped, so every early
/// return through `?` releases it.
#[derive(Debug)]
pub struct AssetFile {
    file: File,
    path: PathBuf,
    size: u64,
    cursor: u64,
}

impl AssetFile {
    /// Opens `path` for reading, or for truncating write when `write` is set.
    pub fn open<P: AsRef<Path>>(path: P, write: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let opened = if write {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
        } else {
            File::open(&path)
        };
        let file = opened.map_err(|source| AssetError::Open {
            path: path.clone(),
            source,
        })?;

        let size = file
            .metadata()
            .map_err(|source| AssetError::Open {
                path: path.clone(),
                source,
            })?
            .len();

        debug!(path = %path.display(), size, write, "opened asset file");

        Ok(AssetFile {
            file,
            path,
            size,
            cursor: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn tell(&self) -> u64 {
        self.cursor
    }

    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.cursor)
    }

    /// Moves the cursor. The target must lie in `[0, size]`; on failure the
    /// cursor stays where it was.
    pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<()> {
        let base = match origin {
            SeekOrigin::Start => 0,
            SeekOrigin::Current => self.cursor as i64,
        };
        let target = base.checked_add(offset).unwrap_or(-1);

        if target < 0 || target as u64 > self.size {
            return Err(AssetError::SeekOutOfRange {
                target,
                size: self.size,
            });
        }

        self.file
            .seek(SeekFrom::Start(target as u64))
            .map_err(|source| AssetError::Read {
                path: self.path.clone(),
                source,
            })?;
        self.cursor = target as u64;
        Ok(())
    }

    /// Reads exactly `length` bytes.
    pub fn read_block(&mut self, length: usize) -> Result<Vec<u8>> {
        if length as u64 > self.remaining() {
            return Err(AssetError::UnexpectedEof {
                path: self.path.clone(),
                offset: self.cursor,
                requested: length,
                remaining: self.remaining(),
            });
        }

        let mut buffer = vec![0u8; length];
        self.file
            .read_exact(&mut buffer)
            .map_err(|source| AssetError::Read {
                path: self.path.clone(),
                source,
            })?;
        self.cursor += length as u64;
        Ok(buffer)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.read_block(N)?);
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Reads a `u16` count, capped at `max`.
    pub fn read_u16_le_clamped(&mut self, max: u16) -> Result<u16> {
        Ok(self.read_u16_le()?.min(max))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Reads a `u8` length followed by that many bytes of Latin-1 text.
    ///
    /// A zero length means the field holds a DOS 8.3 file name instead:
    /// up to nine bytes ending at the first `.`, then a three byte
    /// extension.
    pub fn read_length_prefixed_string(&mut self) -> Result<String> {
        let length = self.read_u8()? as usize;

        let bytes = if length > 0 {
            self.read_block(length)?
        } else {
            let mut name = Vec::with_capacity(12);
            for _ in 0..9 {
                let byte = self.read_u8()?;
                name.push(byte);
                if byte == b'.' {
                    name.extend_from_slice(&self.read_block(3)?);
                    break;
                }
            }
            name
        };

        let text: String = bytes.iter().map(|&b| b as char).collect();
        Ok(text.trim_end_matches('\0').to_string())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.file
            .write_all(bytes)
            .map_err(|source| AssetError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.cursor += bytes.len() as u64;
        self.size = self.size.max(self.cursor);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_all(&[value])
    }

    pub fn write_u16_le(&mut self, value: u16) -> Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    pub fn write_i32_le(&mut self, value: i32) -> Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    pub fn write_block(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.file.flush().map_err(|source| AssetError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Decodes a framed RLE block (a `u16` byte count, then the stream)
    /// into `length` bytes. The cursor ends just past the block.
    pub fn read_rle(&mut self, length: usize) -> Result<Vec<u8>> {
        let offset = self.cursor;
        let block_len = self.read_u16_le()? as usize;
        let block = RleBlock {
            data: self.read_block(block_len)?,
            decompressed_len: length,
        };

        let (decoded, consumed) = rle::decode_prefix(&block.data, block.decompressed_len())
            .map_err(|source| self.decode_error(offset, source))?;
        if consumed < block_len {
            warn!(
                path = %self.path.display(),
                offset,
                unused = block_len - consumed,
                "RLE block has trailing bytes"
            );
        }

        debug!(offset, block_len, length, "decoded RLE block");
        Ok(decoded)
    }

    /// Steps over a framed RLE block without decoding it.
    pub fn skip_rle(&mut self) -> Result<()> {
        let block_len = self.read_u16_le()?;
        self.seek(block_len as i64, SeekOrigin::Current)
    }

    /// Writes `data` as a framed RLE block.
    pub fn write_rle(&mut self, data: &[u8]) -> Result<()> {
        let encoded = rle::encode(data);
        let block_len = u16::try_from(encoded.len()).map_err(|_| AssetError::Write {
            path: self.path.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("RLE block of {} bytes exceeds u16 length", encoded.len()),
            ),
        })?;
        self.write_u16_le(block_len)?;
        self.write_block(&encoded)
    }

    /// Reads `compressed_length` bytes and LZ-decodes them into `length` bytes.
    pub fn read_lz(&mut self, compressed_length: usize, length: usize) -> Result<Vec<u8>> {
        let offset = self.cursor;
        let block = LzBlock {
            data: self.read_block(compressed_length)?,
            decompressed_len: length,
        };

        let decoded = block
            .decompress()
            .map_err(|source| self.decode_error(offset, source))?;

        debug!(offset, compressed_length, length, "decoded LZ block");
        Ok(decoded)
    }

    /// Writes `data` LZ-encoded without any framing and returns the
    /// compressed size.
    pub fn write_lz(&mut self, data: &[u8]) -> Result<usize> {
        let encoded = lz::encode(data);
        self.write_block(&encoded)?;
        Ok(encoded.len())
    }

    fn decode_error(&self, offset: u64, source: DecodeError) -> AssetError {
        AssetError::Decode {
            path: self.path.clone(),
            offset,
            source,
        }
    }
}
