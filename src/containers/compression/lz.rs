//! Dictionary coding with back-references into already decoded output.
//!
//! Each control byte selects the kind of the next eight tokens, least
//! significant bit first. A set bit is a literal byte. A clear bit is a
//! two byte back-reference `b0 b1` where the distance is
//! `(b0 | (b1 & 0xF0) << 4) + 1` and the length is `(b1 & 0x0F) + 3`.
//! Copies may overlap the bytes they produce.

use super::{truncated, DecodeError};
use crate::containers::CompressionContainer;

pub const MIN_MATCH: usize = 3;
pub const MAX_MATCH: usize = 18;
pub const WINDOW_SIZE: usize = 4096;

/// An LZ stream with both of its declared sizes.
#[derive(Debug)]
pub struct LzBlock {
    pub data: Vec<u8>,
    pub decompressed_len: usize,
}

impl CompressionContainer for LzBlock {
    fn decompressed_len(&self) -> usize {
        self.decompressed_len
    }

    fn decompress(&self) -> Result<Vec<u8>, DecodeError> {
        decode(&self.data, self.data.len(), self.decompressed_len)
    }
}

/// Decodes `output_length` bytes using at most the first
/// `compressed_length` bytes of `source`.
pub fn decode(
    source: &[u8],
    compressed_length: usize,
    output_length: usize,
) -> Result<Vec<u8>, DecodeError> {
    let source = source
        .get(..compressed_length)
        .ok_or_else(|| truncated(compressed_length, source.len()))?;

    // A two byte token yields at most MAX_MATCH bytes
    let reachable = source.len().saturating_mul(MAX_MATCH);
    let mut output = Vec::with_capacity(output_length.min(reachable));
    let mut pos = 0;

    while output.len() < output_length {
        let control = *source.get(pos).ok_or_else(|| truncated(pos + 1, source.len()))?;
        pos += 1;

        for bit in 0..8 {
            if output.len() == output_length {
                break;
            }

            if control & (1 << bit) != 0 {
                let literal = *source.get(pos).ok_or_else(|| truncated(pos + 1, source.len()))?;
                pos += 1;
                output.push(literal);
                continue;
            }

            let token = source
                .get(pos..pos + 2)
                .ok_or_else(|| truncated(pos + 2, source.len()))?;
            pos += 2;

            let distance = (token[0] as usize | (((token[1] & 0xF0) as usize) << 4)) + 1;
            let length = (token[1] & 0x0F) as usize + MIN_MATCH;

            if distance > output.len() {
                return Err(DecodeError::InvalidBackReference {
                    distance,
                    produced: output.len(),
                });
            }
            if output.len() + length > output_length {
                return Err(DecodeError::Overrun {
                    produced: output.len(),
                    run: length,
                    limit: output_length,
                });
            }

            let start = output.len() - distance;
            for i in 0..length {
                let byte = output[start + i];
                output.push(byte);
            }
        }
    }

    Ok(output)
}

/// Greedy encoder producing streams [`decode`] accepts.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(data.len() + data.len() / 8 + 1);
    let mut pos = 0;

    while pos < data.len() {
        let control_index = encoded.len();
        encoded.push(0);
        let mut control = 0u8;

        for bit in 0..8 {
            if pos >= data.len() {
                break;
            }

            match longest_match(data, pos) {
                Some((distance, length)) => {
                    let stored = distance - 1;
                    encoded.push((stored & 0xFF) as u8);
                    encoded.push(((stored >> 4) & 0xF0) as u8 | (length - MIN_MATCH) as u8);
                    pos += length;
                }
                None => {
                    control |= 1 << bit;
                    encoded.push(data[pos]);
                    pos += 1;
                }
            }
        }

        encoded[control_index] = control;
    }

    encoded
}

fn longest_match(data: &[u8], pos: usize) -> Option<(usize, usize)> {
    let max_len = MAX_MATCH.min(data.len() - pos);
    if max_len < MIN_MATCH {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    let mut best_len = MIN_MATCH - 1;

    for start in pos.saturating_sub(WINDOW_SIZE)..pos {
        let len = (0..max_len)
            .take_while(|&i| data[start + i] == data[pos + i])
            .count();
        if len > best_len {
            best_len = len;
            best = Some((pos - start, len));
            if len == max_len {
                break;
            }
        }
    }

    best
}
