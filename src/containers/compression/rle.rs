//! Run-length coding used by palette and surface blocks.
//!
//! The stream is a sequence of control bytes. A control byte `c` with the
//! high bit clear repeats the following byte `c` times. With the high bit
//! set, the next `c & 0x7F` bytes are copied as is. Decoding stops as soon
//! as the requested number of output bytes exists, so anything after that
//! point in the source is left unread.

use super::{truncated, DecodeError};
use crate::containers::CompressionContainer;

const LITERAL_FLAG: u8 = 0x80;
const COUNT_MASK: u8 = 0x7F;

/// Longest run a single control byte can describe.
pub const MAX_RUN: usize = 127;

// Shorter repeats cost as much as the literals they replace
const MIN_REPEAT: usize = 3;

/// An RLE stream together with the size it expands to.
#[derive(Debug)]
pub struct RleBlock {
    pub data: Vec<u8>,
    pub decompressed_len: usize,
}

impl CompressionContainer for RleBlock {
    fn decompressed_len(&self) -> usize {
        self.decompressed_len
    }

    fn decompress(&self) -> Result<Vec<u8>, DecodeError> {
        decode(&self.data, self.decompressed_len)
    }
}

/// Decodes exactly `output_length` bytes from `source`.
pub fn decode(source: &[u8], output_length: usize) -> Result<Vec<u8>, DecodeError> {
    decode_prefix(source, output_length).map(|(data, _)| data)
}

/// Like [`decode`], also returning how many source bytes were consumed.
pub fn decode_prefix(
    source: &[u8],
    output_length: usize,
) -> Result<(Vec<u8>, usize), DecodeError> {
    // Each control pair yields at most MAX_RUN bytes
    let reachable = source.len().saturating_mul(MAX_RUN);
    let mut output = Vec::with_capacity(output_length.min(reachable));
    let consumed = walk(source, output_length, Some(&mut output))?;
    Ok((output, consumed))
}

/// Walks the stream for `output_length` bytes without producing them and
/// returns the number of source bytes consumed.
pub fn skip(source: &[u8], output_length: usize) -> Result<usize, DecodeError> {
    walk(source, output_length, None)
}

fn walk(
    source: &[u8],
    output_length: usize,
    mut output: Option<&mut Vec<u8>>,
) -> Result<usize, DecodeError> {
    let mut pos = 0;
    let mut produced = 0;

    while produced < output_length {
        let control = *source.get(pos).ok_or_else(|| truncated(pos + 1, source.len()))?;
        pos += 1;

        let count = (control & COUNT_MASK) as usize;
        if produced + count > output_length {
            return Err(DecodeError::Overrun {
                produced,
                run: count,
                limit: output_length,
            });
        }

        if control & LITERAL_FLAG == 0 {
            let value = *source.get(pos).ok_or_else(|| truncated(pos + 1, source.len()))?;
            pos += 1;
            if let Some(out) = output.as_deref_mut() {
                out.resize(out.len() + count, value);
            }
        } else {
            let literals = source
                .get(pos..pos + count)
                .ok_or_else(|| truncated(pos + count, source.len()))?;
            pos += count;
            if let Some(out) = output.as_deref_mut() {
                out.extend_from_slice(literals);
            }
        }

        produced += count;
    }

    Ok(pos)
}

/// Encodes `data` so that `decode(&encode(data), data.len())` returns it.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(data.len() + data.len() / MAX_RUN + 1);
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < data.len() {
        let run = repeat_length(data, pos);
        if run >= MIN_REPEAT {
            push_literals(&mut encoded, &data[literal_start..pos]);
            encoded.push(run as u8);
            encoded.push(data[pos]);
            pos += run;
            literal_start = pos;
        } else {
            pos += 1;
        }
    }

    push_literals(&mut encoded, &data[literal_start..]);
    encoded
}

fn repeat_length(data: &[u8], pos: usize) -> usize {
    let value = data[pos];
    data[pos..]
        .iter()
        .take(MAX_RUN)
        .take_while(|&&b| b == value)
        .count()
}

fn push_literals(encoded: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_RUN) {
        encoded.push(LITERAL_FLAG | chunk.len() as u8);
        encoded.extend_from_slice(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn decodes_repeats_and_literal_runs() {
        let stream = [
            0x03, 0xAA, // AA AA AA
            0x82, 0x01, 0x02, // 01 02
            0x01, 0x07, // 07
        ];

        let decoded = decode(&stream, 6).unwrap();
        assert_eq!(decoded, vec![0xAA, 0xAA, 0xAA, 0x01, 0x02, 0x07]);
    }

    #[test]
    fn zero_counts_produce_nothing() {
        let stream = [0x00, 0xFF, 0x80, 0x02, 0x05];
        assert_eq!(decode(&stream, 2).unwrap(), vec![0x05, 0x05]);
    }

    #[test]
    fn stops_once_output_is_full() {
        let stream = [0x02, 0x10, 0xDE, 0xAD];
        let (decoded, consumed) = decode_prefix(&stream, 2).unwrap();
        assert_eq!(decoded, vec![0x10, 0x10]);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn empty_output_consumes_nothing() {
        assert_eq!(decode_prefix(&[], 0).unwrap(), (Vec::new(), 0));
        assert_eq!(skip(&[0x05, 0x01], 0).unwrap(), 0);
    }

    #[test]
    fn rejects_run_past_output_length() {
        let stream = [0x02, 0x00, 0x05, 0x01];
        assert_eq!(
            decode(&stream, 4),
            Err(DecodeError::Overrun {
                produced: 2,
                run: 5,
                limit: 4
            })
        );

        let literal_overrun = [0x84, 1, 2, 3, 4];
        assert!(matches!(
            decode(&literal_overrun, 3),
            Err(DecodeError::Overrun { run: 4, .. })
        ));
    }

    #[test]
    fn reports_truncated_source() {
        assert_eq!(
            decode(&[0x04], 4),
            Err(DecodeError::TruncatedStream {
                needed: 2,
                available: 1
            })
        );
        assert!(matches!(
            decode(&[0x83, 0x01], 3),
            Err(DecodeError::TruncatedStream { .. })
        ));
        assert!(matches!(
            decode(&[0x02, 0x09], 5),
            Err(DecodeError::TruncatedStream { .. })
        ));
    }

    #[test]
    fn huge_output_length_is_a_typed_error() {
        assert!(matches!(
            decode(&[], usize::MAX),
            Err(DecodeError::TruncatedStream { .. })
        ));
        assert!(matches!(
            decode(&[0x7F, 0x01, 0x85], usize::MAX),
            Err(DecodeError::TruncatedStream { .. })
        ));
        assert!(matches!(
            skip(&[0x10, 0x00], usize::MAX),
            Err(DecodeError::TruncatedStream { .. })
        ));
    }

    #[test]
    fn round_trips_edge_shapes() {
        let mut alternating = Vec::new();
        for i in 0..300u32 {
            alternating.push((i % 2) as u8);
        }

        let cases: Vec<Vec<u8>> = vec![
            Vec::new(),
            vec![0x42],
            vec![0x42; MAX_RUN],
            vec![0x42; MAX_RUN + 1],
            vec![0x42; 1000],
            (0..=255u8).collect(),
            alternating,
            [vec![1, 1], vec![2; 3], vec![3], vec![4; 127], vec![5, 6]].concat(),
        ];

        for case in cases {
            let encoded = encode(&case);
            assert_eq!(decode(&encoded, case.len()).unwrap(), case);
        }
    }

    #[test]
    fn round_trips_random_data() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for _ in 0..200 {
            let len = rng.gen_range(0..2048);
            // Narrow alphabet so both repeat and literal runs show up
            let data: Vec<u8> = (0..len).map(|_| rng.gen_range(0..4u8)).collect();
            let encoded = encode(&data);
            let (decoded, consumed) = decode_prefix(&encoded, data.len()).unwrap();
            assert_eq!(decoded, data);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn skip_consumes_what_decode_consumes() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let len = rng.gen_range(0..512);
            let data: Vec<u8> = (0..len).map(|_| rng.gen_range(0..3u8)).collect();
            let mut stream = encode(&data);
            stream.extend_from_slice(&[0x05, 0xEE, 0x81, 0x00]);

            let (_, consumed) = decode_prefix(&stream, data.len()).unwrap();
            assert_eq!(skip(&stream, data.len()).unwrap(), consumed);
        }
    }

    #[test]
    fn block_decompresses_to_declared_length() {
        let block = RleBlock {
            data: encode(&[9, 9, 9, 9, 1]),
            decompressed_len: 5,
        };
        assert_eq!(block.decompressed_len(), 5);
        assert_eq!(block.decompress().unwrap(), vec![9, 9, 9, 9, 1]);
    }
}
