pub mod lz;
pub mod rle;

pub use lz::LzBlock;
pub use rle::RleBlock;

/// Codec failures. Both decoders stop at the first one and never write
/// past the declared output size.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("stream truncated: needed {needed} bytes, {available} available")]
    TruncatedStream { needed: usize, available: usize },

    #[error("run of {run} bytes at output {produced} overruns limit {limit}")]
    Overrun {
        produced: usize,
        run: usize,
        limit: usize,
    },

    #[error("back-reference distance {distance} exceeds {produced} decoded bytes")]
    InvalidBackReference { distance: usize, produced: usize },
}

fn truncated(needed: usize, available: usize) -> DecodeError {
    DecodeError::TruncatedStream { needed, available }
}
