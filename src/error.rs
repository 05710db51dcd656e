use crate::header::Marker;

/// Error type for different decoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No `data` marker anywhere in the buffer or stream
    #[error("no `data` marker found")]
    NoDataMarker,
    /// One of the four mandatory markers is not where the layout expects it
    #[error("header does not contain `{0}`")]
    MissingMarker(Marker),
    /// A stream read returned a byte count that does not split into whole frames
    #[error("read {read} bytes, which is not a multiple of the block alignment {block_align}")]
    MisalignedRead {
        /// Bytes actually read
        read: usize,
        /// Bytes per frame declared by the header
        block_align: u16,
    },
    /// Input ends before a field or the declared sample payload
    #[error("input truncated: needed {needed} bytes but only {available} are available")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes present
        available: usize,
    },
    /// The header declares a block alignment of zero
    #[error("block alignment is zero")]
    ZeroBlockAlign,
}

/// Error returned by the reader/writer based entry points
#[cfg(feature = "io")]
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum IoError<E> {
    /// Error from the underlying reader or writer
    #[error("stream error: {0:?}")]
    Stream(E),
    /// Error from the decoder
    #[error(transparent)]
    Decode(#[from] Error),
}
