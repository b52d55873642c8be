use thiserror::Error;

use crate::FourCC;

/// Errors produced while parsing a `DXBC` container or one of its chunks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DxbcError {
    /// The fixed container header is missing or inconsistent.
    #[error("malformed DXBC header: {0}")]
    MalformedHeader(String),

    /// The chunk offset table points outside the container or into the header.
    #[error("malformed DXBC chunk offsets: {0}")]
    MalformedOffsets(String),

    /// A read would have crossed the end of the buffer it was performed on.
    #[error("read of {wanted} bytes at offset {offset} overruns buffer of {len} bytes")]
    BufferOverrun {
        /// Offset of the attempted read, relative to the buffer start.
        offset: usize,
        /// Number of bytes requested.
        wanted: usize,
        /// Length of the buffer.
        len: usize,
    },

    /// A required chunk is not present in the container.
    #[error("DXBC container has no {0} chunk")]
    MissingChunk(FourCC),

    /// The chunk tag does not name a known signature record layout.
    #[error("unsupported signature chunk variant {0}")]
    UnsupportedSignatureVariant(FourCC),

    /// A chunk is structurally valid but carries contents this parser rejects.
    #[error("invalid {fourcc} chunk: {reason}")]
    InvalidChunk {
        /// Tag of the offending chunk.
        fourcc: FourCC,
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl DxbcError {
    pub(crate) fn malformed_header(msg: impl Into<String>) -> Self {
        Self::MalformedHeader(msg.into())
    }

    pub(crate) fn malformed_offsets(msg: impl Into<String>) -> Self {
        Self::MalformedOffsets(msg.into())
    }

    pub(crate) fn invalid_chunk(fourcc: FourCC, reason: impl Into<String>) -> Self {
        Self::InvalidChunk {
            fourcc,
            reason: reason.into(),
        }
    }
}
