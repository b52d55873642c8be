//! Bounds-checked parsing of DirectX shader bytecode containers (`DXBC`).
//!
//! Shader blobs are treated as untrusted input: every offset and size read from
//! the container is validated before use, and malformed data is reported as a
//! [`DxbcError`] rather than a panic.
//!
//! Besides the container itself, this crate decodes the reflection chunks a
//! shader translator needs:
//!
//! - signature chunks (`ISGN`/`ISG1`, `OSGN`/`OSG5`/`OSG1`, `PCSG`/`PSG1`), which map
//!   semantics to registers;
//! - the resource-definition chunk (`RDEF`), which lists constant buffers with their
//!   variables and the bound textures/samplers/UAVs.
//!
//! All names and payloads are copied out of the source buffer, so parsed chunks do
//! not borrow from it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod container;
mod error;
mod fourcc;
/// Parser for resource definition chunks (`RDEF`).
pub mod rdef;
mod reader;
/// Parsers for signature chunks (`ISGN`, `OSGN`, `PCSG`, ...).
pub mod signature;

/// Helpers for building synthetic DXBC blobs in tests.
///
/// Only available when compiling this crate's own tests, or when the `test-utils`
/// feature is enabled. Not part of the stable parsing API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::container::{DxbcChunk, DxbcFile, DxbcHeader, MAX_DXBC_CHUNK_COUNT};
pub use crate::error::DxbcError;
pub use crate::fourcc::FourCC;
pub use crate::rdef::{
    parse_rdef_chunk, CBufferType, ConstantBuffer, RdefChunk, RdefTarget, ResourceBinding,
    ShaderInputType, ShaderVariable, StructMember, TypeDesc, VariableResourceRanges,
    MAX_TYPE_DEPTH,
};
pub use crate::reader::ByteReader;
pub use crate::signature::{
    parse_signature_chunk, SignatureChunk, SignatureKind, SignatureLayout, SignatureParameter,
};
