use tracing::debug;

use crate::reader::ByteReader;
use crate::{DxbcError, FourCC};

/// Which shader interface a signature chunk describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    /// `ISGN` / `ISG1`.
    Input,
    /// `OSGN` / `OSG5` / `OSG1`.
    Output,
    /// `PCSG` / `PSG1`.
    PatchConstant,
}

/// Per-element record layout of a signature chunk.
///
/// The layout is a pure function of the chunk tag; see [`SignatureLayout::for_fourcc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureLayout {
    /// 24-byte records (`ISGN`, `OSGN`, `PCSG`).
    Basic,
    /// 28-byte records prefixed with a stream index (`OSG5`).
    Stream,
    /// 32-byte records with a stream index prefix and a trailing minimum-precision
    /// word (`ISG1`, `OSG1`, `PSG1`).
    MinPrecision,
}

impl SignatureLayout {
    /// Resolves the interface kind and record layout of a signature chunk tag.
    pub fn for_fourcc(fourcc: FourCC) -> Result<(SignatureKind, SignatureLayout), DxbcError> {
        use SignatureKind::*;
        use SignatureLayout::*;

        Ok(match &fourcc.0 {
            b"ISGN" => (Input, Basic),
            b"ISG1" => (Input, MinPrecision),
            b"OSGN" => (Output, Basic),
            b"OSG5" => (Output, Stream),
            b"OSG1" => (Output, MinPrecision),
            b"PCSG" => (PatchConstant, Basic),
            b"PSG1" => (PatchConstant, MinPrecision),
            _ => return Err(DxbcError::UnsupportedSignatureVariant(fourcc)),
        })
    }

    /// Size of one element record in bytes.
    pub const fn record_size(self) -> usize {
        match self {
            SignatureLayout::Basic => 24,
            SignatureLayout::Stream => 28,
            SignatureLayout::MinPrecision => 32,
        }
    }
}

/// One element of a signature chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParameter {
    /// Semantic name, e.g. `TEXCOORD` or `SV_Position`.
    pub semantic_name: String,
    /// Semantic index, e.g. 1 for `TEXCOORD1`.
    pub semantic_index: u32,
    /// Raw `D3D_NAME` system-value code (0 for plain semantics).
    pub system_value_type: u32,
    /// Raw `D3D_REGISTER_COMPONENT_TYPE` (1 = uint, 2 = sint, 3 = float).
    pub component_type: u32,
    /// Register the element is bound to.
    pub register: u32,
    /// Components present in the register.
    pub mask: u8,
    /// Components read (inputs) or never written (outputs).
    pub read_write_mask: u8,
    /// Geometry-shader output stream; 0 for layouts without a stream field.
    pub stream: u32,
    /// Present only for [`SignatureLayout::MinPrecision`] chunks.
    pub min_precision: Option<u32>,
}

/// A decoded signature chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureChunk {
    /// Interface the chunk describes.
    pub kind: SignatureKind,
    /// Record layout selected from the chunk tag.
    pub layout: SignatureLayout,
    /// Elements in chunk order.
    pub parameters: Vec<SignatureParameter>,
}

/// Decodes a signature chunk whose tag is `fourcc`.
///
/// `data` is the chunk payload. Its first two words are the element count and the
/// chunk-relative offset of the element table; semantic names are chunk-relative
/// offsets into a trailing string table.
pub fn parse_signature_chunk(fourcc: FourCC, data: &[u8]) -> Result<SignatureChunk, DxbcError> {
    let (kind, layout) = SignatureLayout::for_fourcc(fourcc)?;

    let base = ByteReader::new(data);
    let mut header = base;
    let param_count = header.read_u32_le()? as usize;
    let param_offset = header.read_u32_le()? as usize;

    let table_len = param_count
        .checked_mul(layout.record_size())
        .ok_or_else(|| DxbcError::invalid_chunk(fourcc, "parameter count overflows"))?;
    if param_offset
        .checked_add(table_len)
        .map_or(true, |end| end > data.len())
    {
        return Err(DxbcError::BufferOverrun {
            offset: param_offset,
            wanted: table_len,
            len: data.len(),
        });
    }

    let mut r = base.fork(param_offset)?;
    let mut parameters = Vec::with_capacity(param_count);
    for _ in 0..param_count {
        parameters.push(read_parameter(&base, &mut r, layout)?);
    }

    debug!(%fourcc, count = parameters.len(), "decoded signature chunk");
    Ok(SignatureChunk {
        kind,
        layout,
        parameters,
    })
}

fn read_parameter(
    base: &ByteReader<'_>,
    r: &mut ByteReader<'_>,
    layout: SignatureLayout,
) -> Result<SignatureParameter, DxbcError> {
    let stream = match layout {
        SignatureLayout::Basic => 0,
        SignatureLayout::Stream | SignatureLayout::MinPrecision => r.read_u32_le()?,
    };
    let name_offset = r.read_u32_le()? as usize;
    let semantic_index = r.read_u32_le()?;
    let system_value_type = r.read_u32_le()?;
    let component_type = r.read_u32_le()?;
    let register = r.read_u32_le()?;
    let mask = r.read_u8()?;
    let read_write_mask = r.read_u8()?;
    r.skip(2)?;
    let min_precision = match layout {
        SignatureLayout::MinPrecision => Some(r.read_u32_le()?),
        SignatureLayout::Basic | SignatureLayout::Stream => None,
    };

    Ok(SignatureParameter {
        semantic_name: base.read_cstring_at(name_offset)?,
        semantic_index,
        system_value_type,
        component_type,
        register,
        mask,
        read_write_mask,
        stream,
        min_precision,
    })
}
