use tracing::debug;

use crate::reader::ByteReader;
use crate::{DxbcError, FourCC};

/// Maximum nesting depth of struct type descriptors.
///
/// Member types are reached through chunk-relative offsets, so a hostile chunk can
/// describe a cycle; decoding stops with an error past this depth.
pub const MAX_TYPE_DEPTH: usize = 16;

const BINDING_RECORD_LEN: usize = 32;
const MIN_TYPE_BUDGET: usize = 64;
const CBUFFER_RECORD_LEN: usize = 24;

/// Decoded resource-definition chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RdefChunk {
    /// Constant buffers in chunk order. Variables are in chunk order as well.
    pub constant_buffers: Vec<ConstantBuffer>,
    /// Bound resources (constant buffers, textures, samplers, UAVs).
    pub bindings: Vec<ResourceBinding>,
    /// Target profile recorded by the compiler.
    pub target: RdefTarget,
    /// Compiler flags (`D3DCOMPILE_*`).
    pub compile_flags: u32,
    /// Compiler identification string, if present.
    pub creator: Option<String>,
}

/// Shader target word of an `RDEF` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RdefTarget {
    /// Program type tag (`0xFFFF` pixel, `0xFFFE` vertex, `"GS"`, `"HS"`, `"DS"`, `"CS"`).
    pub program_type: u16,
    /// Shader model major version.
    pub major: u8,
    /// Shader model minor version.
    pub minor: u8,
}

impl RdefTarget {
    fn from_raw(raw: u32) -> Self {
        Self {
            program_type: (raw >> 16) as u16,
            major: (raw >> 8) as u8,
            minor: raw as u8,
        }
    }
}

/// `D3D_SHADER_INPUT_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ShaderInputType {
    CBuffer,
    TBuffer,
    Texture,
    Sampler,
    UavRwTyped,
    Structured,
    UavRwStructured,
    ByteAddress,
    UavRwByteAddress,
    UavAppendStructured,
    UavConsumeStructured,
    UavRwStructuredWithCounter,
}

impl ShaderInputType {
    /// Maps the raw field value, returning `None` for unknown codes.
    pub fn from_raw(raw: u32) -> Option<Self> {
        use ShaderInputType::*;
        Some(match raw {
            0 => CBuffer,
            1 => TBuffer,
            2 => Texture,
            3 => Sampler,
            4 => UavRwTyped,
            5 => Structured,
            6 => UavRwStructured,
            7 => ByteAddress,
            8 => UavRwByteAddress,
            9 => UavAppendStructured,
            10 => UavConsumeStructured,
            11 => UavRwStructuredWithCounter,
            _ => return None,
        })
    }
}

/// `D3D_CBUFFER_TYPE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CBufferType {
    /// Ordinary scalar constant buffer.
    #[default]
    CBuffer,
    /// Texture buffer.
    TBuffer,
    /// Interface pointer table.
    InterfacePointers,
    /// Binding information for resources.
    ResourceBindInfo,
}

impl CBufferType {
    /// Maps the raw field value, returning `None` for unknown codes.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => CBufferType::CBuffer,
            1 => CBufferType::TBuffer,
            2 => CBufferType::InterfacePointers,
            3 => CBufferType::ResourceBindInfo,
            _ => return None,
        })
    }
}

/// A resource bound to the shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBinding {
    /// HLSL name of the resource.
    pub name: String,
    /// Kind of resource bound.
    pub input_type: ShaderInputType,
    /// Raw `D3D_RESOURCE_RETURN_TYPE`.
    pub return_type: u32,
    /// Raw `D3D_SRV_DIMENSION`.
    pub dimension: u32,
    /// Sample count for multisampled textures, otherwise `u32::MAX` or 0.
    pub sample_count: u32,
    /// First register slot.
    pub bind_point: u32,
    /// Number of consecutive slots (array size).
    pub bind_count: u32,
    /// `D3D_SHADER_INPUT_FLAGS`.
    pub flags: u32,
}

/// A constant buffer and its variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantBuffer {
    /// HLSL name of the buffer.
    pub name: String,
    /// Variables declared in the buffer.
    pub variables: Vec<ShaderVariable>,
    /// Size in bytes.
    pub size: u32,
    /// `D3D_SHADER_CBUFFER_FLAGS`.
    pub flags: u32,
    /// Buffer kind.
    pub ty: CBufferType,
    /// Register of the binding sharing this buffer's name, if any.
    pub bind_point: Option<u32>,
}

/// A variable inside a constant buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderVariable {
    /// HLSL name of the variable.
    pub name: String,
    /// Byte offset within the buffer.
    pub start_offset: u32,
    /// Size in bytes.
    pub size: u32,
    /// `D3D_SHADER_VARIABLE_FLAGS`.
    pub flags: u32,
    /// Type descriptor, when the record references one.
    pub ty: Option<TypeDesc>,
    /// Initial value bytes (`size` bytes), when the compiler recorded one.
    pub default_value: Option<Vec<u8>>,
    /// Texture/sampler slot ranges; only recorded by shader model 5 compilers.
    pub resource_ranges: Option<VariableResourceRanges>,
}

/// Texture and sampler slot ranges of a shader model 5 variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct VariableResourceRanges {
    pub start_texture: u32,
    pub texture_size: u32,
    pub start_sampler: u32,
    pub sampler_size: u32,
}

/// A variable type descriptor (`D3D11_SHADER_TYPE_DESC`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDesc {
    /// Raw `D3D_SHADER_VARIABLE_CLASS` (scalar, vector, matrix, struct, ...).
    pub class: u16,
    /// Raw `D3D_SHADER_VARIABLE_TYPE` (float, int, texture, ...).
    pub ty: u16,
    /// Rows of a matrix, 1 otherwise.
    pub rows: u16,
    /// Columns of a matrix or vector width.
    pub columns: u16,
    /// Array length, or 0 for non-arrays.
    pub elements: u16,
    /// Number of struct members.
    pub member_count: u16,
    /// Chunk-relative offset of the member table, as stored.
    pub member_offset: u32,
    /// Type name; shader model 5 compilers record it for structs.
    pub name: Option<String>,
    /// Decoded member table, `member_count` entries.
    pub members: Vec<StructMember>,
}

/// One member of a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember {
    /// Member name.
    pub name: String,
    /// Byte offset from the start of the struct.
    pub offset: u32,
    /// Member type.
    pub ty: TypeDesc,
}

/// Decodes a resource-definition chunk.
///
/// `shader_major` is the major version from the shader's own version token. When it
/// is 5 or above, variable records carry four extra texture/sampler range words and
/// type descriptors carry a name extension.
pub fn parse_rdef_chunk(data: &[u8], shader_major: u8) -> Result<RdefChunk, DxbcError> {
    let sm5 = shader_major >= 5;
    let base = ByteReader::new(data);
    let mut header = base;
    let cb_count = header.read_u32_le()? as usize;
    let cb_offset = header.read_u32_le()? as usize;
    let binding_count = header.read_u32_le()? as usize;
    let binding_offset = header.read_u32_le()? as usize;
    let target = RdefTarget::from_raw(header.read_u32_le()?);
    let compile_flags = header.read_u32_le()?;
    let creator_offset = header.read_u32_le()? as usize;

    check_table(data.len(), binding_offset, binding_count, BINDING_RECORD_LEN)?;
    check_table(data.len(), cb_offset, cb_count, CBUFFER_RECORD_LEN)?;

    let mut r = base.fork(binding_offset)?;
    let mut bindings = Vec::with_capacity(binding_count);
    for _ in 0..binding_count {
        bindings.push(read_binding(&base, &mut r)?);
    }

    // Member types are shared by offset, so a small chunk can describe a DAG that
    // expands exponentially. Decoded type nodes are capped by the chunk size.
    let mut budget = TypeBudget::for_chunk(data.len());
    let mut r = base.fork(cb_offset)?;
    let mut constant_buffers = Vec::with_capacity(cb_count);
    for _ in 0..cb_count {
        constant_buffers.push(read_constant_buffer(&base, &mut r, sm5, &mut budget)?);
    }

    for cb in &mut constant_buffers {
        cb.bind_point = bindings
            .iter()
            .find(|binding| binding.name == cb.name)
            .map(|binding| binding.bind_point);
        if cb.bind_point.is_none() {
            debug!(name = %cb.name, "constant buffer has no matching resource binding");
        }
    }

    let creator = match creator_offset {
        0 => None,
        offset => Some(base.read_cstring_at(offset)?),
    };

    debug!(
        constant_buffers = constant_buffers.len(),
        bindings = bindings.len(),
        "decoded resource definitions"
    );

    Ok(RdefChunk {
        constant_buffers,
        bindings,
        target,
        compile_flags,
        creator,
    })
}

struct TypeBudget {
    limit: usize,
    remaining: usize,
}

impl TypeBudget {
    fn for_chunk(len: usize) -> Self {
        let limit = len.max(MIN_TYPE_BUDGET);
        Self {
            limit,
            remaining: limit,
        }
    }

    fn take(&mut self) -> Result<(), DxbcError> {
        self.remaining = self.remaining.checked_sub(1).ok_or_else(|| {
            DxbcError::invalid_chunk(
                FourCC::RDEF,
                format!("type descriptors expand past {} nodes", self.limit),
            )
        })?;
        Ok(())
    }
}

fn check_table(len: usize, offset: usize, count: usize, record: usize) -> Result<(), DxbcError> {
    let wanted = count
        .checked_mul(record)
        .ok_or_else(|| DxbcError::invalid_chunk(FourCC::RDEF, "record count overflows"))?;
    if offset
        .checked_add(wanted)
        .map_or(true, |end| end > len)
    {
        return Err(DxbcError::BufferOverrun {
            offset,
            wanted,
            len,
        });
    }
    Ok(())
}

fn read_binding(
    base: &ByteReader<'_>,
    r: &mut ByteReader<'_>,
) -> Result<ResourceBinding, DxbcError> {
    let name_offset = r.read_u32_le()? as usize;
    let raw_type = r.read_u32_le()?;
    let input_type = ShaderInputType::from_raw(raw_type).ok_or_else(|| {
        DxbcError::invalid_chunk(FourCC::RDEF, format!("unknown shader input type {raw_type}"))
    })?;
    Ok(ResourceBinding {
        input_type,
        return_type: r.read_u32_le()?,
        dimension: r.read_u32_le()?,
        sample_count: r.read_u32_le()?,
        bind_point: r.read_u32_le()?,
        bind_count: r.read_u32_le()?,
        flags: r.read_u32_le()?,
        name: base.read_cstring_at(name_offset)?,
    })
}

fn read_constant_buffer(
    base: &ByteReader<'_>,
    r: &mut ByteReader<'_>,
    sm5: bool,
    budget: &mut TypeBudget,
) -> Result<ConstantBuffer, DxbcError> {
    let name_offset = r.read_u32_le()? as usize;
    let var_count = r.read_u32_le()? as usize;
    let var_offset = r.read_u32_le()? as usize;
    let size = r.read_u32_le()?;
    let flags = r.read_u32_le()?;
    let raw_type = r.read_u32_le()?;
    let ty = CBufferType::from_raw(raw_type).ok_or_else(|| {
        DxbcError::invalid_chunk(FourCC::RDEF, format!("unknown constant buffer type {raw_type}"))
    })?;
    let name = base.read_cstring_at(name_offset)?;

    let record_len = if sm5 { 40 } else { 24 };
    check_table(base.len(), var_offset, var_count, record_len)?;
    let mut vr = base.fork(var_offset)?;
    let mut variables = Vec::with_capacity(var_count);
    for _ in 0..var_count {
        variables.push(read_variable(base, &mut vr, sm5, budget)?);
    }

    Ok(ConstantBuffer {
        name,
        variables,
        size,
        flags,
        ty,
        bind_point: None,
    })
}

fn read_variable(
    base: &ByteReader<'_>,
    r: &mut ByteReader<'_>,
    sm5: bool,
    budget: &mut TypeBudget,
) -> Result<ShaderVariable, DxbcError> {
    let name_offset = r.read_u32_le()? as usize;
    let start_offset = r.read_u32_le()?;
    let size = r.read_u32_le()?;
    let flags = r.read_u32_le()?;
    let type_offset = r.read_u32_le()? as usize;
    let default_offset = r.read_u32_le()? as usize;
    let resource_ranges = if sm5 {
        Some(VariableResourceRanges {
            start_texture: r.read_u32_le()?,
            texture_size: r.read_u32_le()?,
            start_sampler: r.read_u32_le()?,
            sampler_size: r.read_u32_le()?,
        })
    } else {
        None
    };

    let ty = match type_offset {
        0 => None,
        offset => Some(read_type(base, offset, sm5, 0, budget)?),
    };
    let default_value = match default_offset {
        0 => None,
        offset => Some(base.fork(offset)?.read_bytes(size as usize)?.to_vec()),
    };

    Ok(ShaderVariable {
        name: base.read_cstring_at(name_offset)?,
        start_offset,
        size,
        flags,
        ty,
        default_value,
        resource_ranges,
    })
}

fn read_type(
    base: &ByteReader<'_>,
    offset: usize,
    sm5: bool,
    depth: usize,
    budget: &mut TypeBudget,
) -> Result<TypeDesc, DxbcError> {
    if depth >= MAX_TYPE_DEPTH {
        return Err(DxbcError::invalid_chunk(
            FourCC::RDEF,
            format!("type descriptors nest deeper than {MAX_TYPE_DEPTH}"),
        ));
    }
    budget.take()?;

    let mut r = base.fork(offset)?;
    let class = r.read_u16_le()?;
    let ty = r.read_u16_le()?;
    let rows = r.read_u16_le()?;
    let columns = r.read_u16_le()?;
    let elements = r.read_u16_le()?;
    let member_count = r.read_u16_le()?;
    let member_offset = r.read_u32_le()?;

    // SM5 extension: parent type offset and three reserved words, then the name.
    let name = if sm5 {
        r.skip(16)?;
        match r.read_u32_le()? as usize {
            0 => None,
            name_offset => Some(base.read_cstring_at(name_offset)?),
        }
    } else {
        None
    };

    let mut members = Vec::new();
    if member_count > 0 {
        let mut mr = base.fork(member_offset as usize)?;
        for _ in 0..member_count {
            let name_offset = mr.read_u32_le()? as usize;
            let type_offset = mr.read_u32_le()? as usize;
            let member_start = mr.read_u32_le()?;
            members.push(StructMember {
                name: base.read_cstring_at(name_offset)?,
                offset: member_start,
                ty: read_type(base, type_offset, sm5, depth + 1, budget)?,
            });
        }
    }

    Ok(TypeDesc {
        class,
        ty,
        rows,
        columns,
        elements,
        member_count,
        member_offset,
        name,
        members,
    })
}
