use crate::{FourCC, SignatureLayout};

/// Builds a `DXBC` container holding `chunks` in the given order.
///
/// The checksum is left zeroed; the parser does not verify it.
pub fn build_container(chunks: &[(FourCC, &[u8])]) -> Vec<u8> {
    let header_len = 4 + 16 + 4 + 4 + 4 + 4 * chunks.len();
    let mut offsets = Vec::with_capacity(chunks.len());
    let mut next = header_len;
    for (_, data) in chunks {
        offsets.push(next as u32);
        next += 8 + data.len();
    }

    let mut out = Vec::with_capacity(next);
    out.extend_from_slice(&FourCC::DXBC.0);
    out.extend_from_slice(&[0u8; 16]);
    push_u32(&mut out, 1);
    push_u32(&mut out, next as u32);
    push_u32(&mut out, chunks.len() as u32);
    for offset in offsets {
        push_u32(&mut out, offset);
    }
    for (fourcc, data) in chunks {
        out.extend_from_slice(&fourcc.0);
        push_u32(&mut out, data.len() as u32);
        out.extend_from_slice(data);
    }
    out
}

/// Serializes SM4/SM5 tokens as a little-endian byte payload.
pub fn tokens_to_bytes(tokens: &[u32]) -> Vec<u8> {
    tokens.iter().flat_map(|t| t.to_le_bytes()).collect()
}

/// One element of a synthetic signature chunk.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct SignatureParamDesc<'a> {
    pub semantic_name: &'a str,
    pub semantic_index: u32,
    pub system_value_type: u32,
    pub component_type: u32,
    pub register: u32,
    pub mask: u8,
    pub read_write_mask: u8,
    pub stream: u32,
    pub min_precision: u32,
}

impl<'a> SignatureParamDesc<'a> {
    /// A float4 element on `register` with all components used.
    pub fn float4(semantic_name: &'a str, register: u32) -> Self {
        Self {
            semantic_name,
            semantic_index: 0,
            system_value_type: 0,
            component_type: 3,
            register,
            mask: 0xF,
            read_write_mask: 0xF,
            stream: 0,
            min_precision: 0,
        }
    }
}

/// Builds a signature chunk payload using `layout` for every record.
pub fn build_signature_chunk(layout: SignatureLayout, params: &[SignatureParamDesc<'_>]) -> Vec<u8> {
    let table_at = 8;
    let strings_at = table_at + layout.record_size() * params.len();

    let mut strings = Vec::new();
    let mut out = Vec::with_capacity(strings_at);
    push_u32(&mut out, params.len() as u32);
    push_u32(&mut out, table_at as u32);
    for p in params {
        let name_offset = (strings_at + strings.len()) as u32;
        strings.extend_from_slice(p.semantic_name.as_bytes());
        strings.push(0);

        if layout != SignatureLayout::Basic {
            push_u32(&mut out, p.stream);
        }
        push_u32(&mut out, name_offset);
        push_u32(&mut out, p.semantic_index);
        push_u32(&mut out, p.system_value_type);
        push_u32(&mut out, p.component_type);
        push_u32(&mut out, p.register);
        out.extend_from_slice(&[p.mask, p.read_write_mask, 0, 0]);
        if layout == SignatureLayout::MinPrecision {
            push_u32(&mut out, p.min_precision);
        }
    }
    out.extend_from_slice(&strings);
    out
}

/// Contents of a synthetic `RDEF` chunk.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct RdefDesc<'a> {
    /// Selects the shader model 5 record layouts when 5 or above.
    pub shader_major: u8,
    pub target: u32,
    pub compile_flags: u32,
    pub creator: Option<&'a str>,
    pub bindings: Vec<BindingDesc<'a>>,
    pub constant_buffers: Vec<CBufferDesc<'a>>,
}

/// A resource binding record.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct BindingDesc<'a> {
    pub name: &'a str,
    pub input_type: u32,
    pub return_type: u32,
    pub dimension: u32,
    pub sample_count: u32,
    pub bind_point: u32,
    pub bind_count: u32,
    pub flags: u32,
}

/// A constant buffer record with its variables.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct CBufferDesc<'a> {
    pub name: &'a str,
    pub ty: u32,
    pub size: u32,
    pub flags: u32,
    pub variables: Vec<VariableDesc<'a>>,
}

/// A constant buffer variable record.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct VariableDesc<'a> {
    pub name: &'a str,
    pub start_offset: u32,
    pub size: u32,
    pub flags: u32,
    pub ty: Option<RdefTypeDesc<'a>>,
    pub default_value: Option<Vec<u8>>,
}

/// A type descriptor; members are `(name, offset, type)`.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct RdefTypeDesc<'a> {
    pub class: u16,
    pub ty: u16,
    pub rows: u16,
    pub columns: u16,
    pub elements: u16,
    pub name: Option<&'a str>,
    pub members: Vec<(&'a str, u32, RdefTypeDesc<'a>)>,
}

/// Builds an `RDEF` chunk payload.
///
/// Fixed-size tables (header, bindings, buffers, variables) come first; type
/// descriptors, default values and strings follow in a trailing heap.
pub fn build_rdef_chunk(desc: &RdefDesc<'_>) -> Vec<u8> {
    let sm5 = desc.shader_major >= 5;
    let var_len = if sm5 { 40 } else { 24 };
    let bindings_at = 28;
    let cbs_at = bindings_at + 32 * desc.bindings.len();
    let vars_at = cbs_at + 24 * desc.constant_buffers.len();
    let var_total: usize = desc.constant_buffers.iter().map(|cb| cb.variables.len()).sum();
    let heap_at = vars_at + var_len * var_total;

    let mut heap = Heap {
        base: heap_at,
        bytes: Vec::new(),
    };
    let mut out = Vec::with_capacity(heap_at);

    let creator = desc.creator.map_or(0, |c| heap.push_str(c));
    push_u32(&mut out, desc.constant_buffers.len() as u32);
    push_u32(&mut out, cbs_at as u32);
    push_u32(&mut out, desc.bindings.len() as u32);
    push_u32(&mut out, bindings_at as u32);
    push_u32(&mut out, desc.target);
    push_u32(&mut out, desc.compile_flags);
    push_u32(&mut out, creator);

    for b in &desc.bindings {
        push_u32(&mut out, heap.push_str(b.name));
        for v in [
            b.input_type,
            b.return_type,
            b.dimension,
            b.sample_count,
            b.bind_point,
            b.bind_count,
            b.flags,
        ] {
            push_u32(&mut out, v);
        }
    }

    let mut var_index = 0usize;
    for cb in &desc.constant_buffers {
        push_u32(&mut out, heap.push_str(cb.name));
        push_u32(&mut out, cb.variables.len() as u32);
        push_u32(&mut out, (vars_at + var_len * var_index) as u32);
        push_u32(&mut out, cb.size);
        push_u32(&mut out, cb.flags);
        push_u32(&mut out, cb.ty);
        var_index += cb.variables.len();
    }

    for var in desc.constant_buffers.iter().flat_map(|cb| &cb.variables) {
        push_u32(&mut out, heap.push_str(var.name));
        push_u32(&mut out, var.start_offset);
        push_u32(&mut out, var.size);
        push_u32(&mut out, var.flags);
        let ty = var.ty.as_ref().map_or(0, |t| heap.push_type(t, sm5));
        push_u32(&mut out, ty);
        let default = var.default_value.as_deref().map_or(0, |d| heap.push_bytes(d));
        push_u32(&mut out, default);
        if sm5 {
            for v in [u32::MAX, 0, u32::MAX, 0] {
                push_u32(&mut out, v);
            }
        }
    }

    assert_eq!(out.len(), heap_at, "RDEF fixed tables miscounted");
    out.extend_from_slice(&heap.bytes);
    out
}

struct Heap {
    base: usize,
    bytes: Vec<u8>,
}

impl Heap {
    fn offset(&self) -> u32 {
        (self.base + self.bytes.len()) as u32
    }

    fn push_bytes(&mut self, data: &[u8]) -> u32 {
        let at = self.offset();
        self.bytes.extend_from_slice(data);
        at
    }

    fn push_str(&mut self, s: &str) -> u32 {
        let at = self.push_bytes(s.as_bytes());
        self.bytes.push(0);
        at
    }

    fn push_type(&mut self, t: &RdefTypeDesc<'_>, sm5: bool) -> u32 {
        let mut records = Vec::with_capacity(t.members.len());
        for (name, offset, ty) in &t.members {
            let name = self.push_str(name);
            let ty = self.push_type(ty, sm5);
            records.push([name, ty, *offset]);
        }
        let member_offset = if records.is_empty() {
            0
        } else {
            let at = self.offset();
            for word in records.iter().flatten() {
                push_u32(&mut self.bytes, *word);
            }
            at
        };
        let name = t.name.map_or(0, |n| self.push_str(n));

        let at = self.offset();
        for v in [
            t.class,
            t.ty,
            t.rows,
            t.columns,
            t.elements,
            t.members.len() as u16,
        ] {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        push_u32(&mut self.bytes, member_offset);
        if sm5 {
            for _ in 0..4 {
                push_u32(&mut self.bytes, 0);
            }
            push_u32(&mut self.bytes, name);
        }
        at
    }
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}
