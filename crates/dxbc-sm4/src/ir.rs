use crate::opcode::Opcode;
use crate::operand::Operand;
use crate::types::{
    CustomDataClass, GlobalFlags, InterpolationMode, Primitive, PrimitiveTopology,
    ResourceDimension, ReturnType, SamplerMode, SyncFlags, SystemValue, TessellatorDomain,
    TessellatorOutputPrimitive, TessellatorPartitioning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Pixel,
    Vertex,
    Geometry,
    Hull,
    Domain,
    Compute,
    Unknown(u16),
}

/// Decoded version token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderVersion {
    pub stage: ShaderStage,
    pub major: u8,
    pub minor: u8,
}

impl ShaderVersion {
    pub fn from_token(token: u32) -> Self {
        // bits 0..=3 minor, 4..=7 major, 16..=31 program type
        let stage = match (token >> 16) as u16 {
            0 => ShaderStage::Pixel,
            1 => ShaderStage::Vertex,
            2 => ShaderStage::Geometry,
            3 => ShaderStage::Hull,
            4 => ShaderStage::Domain,
            5 => ShaderStage::Compute,
            other => ShaderStage::Unknown(other),
        };
        Self {
            stage,
            major: ((token >> 4) & 0xF) as u8,
            minor: (token & 0xF) as u8,
        }
    }

    pub fn to_token(self) -> u32 {
        let ty = match self.stage {
            ShaderStage::Pixel => 0,
            ShaderStage::Vertex => 1,
            ShaderStage::Geometry => 2,
            ShaderStage::Hull => 3,
            ShaderStage::Domain => 4,
            ShaderStage::Compute => 5,
            ShaderStage::Unknown(other) => u32::from(other),
        };
        (ty << 16) | (u32::from(self.major & 0xF) << 4) | u32::from(self.minor & 0xF)
    }
}

/// A non-executable record: a declaration, a hull-shader phase marker, or a
/// `customdata` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub opcode: Opcode,
    pub kind: DeclarationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationKind {
    /// Verbatim payload of a `customdata` block (for example an immediate
    /// constant buffer).
    CustomData {
        class: CustomDataClass,
        data: Vec<u32>,
    },
    /// Start of a hull-shader phase; the opcode names which one.
    HullPhase,
    Resource {
        operand: Operand,
        dimension: ResourceDimension,
        sample_count: u32,
        return_type: [ReturnType; 4],
    },
    ConstantBuffer {
        operand: Operand,
        dynamic_indexed: bool,
    },
    Sampler {
        operand: Operand,
        mode: SamplerMode,
    },
    IndexRange {
        operand: Operand,
        count: u32,
    },
    GsOutputTopology(PrimitiveTopology),
    GsInputPrimitive(Primitive),
    MaxOutputVertexCount(u32),
    /// Any of the `dcl_input*` forms.
    Input {
        operand: Operand,
        interpolation: Option<InterpolationMode>,
        system_value: Option<SystemValue>,
    },
    /// Any of the `dcl_output*` forms.
    Output {
        operand: Operand,
        system_value: Option<SystemValue>,
    },
    Temps(u32),
    IndexableTemp {
        register: u32,
        count: u32,
        components: u32,
    },
    GlobalFlags(GlobalFlags),
    Stream(Operand),
    FunctionBody(u32),
    FunctionTable {
        index: u32,
        bodies: Vec<u32>,
    },
    Interface {
        index: u32,
        dynamic_indexed: bool,
        /// Number of call sites expecting this interface.
        call_sites: u32,
        array_length: u16,
        function_tables: Vec<u32>,
    },
    InputControlPointCount(u32),
    OutputControlPointCount(u32),
    TessDomain(TessellatorDomain),
    TessPartitioning(TessellatorPartitioning),
    TessOutputPrimitive(TessellatorOutputPrimitive),
    HsMaxTessFactor(f32),
    HsForkPhaseInstanceCount(u32),
    HsJoinPhaseInstanceCount(u32),
    ThreadGroup([u32; 3]),
    UavTyped {
        operand: Operand,
        dimension: ResourceDimension,
        return_type: [ReturnType; 4],
        globally_coherent: bool,
    },
    UavRaw {
        operand: Operand,
        globally_coherent: bool,
    },
    UavStructured {
        operand: Operand,
        stride: u32,
        globally_coherent: bool,
        has_counter: bool,
    },
    TgsmRaw {
        operand: Operand,
        byte_count: u32,
    },
    TgsmStructured {
        operand: Operand,
        stride: u32,
        count: u32,
    },
    ResourceRaw(Operand),
    ResourceStructured {
        operand: Operand,
        stride: u32,
    },
    GsInstanceCount(u32),
}

/// `resinfo` result format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResInfoReturnType {
    Float,
    RcpFloat,
    Uint,
}

/// An executable instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Opcode-specific control bits (opcode token bits 11..=23), shifted down.
    pub controls: u32,
    /// `(u, v, w)` texel offsets from a sample-controls extended token.
    pub sample_offsets: [i8; 3],
    pub resource_dimension: Option<ResourceDimension>,
    /// Structure stride from a resource-dimension extended token.
    pub resource_stride: u32,
    pub resource_return_type: Option<[ReturnType; 4]>,
    /// Function-table index of an interface call.
    pub function_index: Option<u32>,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            controls: 0,
            sample_offsets: [0; 3],
            resource_dimension: None,
            resource_stride: 0,
            resource_return_type: None,
            function_index: None,
            operands: Vec::new(),
        }
    }

    pub fn saturate(&self) -> bool {
        self.controls & (1 << 2) != 0
    }

    /// For conditional opcodes (`if`, `breakc`, ...): branch when non-zero.
    pub fn test_nonzero(&self) -> bool {
        self.controls & (1 << 7) != 0
    }

    /// Per-component `precise` mask.
    pub fn precise_mask(&self) -> u8 {
        ((self.controls >> 8) & 0xF) as u8
    }

    /// Result format of `resinfo`; `None` for other opcodes or reserved values.
    pub fn resinfo_return_type(&self) -> Option<ResInfoReturnType> {
        if self.opcode != Opcode::ResInfo {
            return None;
        }
        match self.controls & 0x3 {
            0 => Some(ResInfoReturnType::Float),
            1 => Some(ResInfoReturnType::RcpFloat),
            2 => Some(ResInfoReturnType::Uint),
            _ => None,
        }
    }

    /// Flags of a `sync` instruction; empty for other opcodes.
    pub fn sync_flags(&self) -> SyncFlags {
        if self.opcode != Opcode::Sync {
            return SyncFlags::empty();
        }
        SyncFlags::from_bits_retain(self.controls & 0xF)
    }
}

/// Geometry-shader attributes gathered from declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryInfo {
    pub input_primitive: Option<Primitive>,
    /// Output topology per stream, indexed by stream number.
    pub output_topology: Vec<PrimitiveTopology>,
    pub max_output_vertices: Option<u32>,
    pub instance_count: Option<u32>,
}

/// Hull/domain-shader attributes gathered from declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TessellationInfo {
    pub input_control_points: Option<u32>,
    pub output_control_points: Option<u32>,
    pub domain: Option<TessellatorDomain>,
    pub partitioning: Option<TessellatorPartitioning>,
    pub output_primitive: Option<TessellatorOutputPrimitive>,
    pub max_tess_factor: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputeInfo {
    pub thread_group_size: Option<[u32; 3]>,
}

/// Stage-specific metadata of a program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageInfo {
    pub geometry: GeometryInfo,
    pub tessellation: TessellationInfo,
    pub compute: ComputeInfo,
}
