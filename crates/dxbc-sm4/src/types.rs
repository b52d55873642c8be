//! Enumerations for the bitfields carried by declaration and instruction tokens.

use bitflags::bitflags;

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident = $value:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Maps a raw token field; undefined values yield `None`.
            pub fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub const fn raw(self) -> u32 {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }
    };
}

token_enum! {
    /// Operand register file (`D3D10_SB_OPERAND_TYPE`).
    pub enum OperandType {
        Temp = 0,
        Input = 1,
        Output = 2,
        IndexableTemp = 3,
        Immediate32 = 4,
        Immediate64 = 5,
        Sampler = 6,
        Resource = 7,
        ConstantBuffer = 8,
        ImmediateConstantBuffer = 9,
        Label = 10,
        InputPrimitiveId = 11,
        OutputDepth = 12,
        Null = 13,
        Rasterizer = 14,
        OutputCoverageMask = 15,
        Stream = 16,
        FunctionBody = 17,
        FunctionTable = 18,
        Interface = 19,
        FunctionInput = 20,
        FunctionOutput = 21,
        OutputControlPointId = 22,
        InputForkInstanceId = 23,
        InputJoinInstanceId = 24,
        InputControlPoint = 25,
        OutputControlPoint = 26,
        InputPatchConstant = 27,
        InputDomainPoint = 28,
        ThisPointer = 29,
        UnorderedAccessView = 30,
        ThreadGroupSharedMemory = 31,
        InputThreadId = 32,
        InputThreadGroupId = 33,
        InputThreadIdInGroup = 34,
        InputCoverageMask = 35,
        InputThreadIdInGroupFlattened = 36,
        InputGsInstanceId = 37,
        OutputDepthGreaterEqual = 38,
        OutputDepthLessEqual = 39,
        CycleCounter = 40,
    }
}

impl OperandType {
    /// Immediate operand types carry their values inline after the operand token.
    pub fn is_immediate(self) -> bool {
        matches!(self, OperandType::Immediate32 | OperandType::Immediate64)
    }
}

token_enum! {
    /// Texture/buffer shape of a resource declaration or extended resource token.
    pub enum ResourceDimension {
        Unknown = 0,
        Buffer = 1,
        Texture1D = 2,
        Texture2D = 3,
        Texture2DMs = 4,
        Texture3D = 5,
        TextureCube = 6,
        Texture1DArray = 7,
        Texture2DArray = 8,
        Texture2DMsArray = 9,
        TextureCubeArray = 10,
        RawBuffer = 11,
        StructuredBuffer = 12,
    }
}

token_enum! {
    /// Per-component resource return type.
    pub enum ReturnType {
        Unknown = 0,
        Unorm = 1,
        Snorm = 2,
        Sint = 3,
        Uint = 4,
        Float = 5,
        Mixed = 6,
        Double = 7,
        Continued = 8,
    }
}

token_enum! {
    /// System-value semantic attached to `_sgv`/`_siv` declarations.
    pub enum SystemValue {
        Undefined = 0,
        Position = 1,
        ClipDistance = 2,
        CullDistance = 3,
        RenderTargetArrayIndex = 4,
        ViewportArrayIndex = 5,
        VertexId = 6,
        PrimitiveId = 7,
        InstanceId = 8,
        IsFrontFace = 9,
        SampleIndex = 10,
        FinalQuadEdgeTessFactor = 11,
        FinalQuadInsideTessFactor = 12,
        FinalTriEdgeTessFactor = 13,
        FinalTriInsideTessFactor = 14,
        FinalLineDetailTessFactor = 15,
        FinalLineDensityTessFactor = 16,
        FinalQuadUEq0EdgeTessFactor = 17,
        FinalQuadVEq0EdgeTessFactor = 18,
        FinalQuadUEq1EdgeTessFactor = 19,
        FinalQuadVEq1EdgeTessFactor = 20,
        FinalQuadUInsideTessFactor = 21,
        FinalQuadVInsideTessFactor = 22,
    }
}

token_enum! {
    /// Pixel-shader input interpolation.
    pub enum InterpolationMode {
        Undefined = 0,
        Constant = 1,
        Linear = 2,
        LinearCentroid = 3,
        LinearNoPerspective = 4,
        LinearNoPerspectiveCentroid = 5,
        LinearSample = 6,
        LinearNoPerspectiveSample = 7,
    }
}

token_enum! {
    pub enum SamplerMode {
        Default = 0,
        Comparison = 1,
        Mono = 2,
    }
}

token_enum! {
    /// Geometry-shader output topology.
    pub enum PrimitiveTopology {
        Undefined = 0,
        PointList = 1,
        LineList = 2,
        LineStrip = 3,
        TriangleList = 4,
        TriangleStrip = 5,
        LineListAdj = 10,
        LineStripAdj = 11,
        TriangleListAdj = 12,
        TriangleStripAdj = 13,
    }
}

token_enum! {
    pub enum TessellatorDomain {
        Undefined = 0,
        Isoline = 1,
        Triangle = 2,
        Quad = 3,
    }
}

token_enum! {
    pub enum TessellatorPartitioning {
        Undefined = 0,
        Integer = 1,
        Pow2 = 2,
        FractionalOdd = 3,
        FractionalEven = 4,
    }
}

token_enum! {
    pub enum TessellatorOutputPrimitive {
        Undefined = 0,
        Point = 1,
        Line = 2,
        TriangleCw = 3,
        TriangleCcw = 4,
    }
}

token_enum! {
    /// Class of a `customdata` block.
    pub enum CustomDataClass {
        Comment = 0,
        DebugInfo = 1,
        Opaque = 2,
        ImmediateConstantBuffer = 3,
        ShaderMessage = 4,
        ShaderClipPlaneConstantMappingsForDx9 = 5,
    }
}

/// Geometry-shader input primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Undefined,
    Point,
    Line,
    Triangle,
    LineAdj,
    TriangleAdj,
    /// Patch with 1 to 32 control points.
    Patch(u8),
}

impl Primitive {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Primitive::Undefined,
            1 => Primitive::Point,
            2 => Primitive::Line,
            3 => Primitive::Triangle,
            6 => Primitive::LineAdj,
            7 => Primitive::TriangleAdj,
            8..=39 => Primitive::Patch((raw - 7) as u8),
            _ => return None,
        })
    }

    pub const fn raw(self) -> u32 {
        match self {
            Primitive::Undefined => 0,
            Primitive::Point => 1,
            Primitive::Line => 2,
            Primitive::Triangle => 3,
            Primitive::LineAdj => 6,
            Primitive::TriangleAdj => 7,
            Primitive::Patch(n) => n as u32 + 7,
        }
    }
}

bitflags! {
    /// `dcl_globalFlags` bits, as stored in the opcode token's control field.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct GlobalFlags: u32 {
        const REFACTORING_ALLOWED = 1 << 0;
        const ENABLE_DOUBLE_PRECISION = 1 << 1;
        const FORCE_EARLY_DEPTH_STENCIL = 1 << 2;
        const ENABLE_RAW_AND_STRUCTURED_BUFFERS = 1 << 3;
        const SKIP_OPTIMIZATION = 1 << 4;
        const ENABLE_MINIMUM_PRECISION = 1 << 5;
        const ENABLE_DOUBLE_EXTENSIONS = 1 << 6;
        const ENABLE_SHADER_EXTENSIONS = 1 << 7;
    }
}

bitflags! {
    /// `sync` instruction flags.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct SyncFlags: u32 {
        const THREADS_IN_GROUP = 1 << 0;
        const THREAD_GROUP_SHARED_MEMORY = 1 << 1;
        const UAV_MEMORY_GROUP = 1 << 2;
        const UAV_MEMORY_GLOBAL = 1 << 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_primitives_count_control_points() {
        assert_eq!(Primitive::from_raw(8), Some(Primitive::Patch(1)));
        assert_eq!(Primitive::from_raw(39), Some(Primitive::Patch(32)));
        assert_eq!(Primitive::from_raw(40), None);
        assert_eq!(Primitive::from_raw(4), None);
        assert_eq!(Primitive::Patch(32).raw(), 39);
    }

    #[test]
    fn topology_has_a_gap_before_adjacency() {
        assert_eq!(PrimitiveTopology::from_raw(6), None);
        assert_eq!(
            PrimitiveTopology::from_raw(13),
            Some(PrimitiveTopology::TriangleStripAdj)
        );
        assert_eq!(OperandType::from_raw(40), Some(OperandType::CycleCounter));
        assert_eq!(OperandType::from_raw(41), None);
    }
}
