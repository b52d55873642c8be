//! Decoder for Shader Model 4/5 token streams (`SHDR`/`SHEX` chunks).
//!
//! [`ShaderProgram::parse`] takes a complete DXBC blob and produces an owned,
//! immutable program: the decoded declarations and instructions plus the
//! constant buffers, resource bindings and signatures from the container's
//! reflection chunks. [`InstructionDecoder`] can be used directly on a bare token
//! chunk.
//!
//! Malformed input is rejected with a typed error; nothing is recovered or guessed.

#![forbid(unsafe_code)]

mod cursor;
mod decode;
mod error;
mod ir;
mod limits;
mod opcode;
mod operand;
mod program;
mod types;

pub use crate::cursor::TokenCursor;
pub use crate::decode::{DecodedProgram, InstructionDecoder};
pub use crate::error::{DecodeError, DecodeErrorKind, ProgramError};
pub use crate::ir::{
    ComputeInfo, Declaration, DeclarationKind, GeometryInfo, Instruction, ResInfoReturnType,
    ShaderStage, ShaderVersion, StageInfo, TessellationInfo,
};
pub use crate::limits::{
    DecodeOptions, DEFAULT_MAX_PROGRAM_TOKENS, DEFAULT_MAX_RELATIVE_DEPTH, MAX_OPERANDS,
};
pub use crate::opcode::{DeclarationOpcode, Opcode, OpcodeClass};
pub use crate::operand::{
    ComponentCount, ComponentSelection, ImmediateValues, IndexRepresentation, Operand,
    OperandDecoder, OperandIndex,
};
pub use crate::program::{sort_constant_buffer_variables, ShaderProgram};
pub use crate::types::{
    CustomDataClass, GlobalFlags, InterpolationMode, OperandType, Primitive, PrimitiveTopology,
    ResourceDimension, ReturnType, SamplerMode, SyncFlags, SystemValue, TessellatorDomain,
    TessellatorOutputPrimitive, TessellatorPartitioning,
};

// Reflection types surface through `ShaderProgram`'s accessors.
pub use dxbc::{ConstantBuffer, ResourceBinding, SignatureParameter};
