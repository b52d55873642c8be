//! Decoder limits.
//!
//! Token streams are untrusted input. These bounds keep hostile blobs from driving
//! unbounded recursion or allocation while staying well above what compilers emit.

/// Default cap on the declared program length, in tokens (4 MiB of bytecode).
pub const DEFAULT_MAX_PROGRAM_TOKENS: usize = 1 << 20;

/// Default cap on nested relative addressing (`r0[r1[r2.x].x].x` is depth 2).
///
/// Compiler output nests at most one or two levels.
pub const DEFAULT_MAX_RELATIVE_DEPTH: usize = 4;

/// Fixed operand capacity of one instruction.
pub const MAX_OPERANDS: usize = 6;

/// Tunable limits for [`InstructionDecoder`](crate::InstructionDecoder) and
/// [`ShaderProgram::parse_with_options`](crate::ShaderProgram::parse_with_options).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Programs declaring more tokens than this fail with `ProgramTooLarge`.
    pub max_program_tokens: usize,
    /// Relative operands nested deeper than this fail with `RelativeAddressingTooDeep`.
    pub max_relative_depth: usize,
    /// Instructions with more operands fail with `TooManyOperands`.
    pub max_operands: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_program_tokens: DEFAULT_MAX_PROGRAM_TOKENS,
            max_relative_depth: DEFAULT_MAX_RELATIVE_DEPTH,
            max_operands: MAX_OPERANDS,
        }
    }
}
