use dxbc::DxbcError;
use thiserror::Error;

/// A token-stream decode failure, located at the token where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SM4/5 decode error at token {at_token}: {kind}")]
pub struct DecodeError {
    /// Index of the offending token, counted from the version token.
    pub at_token: usize,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub(crate) fn new(at_token: usize, kind: DecodeErrorKind) -> Self {
        Self { at_token, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("unexpected end of token stream (wanted {wanted} tokens, {remaining} remaining)")]
    BufferOverrun { wanted: usize, remaining: usize },

    #[error("unknown opcode {0}")]
    UnknownOpcode(u32),

    #[error("unknown operand type {0}")]
    UnknownOperandType(u32),

    #[error("unknown operand component mode (components {components}, selection {mode})")]
    UnknownOperandComponentMode { components: u32, mode: u32 },

    #[error("unknown extended token kind {0}")]
    UnknownExtendedTokenKind(u32),

    #[error("unknown operand index representation {0}")]
    UnknownIndexRepresentation(u32),

    #[error("declared length {declared} tokens, consumed {consumed}")]
    LengthMismatch { declared: usize, consumed: usize },

    #[error("invalid {field} value {value}")]
    InvalidFieldValue { field: &'static str, value: u32 },

    #[error("instruction has more than {max} operands")]
    TooManyOperands { max: usize },

    #[error("relative addressing nests deeper than {max}")]
    RelativeAddressingTooDeep { max: usize },

    #[error("token chunk length {len} is not a multiple of 4")]
    MisalignedChunk { len: usize },

    #[error("program declares {declared} tokens, limit is {max}")]
    ProgramTooLarge { declared: usize, max: usize },
}

/// Failure to assemble a [`ShaderProgram`](crate::ShaderProgram) from a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error(transparent)]
    Container(#[from] DxbcError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
