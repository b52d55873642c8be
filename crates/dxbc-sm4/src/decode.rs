use tracing::{debug, trace};

use crate::cursor::TokenCursor;
use crate::error::{DecodeError, DecodeErrorKind};
use crate::ir::{Declaration, DeclarationKind, Instruction, ShaderVersion, StageInfo};
use crate::limits::DecodeOptions;
use crate::opcode::{
    DeclarationOpcode, Opcode, OpcodeClass, CONTROL_MASK, CONTROL_SHIFT, EXTENDED_BIT, LENGTH_MASK, LENGTH_SHIFT,
    OPCODE_MASK,
};
use crate::operand::{Operand, OperandDecoder};
use crate::types::{
    CustomDataClass, GlobalFlags, InterpolationMode, Primitive, PrimitiveTopology,
    ResourceDimension, ReturnType, SamplerMode, SystemValue, TessellatorDomain,
    TessellatorOutputPrimitive, TessellatorPartitioning,
};

// Extended opcode token kinds.
const EXT_OPCODE_TYPE_MASK: u32 = 0x3F;
const EXT_OPCODE_EMPTY: u32 = 0;
const EXT_OPCODE_SAMPLE_CONTROLS: u32 = 1;
const EXT_OPCODE_RESOURCE_DIM: u32 = 2;
const EXT_OPCODE_RESOURCE_RETURN_TYPE: u32 = 3;

/// Result of decoding one token chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedProgram {
    pub version: ShaderVersion,
    pub declarations: Vec<Declaration>,
    pub instructions: Vec<Instruction>,
    pub stage: StageInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InDeclaration,
    InInstruction,
    End,
}

/// Decodes an `SHDR`/`SHEX` token stream into declarations and instructions.
///
/// Records are produced in stream order. Each one is checked against the length in
/// its opcode token; any mismatch or unknown encoding aborts the whole decode.
#[derive(Debug)]
pub struct InstructionDecoder<'a> {
    cursor: TokenCursor<'a>,
    options: DecodeOptions,
    operands: OperandDecoder,
    state: State,
    /// Stream selected by the last `dcl_stream`; output topologies attach to it.
    current_gs_stream: usize,
    version: ShaderVersion,
    declarations: Vec<Declaration>,
    instructions: Vec<Instruction>,
    stage: StageInfo,
}

impl<'a> InstructionDecoder<'a> {
    /// Prepares to decode the payload of a token chunk.
    pub fn new(bytes: &'a [u8], options: DecodeOptions) -> Result<Self, DecodeError> {
        Ok(Self {
            cursor: TokenCursor::new(bytes)?,
            options,
            operands: OperandDecoder::new(options.max_relative_depth),
            state: State::Start,
            current_gs_stream: 0,
            version: ShaderVersion::from_token(0),
            declarations: Vec::new(),
            instructions: Vec::new(),
            stage: StageInfo::default(),
        })
    }

    /// Runs the decoder to the end of the program.
    pub fn decode(mut self) -> Result<DecodedProgram, DecodeError> {
        loop {
            self.state = match self.state {
                State::Start => {
                    self.read_header()?;
                    self.next_state()?
                }
                State::InDeclaration => {
                    let decl = self.decode_declaration()?;
                    trace!(opcode = decl.opcode.mnemonic(), "declaration");
                    // Phase markers other than hs_decls also split the instruction list.
                    if decl.kind == DeclarationKind::HullPhase && decl.opcode != Opcode::HsDecls {
                        self.instructions.push(Instruction::new(decl.opcode));
                    }
                    self.declarations.push(decl);
                    self.next_state()?
                }
                State::InInstruction => {
                    let inst = self.decode_instruction()?;
                    trace!(
                        opcode = inst.opcode.mnemonic(),
                        operands = inst.operands.len(),
                        "instruction"
                    );
                    self.instructions.push(inst);
                    self.next_state()?
                }
                State::End => break,
            };
        }

        debug!(
            stage = ?self.version.stage,
            major = self.version.major,
            minor = self.version.minor,
            declarations = self.declarations.len(),
            instructions = self.instructions.len(),
            "decoded shader program"
        );

        Ok(DecodedProgram {
            version: self.version,
            declarations: self.declarations,
            instructions: self.instructions,
            stage: self.stage,
        })
    }

    fn read_header(&mut self) -> Result<(), DecodeError> {
        self.version = ShaderVersion::from_token(self.cursor.read_u32()?);
        let length_at = self.cursor.position();
        let declared = self.cursor.read_u32()? as usize;

        if declared > self.options.max_program_tokens {
            return Err(DecodeError::new(
                length_at,
                DecodeErrorKind::ProgramTooLarge {
                    declared,
                    max: self.options.max_program_tokens,
                },
            ));
        }
        if declared < 2 {
            return Err(DecodeError::new(
                length_at,
                DecodeErrorKind::LengthMismatch {
                    declared,
                    consumed: 2,
                },
            ));
        }

        // Header-only chunks with an overstated length decode as empty programs; any
        // other shortfall is an overrun.
        let remaining = self.cursor.remaining();
        let wanted = declared - self.cursor.position();
        if wanted > remaining {
            if remaining > 0 {
                return Err(DecodeError::new(
                    length_at,
                    DecodeErrorKind::BufferOverrun { wanted, remaining },
                ));
            }
            debug!(declared, "program body is absent");
        }
        self.cursor.truncate(declared);
        Ok(())
    }

    fn next_state(&self) -> Result<State, DecodeError> {
        if self.cursor.is_at_end() {
            return Ok(State::End);
        }
        let (opcode, _) = self.peek_opcode()?;
        Ok(match opcode.class() {
            OpcodeClass::Instruction => State::InInstruction,
            OpcodeClass::CustomData | OpcodeClass::HullPhase | OpcodeClass::Declaration(_) => {
                State::InDeclaration
            }
        })
    }

    fn peek_opcode(&self) -> Result<(Opcode, u32), DecodeError> {
        let token = self.cursor.peek_u32()?;
        let raw = token & OPCODE_MASK;
        let opcode = Opcode::from_raw(raw)
            .ok_or_else(|| self.cursor.error(DecodeErrorKind::UnknownOpcode(raw)))?;
        Ok((opcode, token))
    }

    fn decode_declaration(&mut self) -> Result<Declaration, DecodeError> {
        let (opcode, token) = self.peek_opcode()?;
        let payload = match opcode.class() {
            OpcodeClass::CustomData => return self.decode_custom_data(token),
            OpcodeClass::HullPhase => None,
            OpcodeClass::Declaration(decl) => Some(decl),
            OpcodeClass::Instruction => {
                return Err(self
                    .cursor
                    .error(DecodeErrorKind::UnknownOpcode(opcode.raw())))
            }
        };

        let start = self.cursor.position();
        let declared = opcode_length(token);
        self.cursor.skip(1)?;
        if declared == 0 {
            return Err(DecodeError::new(
                start,
                DecodeErrorKind::LengthMismatch {
                    declared,
                    consumed: 1,
                },
            ));
        }

        let mut extended = token & EXTENDED_BIT != 0;
        while extended {
            extended = self.cursor.read_u32()? & EXTENDED_BIT != 0;
        }

        let controls = (token >> CONTROL_SHIFT) & CONTROL_MASK;
        let kind = match payload {
            Some(decl) => self.decode_declaration_kind(decl, controls)?,
            None => DeclarationKind::HullPhase,
        };

        let consumed = self.cursor.position() - start;
        if consumed != declared {
            return Err(DecodeError::new(
                start,
                DecodeErrorKind::LengthMismatch { declared, consumed },
            ));
        }
        Ok(Declaration { opcode, kind })
    }

    fn decode_custom_data(&mut self, token: u32) -> Result<Declaration, DecodeError> {
        let start = self.cursor.position();
        self.cursor.skip(1)?;
        let raw_class = token >> CONTROL_SHIFT;
        let class = CustomDataClass::from_raw(raw_class)
            .ok_or_else(|| invalid_field(start, "customdata class", raw_class))?;

        // The length token counts itself and the opcode token.
        let declared = self.cursor.read_u32()? as usize;
        let payload = declared.checked_sub(2).ok_or_else(|| {
            DecodeError::new(
                start,
                DecodeErrorKind::LengthMismatch {
                    declared,
                    consumed: 2,
                },
            )
        })?;
        let data = self.cursor.read_vec(payload)?;

        Ok(Declaration {
            opcode: Opcode::CustomData,
            kind: DeclarationKind::CustomData { class, data },
        })
    }

    fn operand(&mut self) -> Result<Operand, DecodeError> {
        self.operands.decode(&mut self.cursor)
    }

    fn field<T>(
        &self,
        field: &'static str,
        raw: u32,
        map: impl FnOnce(u32) -> Option<T>,
    ) -> Result<T, DecodeError> {
        map(raw).ok_or_else(|| invalid_field(self.cursor.position(), field, raw))
    }

    fn system_value(&mut self) -> Result<SystemValue, DecodeError> {
        let raw = self.cursor.read_u32()?;
        self.field("system value", raw, SystemValue::from_raw)
    }

    fn return_types(&mut self) -> Result<[ReturnType; 4], DecodeError> {
        let at = self.cursor.position();
        unpack_return_types(self.cursor.read_u32()?, 0, at)
    }

    fn decode_declaration_kind(
        &mut self,
        opcode: DeclarationOpcode,
        controls: u32,
    ) -> Result<DeclarationKind, DecodeError> {
        use DeclarationKind as K;
        use DeclarationOpcode as D;

        let globally_coherent = controls & (1 << 5) != 0;
        let has_counter = controls & (1 << 12) != 0;

        Ok(match opcode {
            D::DclResource => {
                let dimension =
                    self.field("resource dimension", controls & 0x1F, ResourceDimension::from_raw)?;
                let operand = self.operand()?;
                K::Resource {
                    operand,
                    dimension,
                    sample_count: (controls >> 5) & 0x7F,
                    return_type: self.return_types()?,
                }
            }
            D::DclConstantBuffer => K::ConstantBuffer {
                operand: self.operand()?,
                dynamic_indexed: controls & 1 != 0,
            },
            D::DclSampler => {
                let mode = self.field("sampler mode", controls & 0xF, SamplerMode::from_raw)?;
                K::Sampler {
                    operand: self.operand()?,
                    mode,
                }
            }
            D::DclIndexRange => K::IndexRange {
                operand: self.operand()?,
                count: self.cursor.read_u32()?,
            },
            D::DclGsOutputPrimitiveTopology => {
                let topology =
                    self.field("output topology", controls & 0x7F, PrimitiveTopology::from_raw)?;
                let streams = &mut self.stage.geometry.output_topology;
                if streams.len() <= self.current_gs_stream {
                    streams.resize(self.current_gs_stream + 1, PrimitiveTopology::Undefined);
                }
                streams[self.current_gs_stream] = topology;
                K::GsOutputTopology(topology)
            }
            D::DclGsInputPrimitive => {
                let primitive =
                    self.field("input primitive", controls & 0x3F, Primitive::from_raw)?;
                self.stage.geometry.input_primitive = Some(primitive);
                K::GsInputPrimitive(primitive)
            }
            D::DclMaxOutputVertexCount => {
                let count = self.cursor.read_u32()?;
                self.stage.geometry.max_output_vertices = Some(count);
                K::MaxOutputVertexCount(count)
            }
            D::DclInput => K::Input {
                operand: self.operand()?,
                interpolation: None,
                system_value: None,
            },
            D::DclInputSgv | D::DclInputSiv => K::Input {
                operand: self.operand()?,
                interpolation: None,
                system_value: Some(self.system_value()?),
            },
            D::DclInputPs | D::DclInputPsSgv | D::DclInputPsSiv => {
                let interpolation =
                    self.field("interpolation mode", controls & 0xF, InterpolationMode::from_raw)?;
                let operand = self.operand()?;
                let system_value = if opcode == D::DclInputPs {
                    None
                } else {
                    Some(self.system_value()?)
                };
                K::Input {
                    operand,
                    interpolation: Some(interpolation),
                    system_value,
                }
            }
            D::DclOutput => K::Output {
                operand: self.operand()?,
                system_value: None,
            },
            D::DclOutputSgv | D::DclOutputSiv => K::Output {
                operand: self.operand()?,
                system_value: Some(self.system_value()?),
            },
            D::DclTemps => K::Temps(self.cursor.read_u32()?),
            D::DclIndexableTemp => K::IndexableTemp {
                register: self.cursor.read_u32()?,
                count: self.cursor.read_u32()?,
                components: self.cursor.read_u32()?,
            },
            D::DclGlobalFlags => K::GlobalFlags(GlobalFlags::from_bits_retain(controls & 0xFF)),
            D::DclStream => {
                let operand = self.operand()?;
                let stream = operand
                    .immediate_index(0)
                    .and_then(|index| usize::try_from(index).ok())
                    .filter(|&index| index < 4)
                    .ok_or_else(|| {
                        let raw = operand.immediate_index(0).unwrap_or(-1) as u32;
                        invalid_field(self.cursor.position(), "stream index", raw)
                    })?;
                self.current_gs_stream = stream;
                K::Stream(operand)
            }
            D::DclFunctionBody => K::FunctionBody(self.cursor.read_u32()?),
            D::DclFunctionTable => {
                let index = self.cursor.read_u32()?;
                let count = self.cursor.read_u32()? as usize;
                K::FunctionTable {
                    index,
                    bodies: self.cursor.read_vec(count)?,
                }
            }
            D::DclInterface => {
                let index = self.cursor.read_u32()?;
                let call_sites = self.cursor.read_u32()?;
                let packed = self.cursor.read_u32()?;
                let table_length = (packed & 0xFFFF) as usize;
                K::Interface {
                    index,
                    dynamic_indexed: controls & 1 != 0,
                    call_sites,
                    array_length: (packed >> 16) as u16,
                    function_tables: self.cursor.read_vec(table_length)?,
                }
            }
            D::DclInputControlPointCount => {
                let count = controls & 0x3F;
                self.stage.tessellation.input_control_points = Some(count);
                K::InputControlPointCount(count)
            }
            D::DclOutputControlPointCount => {
                let count = controls & 0x3F;
                self.stage.tessellation.output_control_points = Some(count);
                K::OutputControlPointCount(count)
            }
            D::DclTessDomain => {
                let domain =
                    self.field("tessellator domain", controls & 0x7, TessellatorDomain::from_raw)?;
                self.stage.tessellation.domain = Some(domain);
                K::TessDomain(domain)
            }
            D::DclTessPartitioning => {
                let partitioning = self.field(
                    "tessellator partitioning",
                    controls & 0x7,
                    TessellatorPartitioning::from_raw,
                )?;
                self.stage.tessellation.partitioning = Some(partitioning);
                K::TessPartitioning(partitioning)
            }
            D::DclTessOutputPrimitive => {
                let primitive = self.field(
                    "tessellator output primitive",
                    controls & 0x7,
                    TessellatorOutputPrimitive::from_raw,
                )?;
                self.stage.tessellation.output_primitive = Some(primitive);
                K::TessOutputPrimitive(primitive)
            }
            D::DclHsMaxTessFactor => {
                let factor = f32::from_bits(self.cursor.read_u32()?);
                self.stage.tessellation.max_tess_factor = Some(factor);
                K::HsMaxTessFactor(factor)
            }
            D::DclHsForkPhaseInstanceCount => {
                K::HsForkPhaseInstanceCount(self.cursor.read_u32()?)
            }
            D::DclHsJoinPhaseInstanceCount => {
                K::HsJoinPhaseInstanceCount(self.cursor.read_u32()?)
            }
            D::DclThreadGroup => {
                let size = [
                    self.cursor.read_u32()?,
                    self.cursor.read_u32()?,
                    self.cursor.read_u32()?,
                ];
                self.stage.compute.thread_group_size = Some(size);
                K::ThreadGroup(size)
            }
            D::DclUavTyped => {
                let dimension =
                    self.field("UAV dimension", controls & 0x1F, ResourceDimension::from_raw)?;
                let operand = self.operand()?;
                K::UavTyped {
                    operand,
                    dimension,
                    return_type: self.return_types()?,
                    globally_coherent,
                }
            }
            D::DclUavRaw => K::UavRaw {
                operand: self.operand()?,
                globally_coherent,
            },
            D::DclUavStructured => K::UavStructured {
                operand: self.operand()?,
                stride: self.cursor.read_u32()?,
                globally_coherent,
                has_counter,
            },
            D::DclTgsmRaw => K::TgsmRaw {
                operand: self.operand()?,
                byte_count: self.cursor.read_u32()?,
            },
            D::DclTgsmStructured => K::TgsmStructured {
                operand: self.operand()?,
                stride: self.cursor.read_u32()?,
                count: self.cursor.read_u32()?,
            },
            D::DclResourceRaw => K::ResourceRaw(self.operand()?),
            D::DclResourceStructured => K::ResourceStructured {
                operand: self.operand()?,
                stride: self.cursor.read_u32()?,
            },
            D::DclGsInstanceCount => {
                let count = self.cursor.read_u32()?;
                self.stage.geometry.instance_count = Some(count);
                K::GsInstanceCount(count)
            }
        })
    }

    fn decode_instruction(&mut self) -> Result<Instruction, DecodeError> {
        let (opcode, token) = self.peek_opcode()?;
        let start = self.cursor.position();
        let declared = opcode_length(token);
        if declared == 0 {
            return Err(DecodeError::new(
                start,
                DecodeErrorKind::LengthMismatch {
                    declared,
                    consumed: 1,
                },
            ));
        }
        let mut body = self.cursor.take(declared)?;
        body.skip(1)?;

        let mut inst = Instruction::new(opcode);
        inst.controls = (token >> CONTROL_SHIFT) & CONTROL_MASK;

        let mut extended = token & EXTENDED_BIT != 0;
        while extended {
            let ext_at = body.position();
            let ext = body.read_u32()?;
            extended = ext & EXTENDED_BIT != 0;
            match ext & EXT_OPCODE_TYPE_MASK {
                EXT_OPCODE_EMPTY => {}
                EXT_OPCODE_SAMPLE_CONTROLS => {
                    inst.sample_offsets = [
                        signed_nibble(ext >> 9),
                        signed_nibble(ext >> 13),
                        signed_nibble(ext >> 17),
                    ];
                }
                EXT_OPCODE_RESOURCE_DIM => {
                    let raw = (ext >> 6) & 0x1F;
                    inst.resource_dimension = Some(
                        ResourceDimension::from_raw(raw)
                            .ok_or_else(|| invalid_field(ext_at, "resource dimension", raw))?,
                    );
                    inst.resource_stride = (ext >> 11) & 0xFFF;
                }
                EXT_OPCODE_RESOURCE_RETURN_TYPE => {
                    inst.resource_return_type = Some(unpack_return_types(ext, 6, ext_at)?);
                }
                other => {
                    return Err(DecodeError::new(
                        ext_at,
                        DecodeErrorKind::UnknownExtendedTokenKind(other),
                    ))
                }
            }
        }

        if opcode == Opcode::InterfaceCall {
            inst.function_index = Some(body.read_u32()?);
        }

        while !body.is_at_end() {
            if inst.operands.len() == self.options.max_operands {
                return Err(body.error(DecodeErrorKind::TooManyOperands {
                    max: self.options.max_operands,
                }));
            }
            inst.operands.push(self.operands.decode(&mut body)?);
        }

        Ok(inst)
    }
}

fn opcode_length(token: u32) -> usize {
    ((token >> LENGTH_SHIFT) & LENGTH_MASK) as usize
}

/// Four 4-bit return types packed from bit `shift` upwards.
fn unpack_return_types(token: u32, shift: u32, at: usize) -> Result<[ReturnType; 4], DecodeError> {
    let mut out = [ReturnType::Unknown; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let raw = (token >> (shift + 4 * i as u32)) & 0xF;
        *slot = ReturnType::from_raw(raw).ok_or_else(|| invalid_field(at, "return type", raw))?;
    }
    Ok(out)
}

fn signed_nibble(bits: u32) -> i8 {
    (((bits & 0xF) as u8) << 4) as i8 >> 4
}

fn invalid_field(at_token: usize, field: &'static str, value: u32) -> DecodeError {
    DecodeError::new(at_token, DecodeErrorKind::InvalidFieldValue { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_nibbles() {
        assert_eq!(signed_nibble(0x7), 7);
        assert_eq!(signed_nibble(0x8), -8);
        assert_eq!(signed_nibble(0xF), -1);
        assert_eq!(signed_nibble(0x1F), -1);
    }
}
