use dxbc::{
    parse_rdef_chunk, parse_signature_chunk, CBufferType, ConstantBuffer, DxbcError, DxbcFile,
    FourCC, RdefChunk, ResourceBinding, SignatureParameter,
};
use tracing::debug;

use crate::decode::{DecodedProgram, InstructionDecoder};
use crate::error::ProgramError;
use crate::ir::{
    ComputeInfo, Declaration, GeometryInfo, Instruction, ShaderStage, ShaderVersion, StageInfo,
    TessellationInfo,
};
use crate::limits::DecodeOptions;

const TOKEN_CHUNKS: &[FourCC] = &[FourCC::SHEX, FourCC::SHDR];
const INPUT_SIGNATURES: &[FourCC] = &[FourCC::ISGN, FourCC::ISG1];
const OUTPUT_SIGNATURES: &[FourCC] = &[FourCC::OSGN, FourCC::OSG5, FourCC::OSG1];
const PATCH_CONSTANT_SIGNATURES: &[FourCC] = &[FourCC::PCSG, FourCC::PSG1];

/// A fully decoded SM4/SM5 shader: token stream, reflection data and signatures.
///
/// Built once by [`ShaderProgram::parse`]; all data is owned and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    version: ShaderVersion,
    declarations: Vec<Declaration>,
    instructions: Vec<Instruction>,
    constant_buffers: Vec<ConstantBuffer>,
    resource_bindings: Vec<ResourceBinding>,
    inputs: Vec<SignatureParameter>,
    outputs: Vec<SignatureParameter>,
    patch_constants: Vec<SignatureParameter>,
    stage: StageInfo,
    creator: Option<String>,
    compile_flags: u32,
}

impl ShaderProgram {
    /// Parses a DXBC blob with the default [`DecodeOptions`].
    pub fn parse(bytes: &[u8]) -> Result<Self, ProgramError> {
        Self::parse_with_options(bytes, DecodeOptions::default())
    }

    pub fn parse_with_options(bytes: &[u8], options: DecodeOptions) -> Result<Self, ProgramError> {
        let file = DxbcFile::parse(bytes)?;
        Self::from_dxbc(&file, options)
    }

    /// Assembles a program from an already-parsed container.
    ///
    /// Requires an `SHEX` or `SHDR` chunk. Resource definitions and signatures are
    /// optional; missing ones leave the corresponding lists empty.
    pub fn from_dxbc(file: &DxbcFile<'_>, options: DecodeOptions) -> Result<Self, ProgramError> {
        let tokens = file
            .find_first_of(TOKEN_CHUNKS)
            .ok_or(DxbcError::MissingChunk(FourCC::SHEX))?;
        debug!(fourcc = %tokens.fourcc, bytes = tokens.data.len(), "decoding token chunk");

        let DecodedProgram {
            version,
            declarations,
            instructions,
            stage,
        } = InstructionDecoder::new(tokens.data, options)?.decode()?;

        let rdef = match file.get_chunk(FourCC::RDEF) {
            Some(chunk) => parse_rdef_chunk(chunk.data, version.major)?,
            None => RdefChunk::default(),
        };
        let RdefChunk {
            mut constant_buffers,
            bindings,
            compile_flags,
            creator,
            ..
        } = rdef;
        sort_constant_buffer_variables(&mut constant_buffers);

        Ok(Self {
            version,
            declarations,
            instructions,
            constant_buffers,
            resource_bindings: bindings,
            inputs: signature(file, INPUT_SIGNATURES)?,
            outputs: signature(file, OUTPUT_SIGNATURES)?,
            patch_constants: signature(file, PATCH_CONSTANT_SIGNATURES)?,
            stage,
            creator,
            compile_flags,
        })
    }

    pub fn version(&self) -> ShaderVersion {
        self.version
    }

    pub fn shader_stage(&self) -> ShaderStage {
        self.version.stage
    }

    /// Declarations, hull-shader phase markers and custom-data blocks in stream order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Constant buffers from `RDEF`. Variables of `cbuffer`-typed buffers are sorted
    /// by start offset.
    pub fn constant_buffers(&self) -> &[ConstantBuffer] {
        &self.constant_buffers
    }

    pub fn resource_bindings(&self) -> &[ResourceBinding] {
        &self.resource_bindings
    }

    pub fn inputs(&self) -> &[SignatureParameter] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[SignatureParameter] {
        &self.outputs
    }

    pub fn patch_constants(&self) -> &[SignatureParameter] {
        &self.patch_constants
    }

    pub fn geometry(&self) -> &GeometryInfo {
        &self.stage.geometry
    }

    pub fn tessellation(&self) -> &TessellationInfo {
        &self.stage.tessellation
    }

    pub fn compute(&self) -> &ComputeInfo {
        &self.stage.compute
    }

    /// Compiler identification string from `RDEF`, if present.
    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    pub fn compile_flags(&self) -> u32 {
        self.compile_flags
    }
}

fn signature(
    file: &DxbcFile<'_>,
    fourccs: &[FourCC],
) -> Result<Vec<SignatureParameter>, DxbcError> {
    match file.find_first_of(fourccs) {
        Some(chunk) => Ok(parse_signature_chunk(chunk.fourcc, chunk.data)?.parameters),
        None => Ok(Vec::new()),
    }
}

/// Orders each `cbuffer`'s variables by start offset.
///
/// The sort is stable, so variables sharing an offset keep their `RDEF` order. Other
/// buffer kinds are left as declared.
pub fn sort_constant_buffer_variables(buffers: &mut [ConstantBuffer]) {
    for cb in buffers.iter_mut().filter(|cb| cb.ty == CBufferType::CBuffer) {
        cb.variables.sort_by_key(|var| var.start_offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxbc::ShaderVariable;

    fn var(name: &str, start_offset: u32) -> ShaderVariable {
        ShaderVariable {
            name: name.to_owned(),
            start_offset,
            ..ShaderVariable::default()
        }
    }

    fn names(cb: &ConstantBuffer) -> Vec<&str> {
        cb.variables.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn sorts_only_cbuffers() {
        let mut buffers = vec![
            ConstantBuffer {
                name: "cb".into(),
                ty: CBufferType::CBuffer,
                variables: vec![var("c", 32), var("a", 0), var("b", 16), var("b2", 16)],
                ..ConstantBuffer::default()
            },
            ConstantBuffer {
                name: "tb".into(),
                ty: CBufferType::TBuffer,
                variables: vec![var("y", 16), var("x", 0)],
                ..ConstantBuffer::default()
            },
        ];
        sort_constant_buffer_variables(&mut buffers);
        assert_eq!(names(&buffers[0]), ["a", "b", "b2", "c"]);
        assert_eq!(names(&buffers[1]), ["y", "x"]);
    }
}
