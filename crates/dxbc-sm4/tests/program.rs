use dxbc::test_utils::{
    build_container, build_rdef_chunk, build_signature_chunk, tokens_to_bytes, BindingDesc,
    CBufferDesc, RdefDesc, SignatureParamDesc, VariableDesc,
};
use dxbc::{DxbcError, FourCC, SignatureLayout};
use dxbc_sm4::{
    DecodeErrorKind, DeclarationKind, Opcode, ProgramError, ShaderProgram, ShaderStage,
};
use pretty_assertions::assert_eq;

const VS_5_0: u32 = 0x0001_0050;
const VS_4_0: u32 = 0x0001_0040;

fn opcode_token(opcode: Opcode, len: u32) -> u32 {
    opcode.raw() | (len << 24)
}

fn dcl_temps_program(version: u32, count: u32) -> Vec<u8> {
    tokens_to_bytes(&[
        version,
        5,
        opcode_token(Opcode::DclTemps, 2),
        count,
        opcode_token(Opcode::Ret, 1),
    ])
}

fn var(name: &str, start_offset: u32) -> VariableDesc<'_> {
    VariableDesc {
        name,
        start_offset,
        size: 16,
        ..VariableDesc::default()
    }
}

#[test]
fn parses_a_complete_vertex_shader() {
    let shex = dcl_temps_program(VS_5_0, 3);
    let rdef = build_rdef_chunk(&RdefDesc {
        shader_major: 5,
        target: 0xFFFE_0500,
        compile_flags: 0x100,
        creator: Some("test compiler"),
        bindings: vec![BindingDesc {
            name: "Globals",
            input_type: 0,
            bind_point: 2,
            bind_count: 1,
            ..BindingDesc::default()
        }],
        constant_buffers: vec![CBufferDesc {
            name: "Globals",
            size: 48,
            variables: vec![var("c", 32), var("a", 0), var("b", 16)],
            ..CBufferDesc::default()
        }],
    });
    let isgn = build_signature_chunk(
        SignatureLayout::Basic,
        &[
            SignatureParamDesc::float4("POSITION", 0),
            SignatureParamDesc::float4("TEXCOORD", 1),
        ],
    );
    let osgn = build_signature_chunk(
        SignatureLayout::Basic,
        &[SignatureParamDesc {
            system_value_type: 1,
            ..SignatureParamDesc::float4("SV_Position", 0)
        }],
    );
    let blob = build_container(&[
        (FourCC::RDEF, &rdef),
        (FourCC::ISGN, &isgn),
        (FourCC::OSGN, &osgn),
        (FourCC::SHEX, &shex),
    ]);

    let program = ShaderProgram::parse(&blob).unwrap();

    assert_eq!(program.shader_stage(), ShaderStage::Vertex);
    assert_eq!(program.version().major, 5);
    assert_eq!(program.declarations().len(), 1);
    assert_eq!(program.declarations()[0].kind, DeclarationKind::Temps(3));
    assert_eq!(program.instructions().len(), 1);

    let cb = &program.constant_buffers()[0];
    assert_eq!(cb.bind_point, Some(2));
    let names: Vec<_> = cb.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert_eq!(program.resource_bindings().len(), 1);
    assert_eq!(program.creator(), Some("test compiler"));
    assert_eq!(program.compile_flags(), 0x100);

    let inputs: Vec<_> = program
        .inputs()
        .iter()
        .map(|p| (p.semantic_name.as_str(), p.register))
        .collect();
    assert_eq!(inputs, [("POSITION", 0), ("TEXCOORD", 1)]);
    assert_eq!(program.outputs()[0].system_value_type, 1);
    assert!(program.patch_constants().is_empty());
}

#[test]
fn accepts_shdr_and_newer_signature_tags() {
    let shdr = dcl_temps_program(VS_4_0, 1);
    let osg5 = build_signature_chunk(
        SignatureLayout::Stream,
        &[SignatureParamDesc {
            stream: 1,
            ..SignatureParamDesc::float4("SV_Position", 0)
        }],
    );
    let isg1 = build_signature_chunk(
        SignatureLayout::MinPrecision,
        &[SignatureParamDesc {
            min_precision: 1,
            ..SignatureParamDesc::float4("COLOR", 0)
        }],
    );
    let blob = build_container(&[
        (FourCC::ISG1, &isg1),
        (FourCC::OSG5, &osg5),
        (FourCC::SHDR, &shdr),
    ]);

    let program = ShaderProgram::parse(&blob).unwrap();
    assert_eq!(program.version().major, 4);
    assert_eq!(program.inputs()[0].min_precision, Some(1));
    assert_eq!(program.outputs()[0].stream, 1);
    assert!(program.constant_buffers().is_empty());
    assert_eq!(program.creator(), None);
}

#[test]
fn header_only_token_chunk_is_an_empty_program() {
    // The declared length counts one token more than the chunk holds.
    let shex = tokens_to_bytes(&[0x50, 3]);
    let blob = build_container(&[(FourCC::SHEX, &shex)]);

    let program = ShaderProgram::parse(&blob).unwrap();
    assert_eq!(program.shader_stage(), ShaderStage::Pixel);
    assert_eq!((program.version().major, program.version().minor), (5, 0));
    assert!(program.declarations().is_empty());
    assert!(program.instructions().is_empty());
    assert!(program.inputs().is_empty());
}

#[test]
fn missing_token_chunk_is_reported() {
    let isgn = build_signature_chunk(SignatureLayout::Basic, &[]);
    let blob = build_container(&[(FourCC::ISGN, &isgn)]);

    let err = ShaderProgram::parse(&blob).unwrap_err();
    assert_eq!(
        err,
        ProgramError::Container(DxbcError::MissingChunk(FourCC::SHEX))
    );
}

#[test]
fn decode_errors_surface_through_the_program() {
    let shex = tokens_to_bytes(&[VS_5_0, 4, opcode_token(Opcode::DclTemps, 3), 1]);
    let blob = build_container(&[(FourCC::SHEX, &shex)]);

    match ShaderProgram::parse(&blob).unwrap_err() {
        ProgramError::Decode(err) => {
            assert_eq!(err.at_token, 2);
            assert_eq!(
                err.kind,
                DecodeErrorKind::LengthMismatch {
                    declared: 3,
                    consumed: 2
                }
            );
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn program_errors_render_the_wrapped_message() {
    let missing = ProgramError::from(DxbcError::MissingChunk(FourCC::SHEX));
    assert_eq!(missing.to_string(), "DXBC container has no SHEX chunk");

    let shex = tokens_to_bytes(&[VS_5_0, 4, opcode_token(Opcode::DclTemps, 3), 1]);
    let blob = build_container(&[(FourCC::SHEX, &shex)]);
    let err = ShaderProgram::parse(&blob).unwrap_err();
    assert_eq!(
        err.to_string(),
        "SM4/5 decode error at token 2: declared length 3 tokens, consumed 2"
    );
}

#[test]
fn tbuffer_variables_keep_declaration_order() {
    let shex = dcl_temps_program(VS_5_0, 1);
    let rdef = build_rdef_chunk(&RdefDesc {
        shader_major: 5,
        constant_buffers: vec![
            CBufferDesc {
                name: "cb",
                variables: vec![var("y", 16), var("x", 0)],
                ..CBufferDesc::default()
            },
            CBufferDesc {
                name: "tb",
                ty: 1,
                variables: vec![var("y", 16), var("x", 0)],
                ..CBufferDesc::default()
            },
        ],
        ..RdefDesc::default()
    });
    let blob = build_container(&[(FourCC::RDEF, &rdef), (FourCC::SHEX, &shex)]);

    let program = ShaderProgram::parse(&blob).unwrap();
    let order = |i: usize| -> Vec<String> {
        program.constant_buffers()[i]
            .variables
            .iter()
            .map(|v| v.name.clone())
            .collect()
    };
    assert_eq!(order(0), ["x", "y"]);
    assert_eq!(order(1), ["y", "x"]);
    assert_eq!(program.constant_buffers()[0].bind_point, None);
}

#[test]
fn program_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync + 'static>() {}
    assert_send_sync::<ShaderProgram>();
}
