#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
#[cfg(not(target_arch = "wasm32"))]
use dxbc::test_utils::{
    build_container, build_rdef_chunk, build_signature_chunk, tokens_to_bytes, CBufferDesc,
    RdefDesc, SignatureParamDesc, VariableDesc,
};
#[cfg(not(target_arch = "wasm32"))]
use dxbc::{FourCC, SignatureLayout};
#[cfg(not(target_arch = "wasm32"))]
use dxbc_sm4::{DecodeOptions, InstructionDecoder, Opcode, ShaderProgram};

#[cfg(not(target_arch = "wasm32"))]
fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(2))
        .sample_size(50)
}

#[cfg(not(target_arch = "wasm32"))]
fn opcode_token(opcode: Opcode, len: u32) -> u32 {
    opcode.raw() | (len << 24)
}

/// A pixel shader with `body_len` arithmetic instructions.
#[cfg(not(target_arch = "wasm32"))]
fn synthetic_program(body_len: usize) -> Vec<u32> {
    const R0_XYZW: u32 = 0x0010_00F2;
    const V0_SWIZZLE: u32 = 0x0010_1E46; // v0.xyzw
    const CB0_INDEXED: u32 = 0x0020_8E46 | (3 << 25); // cb0[r0.x + n].xyzw
    const R0_X: u32 = 0x0010_000A;

    let mut tokens = vec![0x50, 0];
    tokens.extend([opcode_token(Opcode::DclTemps, 2), 1]);
    tokens.extend([opcode_token(Opcode::DclInputPs, 3) | (2 << 11), 0x0010_10F2, 0]);
    for i in 0..body_len as u32 {
        // add r0, v0, cb0[r0.x + i]
        tokens.extend([
            opcode_token(Opcode::Add, 10),
            R0_XYZW,
            0,
            V0_SWIZZLE,
            0,
            CB0_INDEXED,
            0,
            i,
            R0_X,
            0,
        ]);
    }
    tokens.push(opcode_token(Opcode::Ret, 1));
    tokens[1] = tokens.len() as u32;
    tokens
}

#[cfg(not(target_arch = "wasm32"))]
fn synthetic_blob(body_len: usize) -> Vec<u8> {
    let shex = tokens_to_bytes(&synthetic_program(body_len));
    let names: Vec<String> = (0..32).map(|i| format!("var{i}")).collect();
    let rdef = build_rdef_chunk(&RdefDesc {
        shader_major: 5,
        constant_buffers: vec![CBufferDesc {
            name: "cb0",
            size: 32 * 16,
            variables: names
                .iter()
                .enumerate()
                .rev()
                .map(|(i, name)| VariableDesc {
                    name,
                    start_offset: i as u32 * 16,
                    size: 16,
                    ..VariableDesc::default()
                })
                .collect(),
            ..CBufferDesc::default()
        }],
        ..RdefDesc::default()
    });
    let isgn = build_signature_chunk(
        SignatureLayout::Basic,
        &[SignatureParamDesc::float4("TEXCOORD", 0)],
    );
    build_container(&[
        (FourCC::RDEF, &rdef),
        (FourCC::ISGN, &isgn),
        (FourCC::SHEX, &shex),
    ])
}

#[cfg(not(target_arch = "wasm32"))]
fn bench_token_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("sm4_decode");
    for body_len in [16usize, 256, 4096] {
        let bytes = tokens_to_bytes(&synthetic_program(body_len));
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(body_len), &bytes, |b, bytes| {
            b.iter(|| {
                let decoder = InstructionDecoder::new(black_box(bytes), DecodeOptions::default())
                    .expect("aligned token chunk");
                black_box(decoder.decode().expect("valid program"))
            });
        });
    }
    group.finish();
}

#[cfg(not(target_arch = "wasm32"))]
fn bench_program_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("program_parse");
    for body_len in [16usize, 1024] {
        let blob = synthetic_blob(body_len);
        group.throughput(Throughput::Bytes(blob.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(body_len), &blob, |b, blob| {
            b.iter(|| black_box(ShaderProgram::parse(black_box(blob)).expect("valid blob")));
        });
    }
    group.finish();
}

#[cfg(not(target_arch = "wasm32"))]
criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_token_decode, bench_program_parse
}
#[cfg(not(target_arch = "wasm32"))]
criterion_main!(benches);
