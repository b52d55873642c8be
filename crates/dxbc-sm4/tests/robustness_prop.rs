#![cfg(not(target_arch = "wasm32"))]

use dxbc::test_utils::{build_container, tokens_to_bytes};
use dxbc::FourCC;
use dxbc_sm4::{
    ComponentCount, ComponentSelection, DecodeOptions, ImmediateValues, IndexRepresentation,
    InstructionDecoder, Operand, OperandDecoder, OperandIndex, OperandType, ShaderProgram,
    TokenCursor,
};
use proptest::prelude::*;

const PS_5_0: u32 = 0x0000_0050;

fn non_immediate_type() -> impl Strategy<Value = OperandType> {
    (0u32..=40).prop_filter_map("immediate types carry values, not indices", |raw| {
        OperandType::from_raw(raw).filter(|ty| !ty.is_immediate())
    })
}

fn components() -> impl Strategy<Value = (ComponentCount, Option<ComponentSelection>)> {
    prop_oneof![
        Just((ComponentCount::Zero, None)),
        Just((ComponentCount::One, None)),
        (0u8..16).prop_map(|m| (ComponentCount::Four, Some(ComponentSelection::Mask(m)))),
        prop::array::uniform4(0u8..4)
            .prop_map(|s| (ComponentCount::Four, Some(ComponentSelection::Swizzle(s)))),
        (0u8..4).prop_map(|l| (ComponentCount::Four, Some(ComponentSelection::Scalar(l)))),
    ]
}

fn immediate_index() -> impl Strategy<Value = OperandIndex> {
    prop_oneof![
        any::<i32>().prop_map(|d| OperandIndex {
            representation: IndexRepresentation::Immediate32,
            displacement: i64::from(d),
            relative: None,
        }),
        any::<i64>().prop_map(|d| OperandIndex {
            representation: IndexRepresentation::Immediate64,
            displacement: d,
            relative: None,
        }),
    ]
}

fn any_index(inner: BoxedStrategy<Operand>) -> impl Strategy<Value = OperandIndex> {
    prop_oneof![
        immediate_index(),
        inner.clone().prop_map(|r| OperandIndex {
            representation: IndexRepresentation::Relative,
            displacement: 0,
            relative: Some(Box::new(r)),
        }),
        (any::<i32>(), inner.clone()).prop_map(|(d, r)| OperandIndex {
            representation: IndexRepresentation::Immediate32PlusRelative,
            displacement: i64::from(d),
            relative: Some(Box::new(r)),
        }),
        (any::<i64>(), inner).prop_map(|(d, r)| OperandIndex {
            representation: IndexRepresentation::Immediate64PlusRelative,
            displacement: d,
            relative: Some(Box::new(r)),
        }),
    ]
}

fn register_operand(
    indices: impl Strategy<Value = Vec<OperandIndex>>,
) -> impl Strategy<Value = Operand> {
    (non_immediate_type(), components(), indices, any::<bool>(), any::<bool>()).prop_map(
        |(ty, (components, selection), indices, negate, absolute)| Operand {
            components,
            selection,
            indices,
            negate,
            absolute,
            ..Operand::new(ty)
        },
    )
}

fn immediate_operand() -> impl Strategy<Value = Operand> {
    prop_oneof![
        any::<u32>().prop_map(|v| Operand {
            components: ComponentCount::One,
            immediate: Some(ImmediateValues::Bits32(vec![v])),
            ..Operand::new(OperandType::Immediate32)
        }),
        prop::array::uniform4(any::<u32>()).prop_map(|v| Operand {
            components: ComponentCount::Four,
            selection: Some(ComponentSelection::Mask(0xF)),
            immediate: Some(ImmediateValues::Bits32(v.to_vec())),
            ..Operand::new(OperandType::Immediate32)
        }),
        any::<u64>().prop_map(|v| Operand {
            components: ComponentCount::One,
            immediate: Some(ImmediateValues::Bits64(vec![v])),
            ..Operand::new(OperandType::Immediate64)
        }),
    ]
}

fn operand() -> impl Strategy<Value = Operand> {
    let leaf = prop_oneof![
        register_operand(prop::collection::vec(immediate_index(), 0..=3)),
        immediate_operand(),
    ];
    // Three levels of nesting stays inside the default relative-depth limit.
    leaf.prop_recursive(3, 24, 3, |inner| {
        register_operand(prop::collection::vec(any_index(inner.boxed()), 0..=3))
    })
}

fn biased_token() -> impl Strategy<Value = u32> {
    prop_oneof![
        any::<u32>(),
        // plausible opcode tokens with short lengths
        (0u32..=206, 0u32..=8, 0u32..0x40).prop_map(|(op, len, controls)| {
            op | (controls << 11) | (len << 24)
        }),
        // small register indices and counts
        0u32..16,
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        rng_algorithm: proptest::test_runner::RngAlgorithm::ChaCha,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0xD8_BC_05),
        .. ProptestConfig::default()
    })]

    #[test]
    fn operand_encoding_roundtrips(op in operand()) {
        let mut tokens = Vec::new();
        op.encode(&mut tokens);
        let bytes = tokens_to_bytes(&tokens);

        let mut cursor = TokenCursor::new(&bytes).unwrap();
        let decoded = OperandDecoder::new(4).decode(&mut cursor).unwrap();
        prop_assert_eq!(&decoded, &op);
        prop_assert_eq!(cursor.position(), tokens.len());
    }

    #[test]
    fn instruction_decoder_never_panics(body in prop::collection::vec(biased_token(), 0..64)) {
        let mut tokens = vec![PS_5_0, body.len() as u32 + 2];
        tokens.extend_from_slice(&body);
        let bytes = tokens_to_bytes(&tokens);

        let res = std::panic::catch_unwind(|| {
            InstructionDecoder::new(&bytes, DecodeOptions::default()).and_then(|d| d.decode())
        });
        prop_assert!(res.is_ok());
    }

    #[test]
    fn program_parse_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let res = std::panic::catch_unwind(|| ShaderProgram::parse(&bytes));
        prop_assert!(res.is_ok());
    }

    #[test]
    fn program_parse_of_random_token_chunk_never_panics(
        body in prop::collection::vec(biased_token(), 0..64),
        declared in 0u32..80,
    ) {
        let mut tokens = vec![PS_5_0, declared];
        tokens.extend_from_slice(&body);
        let shex = tokens_to_bytes(&tokens);
        let blob = build_container(&[(FourCC::SHEX, &shex)]);

        let res = std::panic::catch_unwind(|| ShaderProgram::parse(&blob));
        prop_assert!(res.is_ok());
    }
}
