use dxbc::test_utils::build_container;
use dxbc::{DxbcError, DxbcFile, FourCC};

#[test]
fn chunks_iterate_in_file_order() {
    let bytes = build_container(&[
        (FourCC::RDEF, &[1, 2, 3, 4]),
        (FourCC::ISGN, &[]),
        (FourCC::SHEX, &[5, 6, 7, 8, 9, 10, 11, 12]),
    ]);
    let file = DxbcFile::parse(&bytes).expect("parse container");
    let tags: Vec<_> = file.chunks().map(|c| c.fourcc).collect();
    assert_eq!(tags, vec![FourCC::RDEF, FourCC::ISGN, FourCC::SHEX]);

    let shader = file
        .find_first_of(&[FourCC::SHDR, FourCC::SHEX])
        .expect("shader chunk");
    assert_eq!(shader.fourcc, FourCC::SHEX);
    assert_eq!(shader.data.len(), 8);
}

#[test]
fn duplicate_tags_resolve_to_first() {
    let bytes = build_container(&[(FourCC::SHDR, &[1, 0, 0, 0]), (FourCC::SHDR, &[2, 0, 0, 0])]);
    let file = DxbcFile::parse(&bytes).expect("parse container");
    assert_eq!(file.get_chunk(FourCC::SHDR).unwrap().data, &[1, 0, 0, 0]);
}

#[test]
fn trailing_bytes_past_total_size_are_ignored() {
    let mut bytes = build_container(&[(FourCC::SHDR, &[0u8; 8])]);
    bytes.extend_from_slice(&[0xEE; 32]);
    let file = DxbcFile::parse(&bytes).expect("parse container");
    assert_eq!(file.header().total_size as usize, bytes.len() - 32);
}

#[test]
fn total_size_larger_than_buffer_is_rejected() {
    let bytes = build_container(&[(FourCC::SHDR, &[0u8; 8])]);
    let err = DxbcFile::parse(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, DxbcError::MalformedHeader(_)), "{err}");
}

#[test]
fn debug_summary_lists_chunks() {
    let bytes = build_container(&[(FourCC::SHEX, &[0u8; 8]), (FourCC::RDEF, &[0u8; 28])]);
    let file = DxbcFile::parse(&bytes).expect("parse container");
    let summary = file.debug_summary();
    assert!(summary.starts_with("DXBC total_size="), "{summary}");
    assert!(summary.contains("[00] SHEX 8 bytes"), "{summary}");
    assert!(summary.contains("[01] RDEF 28 bytes"), "{summary}");
}

#[test]
fn truncating_any_container_never_panics() {
    let bytes = build_container(&[(FourCC::SHEX, &[0u8; 8]), (FourCC::RDEF, &[0u8; 28])]);
    for len in 0..bytes.len() {
        let _ = DxbcFile::parse(&bytes[..len]);
    }
}
