use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    serialize::{SerializeErrorKind, deserialize_bounded, serialize},
};

#[test]
fn bounded_decode_refuses_oversized_payloads() {
    let bytes = serialize(&vec![7_u32; 32]).expect("serialize");

    let err = deserialize_bounded::<Vec<u32>>(&bytes, bytes.len() - 1)
        .expect_err("payload exceeds the limit");
    assert_eq!(err.kind(), SerializeErrorKind::DeserializeSizeLimitExceeded);

    let err = InternalError::from(err);
    assert_eq!(err.class, ErrorClass::Unsupported);
    assert_eq!(err.origin, ErrorOrigin::Serialize);
}

#[test]
fn undecodable_bytes_are_corruption() {
    let err = deserialize_bounded::<Vec<u32>>(&[0xff, 0x00, 0x13], 64)
        .expect_err("garbage must not decode");
    assert_eq!(err.kind(), SerializeErrorKind::Deserialize);
    assert!(InternalError::from(err).is_corruption());
}

#[test]
fn bounded_decode_accepts_payloads_at_the_limit() {
    let bytes = serialize(&("index", 3_u8)).expect("serialize");
    let decoded: (String, u8) = deserialize_bounded(&bytes, bytes.len()).expect("decode");

    assert_eq!(decoded, ("index".to_string(), 3));
}

#[test]
fn kinds_map_to_stable_classes() {
    assert_eq!(SerializeErrorKind::Serialize.class(), ErrorClass::Internal);
    assert_eq!(SerializeErrorKind::Deserialize.class(), ErrorClass::Corruption);
}
