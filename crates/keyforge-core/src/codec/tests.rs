use crate::{
    codec::{
        BinaryValueSerializer, CodecError, CodecKind, CompactCodec, LogDeltaCodec,
        PositionedCodec, PageChanges, WalChanges, WireCodec,
        error::{
            ERR_INVALID_BOOLEAN, ERR_INVALID_SIZE, ERR_NESTED_COMPOSITE, ERR_SIZE_MISMATCH, ERR_TRUNCATED_KEY,
            ERR_UNKNOWN_TYPE_CODE,
        },
    },
    MAX_KEY_BYTES, composite_key,
    error::{ErrorDetail, InternalError},
    key::CompositeKey,
    types::{Date, DateTime, Decimal, RecordId},
    value::Value,
};
use keyforge_primitives::PropertyType;
use proptest::prelude::*;
use std::io::Cursor;

fn sample_key() -> CompositeKey {
    composite_key![
        Value::Null,
        true,
        7_i8,
        -12_i16,
        12_i32,
        -9_000_000_000_i64,
        1.5_f32,
        -2.25_f64,
        Decimal::new(-12_345, 3),
        "test",
        vec![0_u8, 255, 3],
        Date::new(2020, 2, 29).expect("valid date"),
        DateTime::from_millis(1_600_000_000_123),
        RecordId::new(12, 1_000_000),
        RecordId::new(-1, -1),
        Value::Null,
    ]
}

fn corrupt_reason(err: &InternalError) -> Option<&'static str> {
    match &err.detail {
        Some(ErrorDetail::Codec(CodecError::Corrupt { reason, .. })) => Some(*reason),
        _ => None,
    }
}

// ---- compact -----------------------------------------------------------

#[test]
fn compact_round_trips_every_kind() {
    let key = sample_key();
    let size = CompactCodec::size(&key).expect("size");

    let mut buffer = vec![0xAA; size + 10];
    let written = CompactCodec::write(&key, &mut buffer, 10).expect("write");
    assert_eq!(written, size);

    let (decoded, consumed) = CompactCodec::read(&buffer, 10).expect("read");
    assert_eq!(decoded, key);
    assert_eq!(consumed, size);
    assert_eq!(CompactCodec::size_at(&buffer, 10).expect("header"), size);
}

#[test]
fn empty_key_is_header_only() {
    let bytes = CompactCodec::to_vec(&CompositeKey::new()).expect("encode");
    assert_eq!(bytes, vec![0, 0, 0, 8, 0, 0, 0, 0]);
}

#[test]
fn compact_layout_is_stable() {
    let bytes = CompactCodec::to_vec(&composite_key![1_i32, Value::Null]).expect("encode");

    assert_eq!(
        bytes,
        vec![
            0, 0, 0, 14, // total size
            0, 0, 0, 2, // component count
            1, 0, 0, 0, 1, // INTEGER 1
            0xFE, // NULL
        ]
    );
}

#[test]
fn compact_rejects_short_destination() {
    let key = composite_key!["abc"];
    let mut buffer = vec![0; 4];

    let err = CompactCodec::write(&key, &mut buffer, 0).expect_err("encode must fail");
    assert!(matches!(
        err.detail,
        Some(ErrorDetail::Codec(CodecError::BufferTooSmall { .. }))
    ));
    assert_eq!(buffer, vec![0; 4]);
}

#[test]
fn truncated_input_is_corruption() {
    let bytes = CompactCodec::to_vec(&composite_key!["hello", 5_i64]).expect("encode");

    for cut in 0..bytes.len() {
        let err = CompactCodec::read(&bytes[..cut], 0).expect_err("corrupt input must fail");
        assert!(err.is_corruption(), "cut at {cut} must be corruption");
    }
}

#[test]
fn unknown_type_code_is_corruption() {
    let bytes = vec![0, 0, 0, 9, 0, 0, 0, 1, 0x7F];
    let err = CompactCodec::read(&bytes, 0).expect_err("corrupt input must fail");

    assert_eq!(corrupt_reason(&err), Some(ERR_UNKNOWN_TYPE_CODE));
}

#[test]
fn nested_composite_code_is_rejected_on_disk() {
    let bytes = vec![0, 0, 0, 13, 0, 0, 0, 1, 0xFF, 0, 0, 0, 0];
    let err = CompactCodec::read(&bytes, 0).expect_err("corrupt input must fail");

    assert_eq!(corrupt_reason(&err), Some(ERR_NESTED_COMPOSITE));
}

#[test]
fn invalid_boolean_byte_is_corruption() {
    let bytes = vec![0, 0, 0, 10, 0, 0, 0, 1, 0, 2];
    let err = CompactCodec::read(&bytes, 0).expect_err("corrupt input must fail");

    assert_eq!(corrupt_reason(&err), Some(ERR_INVALID_BOOLEAN));
}

#[test]
fn declared_size_must_match_content() {
    let mut bytes = CompactCodec::to_vec(&composite_key![1_i32]).expect("encode");
    bytes[3] += 1;
    bytes.push(0);

    let err = CompactCodec::read(&bytes, 0).expect_err("corrupt input must fail");
    assert_eq!(corrupt_reason(&err), Some(ERR_SIZE_MISMATCH));
}

#[test]
fn read_past_end_reports_truncation() {
    let err = CompactCodec::read(&[], 3).expect_err("corrupt input must fail");
    assert_eq!(corrupt_reason(&err), Some(ERR_TRUNCATED_KEY));
}

#[test]
fn size_header_outside_key_range_is_corruption() {
    let too_small = [0, 0, 0, 3, 0, 0, 0, 0];
    let err = CompactCodec::size_at(&too_small, 0).expect_err("below header length");
    assert_eq!(corrupt_reason(&err), Some(ERR_INVALID_SIZE));

    let too_large = u32::try_from(MAX_KEY_BYTES + 1).expect("fits u32").to_be_bytes();
    let err = CompactCodec::size_at(&too_large, 0).expect_err("above key bound");
    assert_eq!(corrupt_reason(&err), Some(ERR_INVALID_SIZE));

    let valid = CompactCodec::to_vec(&composite_key!["ok"]).expect("encode");
    assert_eq!(CompactCodec::size_at(&valid, 0).expect("header"), valid.len());
}

#[test]
fn composite_components_cannot_be_sized_for_disk() {
    let err = super::component::payload_size(
        &Value::Composite(composite_key![1_i32]),
        CodecKind::Compact,
    )
    .expect_err("nested composite has no disk size");

    assert!(matches!(err, CodecError::UnsupportedType { .. }));
}

#[test]
fn fixed_width_components_follow_the_type_registry() {
    let fixed = [
        Value::Boolean(true),
        Value::Byte(-1),
        Value::Short(3),
        Value::Integer(4),
        Value::Long(5),
        Value::Float(0.5),
        Value::Double(-0.5),
        Value::Date(Date::new(2001, 1, 1).expect("valid date")),
        Value::DateTime(DateTime::from_millis(42)),
    ];

    for value in fixed {
        let declared = value
            .property_type()
            .and_then(PropertyType::fixed_size)
            .expect("fixed-width type");
        let size = super::component::payload_size(&value, CodecKind::Compact).expect("size");
        assert_eq!(size, declared, "{}", value.kind_label());

        // type code plus payload on top of the header
        let bytes = CompactCodec::to_vec(&composite_key![value]).expect("encode");
        assert_eq!(bytes.len(), 8 + 1 + declared);
    }

    assert_eq!(PropertyType::String.fixed_size(), None);
    assert_eq!(PropertyType::Decimal.fixed_size(), None);
}

// ---- positioned --------------------------------------------------------

#[test]
fn positioned_matches_compact_bytes() {
    let key = sample_key();
    let mut out = Vec::new();

    let written = PositionedCodec::write(&key, &mut out).expect("write");
    assert_eq!(written, PositionedCodec::size(&key).expect("size"));
    assert_eq!(out, CompactCodec::to_vec(&key).expect("compact"));

    let mut cursor = out.as_slice();
    let (decoded, consumed) = PositionedCodec::read(&mut cursor).expect("read");
    assert_eq!(decoded, key);
    assert_eq!(consumed, written);
    assert!(cursor.is_empty());
}

#[test]
fn positioned_reads_back_to_back_keys() {
    let first = composite_key![1_i32, "a"];
    let second = composite_key![Value::Null];

    let mut out = Vec::new();
    PositionedCodec::write(&first, &mut out).expect("first");
    PositionedCodec::write(&second, &mut out).expect("second");

    let mut cursor = out.as_slice();
    assert_eq!(PositionedCodec::read(&mut cursor).expect("first").0, first);
    assert_eq!(PositionedCodec::read(&mut cursor).expect("second").0, second);
}

#[test]
fn positioned_write_checks_remaining_capacity() {
    let key = composite_key!["too long for the slice"];
    let mut backing = [0u8; 8];
    let mut slice = &mut backing[..];

    let err = PositionedCodec::write(&key, &mut slice).expect_err("encode must fail");
    assert!(!err.is_corruption());
    assert_eq!(backing, [0u8; 8]);
}

// ---- log delta ---------------------------------------------------------

#[test]
fn log_delta_writes_only_through_the_tracker() {
    let key = sample_key();
    let page = vec![0u8; 512];
    let mut changes = PageChanges::new();

    let written = LogDeltaCodec::write(&key, &page, &mut changes, 40).expect("write");
    assert_eq!(written, LogDeltaCodec::size(&key).expect("size"));
    assert!(page.iter().all(|b| *b == 0));

    // contiguous puts coalesce into a single range
    assert_eq!(changes.changes().len(), 1);
    assert_eq!(changes.changes()[0].offset(), 40);
    assert_eq!(changes.changed_bytes(), written);

    let (decoded, consumed) = LogDeltaCodec::read(&page, &changes, 40).expect("read");
    assert_eq!(decoded, key);
    assert_eq!(consumed, written);
}

#[test]
fn replayed_delta_matches_compact_encoding() {
    let key = composite_key![RecordId::new(3, 99), "x"];
    let mut page = vec![0u8; 64];
    let mut changes = PageChanges::new();

    let written = LogDeltaCodec::write(&key, &page, &mut changes, 0).expect("write");
    changes.apply_to(&mut page);

    assert_eq!(&page[..written], CompactCodec::to_vec(&key).expect("compact"));
    assert_eq!(CompactCodec::read(&page, 0).expect("read").0, key);
}

#[test]
fn later_ranges_overlay_earlier_ones() {
    let page = vec![1u8; 8];
    let mut changes = PageChanges::new();
    changes.set_binary_value(&page, &[2, 2, 2], 2);
    changes.set_binary_value(&page, &[9], 3);

    assert_eq!(
        changes.binary_value(&page, 0, 8),
        Some(vec![1, 1, 2, 9, 2, 1, 1, 1])
    );
    assert_eq!(changes.binary_value(&page, 6, 4), None);
}

#[test]
fn log_delta_rejects_writes_past_the_page() {
    let page = vec![0u8; 16];
    let mut changes = PageChanges::new();

    let err = LogDeltaCodec::write(&composite_key!["abcdefgh"], &page, &mut changes, 4)
        .expect_err("encode must fail");
    assert!(matches!(
        err.detail,
        Some(ErrorDetail::Codec(CodecError::BufferTooSmall { .. }))
    ));
    assert!(changes.is_empty());
}

// ---- wire --------------------------------------------------------------

#[test]
fn wire_round_trips_and_reports_size() {
    let codec = WireCodec::binary();
    let key = sample_key();

    let mut out = Vec::new();
    let written = codec.write(&key, &mut out).expect("write");
    assert_eq!(written, out.len());
    assert_eq!(codec.size(&key).expect("size"), written);

    let (decoded, consumed) = codec.read(&mut Cursor::new(&out)).expect("read");
    assert_eq!(decoded, key);
    assert_eq!(consumed, written);
}

#[test]
fn wire_carries_nested_composite_values() {
    let codec = WireCodec::new(BinaryValueSerializer);
    let inner = composite_key![1_i32, "a"];
    let value = Value::Composite(composite_key![Value::Composite(inner.clone()), 2_i64]);

    let mut out = Vec::new();
    let written = codec.write_value(&value, &mut out).expect("write");
    let (decoded, consumed) = codec.read_value(&mut Cursor::new(&out)).expect("read");

    assert_eq!(consumed, written);
    // building the outer key flattened the inner one
    assert_eq!(decoded, Value::Composite(composite_key![1_i32, "a", 2_i64]));
}

#[test]
fn wire_key_read_flattens_nested_components() {
    let codec = WireCodec::binary();

    // [count=2] [composite(count=1, INTEGER 4)] [STRING "z"]
    let mut bytes = vec![0, 0, 0, 2];
    bytes.extend_from_slice(&[0xFF, 0, 0, 0, 1, 1, 0, 0, 0, 4]);
    bytes.extend_from_slice(&[7, 0, 0, 0, 1, b'z']);

    let (key, consumed) = codec.read(&mut Cursor::new(&bytes)).expect("read");
    assert_eq!(key, composite_key![4_i32, "z"]);
    assert_eq!(consumed, bytes.len());
}

#[test]
fn wire_truncation_is_corruption() {
    let codec = WireCodec::binary();
    let mut out = Vec::new();
    codec.write(&composite_key!["abc", 1_i32], &mut out).expect("write");
    out.pop();

    let err = codec.read(&mut Cursor::new(&out)).expect_err("corrupt input must fail");
    assert!(err.is_corruption());
}

#[test]
fn wire_rejects_runaway_nesting() {
    let codec = WireCodec::binary();

    let mut bytes = Vec::new();
    for _ in 0..=super::MAX_WIRE_DEPTH + 1 {
        bytes.extend_from_slice(&[0xFF, 0, 0, 0, 1]);
    }
    bytes.push(0xFE);

    let err = codec.read_value(&mut Cursor::new(&bytes)).expect_err("corrupt input must fail");
    assert!(err.is_corruption());
}

// ---- property: every codec agrees ---------------------------------------

fn arb_component() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        any::<i8>().prop_map(Value::Byte),
        any::<i16>().prop_map(Value::Short),
        any::<i32>().prop_map(Value::Integer),
        any::<i64>().prop_map(Value::Long),
        any::<f32>().prop_map(Value::Float),
        any::<f64>().prop_map(Value::Double),
        (any::<i64>(), 0u32..=28).prop_map(|(m, s)| Value::Decimal(Decimal::new(m, s))),
        ".{0,12}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Binary),
        (-1_000_000_i64..1_000_000).prop_map(|days| {
            Value::Date(Date::from_millis(days * 86_400_000).expect("in range"))
        }),
        any::<i64>().prop_map(|ms| Value::DateTime(DateTime::from_millis(ms))),
        (any::<i16>(), any::<i64>()).prop_map(|(c, p)| Value::Link(RecordId::new(c, p))),
    ]
}

fn arb_key() -> impl Strategy<Value = CompositeKey> {
    prop::collection::vec(arb_component(), 0..8).prop_map(CompositeKey::from_values)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn all_codecs_round_trip_with_exact_sizes(key in arb_key()) {
        let size = CompactCodec::size(&key).expect("size");

        let compact = CompactCodec::to_vec(&key).expect("compact");
        prop_assert_eq!(compact.len(), size);
        let (decoded, consumed) = CompactCodec::read(&compact, 0).expect("compact read");
        prop_assert_eq!(&decoded, &key);
        prop_assert_eq!(consumed, size);

        let mut positioned = Vec::new();
        PositionedCodec::write(&key, &mut positioned).expect("positioned");
        prop_assert_eq!(&positioned, &compact);
        let (decoded, consumed) =
            PositionedCodec::read(&mut positioned.as_slice()).expect("positioned read");
        prop_assert_eq!(&decoded, &key);
        prop_assert_eq!(consumed, size);

        let page = vec![0u8; size + 3];
        let mut changes = PageChanges::new();
        LogDeltaCodec::write(&key, &page, &mut changes, 3).expect("delta");
        let (decoded, consumed) = LogDeltaCodec::read(&page, &changes, 3).expect("delta read");
        prop_assert_eq!(&decoded, &key);
        prop_assert_eq!(consumed, size);

        let wire = WireCodec::binary();
        let mut stream = Vec::new();
        let written = wire.write(&key, &mut stream).expect("wire");
        prop_assert_eq!(wire.size(&key).expect("wire size"), written);
        let (decoded, consumed) = wire.read(&mut Cursor::new(&stream)).expect("wire read");
        prop_assert_eq!(&decoded, &key);
        prop_assert_eq!(consumed, written);
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = CompactCodec::read(&bytes, 0);
        let _ = PositionedCodec::read(&mut bytes.as_slice());
        let _ = WireCodec::binary().read(&mut Cursor::new(&bytes));
        let _ = CompactCodec::size_at(&bytes, 0);
        for offset in [0, bytes.len() / 2] {
            let _ = LogDeltaCodec::read(&bytes, &PageChanges::new(), offset);
        }
    }
}
