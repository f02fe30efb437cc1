//! Save, mutate and encode flow across definitions, reconciler and codecs.

use keyforge_core::{
    codec::{CompactCodec, LogDeltaCodec, PageChanges, PositionedCodec, WireCodec},
    composite_key,
    index::FieldSource,
    prelude::*,
};
use std::collections::BTreeSet;

fn post_index() -> CompositeIndexDefinition {
    CompositeIndexDefinition::try_new(
        "Post",
        [
            IndexDefinition::from(PropertyIndexDefinition::new("Post", "author", PropertyType::Link)),
            PropertyListIndexDefinition::new("Post", "tags", PropertyType::String).into(),
            PropertyIndexDefinition::new("Post", "published", PropertyType::Date).into(),
        ],
    )
    .expect("valid composite definition")
}

fn stored_keys(def: &CompositeIndexDefinition, record: &dyn FieldSource) -> BTreeSet<Vec<u8>> {
    def.value_from_record(record)
        .expect("build keys from record")
        .map(IndexKeys::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|key| {
            let Value::Composite(key) = key else {
                panic!("composite definitions build composite keys");
            };
            CompactCodec::to_vec(&key).expect("encode")
        })
        .collect()
}

#[test]
fn incremental_delta_matches_full_rebuild() {
    let def = post_index();
    let author = RecordId::new(10, 3);

    let before = Record::new("Post")
        .with("author", author)
        .with("tags", PropertyValue::list(["rust", "db"]))
        .with("published", "2024-05-01");
    let after = before
        .clone()
        .with("tags", PropertyValue::list(["rust", "index"]));

    // the tag list went from [rust, db] to [rust, index]
    let events = [ChangeEvent::update(1, "index", "db")];
    let siblings = [
        PropertyValue::from(author),
        PropertyValue::from("2024-05-01"),
    ];
    let delta = IndexDefinition::from(def.clone())
        .reconcile(&events, &siblings)
        .expect("reconcile events");

    let old_keys = stored_keys(&def, &before);
    let new_keys = stored_keys(&def, &after);

    let encode = |keys: &std::collections::HashMap<Value, u64>| -> BTreeSet<Vec<u8>> {
        keys.keys()
            .map(|key| CompactCodec::to_vec(key.as_composite().expect("composite key")).expect("encode"))
            .collect()
    };

    let added: BTreeSet<_> = new_keys.difference(&old_keys).cloned().collect();
    let removed: BTreeSet<_> = old_keys.difference(&new_keys).cloned().collect();

    assert_eq!(encode(delta.keys_to_add()), added);
    assert_eq!(encode(delta.keys_to_remove()), removed);
}

#[test]
fn every_codec_agrees_on_a_built_key() {
    let def = post_index();
    let record = Record::new("Post")
        .with("author", RecordId::new(1, 99))
        .with("tags", PropertyValue::list(["a"]))
        .with("published", "2023-01-31");

    let keys = def
        .value_from_record(&record)
        .expect("build keys from record")
        .expect("record produces keys")
        .into_vec();
    let Value::Composite(key) = &keys[0] else {
        panic!("expected a composite key");
    };

    let compact = CompactCodec::to_vec(key).expect("encode");

    let mut positioned = Vec::new();
    let written = PositionedCodec::write(key, &mut positioned).expect("encode");
    assert_eq!(positioned, compact);
    assert_eq!(written, compact.len());

    let page = vec![0u8; 256];
    let mut changes = PageChanges::new();
    LogDeltaCodec::write(key, &page, &mut changes, 16).expect("encode");
    let (from_log, consumed) = LogDeltaCodec::read(&page, &changes, 16).expect("decode");
    assert_eq!(&from_log, key);
    assert_eq!(consumed, compact.len());

    let wire = WireCodec::binary();
    let mut stream = Vec::new();
    let sent = wire.write(key, &mut stream).expect("encode");
    let (received, read) = wire.read(&mut stream.as_slice()).expect("decode");
    assert_eq!(&received, key);
    assert_eq!(sent, read);
    assert_eq!(sent, wire.size(key).expect("size"));
}

#[test]
fn persisted_definition_builds_identical_keys() {
    let def = IndexDefinition::from(post_index());
    let restored = IndexDefinition::from_bytes(&def.to_bytes().expect("encode definition")).expect("decode definition");

    let params = [
        PropertyValue::from(RecordId::new(2, 2)),
        PropertyValue::list(["x", "y"]),
        PropertyValue::from("2020-02-29"),
    ];

    assert_eq!(
        restored.create_value(&params).expect("build keys"),
        def.create_value(&params).expect("build keys")
    );
    assert_eq!(
        def.create_value(&params).expect("build keys").map(|keys| keys.len()),
        Some(2)
    );
}

#[test]
fn composite_key_macro_matches_built_keys() {
    let def = SimpleKeyIndexDefinition::new([PropertyType::Integer, PropertyType::String]);
    let built = def
        .create_value(&[PropertyValue::from(7), PropertyValue::from("seven")])
        .expect("build keys");

    assert_eq!(
        built,
        Some(IndexKeys::One(Value::Composite(composite_key![7, "seven"])))
    );
}
