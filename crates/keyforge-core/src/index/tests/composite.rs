use super::{composite, many, one, scalar};
use crate::{
    composite_key,
    error::ErrorClass,
    index::{
        ChangeEvent, CompositeIndexDefinition, IndexDefinition, KeyDefinition, KeyDelta,
        MapIndexBy, PropertyIndexDefinition, PropertyListIndexDefinition,
        PropertyMapIndexDefinition, Record,
    },
    value::{PropertyValue, Value},
};
use keyforge_primitives::PropertyType;

fn scalar_list_scalar() -> CompositeIndexDefinition {
    CompositeIndexDefinition::try_new(
        "testCollectionClass",
        [
            IndexDefinition::from(PropertyIndexDefinition::new(
                "testCollectionClass",
                "fOne",
                PropertyType::Integer,
            )),
            PropertyListIndexDefinition::new("testCollectionClass", "fTwo", PropertyType::Integer)
                .into(),
            PropertyIndexDefinition::new("testCollectionClass", "fThree", PropertyType::String)
                .into(),
        ],
    )
    .expect("valid composite definition")
}

fn scalar_then_list(null_values_ignored: bool) -> CompositeIndexDefinition {
    CompositeIndexDefinition::try_new(
        "C",
        [
            IndexDefinition::from(PropertyIndexDefinition::new("C", "fOne", PropertyType::Integer)),
            PropertyListIndexDefinition::new("C", "fTwo", PropertyType::Integer).into(),
        ],
    )
    .expect("valid composite definition")
    .with_null_values_ignored(null_values_ignored)
}

fn two_scalars() -> CompositeIndexDefinition {
    CompositeIndexDefinition::try_new(
        "C",
        [
            PropertyIndexDefinition::new("C", "fOne", PropertyType::Integer),
            PropertyIndexDefinition::new("C", "fTwo", PropertyType::String),
        ],
    )
    .expect("valid composite definition")
}

#[test]
fn accessors_flatten_children() {
    let def = scalar_list_scalar();

    assert_eq!(def.param_count(), 3);
    assert_eq!(def.field_names(), vec!["fOne", "fTwo", "fThree"]);
    assert_eq!(
        def.declared_types(),
        vec![PropertyType::Integer, PropertyType::Integer, PropertyType::String]
    );
    assert_eq!(def.multi_value_definition_index(), Some(1));
    assert_eq!(def.multi_value_field(), Some("fTwo"));
}

#[test]
fn scalars_build_one_composite_key() {
    let key = one(two_scalars().create_value(&[scalar(12), scalar("test")]).expect("build keys"));

    assert_eq!(key, composite(composite_key![12, "test"]));
}

#[test]
fn collection_child_expands_the_key() {
    let keys = many(
        scalar_list_scalar()
            .create_value(&[scalar(12), PropertyValue::list([1, 2]), scalar("test")])
            .expect("build keys"),
    );

    assert_eq!(
        keys,
        vec![
            composite(composite_key![12, 1, "test"]),
            composite(composite_key![12, 2, "test"]),
        ]
    );
}

#[test]
fn expansion_from_record() {
    let record = Record::new("testCollectionClass")
        .with("fOne", 12)
        .with("fTwo", PropertyValue::list([1, 2]))
        .with("fThree", "test");

    let keys = many(scalar_list_scalar().value_from_record(&record).expect("build keys from record"));

    assert_eq!(
        keys,
        vec![
            composite(composite_key![12, 1, "test"]),
            composite(composite_key![12, 2, "test"]),
        ]
    );
}

#[test]
fn missing_params_give_a_partial_key() {
    let key = one(two_scalars().create_value(&[scalar(12)]).expect("build keys"));

    assert_eq!(key, composite(composite_key![12]));
}

#[test]
fn trailing_params_are_ignored() {
    let key = one(
        two_scalars()
            .create_value(&[scalar(1), scalar("a"), scalar("extra")])
            .expect("build keys"),
    );

    assert_eq!(key, composite(composite_key![1, "a"]));
}

#[test]
fn empty_collection_with_nulls_ignored_drops_the_key() {
    let def = scalar_then_list(true);

    assert_eq!(
        def.create_value(&[scalar(12), PropertyValue::List(vec![])]).expect("build keys"),
        None
    );
}

#[test]
fn empty_collection_with_nulls_kept_yields_null_component() {
    let def = scalar_then_list(false);

    let keys = many(
        def.create_value(&[scalar(12), PropertyValue::List(vec![])])
            .expect("build keys"),
    );

    assert_eq!(keys, vec![composite(composite_key![12, Value::Null])]);
}

#[test]
fn null_scalar_follows_the_null_policy() {
    let ignored = two_scalars();
    let kept = two_scalars().with_null_values_ignored(false);

    assert_eq!(
        ignored.create_value(&[scalar(1), PropertyValue::NULL]).expect("build keys"),
        None
    );
    assert_eq!(
        one(kept.create_value(&[scalar(1), PropertyValue::NULL]).expect("build keys")),
        composite(composite_key![1, Value::Null])
    );
}

#[test]
fn second_collection_child_is_rejected_on_add() {
    let mut def = scalar_then_list(true);
    let err = def
        .add_definition(PropertyListIndexDefinition::new("C", "fThree", PropertyType::String))
        .expect_err("second collection must be rejected");

    assert_eq!(err.class, ErrorClass::Configuration);
}

#[test]
fn two_collections_at_use_are_rejected() {
    let nested = CompositeIndexDefinition::try_new(
        "C",
        [PropertyListIndexDefinition::new("C", "fOne", PropertyType::Integer)],
    )
    .expect("valid composite definition");
    let def = CompositeIndexDefinition::try_new(
        "C",
        [
            IndexDefinition::from(nested),
            PropertyListIndexDefinition::new("C", "fTwo", PropertyType::Integer).into(),
        ],
    )
    .expect("valid composite definition");

    let err = def
        .create_value(&[PropertyValue::list([1, 2]), PropertyValue::list([3, 4])])
        .expect_err("input must be rejected");

    assert_eq!(err.class, ErrorClass::Configuration);
}

#[test]
fn nested_composites_flatten() {
    let inner = two_scalars();
    let def = CompositeIndexDefinition::try_new(
        "C",
        [
            IndexDefinition::from(inner),
            PropertyIndexDefinition::new("C", "fThree", PropertyType::Long).into(),
        ],
    )
    .expect("valid composite definition");

    assert_eq!(def.param_count(), 3);
    let key = one(
        def.create_value(&[scalar(1), scalar("a"), scalar(2)])
            .expect("build keys"),
    );
    assert_eq!(key, composite(composite_key![1, "a", 2_i64]));
}

#[test]
fn single_value_uses_one_element() {
    let key = scalar_list_scalar()
        .create_single_value(&[scalar(12), scalar("7"), scalar("test")])
        .expect("single key");

    assert_eq!(key, Some(composite_key![12, 7, "test"]));
}

#[test]
fn single_value_with_null_is_dropped() {
    let key = scalar_list_scalar()
        .create_single_value(&[scalar(12), PropertyValue::NULL, scalar("test")])
        .expect("single key");

    assert_eq!(key, None);
}

#[test]
fn change_events_wrap_elements_with_siblings() {
    let def = scalar_list_scalar();
    let siblings = [scalar(12), scalar("test")];
    let mut delta = KeyDelta::new();

    def.process_change_event(&ChangeEvent::add(0, 1), &mut delta, &siblings)
        .expect("apply change event");
    def.process_change_event(&ChangeEvent::add(1, 2), &mut delta, &siblings)
        .expect("apply change event");
    def.process_change_event(&ChangeEvent::remove(0, 1), &mut delta, &siblings)
        .expect("apply change event");

    assert_eq!(delta.add_count(&composite(composite_key![12, 2, "test"])), 1);
    assert_eq!(delta.add_count(&composite(composite_key![12, 1, "test"])), 0);
    assert!(delta.keys_to_remove().is_empty());
}

#[test]
fn change_events_need_every_sibling() {
    let def = scalar_list_scalar();
    let mut delta = KeyDelta::new();

    let err = def
        .process_change_event(&ChangeEvent::add(0, 1), &mut delta, &[scalar(12)])
        .expect_err("event must be rejected");

    assert_eq!(err.class, ErrorClass::Configuration);
    assert!(delta.is_empty());
}

#[test]
fn change_events_need_a_collection_child() {
    let mut delta = KeyDelta::new();
    let err = two_scalars()
        .process_change_event(&ChangeEvent::add(0, 1), &mut delta, &[])
        .expect_err("event must be rejected");

    assert_eq!(err.class, ErrorClass::Configuration);
}

#[test]
fn map_child_change_events() {
    let def = CompositeIndexDefinition::try_new(
        "C",
        [
            IndexDefinition::from(PropertyMapIndexDefinition::new(
                "C",
                "attrs",
                PropertyType::String,
                MapIndexBy::ByKey,
            )),
            PropertyIndexDefinition::new("C", "owner", PropertyType::Integer).into(),
        ],
    )
    .expect("valid composite definition");
    let mut delta = KeyDelta::new();

    def.process_change_event(&ChangeEvent::add("color", "red"), &mut delta, &[scalar(5)])
        .expect("apply change event");
    def.process_change_event(
        &ChangeEvent::update("color", "blue", "red"),
        &mut delta,
        &[scalar(5)],
    )
    .expect("apply change event");

    assert_eq!(delta.add_count(&composite(composite_key!["color", 5])), 1);
    assert_eq!(delta.inserts(), 1);
    assert_eq!(delta.removes(), 0);
}

#[test]
fn fields_to_index_and_ddl() {
    let def = CompositeIndexDefinition::try_new(
        "C",
        [
            IndexDefinition::from(PropertyIndexDefinition::new("C", "fOne", PropertyType::Integer)),
            PropertyMapIndexDefinition::new("C", "fTwo", PropertyType::String, MapIndexBy::ByValue)
                .into(),
        ],
    )
    .expect("valid composite definition");

    assert_eq!(def.fields_to_index(), vec!["fOne", "fTwo by value"]);
    assert_eq!(
        def.to_create_index_ddl("idx", "NOTUNIQUE", None),
        "create index `idx` on `C` ( `fOne`, `fTwo` by value ) NOTUNIQUE"
    );
    assert_eq!(
        two_scalars().to_create_index_ddl("idx", "UNIQUE", Some("CELL_BTREE")),
        "create index `idx` on `C` ( `fOne`, `fTwo` ) UNIQUE ENGINE CELL_BTREE INTEGER, STRING"
    );
}
