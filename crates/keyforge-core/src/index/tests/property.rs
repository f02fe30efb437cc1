use super::{one, scalar};
use crate::{
    error::{ErrorClass, ErrorDetail},
    index::{
        Collate, IndexDefinition, KeyDefinition, PropertyIndexDefinition, Record,
    },
    types::{Date, RecordId},
    value::{CoercionError, PropertyValue, Value},
};
use keyforge_primitives::PropertyType;

fn age_index() -> PropertyIndexDefinition {
    PropertyIndexDefinition::new("Person", "age", PropertyType::Integer)
}

#[test]
fn contract_accessors() {
    let def = age_index();

    assert_eq!(def.class_name(), Some("Person"));
    assert_eq!(def.field_names(), vec!["age"]);
    assert_eq!(def.declared_types(), vec![PropertyType::Integer]);
    assert_eq!(def.param_count(), 1);
    assert!(def.is_null_values_ignored());
}

#[test]
fn coerces_the_single_param() {
    let def = age_index();

    let key = one(def.create_value(&[scalar("12")]).expect("build keys"));
    assert_eq!(key, Value::Integer(12));

    let key = one(def.create_value(&[scalar(12_i64)]).expect("build keys"));
    assert_eq!(key, Value::Integer(12));
}

#[test]
fn trailing_params_are_ignored() {
    let key = one(
        age_index()
            .create_value(&[scalar(7), scalar("ignored"), scalar(true)])
            .expect("build keys"),
    );

    assert_eq!(key, Value::Integer(7));
}

#[test]
fn null_or_missing_param_yields_no_key() {
    let def = age_index();

    assert_eq!(def.create_value(&[PropertyValue::NULL]).expect("build keys"), None);
    assert_eq!(def.create_value(&[]).expect("build keys"), None);
}

#[test]
fn coercion_failure_names_the_field() {
    let err = age_index().create_value(&[scalar("twelve")]).expect_err("input must be rejected");

    assert_eq!(err.class, ErrorClass::Coercion);
    assert!(err.message.contains("age"), "{}", err.message);
    match err.detail {
        Some(ErrorDetail::Coercion { field, source }) => {
            assert_eq!(field.as_deref(), Some("age"));
            assert!(matches!(
                source,
                CoercionError::Incompatible {
                    expected: PropertyType::Integer,
                    ..
                }
            ));
        }
        other => panic!("unexpected detail: {other:?}"),
    }
}

#[test]
fn out_of_range_is_a_coercion_error() {
    let def = PropertyIndexDefinition::new("Person", "flag", PropertyType::Byte);
    let err = def.create_value(&[scalar(300)]).expect_err("input must be rejected");

    assert!(err.is_coercion());
}

#[test]
fn collection_param_is_rejected() {
    let err = age_index()
        .create_value(&[PropertyValue::list([1, 2])])
        .expect_err("input must be rejected");

    assert!(err.is_coercion());
}

#[test]
fn value_from_record_reads_the_field() {
    let def = age_index();
    let record = Record::new("Person").with("age", "41").with("name", "Ann");

    assert_eq!(one(def.value_from_record(&record).expect("build keys from record")), Value::Integer(41));
    assert_eq!(def.value_from_record(&Record::new("Person")).expect("build keys from record"), None);
}

#[test]
fn case_insensitive_collate_lowercases_strings() {
    let def = PropertyIndexDefinition::new("Person", "name", PropertyType::String)
        .with_collate(Collate::CaseInsensitive);

    let key = one(def.create_value(&[scalar("MiXeD")]).expect("build keys"));
    assert_eq!(key, Value::from("mixed"));
}

#[test]
fn date_keys_truncate_to_midnight() {
    let def = PropertyIndexDefinition::new("Event", "day", PropertyType::Date);
    let key = one(def.create_value(&[scalar(86_400_000_i64 + 5_000)]).expect("build keys"));

    assert_eq!(key, Value::Date(Date::from_millis(86_400_000).expect("valid date")));
}

#[test]
fn link_keys_parse_record_ids() {
    let def = PropertyIndexDefinition::new("Edge", "out", PropertyType::Link);
    let key = one(def.create_value(&[scalar("#12:7")]).expect("build keys"));

    assert_eq!(key, Value::Link(RecordId::new(12, 7)));
}

#[test]
fn ddl_renders_field_and_collate() {
    let def = PropertyIndexDefinition::new("Person", "name", PropertyType::String)
        .with_collate(Collate::CaseInsensitive);

    assert_eq!(
        def.to_create_index_ddl("Person.name", "NOTUNIQUE", None),
        "create index `Person.name` on `Person` ( `name` collate ci ) NOTUNIQUE"
    );
    assert_eq!(
        age_index().to_create_index_ddl("Person.age", "UNIQUE", Some("CELL_BTREE")),
        "create index `Person.age` on `Person` ( `age` ) UNIQUE ENGINE CELL_BTREE"
    );
}

#[test]
fn enum_delegates_to_variant() {
    let def = IndexDefinition::from(age_index());

    assert_eq!(def.kind().label(), "property");
    assert!(!def.is_multi_value());
    assert_eq!(one(def.create_value(&[scalar(3)]).expect("build keys")), Value::Integer(3));
    assert_eq!(def.fields_to_index(), vec!["age".to_string()]);
}
