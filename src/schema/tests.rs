//! Schema classification and inference tests

use super::*;
use crate::types::{Record, EXTRACTED_AT_FIELD};
use serde_json::json;
use test_case::test_case;

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[test_case(json!(null), TypeTag::Null; "null value")]
#[test_case(json!(true), TypeTag::Boolean; "boolean")]
#[test_case(json!(42), TypeTag::Integer; "integer")]
#[test_case(json!(3.5), TypeTag::Number; "float")]
#[test_case(json!({"a": 1}), TypeTag::Object; "object")]
#[test_case(json!([1, 2]), TypeTag::Array; "array")]
#[test_case(json!("2024-01-15T10:30:00Z"), TypeTag::DateTime; "rfc3339")]
#[test_case(json!("2024-01-15T10:30:00.123+02:00"), TypeTag::DateTime; "offset with fraction")]
#[test_case(json!("2024-01-15T10:30:00"), TypeTag::DateTime; "zoneless datetime")]
#[test_case(json!("2024-01-15"), TypeTag::DateTime; "bare date")]
#[test_case(json!("hello"), TypeTag::String; "plain string")]
#[test_case(json!("2024-99-99"), TypeTag::String; "invalid date")]
#[test_case(json!("123"), TypeTag::String; "numeric string")]
fn test_classify(value: serde_json::Value, expected: TypeTag) {
    assert_eq!(classify(&value), expected);
}

#[test]
fn test_parse_iso_datetime_ordering() {
    let early = parse_iso_datetime("2024-01-15T00:00:00Z").unwrap();
    let late = parse_iso_datetime("2024-01-15T10:30:00Z").unwrap();
    assert!(early < late);

    // bare dates read as midnight UTC
    let bare = parse_iso_datetime("2024-01-15").unwrap();
    assert_eq!(bare, early);
}

// ============================================================================
// Type lattice merging
// ============================================================================

#[test]
fn test_merge_number_absorbs_integer() {
    let mut set = TypeSet::new();
    set.merge(TypeTag::Integer);
    set.merge(TypeTag::Number);
    assert!(set.contains(TypeTag::Number));
    assert!(!set.contains(TypeTag::Integer));

    // later integer observations do not reintroduce integer
    set.merge(TypeTag::Integer);
    assert!(set.contains(TypeTag::Number));
    assert!(!set.contains(TypeTag::Integer));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_merge_is_idempotent() {
    let mut set = TypeSet::new();
    set.merge(TypeTag::String);
    set.merge(TypeTag::String);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_merge_never_holds_integer_and_number() {
    // every insertion order over a mixed observation sequence
    let observations = [
        TypeTag::Integer,
        TypeTag::Number,
        TypeTag::Integer,
        TypeTag::Null,
        TypeTag::Number,
    ];
    let set: TypeSet = observations.into_iter().collect();
    assert!(!(set.contains(TypeTag::Integer) && set.contains(TypeTag::Number)));
    assert!(set.contains(TypeTag::Number));
    assert!(set.contains(TypeTag::Null));
}

#[test]
fn test_type_set_sorted_iteration() {
    let set: TypeSet = [TypeTag::String, TypeTag::Boolean, TypeTag::Null]
        .into_iter()
        .collect();
    let tags: Vec<TypeTag> = set.iter().collect();
    assert_eq!(tags, vec![TypeTag::Boolean, TypeTag::Null, TypeTag::String]);
}

// ============================================================================
// Schema inference
// ============================================================================

#[test]
fn test_infer_single_types_required() {
    let mut builder = SchemaBuilder::new();
    builder.observe(&record(json!({"id": 1, "name": "a", "active": true})));
    builder.observe(&record(json!({"id": 2, "name": "b", "active": false})));

    let schema = builder.build(None, &[]);

    let id = schema.get_property("id").unwrap();
    assert_eq!(id.type_list, TypeList::single(TypeTag::Integer));
    assert!(schema.is_required("id"));
    assert!(schema.is_required("name"));
    assert!(schema.is_required("active"));
}

#[test]
fn test_infer_nullable_union() {
    let mut builder = SchemaBuilder::new();
    builder.observe(&record(json!({"score": 10})));
    builder.observe(&record(json!({"score": null})));

    let schema = builder.build(None, &[]);
    let score = schema.get_property("score").unwrap();
    assert_eq!(
        score.type_list,
        TypeList::Multiple(vec![TypeTag::Integer, TypeTag::Null])
    );
    assert!(!schema.is_required("score"));
}

#[test]
fn test_infer_integer_number_collapse() {
    let mut builder = SchemaBuilder::new();
    builder.observe(&record(json!({"value": 1})));
    builder.observe(&record(json!({"value": 2.5})));
    builder.observe(&record(json!({"value": 3})));

    let schema = builder.build(None, &[]);
    let value = schema.get_property("value").unwrap();
    assert_eq!(value.type_list, TypeList::single(TypeTag::Number));
}

#[test]
fn test_infer_datetime_format() {
    let mut builder = SchemaBuilder::new();
    builder.observe(&record(json!({"ts": "2024-01-15T10:30:00Z"})));

    let schema = builder.build(None, &[]);
    let ts = schema.get_property("ts").unwrap();
    assert_eq!(ts.type_list, TypeList::single(TypeTag::String));
    assert_eq!(ts.format.as_deref(), Some("date-time"));
    assert!(schema.is_required("ts"));
}

#[test]
fn test_infer_nullable_datetime() {
    let mut builder = SchemaBuilder::new();
    builder.observe(&record(json!({"ts": "2024-01-15T10:30:00Z"})));
    builder.observe(&record(json!({"ts": null})));

    let schema = builder.build(None, &[]);
    let ts = schema.get_property("ts").unwrap();
    assert_eq!(
        ts.type_list,
        TypeList::Multiple(vec![TypeTag::String, TypeTag::Null])
    );
    assert_eq!(ts.format.as_deref(), Some("date-time"));
    assert!(!schema.is_required("ts"));
}

#[test]
fn test_infer_multi_type_sorted() {
    let mut builder = SchemaBuilder::new();
    builder.observe(&record(json!({"mixed": "text"})));
    builder.observe(&record(json!({"mixed": true})));
    builder.observe(&record(json!({"mixed": null})));

    let schema = builder.build(None, &[]);
    let mixed = schema.get_property("mixed").unwrap();
    // full sorted set when more than one non-null type was observed
    assert_eq!(
        mixed.type_list,
        TypeList::Multiple(vec![TypeTag::Boolean, TypeTag::Null, TypeTag::String])
    );
    assert!(!schema.is_required("mixed"));
}

#[test]
fn test_infer_null_only_field_is_nullable_string() {
    let mut builder = SchemaBuilder::new();
    builder.observe(&record(json!({"ghost": null})));

    let schema = builder.build(None, &[]);
    let ghost = schema.get_property("ghost").unwrap();
    assert_eq!(
        ghost.type_list,
        TypeList::Multiple(vec![TypeTag::String, TypeTag::Null])
    );
    assert!(!schema.is_required("ghost"));
}

#[test]
fn test_infer_synthesizes_replication_key() {
    let builder = SchemaBuilder::new();
    let schema = builder.build(Some("updated_at"), &[]);

    let key = schema.get_property("updated_at").unwrap();
    assert_eq!(
        key.type_list,
        TypeList::Multiple(vec![TypeTag::String, TypeTag::Null])
    );
    assert!(key.format.is_none());
    assert!(!schema.is_required("updated_at"));
}

#[test]
fn test_infer_synthesizes_extraction_timestamp() {
    let builder = SchemaBuilder::new();
    let schema = builder.build(Some(EXTRACTED_AT_FIELD), &[]);

    let key = schema.get_property(EXTRACTED_AT_FIELD).unwrap();
    assert_eq!(
        key.type_list,
        TypeList::Multiple(vec![TypeTag::String, TypeTag::Null])
    );
    assert_eq!(key.format.as_deref(), Some("date-time"));
    assert!(!schema.is_required(EXTRACTED_AT_FIELD));
}

#[test]
fn test_infer_extraction_timestamp_never_required_even_when_sampled() {
    let mut sampled = record(json!({"id": 1}));
    sampled.insert(
        EXTRACTED_AT_FIELD.to_string(),
        json!("2024-01-15T10:30:00Z"),
    );

    let mut builder = SchemaBuilder::new();
    builder.observe(&sampled);

    let schema = builder.build(Some(EXTRACTED_AT_FIELD), &[]);
    assert!(schema.is_required("id"));
    assert!(!schema.is_required(EXTRACTED_AT_FIELD));
}

#[test]
fn test_infer_synthesizes_primary_keys() {
    let builder = SchemaBuilder::new();
    let schema = builder.build(None, &["id".to_string(), "region".to_string()]);

    for key in ["id", "region"] {
        let property = schema.get_property(key).unwrap();
        assert_eq!(
            property.type_list,
            TypeList::Multiple(vec![TypeTag::String, TypeTag::Null])
        );
    }
    assert!(schema.required.is_empty());
}

#[test]
fn test_zero_samples_yields_minimal_schema() {
    let builder = SchemaBuilder::new();
    let schema = builder.build(None, &[]);
    assert!(schema.properties.is_empty());
    assert!(schema.required.is_empty());
    assert_eq!(builder.samples(), 0);
}

#[test]
fn test_descriptor_serialization_shape() {
    let mut builder = SchemaBuilder::new();
    builder.observe(&record(json!({"id": 1, "note": null})));

    let json = builder.build(None, &[]).to_json();
    assert_eq!(json["type"], "object");
    assert_eq!(json["additionalProperties"], true);
    assert_eq!(json["properties"]["id"]["type"], "integer");
    assert_eq!(json["properties"]["note"]["type"], json!(["string", "null"]));
    assert_eq!(json["required"], json!(["id"]));
}
