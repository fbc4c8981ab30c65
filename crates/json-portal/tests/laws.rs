use chrono::{TimeZone, Utc};
use json_portal::{
    array, boolean, branch, combine, date_iso, field, float, int, nothing, nullable, obj, one_of,
    optional, partial_obj, raw, record, string, tuple, uuid, variant, Data, PathSegment, Portal,
    Record,
};
use serde_json::json;

fn assert_round_trip<P>(portal: &P, value: P::Value)
where
    P: Portal,
    P::Value: PartialEq + std::fmt::Debug,
{
    let wire = portal.write(&value).expect("write");
    let back = portal.read(&wire).expect("read");
    assert_eq!(back, value, "round trip through {}", portal.description());
}

#[test]
fn primitives_and_modifiers_round_trip() {
    assert_round_trip(&string(), "hello".to_string());
    assert_round_trip(&boolean(), false);
    assert_round_trip(&int(), -17);
    assert_round_trip(&float(), 3.75);
    assert_round_trip(&raw(), json!({"free": ["form", 1, null]}));
    assert_round_trip(&nothing(), ());
    assert_round_trip(&uuid(), "9b2e7c1a-4f3d-4a8b-9c6d-0e1f2a3b4c5d".to_string());
    assert_round_trip(
        &date_iso(),
        Utc.with_ymd_and_hms(2021, 6, 30, 12, 0, 1).unwrap(),
    );
    assert_round_trip(&optional(int()), None);
    assert_round_trip(&optional(int()), Some(5));
    assert_round_trip(&nullable(string()), None);
}

#[test]
fn containers_round_trip() {
    assert_round_trip(&array(int()), vec![1, 2, 3, 4]);
    assert_round_trip(
        &tuple(vec![string().erased(), float().erased()]),
        vec![Data::Str("half".into()), Data::Float(0.5)],
    );
    assert_round_trip(
        &obj(vec![
            field("name", string()),
            field("tags", array(string())),
            field("nick", optional(string())),
        ]),
        record! { "name" => "Ada", "tags" => vec!["math".to_string()] },
    );
    assert_round_trip(
        &array(obj(vec![field("id", int())])),
        vec![record! { "id" => 1i64 }, record! { "id" => 2i64 }],
    );
}

#[test]
fn wrong_shapes_are_rejected() {
    assert!(boolean().read(&json!("true")).is_err());
    assert!(array(int()).read(&json!({})).is_err());
    assert!(obj(vec![field("x", string())]).read(&json!([])).is_err());
    assert!(obj(vec![field("x", string())]).read(&json!(null)).is_err());

    // int.write('hi') through a heterogeneous container
    let err = obj(vec![field("n", int())])
        .write(&record! { "n" => "hi" })
        .unwrap_err();
    assert_eq!(err.path(), ".n");
    assert_eq!(err.expected(), "int");
}

#[test]
fn write_failure_points_at_the_leaf() {
    let portal = obj(vec![field("x", array(int()))]);
    let value = record! { "x" => vec![Data::Int(1), Data::Bool(true)] };
    let err = portal.write(&value).unwrap_err();

    assert_eq!(err.path(), ".x[1]");
    assert_eq!(
        err.segments().cloned().collect::<Vec<_>>(),
        vec![PathSegment::Field("x".into()), PathSegment::Index(1)]
    );
    assert_eq!(err.input(), &json!({"x": [1, true]}));
    assert_eq!(
        err.to_string(),
        r#"data.x[1] does not match serializer in data {"x":[1,true]}"#
    );
}

#[test]
fn read_failure_carries_the_top_level_input() {
    let portal = obj(vec![field(
        "rows",
        array(obj(vec![field("cells", array(float()))])),
    )]);
    let input = json!({"rows": [{"cells": [1.0]}, {"cells": [2.0, "x"]}]});
    let err = portal.read(&input).unwrap_err();
    assert_eq!(err.path(), ".rows[1].cells[1]");
    assert_eq!(err.input(), &input);
}

#[test]
fn descriptions_are_structural_and_stable() {
    let pair = tuple(vec![string().erased(), float().erased()]);
    assert_eq!(pair.description(), "tuple(str, float)");
    assert_eq!(pair.description(), pair.description());

    let shapes = variant(vec![
        branch("circle", obj(vec![field("radius", float())])),
        branch("person", obj(vec![field("name", string())])),
    ]);
    assert_eq!(
        shapes.description(),
        "variant(<circle> obj({radius: float}) | <person> obj({name: str}))"
    );

    let nested = obj(vec![
        field("when", optional(date_iso())),
        field("kind", one_of(["a", "b"])),
    ]);
    assert_eq!(
        nested.description(),
        r#"obj({when: optional(dateIso), kind: oneOf("a", "b")})"#
    );
}

#[test]
fn enum_is_closed() {
    let p = one_of(["a", "b"]);
    assert!(p.read(&json!("c")).is_err());
    assert_eq!(p.read(&json!("a")).unwrap(), "a");
}

#[test]
fn union_dispatches_on_type_only() {
    let shapes = variant(vec![
        branch("circle", obj(vec![field("radius", float())])),
        branch("person", obj(vec![field("name", string())])),
    ]);

    let person = shapes
        .read(&json!({"type": "person", "name": "Ada", "radius": "ignored"}))
        .unwrap();
    assert_eq!(person, record! { "type" => "person", "name" => "Ada" });

    let err = shapes.read(&json!({"type": "triangle"})).unwrap_err();
    assert_eq!(err.path(), "");

    let err = shapes
        .read(&json!({"type": "circle", "radius": "wide"}))
        .unwrap_err();
    assert_eq!(err.path(), "<circle>.radius");
}

#[test]
fn union_inside_list_stacks_paths() {
    let shapes = array(variant(vec![branch(
        "circle",
        obj(vec![field("radius", float())]),
    )]));
    let err = shapes
        .read(&json!([{"type": "circle", "radius": 1}, {"type": "circle"}]))
        .unwrap_err();
    assert_eq!(err.path(), "[1]<circle>.radius");
}

#[test]
fn partial_object_tolerates_missing_keys() {
    let fields = || vec![field("x", string()), field("y", array(int()))];
    let value = record! { "y" => vec![1i64, 2, 3] };

    assert_round_trip(&partial_obj(fields()), value.clone());
    assert!(obj(fields()).write(&value).is_err());
    assert!(obj(fields()).read(&json!({"y": [1, 2, 3]})).is_err());
}

#[test]
fn combined_records_merge_and_validate() {
    let merged = combine(vec![
        obj(vec![field("x", int())]).boxed(),
        obj(vec![field("y", string()), field("z", boolean())]).boxed(),
    ]);
    assert_round_trip(
        &merged,
        record! { "x" => 123i64, "y" => "hi", "z" => false },
    );

    let err = merged
        .read(&json!({"x": 123, "y": 4, "z": false}))
        .unwrap_err();
    assert_eq!(err.path(), ".y");

    let err = merged
        .write(&record! { "x" => 123i64, "y" => 4i64, "z" => false })
        .unwrap_err();
    assert_eq!(err.path(), ".y");
}

#[test]
fn combine_accepts_partial_parts() {
    let merged = combine(vec![
        obj(vec![field("id", int())]).boxed(),
        partial_obj(vec![field("note", string())]).boxed(),
    ]);
    assert_eq!(
        merged.read(&json!({"id": 1})).unwrap(),
        record! { "id" => 1i64 }
    );
    assert_eq!(
        merged.read(&json!({"id": 1, "note": "n"})).unwrap(),
        record! { "id" => 1i64, "note" => "n" }
    );
}

#[test]
fn empty_record_round_trips() {
    assert_round_trip(&obj(Vec::new()), Record::new());
    assert_eq!(obj(Vec::new()).description(), "obj({})");
}
