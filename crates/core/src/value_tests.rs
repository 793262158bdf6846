use super::*;

#[test]
fn scalars_deserialize_untagged() {
    let value: AttrValue = serde_json::from_str("\"hello\"").unwrap();
    assert_eq!(value, AttrValue::Str("hello".to_string()));

    let value: AttrValue = serde_json::from_str("42").unwrap();
    assert_eq!(value.as_f64(), Some(42.0));

    let value: AttrValue = serde_json::from_str("true").unwrap();
    assert_eq!(value, AttrValue::Bool(true));

    let value: AttrValue = serde_json::from_str("null").unwrap();
    assert_eq!(value, AttrValue::Null);
}

#[test]
fn nested_maps_deserialize() {
    let value: AttrValue = serde_json::from_str(r#"{"outer":{"inner":"x"}}"#).unwrap();
    let outer = value.as_map().unwrap();
    let inner = outer.get("outer").and_then(AttrValue::as_map).unwrap();
    assert_eq!(inner.get("inner").and_then(AttrValue::as_str), Some("x"));
}

#[test]
fn lists_roundtrip() {
    let value = AttrValue::List(vec![AttrValue::from(1i64), AttrValue::from("two")]);
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#"[1.0,"two"]"#);

    let back: AttrValue = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
}

#[test]
fn attr_map_builder_converts_values() {
    let map = attr_map([
        ("name", AttrValue::from("caption-job")),
        ("durationMs", AttrValue::from(1200i64)),
    ]);

    assert_eq!(map.get("name").and_then(AttrValue::as_str), Some("caption-job"));
    assert_eq!(map.get("durationMs").and_then(AttrValue::as_f64), Some(1200.0));
}

#[test]
fn map_keys_are_ordered() {
    let map = attr_map([("b", 1i64), ("a", 2i64), ("c", 3i64)]);
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}
