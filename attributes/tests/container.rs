//! Behavioural tests for the attribute container.

use ledc_attributes::{AttributeRecord, Attributes, AttributesError};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn sentinel() -> Value {
    json!({"__sentinel__": "absent"})
}

fn user_fixture() -> Attributes {
    Attributes::with_required_keys(
        object(json!({"user": {"name": "Alice", "age": 30}})),
        ["user.name"],
    )
    .expect("user.name is present")
}

#[test]
fn user_scenario() {
    let attrs = user_fixture();

    assert_eq!(attrs.get("user.name"), Some(&json!("Alice")));
    assert_eq!(attrs.get_or("user.email", json!("n/a")), json!("n/a"));
    assert!(attrs.has("user.age"));
    assert!(!attrs.has_all(["user.name", "user.missing"]));
    assert!(attrs.has_all(["user.name", "user.age"]));
}

#[test]
fn missing_required_path_fails_construction() {
    let err = Attributes::with_required_keys(Map::new(), ["a.b"]).expect_err("a.b is absent");

    assert_eq!(err.missing_keys(), ["a.b".to_string()]);
    assert!(err.to_string().contains("a.b"));
}

#[test]
fn validation_lists_exactly_the_missing_keys() {
    let err = Attributes::with_required_keys(
        object(json!({"id": 1, "profile": {"nick": "x"}})),
        ["id", "profile.nick", "profile.avatar", "email"],
    )
    .expect_err("two keys are missing");

    assert_eq!(
        err,
        AttributesError::Validation {
            missing: vec!["profile.avatar".to_string(), "email".to_string()],
        }
    );
    assert_eq!(err.to_string(), "\"profile.avatar,email\" cannot be empty.");
}

#[test]
fn required_key_with_null_value_counts_as_present() {
    let attrs = Attributes::with_required_keys(object(json!({"token": null})), ["token"])
        .expect("null is present");
    assert_eq!(attrs.get("token"), Some(&Value::Null));
}

#[test]
fn get_returns_exact_nested_values() {
    let attrs = Attributes::new(object(json!({
        "order": {
            "items": [{"sku": "A-1", "qty": 2}, {"sku": "B-2", "qty": 1}],
            "total": 12.5,
        }
    })))
    .expect("valid");

    assert_eq!(attrs.get("order.total"), Some(&json!(12.5)));
    assert_eq!(attrs.get("order.items.1.sku"), Some(&json!("B-2")));
    assert_eq!(
        attrs.get("order.items.0"),
        Some(&json!({"sku": "A-1", "qty": 2}))
    );
    assert_eq!(attrs.get("order.items.2.sku"), None);
    assert_eq!(attrs.get("order.total.cents"), None);
}

#[test]
fn has_agrees_with_get_against_a_sentinel() {
    let attrs = Attributes::new(object(json!({
        "a": {"b": {"c": null}, "list": [0, false, ""]},
        "flag": false,
    })))
    .expect("valid");

    let paths = [
        "a", "a.b", "a.b.c", "a.b.c.d", "a.list", "a.list.0", "a.list.2", "a.list.3", "flag",
        "flag.x", "missing", "",
    ];
    for path in paths {
        let via_get = attrs.get_or(path, sentinel()) != sentinel();
        assert_eq!(attrs.has(path), via_get, "path {path:?}");
    }
}

#[test]
fn has_is_false_on_an_empty_container() {
    let attrs = Attributes::default();
    assert!(!attrs.has("anything"));
    assert!(!attrs.has_all(["anything"]));
}

#[test]
fn has_all_with_no_keys_is_false() {
    let attrs = user_fixture();
    assert!(!attrs.has_all(Vec::<String>::new()));
}

#[test]
fn json_round_trip_is_structurally_equal() {
    let attrs = Attributes::new(object(json!({
        "名字": "张三",
        "nested": {"list": [1, 2, {"deep": true}], "none": null},
        "url": "https://example.com/a/b",
    })))
    .expect("valid");

    let json = attrs.to_json().expect("encodes");
    assert!(json.contains("张三"), "unicode is not escaped: {json}");

    let parsed: Value = serde_json::from_str(&json).expect("parses");
    assert_eq!(parsed, Value::Object(attrs.to_array().clone()));

    let reparsed = Attributes::from_json(&json, ["nested.list.2.deep"]).expect("still valid");
    assert_eq!(reparsed.to_array(), attrs.to_array());
}

#[test]
fn serialization_preserves_insertion_order() {
    let mut attrs = Attributes::new(object(json!({"z": 1, "a": 2}))).expect("valid");
    attrs.set("m", json!(3)).set("z", json!(4));

    assert_eq!(attrs.to_json().expect("encodes"), r#"{"z":4,"a":2,"m":3}"#);
}

#[test]
fn push_appends_at_next_sequential_index() {
    let mut attrs = Attributes::new(object(json!({"0": "first", "1": "second"}))).expect("valid");
    attrs.push(json!("third")).expect("index available");

    assert_eq!(attrs.to_array().get("2"), Some(&json!("third")));
    assert_eq!(attrs.get(2), Some(&json!("third")));
    assert_eq!(attrs.len(), 3);
}

#[test]
fn set_then_get_top_level() {
    let mut attrs = user_fixture();
    attrs.set("status", json!("active")).set(7, json!([1, 2]));

    assert_eq!(attrs.get("status"), Some(&json!("active")));
    assert_eq!(attrs.get("7"), Some(&json!([1, 2])));
    assert_eq!(attrs.get(7), attrs.get("7"));
}

#[test]
fn set_does_not_write_dotted_paths() {
    let mut attrs = user_fixture();
    attrs.set("user.name", json!("Bob"));

    assert_eq!(attrs.get("user.name"), Some(&json!("Alice")));
    assert_eq!(attrs.to_array().get("user.name"), Some(&json!("Bob")));
    assert!(attrs.contains_key("user.name"));
}

#[test]
fn contains_key_and_unset_are_top_level_only() {
    let mut attrs = user_fixture();

    assert!(attrs.contains_key("user"));
    assert!(!attrs.contains_key("user.name"));
    assert_eq!(attrs.unset("user.name"), None);
    assert!(attrs.has("user.name"));

    assert!(attrs.unset("user").is_some());
    assert!(!attrs.has("user.name"));
    assert!(attrs.is_empty());
}

#[test]
fn deserialized_containers_carry_no_required_keys() {
    let attrs: Attributes = serde_json::from_str(r#"{"a": 1}"#).expect("deserializes");
    assert!(attrs.required_keys().is_empty());
    assert_eq!(serde_json::to_string(&attrs).expect("serializes"), r#"{"a":1}"#);
}

struct Profile(Attributes);

impl AttributeRecord for Profile {
    const REQUIRED_KEYS: &'static [&'static str] = &["id", "contact.email"];

    fn from_attributes(attributes: Attributes) -> Self {
        Profile(attributes)
    }

    fn attributes(&self) -> &Attributes {
        &self.0
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.0
    }
}

#[test]
fn records_validate_declared_keys() -> anyhow::Result<()> {
    let mut profile = Profile::try_from_value(json!({
        "id": 42,
        "contact": {"email": "a@example.com"},
    }))?;
    profile.set("nickname", json!("ace"));

    assert_eq!(profile.get("contact.email"), Some(&json!("a@example.com")));
    assert!(profile.has("nickname"));
    assert_eq!(
        profile.attributes().required_keys(),
        ["id".to_string(), "contact.email".to_string()]
    );

    let err = match Profile::try_from_value(json!({"id": 42})) {
        Ok(_) => anyhow::bail!("contact.email should be required"),
        Err(err) => err,
    };
    assert_eq!(err.missing_keys(), ["contact.email".to_string()]);
    Ok(())
}
