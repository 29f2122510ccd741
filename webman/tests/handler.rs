//! Error rendering for errors raised by the container and the glue.

use ledc_attributes::Attributes;
use ledc_webman::{ExceptionHandler, ParamSpec, Request, WebmanConfig, WebmanError};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

fn body(handler: &ExceptionHandler, err: &WebmanError) -> Value {
    serde_json::from_str(&handler.render(err).body).expect("body is json")
}

#[test]
fn missing_required_keys_render_their_message() {
    let err: WebmanError = Attributes::with_required_keys(Map::new(), ["order.no", "buyer"])
        .expect_err("keys missing")
        .into();
    let handler = ExceptionHandler::from_config(&WebmanConfig::default());

    assert_eq!(
        body(&handler, &err),
        json!({"code": 500, "msg": "\"order.no,buyer\" cannot be empty."})
    );
}

#[test]
fn type_errors_from_extraction_are_shown() {
    let mut query = Map::new();
    query.insert("name".to_string(), json!({"nested": true}));
    let request = Request::new("GET").with_query(query);

    let err = request
        .get_more(&[ParamSpec::new("name/s")], false)
        .expect_err("objects cannot become strings");
    let handler = ExceptionHandler::new(false);

    assert_eq!(body(&handler, &err)["msg"], json!("variable type error：array"));
}

#[test]
fn config_errors_are_masked_unless_debugging() {
    let err = WebmanConfig::parse("debug = ").expect_err("invalid toml");

    let masked = body(&ExceptionHandler::new(false), &err);
    assert_eq!(masked, json!({"code": 500, "msg": "server internal error"}));

    let debug = WebmanConfig::parse("debug = true").expect("valid");
    let revealed = body(&ExceptionHandler::from_config(&debug), &err);
    assert_eq!(revealed["msg"], json!("config error: failed to parse config"));
    assert!(revealed["traces"].as_str().is_some_and(|t| t.contains("Caused by")));
}
