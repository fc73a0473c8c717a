//! Tests for models and their sync.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::{Value, json};
use traction::config::ApiConfig;
use traction::error::{FetchError, HandlerError};
use traction::model::{CHANGE, Model};

fn person(name: &str) -> Model {
    Model::from_value(json!({ "name": name, "age": 36 }))
}

// =============================================================================
// Attributes
// =============================================================================

#[test]
fn test_get_and_has() {
    let model = person("Ada");
    assert_eq!(model.get("name"), Some(json!("Ada")));
    assert_eq!(model.get_str("name").as_deref(), Some("Ada"));
    assert_eq!(model.get_str("age"), None);
    assert!(model.has("age"));
    assert!(!model.has("email"));
}

#[test]
fn test_from_value_wraps_scalars() {
    let model = Model::from_value(json!(42));
    assert_eq!(model.get("value"), Some(json!(42)));
    assert!(Model::from_value(Value::Null).attributes().is_empty());
}

#[test]
fn test_cids_are_unique() {
    assert_ne!(person("Ada").cid(), person("Ada").cid());
}

#[test]
fn test_set_reports_changed_names() {
    let model = person("Ada");
    let changes = model.set("name", json!("Grace")).unwrap();
    assert_eq!(changes.names(), ["name".to_string()]);
    assert_eq!(model.to_json(), json!({ "name": "Grace", "age": 36 }));
}

#[test]
fn test_set_same_value_is_silent() {
    let model = person("Ada");
    let fired = Rc::new(Cell::new(0));
    let count = fired.clone();
    model.on(CHANGE, move |_| {
        count.set(count.get() + 1);
        Ok(())
    });

    let changes = model.set("name", json!("Ada")).unwrap();

    assert!(changes.is_empty());
    assert_eq!(fired.get(), 0);
}

#[test]
fn test_change_events_per_attribute_then_change() {
    let model = person("Ada");
    let log = Rc::new(RefCell::new(Vec::new()));
    for event in ["change:name", "change:age", CHANGE] {
        let log = log.clone();
        model.on(event, move |changes| {
            log.borrow_mut().push((event, changes.len()));
            Ok(())
        });
    }

    let mut update = serde_json::Map::new();
    update.insert("name".to_string(), json!("Grace"));
    update.insert("age".to_string(), json!(45));
    model.set_all(update).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 3);
    assert_eq!(log[2], (CHANGE, 2));
}

#[test]
fn test_unset_and_clear() {
    let model = person("Ada");
    assert!(model.unset("age").unwrap().contains("age"));
    assert!(model.unset("age").unwrap().is_empty());

    let cleared = model.clear().unwrap();
    assert_eq!(cleared.names(), ["name".to_string()]);
    assert!(model.attributes().is_empty());
}

#[test]
fn test_failing_change_handler_surfaces() {
    let model = person("Ada");
    model.on(CHANGE, |_| Err(HandlerError::new("read only")));

    let error = model.set("name", json!("Grace")).unwrap_err();
    assert_eq!(error.event(), CHANGE);
    // The attribute is applied before notification
    assert_eq!(model.get_str("name").as_deref(), Some("Grace"));
}

// =============================================================================
// Errors container
// =============================================================================

#[test]
fn test_parse_fills_errors() {
    let model = person("Ada");
    let resets = Rc::new(Cell::new(0));
    let count = resets.clone();
    model.errors().on("reset", move |_| {
        count.set(count.get() + 1);
        Ok(())
    });

    model
        .parse(json!({ "errors": ["Name is required", { "field": "age", "message": "too old" }] }))
        .unwrap();

    let errors = model.errors();
    assert_eq!(resets.get(), 1);
    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors.at(0).and_then(|e| e.get_str("message")).as_deref(),
        Some("Name is required")
    );
    assert_eq!(errors.at(1).and_then(|e| e.get_str("field")).as_deref(), Some("age"));
}

#[test]
fn test_parse_without_errors_empties_container() {
    let model = person("Ada");
    model.parse(json!({ "errors": ["bad"] })).unwrap();
    assert_eq!(model.errors().len(), 1);

    model.parse(json!({ "name": "Ada" })).unwrap();
    assert!(model.errors().is_empty());
}

#[test]
fn test_parse_rejects_non_objects() {
    let model = person("Ada");
    assert!(matches!(
        model.parse(json!([1, 2])),
        Err(FetchError::Malformed(_))
    ));
}

// =============================================================================
// Fetch
// =============================================================================

#[test]
fn test_fetch_without_endpoint() {
    let model = person("Ada");
    let transport = |_: &str| -> Result<Value, FetchError> { Ok(json!({})) };
    assert_eq!(model.fetch(&transport), Err(FetchError::NoEndpoint));
}

#[test]
fn test_fetch_applies_subelement() {
    let config = ApiConfig::new("https://api.example.com/");
    let model = person("Ada").with_endpoint(config.endpoint("person").subelement("person"));
    let requested = Rc::new(RefCell::new(Vec::new()));

    let urls = requested.clone();
    let transport = move |url: &str| -> Result<Value, FetchError> {
        urls.borrow_mut().push(url.to_string());
        Ok(json!({ "person": { "name": "Grace" } }))
    };

    let changes = model.fetch(&transport).unwrap();

    assert!(changes.contains("name"));
    assert_eq!(model.get_str("name").as_deref(), Some("Grace"));
    assert_eq!(*requested.borrow(), vec!["https://api.example.com/person"]);
}

#[test]
fn test_query_reports_success() {
    let config = ApiConfig::new("https://api.example.com");
    let model = person("Ada").with_endpoint(config.endpoint("person"));
    let transport = |url: &str| -> Result<Value, FetchError> {
        assert_eq!(url, "https://api.example.com/person?name=Grace%20Hopper");
        Ok(json!({ "name": "Grace Hopper" }))
    };

    let succeeded = Cell::new(false);
    model.query(
        [("name", "Grace Hopper")],
        &transport,
        |m| {
            assert_eq!(m.get_str("name").as_deref(), Some("Grace Hopper"));
            succeeded.set(true);
        },
        |error| panic!("unexpected failure: {error}"),
    );

    assert!(succeeded.get());
    assert_eq!(
        model.url().as_deref(),
        Some("https://api.example.com/person?name=Grace%20Hopper")
    );
}

#[test]
fn test_query_reports_failure() {
    let config = ApiConfig::new("https://api.example.com");
    let model = person("Ada").with_endpoint(config.endpoint("person"));
    let transport =
        |_: &str| -> Result<Value, FetchError> { Err(FetchError::transport("connection refused")) };

    let failure = RefCell::new(None);
    model.query(
        [("id", "7")],
        &transport,
        |_| panic!("unexpected success"),
        |error| *failure.borrow_mut() = Some(error.clone()),
    );

    assert_eq!(
        failure.into_inner(),
        Some(FetchError::Transport("connection refused".to_string()))
    );
    assert_eq!(model.get_str("name").as_deref(), Some("Ada"));
}
