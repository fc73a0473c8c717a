use std::fs::File;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Value, json};
use simplelog::{Config, LevelFilter, WriteLogger};
use traction::dom::{Delegate, Effect, Element, FrameAnimator};
use traction::prelude::*;
use traction::view::{EMPTY_PLACEHOLDER_CLASS, TITLE_CLASS};

/// One `<li>` per person.
struct PersonRow;

impl Hooks for PersonRow {}

impl Row for PersonRow {
    fn template(&self, attributes: &Attributes) -> Element {
        let name = attributes
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("?");
        let role = attributes
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Element::new("li")
            .class("person")
            .child(Element::span(name).class("name"))
            .child(Element::span(format!(" ({role})")))
    }

    fn bindings(&self) -> Vec<Delegate> {
        vec![Delegate::new("click", |event| {
            println!("clicked {}", event.current_target.text_content());
        })]
    }
}

/// Canned responses standing in for a server.
fn transport(url: &str) -> Result<Value, FetchError> {
    log::info!("GET {}", url);
    if url.ends_with("/people") {
        Ok(json!({
            "people": [
                { "name": "Ada", "role": "analyst" },
                { "name": "Grace", "role": "admiral" },
            ]
        }))
    } else if url.contains("role=") {
        Ok(json!({ "people": [{ "name": "Grace", "role": "admiral" }] }))
    } else {
        Err(FetchError::transport(format!("no route for {url}")))
    }
}

fn print_rows(label: &str, list: &Element) {
    let rows: Vec<String> = list
        .children()
        .iter()
        .filter(|c| c.is_visible())
        .map(|c| c.text_content())
        .collect();
    println!("{label}: {rows:?}");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up file logging
    let log_file = File::create("roster.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;

    let config = ApiConfig::new("https://example.invalid/api");
    let people = Rc::new(Collection::new().with_endpoint(config.endpoint("people").subelement("people")));

    let list = Element::new("ul").child(
        Element::new("li")
            .class(EMPTY_PLACEHOLDER_CLASS)
            .with_text("No people yet"),
    );
    let roster = Component::new(
        Repeater::new(|_| PersonRow),
        Options::new().collection(people.clone()).element(list.clone()),
    );
    print_rows("empty", &list);

    people.fetch(&transport)?;
    print_rows("fetched", &list);

    people.query(
        [("role", "admiral")],
        &transport,
        |people| println!("query returned {} person(s)", people.len()),
        |error| println!("query failed: {error}"),
    );
    print_rows("filtered", &list);

    if let Some(grace) = people.at(0) {
        grace.set("role", json!("rear admiral"))?;
    }
    print_rows("edited", &list);
    if let Some(row) = list.find_by_class("person") {
        row.dispatch("click");
    }

    // A confirmation dialog fading in over a few frames
    let animator = Rc::new(FrameAnimator::new());
    let dialog = Element::div()
        .class("modal")
        .hidden()
        .child(Element::new("h3").class(TITLE_CLASS));
    let overlay = Overlay::new(dialog.clone())
        .animator(animator.clone())
        .effect(Effect::fade().duration(Duration::from_millis(200)));
    let confirm = Component::new(Modal::new(overlay), Options::new().element(dialog.clone()));
    confirm.on("shown", |_| {
        println!("dialog shown");
        Ok(())
    });

    confirm.title("Clear the roster?").show(None)?;
    while animator.has_active_transitions() {
        animator.advance(Duration::from_millis(50));
        println!("dialog opacity {:.2}", dialog.opacity());
    }

    people.reset(Vec::new())?;
    print_rows("cleared", &list);

    confirm.hide(None)?;
    animator.finish_all();
    roster.destroy();
    Ok(())
}
