use std::cell::RefCell;
use std::rc::Rc;

use traction_dom::{find_element, Delegate, Element};

// =============================================================================
// Tree Construction
// =============================================================================

#[test]
fn test_append_child_sets_parent_and_order() {
    let list = Element::new("ul");
    let a = Element::new("li").with_text("a");
    let b = Element::new("li").with_text("b");

    list.append_child(&a);
    list.append_child(&b);

    let children = list.children();
    assert_eq!(children.len(), 2);
    assert!(children[0].ptr_eq(&a));
    assert!(children[1].ptr_eq(&b));
    assert!(a.parent().is_some_and(|p| p.ptr_eq(&list)));
    assert_eq!(list.text_content(), "ab");
}

#[test]
fn test_append_moves_child_between_parents() {
    let first = Element::div();
    let second = Element::div();
    let item = Element::span("x");

    first.append_child(&item);
    second.append_child(&item);

    assert_eq!(first.child_count(), 0);
    assert_eq!(second.child_count(), 1);
    assert!(item.parent().is_some_and(|p| p.ptr_eq(&second)));
}

#[test]
fn test_append_into_own_subtree_is_refused() {
    let outer = Element::div();
    let inner = Element::div();
    outer.append_child(&inner);

    inner.append_child(&outer);
    outer.append_child(&outer);

    assert!(outer.parent().is_none());
    assert_eq!(inner.child_count(), 0);
    assert_eq!(outer.child_count(), 1);
}

#[test]
fn test_append_to_text_keeps_text_as_span() {
    let cell = Element::new("td").with_text("Name: ");
    cell.append_child(&Element::span("Ada"));

    assert_eq!(cell.child_count(), 2);
    assert_eq!(cell.children()[0].tag(), "span");
    assert_eq!(cell.text_content(), "Name: Ada");
}

#[test]
fn test_set_text_detaches_children() {
    let el = Element::div();
    let child = Element::span("gone");
    el.append_child(&child);

    el.set_text("replaced");

    assert!(child.parent().is_none());
    assert_eq!(el.child_count(), 0);
    assert_eq!(el.text_content(), "replaced");
}

// =============================================================================
// Detach, Remove, Replace
// =============================================================================

#[test]
fn test_detach() {
    let parent = Element::div();
    let child = Element::span("x");
    parent.append_child(&child);

    assert!(child.detach());
    assert!(!child.detach());
    assert_eq!(parent.child_count(), 0);
    assert!(child.parent().is_none());
}

#[test]
fn test_remove_children_by_predicate() {
    let table = Element::new("table")
        .child(Element::new("tr").class("nodata"))
        .child(Element::new("tr").with_id("r1"))
        .child(Element::new("tr").with_id("r2"));

    let removed = table.remove_children(|c| !c.has_class("nodata"));

    assert_eq!(removed.len(), 2);
    assert_eq!(removed[0].id(), "r1");
    assert_eq!(removed[1].id(), "r2");
    assert!(removed.iter().all(|r| r.parent().is_none()));
    assert_eq!(table.child_count(), 1);
    assert!(table.children()[0].has_class("nodata"));
}

#[test]
fn test_replace_with_keeps_slot() {
    let list = Element::new("ul");
    let a = Element::new("li").with_id("a");
    let b = Element::new("li").with_id("b");
    let c = Element::new("li").with_id("c");
    list.append_child(&a);
    list.append_child(&b);
    list.append_child(&c);

    let fresh = Element::new("li").with_id("b2");
    assert!(b.replace_with(&fresh));

    let ids: Vec<String> = list.children().iter().map(Element::id).collect();
    assert_eq!(ids, vec!["a", "b2", "c"]);
    assert!(b.parent().is_none());
    assert!(fresh.parent().is_some_and(|p| p.ptr_eq(&list)));
    assert!(list.children()[0].ptr_eq(&a));
    assert!(list.children()[2].ptr_eq(&c));
}

#[test]
fn test_replace_with_detached_is_noop() {
    let lone = Element::div();
    let other = Element::div();
    assert!(!lone.replace_with(&other));
    assert!(other.parent().is_none());
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_classes() {
    let el = Element::div().class("row").class("row").class("active");
    assert_eq!(el.classes(), vec!["row", "active"]);
    assert!(el.has_class(".row"));

    el.remove_class("active");
    assert!(!el.has_class("active"));
}

#[test]
fn test_find_by_class_and_id() {
    let modal = Element::div().with_id("modal").child(
        Element::div()
            .class("modal-header")
            .child(Element::new("h3").class("title").with_id("heading")),
    );

    let title = modal.find_by_class("title");
    assert!(title.is_some_and(|t| t.id() == "heading"));
    assert!(modal.find_by_class("missing").is_none());
    assert!(find_element(&modal, "heading").is_some());
    assert!(find_element(&modal, "modal").is_some());
}

#[test]
fn test_weak_element() {
    let weak = {
        let el = Element::div();
        let weak = el.downgrade();
        assert!(weak.upgrade().is_some());
        weak
    };
    assert!(weak.upgrade().is_none());
}

// =============================================================================
// Delegation
// =============================================================================

#[test]
fn test_dispatch_bubbles_to_ancestors() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let list = Element::new("ul");
    let item = Element::new("li").class("item");
    let button = Element::new("button").class("remove");
    item.append_child(&button);
    list.append_child(&item);

    let log = calls.clone();
    list.delegate(Delegate::new("click", move |ev| {
        log.borrow_mut().push(format!("list:{}", ev.current_target.tag()));
    }));
    let log = calls.clone();
    item.delegate(Delegate::new("click", move |ev| {
        log.borrow_mut().push(format!("item:{}", ev.target.tag()));
    }));

    assert_eq!(button.dispatch("click"), 2);
    assert_eq!(*calls.borrow(), vec!["item:button", "list:ul"]);
}

#[test]
fn test_dispatch_selector_matches_descendant_only() {
    let hits = Rc::new(RefCell::new(Vec::new()));
    let row = Element::new("tr");
    let remove = Element::new("a").class("remove");
    let label = Element::span("label");
    row.append_child(&remove);
    row.append_child(&label);

    let log = hits.clone();
    row.delegate(
        Delegate::new("click", move |ev| log.borrow_mut().push(ev.current_target.id()))
            .selector(".remove"),
    );

    assert_eq!(label.dispatch("click"), 0);
    assert_eq!(row.dispatch("click"), 0);
    assert_eq!(remove.dispatch("click"), 1);
    assert_eq!(*hits.borrow(), vec![remove.id()]);
}

#[test]
fn test_dispatch_ignores_other_events() {
    let el = Element::div();
    el.delegate(Delegate::new("click", |_| {}));
    assert_eq!(el.dispatch("dblclick"), 0);
}

#[test]
fn test_undelegate_all() {
    let el = Element::div();
    el.delegate(Delegate::new("click", |_| {}));
    el.delegate(Delegate::new("hover", |_| {}));
    assert_eq!(el.delegate_count(), 2);

    el.undelegate_all();
    assert_eq!(el.delegate_count(), 0);
    assert_eq!(el.dispatch("click"), 0);
}
