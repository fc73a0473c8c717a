//! Tests for the event bus.

use std::cell::RefCell;
use std::rc::Rc;

use traction::error::{EventError, HandlerError};
use traction::events::{ALL, EventBus};

fn recorder() -> (Rc<RefCell<Vec<String>>>, EventBus<i32>) {
    (Rc::new(RefCell::new(Vec::new())), EventBus::new())
}

// =============================================================================
// Delivery
// =============================================================================

#[test]
fn test_emit_in_registration_order() {
    let (log, bus) = recorder();
    for name in ["first", "second", "third"] {
        let log = log.clone();
        bus.on("tick", move |n| {
            log.borrow_mut().push(format!("{name}:{n}"));
            Ok(())
        });
    }

    bus.emit("tick", &7).unwrap();

    assert_eq!(*log.borrow(), vec!["first:7", "second:7", "third:7"]);
}

#[test]
fn test_emit_only_reaches_named_event() {
    let (log, bus) = recorder();
    let seen = log.clone();
    bus.on("add", move |_| {
        seen.borrow_mut().push("add".to_string());
        Ok(())
    });

    bus.emit("remove", &1).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn test_all_runs_after_specific_handlers() {
    let (log, bus) = recorder();
    let seen = log.clone();
    bus.on(ALL, move |_| {
        seen.borrow_mut().push("all".to_string());
        Ok(())
    });
    let seen = log.clone();
    bus.on("add", move |_| {
        seen.borrow_mut().push("add".to_string());
        Ok(())
    });

    bus.emit("add", &0).unwrap();
    bus.emit("other", &0).unwrap();

    assert_eq!(*log.borrow(), vec!["add", "all", "all"]);
}

#[test]
fn test_on_all_receives_event_name() {
    let (log, bus) = recorder();
    let seen = log.clone();
    bus.on_all(move |event, n| {
        seen.borrow_mut().push(format!("{event}:{n}"));
        Ok(())
    });

    bus.emit("add", &1).unwrap();
    bus.emit("remove", &2).unwrap();

    assert_eq!(*log.borrow(), vec!["add:1", "remove:2"]);
    assert_eq!(bus.listener_count(ALL), 1);
}

#[test]
fn test_on_all_removed_with_off() {
    let bus: EventBus<i32> = EventBus::new();
    let id = bus.on_all(|_, _| Ok(()));
    assert_eq!(bus.off(ALL, Some(id)), 1);
}

#[test]
fn test_emit_all_directly_runs_wildcard_once() {
    let (log, bus) = recorder();
    let seen = log.clone();
    bus.on(ALL, move |_| {
        seen.borrow_mut().push("all".to_string());
        Ok(())
    });

    bus.emit(ALL, &0).unwrap();
    assert_eq!(log.borrow().len(), 1);
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn test_off_single_handler() {
    let (log, bus) = recorder();
    let seen = log.clone();
    let id = bus.on("x", move |_| {
        seen.borrow_mut().push("a".to_string());
        Ok(())
    });
    let seen = log.clone();
    bus.on("x", move |_| {
        seen.borrow_mut().push("b".to_string());
        Ok(())
    });

    assert_eq!(bus.off("x", Some(id)), 1);
    bus.emit("x", &0).unwrap();

    assert_eq!(*log.borrow(), vec!["b"]);
}

#[test]
fn test_off_all_handlers_of_event() {
    let bus: EventBus<i32> = EventBus::new();
    bus.on("x", |_| Ok(()));
    bus.on("x", |_| Ok(()));
    bus.on("y", |_| Ok(()));

    assert_eq!(bus.off("x", None), 2);
    assert_eq!(bus.listener_count("x"), 0);
    assert_eq!(bus.listener_count("y"), 1);
}

#[test]
fn test_clear() {
    let bus: EventBus<i32> = EventBus::new();
    bus.on("x", |_| Ok(()));
    bus.on(ALL, |_| Ok(()));
    bus.clear();
    assert_eq!(bus.listener_count("x"), 0);
    assert_eq!(bus.listener_count(ALL), 0);
}

#[test]
fn test_subscription_drop_removes_handler() {
    let bus: EventBus<i32> = EventBus::new();
    let subscription = bus.subscribe("x", |_| Ok(()));
    assert_eq!(bus.listener_count("x"), 1);

    drop(subscription);
    assert_eq!(bus.listener_count("x"), 0);
}

#[test]
fn test_subscription_detach() {
    let bus: EventBus<i32> = EventBus::new();
    let subscription = bus.subscribe("x", |_| Ok(()));
    subscription.detach();
    assert_eq!(bus.listener_count("x"), 0);
}

#[test]
fn test_handler_removed_during_emit_is_skipped() {
    let (log, bus) = recorder();
    let second = Rc::new(RefCell::new(None));

    let handle = bus.clone();
    let target = second.clone();
    bus.on("x", move |_| {
        if let Some(id) = *target.borrow() {
            handle.off("x", Some(id));
        }
        Ok(())
    });
    let seen = log.clone();
    let id = bus.on("x", move |_| {
        seen.borrow_mut().push("second".to_string());
        Ok(())
    });
    *second.borrow_mut() = Some(id);

    bus.emit("x", &0).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn test_handler_added_during_emit_waits_for_next_emit() {
    let (log, bus) = recorder();
    let handle = bus.clone();
    let seen = log.clone();
    bus.on("x", move |_| {
        let seen = seen.clone();
        handle.on("x", move |_| {
            seen.borrow_mut().push("late".to_string());
            Ok(())
        });
        Ok(())
    });

    bus.emit("x", &0).unwrap();
    assert!(log.borrow().is_empty());

    bus.emit("x", &0).unwrap();
    assert_eq!(*log.borrow(), vec!["late"]);
}

// =============================================================================
// Faults
// =============================================================================

#[test]
fn test_failing_handler_aborts_delivery() {
    let (log, bus) = recorder();
    let seen = log.clone();
    bus.on("save", move |_| {
        seen.borrow_mut().push("before".to_string());
        Ok(())
    });
    bus.on("save", |_| Err(HandlerError::new("disk full")));
    let seen = log.clone();
    bus.on("save", move |_| {
        seen.borrow_mut().push("after".to_string());
        Ok(())
    });
    let seen = log.clone();
    bus.on(ALL, move |_| {
        seen.borrow_mut().push("all".to_string());
        Ok(())
    });

    let error = bus.emit("save", &0).unwrap_err();

    assert_eq!(*log.borrow(), vec!["before"]);
    assert_eq!(error.event(), "save");
    match error {
        EventError::Handler { source, .. } => assert_eq!(source.message(), "disk full"),
    }
}

#[test]
fn test_fault_does_not_unregister_handlers() {
    let bus: EventBus<i32> = EventBus::new();
    bus.on("x", |n| {
        if *n < 0 {
            Err(HandlerError::new("negative"))
        } else {
            Ok(())
        }
    });

    assert!(bus.emit("x", &-1).is_err());
    assert!(bus.emit("x", &1).is_ok());
    assert_eq!(bus.listener_count("x"), 1);
}

#[test]
fn test_handler_error_display() {
    let error = EventError::handler("save", HandlerError::new("disk full"));
    let display = format!("{}", error);
    assert!(display.contains("save"));
    assert!(display.contains("disk full"));
}
