use std::rc::Rc;

use crate::element::Element;

/// A UI event delivered to a delegated handler.
#[derive(Debug, Clone)]
pub struct UiEvent {
    pub name: String,
    /// The element the event originated at.
    pub target: Element,
    /// The element the handler matched: its own element, or the closest
    /// element carrying the handler's selector class.
    pub current_target: Element,
}

/// A UI event binding attached to an element.
///
/// Bindings are declared by views and re-attached every time a view's
/// rendering target is replaced.
#[derive(Clone)]
pub struct Delegate {
    pub event: String,
    /// Class a descendant must carry for the handler to fire.
    pub selector: Option<String>,
    pub handler: Rc<dyn Fn(&UiEvent)>,
}

impl Delegate {
    pub fn new(event: impl Into<String>, handler: impl Fn(&UiEvent) + 'static) -> Self {
        Self {
            event: event.into(),
            selector: None,
            handler: Rc::new(handler),
        }
    }

    /// Restrict the binding to events coming from elements with `class`.
    /// A leading `.` is accepted and ignored.
    pub fn selector(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.selector = Some(class.strip_prefix('.').unwrap_or(&class).to_string());
        self
    }
}

impl std::fmt::Debug for Delegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delegate")
            .field("event", &self.event)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}
