use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::Content;
use crate::event::{Delegate, UiEvent};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_id(prefix: &str) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id}")
}

struct Node {
    // Identity
    id: String,
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,

    // Content
    content: Content,

    // Visual
    visible: bool,
    /// Animation progress, 0.0 (transparent) to 1.0 (opaque).
    opacity: f32,

    // Tree
    parent: Weak<RefCell<Node>>,

    // Interaction
    delegates: Vec<Delegate>,
}

/// A displayable unit: a shared handle onto one node of an element tree.
///
/// Cloning an `Element` clones the handle, not the node. Identity is pointer
/// identity (see [`Element::ptr_eq`]). A parent owns its children; a child
/// only keeps a weak pointer back to its parent, so detaching a subtree and
/// dropping every handle to it frees it.
///
/// # Example
///
/// ```
/// use traction_dom::Element;
///
/// let table = Element::new("table")
///     .child(Element::new("tr").class("nodata").with_text("Nothing here"));
///
/// let row = Element::new("tr").with_text("Ada");
/// table.append_child(&row);
///
/// assert_eq!(table.child_count(), 2);
/// assert!(row.parent().is_some_and(|p| p.ptr_eq(&table)));
/// ```
#[derive(Clone)]
pub struct Element {
    node: Rc<RefCell<Node>>,
}

/// A non-owning handle to an [`Element`].
#[derive(Clone, Default)]
pub struct WeakElement {
    node: Weak<RefCell<Node>>,
}

impl WeakElement {
    pub fn upgrade(&self) -> Option<Element> {
        self.node.upgrade().map(|node| Element { node })
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            node: Rc::new(RefCell::new(Node {
                id: generate_id(&tag),
                tag,
                classes: Vec::new(),
                attributes: BTreeMap::new(),
                content: Content::None,
                visible: true,
                opacity: 1.0,
                parent: Weak::new(),
                delegates: Vec::new(),
            })),
        }
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    pub fn span(text: impl Into<String>) -> Self {
        Self::new("span").with_text(text)
    }

    // Builders

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.node.borrow_mut().id = id.into();
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn child(self, child: Element) -> Self {
        self.append_child(&child);
        self
    }

    pub fn hidden(self) -> Self {
        self.set_visible(false);
        self
    }

    // Identity

    pub fn id(&self) -> String {
        self.node.borrow().id.clone()
    }

    pub fn tag(&self) -> String {
        self.node.borrow().tag.clone()
    }

    /// Returns true if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    pub fn downgrade(&self) -> WeakElement {
        WeakElement {
            node: Rc::downgrade(&self.node),
        }
    }

    // Classes and attributes

    pub fn has_class(&self, class: &str) -> bool {
        let class = class.strip_prefix('.').unwrap_or(class);
        self.node.borrow().classes.iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: impl Into<String>) {
        let class = class.into();
        let mut node = self.node.borrow_mut();
        if !node.classes.contains(&class) {
            node.classes.push(class);
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.node.borrow_mut().classes.retain(|c| c != class);
    }

    pub fn classes(&self) -> Vec<String> {
        self.node.borrow().classes.clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.node.borrow().attributes.get(name).cloned()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.node
            .borrow_mut()
            .attributes
            .insert(name.into(), value.into());
    }

    // Content

    /// Replace the content with a text run. Existing children are detached.
    pub fn set_text(&self, text: impl Into<String>) {
        let previous = std::mem::replace(
            &mut self.node.borrow_mut().content,
            Content::Text(text.into()),
        );
        if let Content::Children(children) = previous {
            for child in &children {
                child.node.borrow_mut().parent = Weak::new();
            }
        }
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_content(&self) -> String {
        match &self.node.borrow().content {
            Content::None => String::new(),
            Content::Text(text) => text.clone(),
            Content::Children(children) => children.iter().map(Element::text_content).collect(),
        }
    }

    // Visual

    pub fn is_visible(&self) -> bool {
        self.node.borrow().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.node.borrow_mut().visible = visible;
    }

    pub fn opacity(&self) -> f32 {
        self.node.borrow().opacity
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.node.borrow_mut().opacity = opacity.clamp(0.0, 1.0);
    }

    // Tree

    pub fn parent(&self) -> Option<Element> {
        self.node.borrow().parent.upgrade().map(|node| Element { node })
    }

    pub fn children(&self) -> Vec<Element> {
        match &self.node.borrow().content {
            Content::Children(children) => children.clone(),
            _ => Vec::new(),
        }
    }

    pub fn child_count(&self) -> usize {
        match &self.node.borrow().content {
            Content::Children(children) => children.len(),
            _ => 0,
        }
    }

    pub fn children_with_class(&self, class: &str) -> Vec<Element> {
        self.children()
            .into_iter()
            .filter(|c| c.has_class(class))
            .collect()
    }

    /// Returns true if `other` is a strict descendant of this element.
    pub fn contains(&self, other: &Element) -> bool {
        let mut current = other.parent();
        while let Some(el) = current {
            if el.ptr_eq(self) {
                return true;
            }
            current = el.parent();
        }
        false
    }

    /// Append `child` as the last child, detaching it from any previous parent.
    ///
    /// A text run already held by this element is kept as a leading `span`.
    pub fn append_child(&self, child: &Element) {
        if self.ptr_eq(child) || child.contains(self) {
            log::warn!(
                "Refusing to append {} into its own subtree",
                child.id()
            );
            return;
        }

        child.detach();
        child.node.borrow_mut().parent = Rc::downgrade(&self.node);

        let mut node = self.node.borrow_mut();
        match &mut node.content {
            Content::Children(children) => children.push(child.clone()),
            content => {
                let mut children = Vec::new();
                if let Content::Text(text) = std::mem::take(content) {
                    let run = Element::span(text);
                    run.node.borrow_mut().parent = Rc::downgrade(&self.node);
                    children.push(run);
                }
                children.push(child.clone());
                *content = Content::Children(children);
            }
        }
    }

    /// Remove this element from its parent. Returns false if it had none.
    pub fn detach(&self) -> bool {
        let parent = self.node.borrow().parent.upgrade();
        let Some(parent) = parent else {
            return false;
        };

        self.node.borrow_mut().parent = Weak::new();
        let removed = match &mut parent.borrow_mut().content {
            Content::Children(children) => children
                .iter()
                .position(|c| c.ptr_eq(self))
                .map(|index| children.remove(index)),
            _ => None,
        };
        removed.is_some()
    }

    /// Remove every child matching `predicate`, returning them in order.
    pub fn remove_children(&self, mut predicate: impl FnMut(&Element) -> bool) -> Vec<Element> {
        let removed: Vec<Element> = {
            let mut node = self.node.borrow_mut();
            match &mut node.content {
                Content::Children(children) => {
                    let (removed, kept) = std::mem::take(children)
                        .into_iter()
                        .partition(|c| predicate(c));
                    *children = kept;
                    removed
                }
                _ => Vec::new(),
            }
        };

        for child in &removed {
            child.node.borrow_mut().parent = Weak::new();
        }
        removed
    }

    /// Put `replacement` into this element's slot in its parent.
    ///
    /// Returns false (and does nothing) when this element is detached.
    pub fn replace_with(&self, replacement: &Element) -> bool {
        if self.ptr_eq(replacement) {
            return true;
        }
        let Some(parent) = self.parent() else {
            return false;
        };
        if replacement.contains(self) {
            return false;
        }

        replacement.detach();
        let replaced = {
            let mut node = parent.node.borrow_mut();
            match &mut node.content {
                Content::Children(children) => children
                    .iter_mut()
                    .find(|c| c.ptr_eq(self))
                    .map(|slot| std::mem::replace(slot, replacement.clone())),
                _ => None,
            }
        };

        if replaced.is_none() {
            return false;
        }
        replacement.node.borrow_mut().parent = Rc::downgrade(&parent.node);
        self.node.borrow_mut().parent = Weak::new();
        true
    }

    /// First descendant (depth-first, excluding self) carrying `class`.
    pub fn find_by_class(&self, class: &str) -> Option<Element> {
        for child in self.children() {
            if child.has_class(class) {
                return Some(child);
            }
            if let Some(found) = child.find_by_class(class) {
                return Some(found);
            }
        }
        None
    }

    // Interaction

    /// Bind a UI event handler on this element.
    pub fn delegate(&self, delegate: Delegate) {
        self.node.borrow_mut().delegates.push(delegate);
    }

    /// Drop every UI event handler bound on this element.
    pub fn undelegate_all(&self) {
        let previous = std::mem::take(&mut self.node.borrow_mut().delegates);
        drop(previous);
    }

    pub fn delegate_count(&self) -> usize {
        self.node.borrow().delegates.len()
    }

    /// Fire a UI event originating at this element.
    ///
    /// The event bubbles up through the ancestors. A handler without a
    /// selector runs for any event reaching its element; a handler with a
    /// selector runs only when an element between the origin (inclusive) and
    /// the handler's element (exclusive) carries the selector class.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &str) -> usize {
        let mut invoked = 0;
        let mut path: Vec<Element> = Vec::new();
        let mut current = Some(self.clone());

        while let Some(el) = current {
            let delegates: Vec<Delegate> = el
                .node
                .borrow()
                .delegates
                .iter()
                .filter(|d| d.event == event)
                .cloned()
                .collect();

            for delegate in delegates {
                let current_target = match &delegate.selector {
                    None => Some(el.clone()),
                    Some(class) => path.iter().find(|p| p.has_class(class)).cloned(),
                };
                if let Some(current_target) = current_target {
                    (delegate.handler)(&UiEvent {
                        name: event.to_string(),
                        target: self.clone(),
                        current_target,
                    });
                    invoked += 1;
                }
            }

            path.push(el.clone());
            current = el.parent();
        }

        log::trace!("Dispatched '{}' from {}: {} handler(s)", event, self.id(), invoked);
        invoked
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.node.borrow();
        f.debug_struct("Element")
            .field("id", &node.id)
            .field("tag", &node.tag)
            .field("classes", &node.classes)
            .field("visible", &node.visible)
            .field("content", &node.content)
            .finish()
    }
}
