use std::cell::RefCell;

use traction_dom::{Delegate, Element};

use super::{Component, Hooks, Options, RepeaterRef, View};
use crate::collection::Collection;
use crate::model::{Attributes, CHANGE};

/// Renders one model's attributes into an element.
pub trait Row: Hooks {
    /// Build a fresh element from an attribute snapshot.
    fn template(&self, attributes: &Attributes) -> Element;

    /// UI event handlers for the row's element.
    fn bindings(&self) -> Vec<Delegate> {
        Vec::new()
    }
}

/// A view that renders exactly one model and re-renders when it changes.
///
/// Each re-render replaces the rendering target wholesale. When the old
/// target sits in a container, the new one takes its slot, so sibling
/// targets are left untouched.
pub struct ItemRenderer<R: Row> {
    row: R,
    repeater: RefCell<Option<RepeaterRef>>,
}

/// Item renderer used for table rows.
pub type RowRenderer<R> = ItemRenderer<R>;

impl<R: Row> ItemRenderer<R> {
    pub fn new(row: R) -> Self {
        Self {
            row,
            repeater: RefCell::new(None),
        }
    }

    pub fn row(&self) -> &R {
        &self.row
    }

    /// The repeater that built this renderer, if any.
    pub fn repeater(&self) -> Option<RepeaterRef> {
        self.repeater.borrow().clone()
    }
}

impl<R: Row> Hooks for ItemRenderer<R> {
    fn before_show(&self) {
        self.row.before_show();
    }

    fn after_show(&self) {
        self.row.after_show();
    }

    fn before_hide(&self) {
        self.row.before_hide();
    }

    fn after_hide(&self) {
        self.row.after_hide();
    }

    fn render_errors(&self, errors: &Collection) {
        self.row.render_errors(errors);
    }

    fn customize(&self, options: &Options) {
        self.row.customize(options);
    }
}

impl<R: Row> View for ItemRenderer<R> {
    fn post_initialize(&self, component: &Component<Self>, options: &Options) {
        if let Some(model) = component.model() {
            component.listen_to(model.events(), CHANGE, |renderer, _| {
                renderer.render();
                Ok(())
            });
        }

        *self.repeater.borrow_mut() = options.repeater.clone();
        self.row.customize(options);
    }

    fn render(&self, component: &Component<Self>) {
        let Some(model) = component.model() else {
            log::debug!("Item renderer without a model; nothing to render");
            return;
        };

        let fresh = self.row.template(&model.attributes());
        component.element().replace_with(&fresh);
        component.set_element(fresh);
    }

    fn bindings(&self) -> Vec<Delegate> {
        self.row.bindings()
    }
}
