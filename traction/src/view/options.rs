use std::rc::Rc;

use serde_json::{Map, Value};
use traction_dom::{Animator, Element};

use super::RepeaterRef;
use crate::collection::Collection;
use crate::model::Model;

/// Construction options of a component.
#[derive(Clone, Default)]
pub struct Options {
    /// Model the component renders.
    pub model: Option<Rc<Model>>,
    /// Collection the component binds.
    pub collection: Option<Rc<Collection>>,
    /// Existing element to use as the rendering target.
    pub element: Option<Element>,
    /// Back-reference handed to rows built by a repeater.
    pub repeater: Option<RepeaterRef>,
    /// Animator for show/hide effects. Defaults to completing immediately.
    pub animator: Option<Rc<dyn Animator>>,
    /// Free-form options for specializations.
    pub extra: Map<String, Value>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: Rc<Model>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn collection(mut self, collection: Rc<Collection>) -> Self {
        self.collection = Some(collection);
        self
    }

    pub fn element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn repeater(mut self, repeater: RepeaterRef) -> Self {
        self.repeater = Some(repeater);
        self
    }

    pub fn animator(mut self, animator: Rc<dyn Animator>) -> Self {
        self.animator = Some(animator);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("model", &self.model.as_ref().map(|m| m.cid()))
            .field("collection", &self.collection.as_ref().map(|c| c.len()))
            .field("element", &self.element.as_ref().map(|e| e.id()))
            .field("repeater", &self.repeater.is_some())
            .field("animator", &self.animator.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}
