//! Ordered sequences of models.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use serde_json::Value;
use uuid::Uuid;

use crate::error::{EventError, FetchError};
use crate::events::{EventBus, HandlerResult, ListenerId};
use crate::model::Model;
use crate::sync::{Endpoint, Transport, query_string};

/// A membership or ordering change of a [`Collection`].
#[derive(Debug, Clone)]
pub enum CollectionEvent {
    /// `model` was inserted at `index`.
    Add { model: Rc<Model>, index: usize },
    /// `model` was removed from `index`.
    Remove { model: Rc<Model>, index: usize },
    /// Every model was replaced; `previous` holds the old members.
    Reset { previous: Vec<Rc<Model>> },
    /// The members were reordered.
    Sort,
}

impl CollectionEvent {
    /// Notification name this change is emitted under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Reset { .. } => "reset",
            Self::Sort => "sort",
        }
    }
}

/// An ordered sequence of models with change notification.
///
/// Each mutation notifies synchronously under its own name (`add`, `remove`,
/// `reset`, `sort`) and then under `all`, before the mutating call returns.
/// Attribute changes of member models are not forwarded.
#[derive(Default)]
pub struct Collection {
    models: RefCell<Vec<Rc<Model>>>,
    events: EventBus<CollectionEvent>,
    endpoint: Option<Endpoint>,
    query: RefCell<Option<String>>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_models(models: Vec<Rc<Model>>) -> Self {
        Self {
            models: RefCell::new(models),
            ..Self::default()
        }
    }

    /// Build a collection with one model per JSON value.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self::from_models(
            values
                .into_iter()
                .map(|v| Rc::new(Model::from_value(v)))
                .collect(),
        )
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    // Access

    pub fn len(&self) -> usize {
        self.models.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.borrow().is_empty()
    }

    pub fn at(&self, index: usize) -> Option<Rc<Model>> {
        self.models.borrow().get(index).cloned()
    }

    pub fn get(&self, cid: Uuid) -> Option<Rc<Model>> {
        self.models.borrow().iter().find(|m| m.cid() == cid).cloned()
    }

    pub fn index_of(&self, model: &Model) -> Option<usize> {
        self.models
            .borrow()
            .iter()
            .position(|m| m.cid() == model.cid())
    }

    pub fn contains(&self, model: &Model) -> bool {
        self.index_of(model).is_some()
    }

    /// Snapshot of the members, in order.
    pub fn models(&self) -> Vec<Rc<Model>> {
        self.models.borrow().clone()
    }

    /// Visit every member in order. Mutations made by `f` do not affect the
    /// iteration.
    pub fn each(&self, mut f: impl FnMut(usize, &Rc<Model>)) {
        for (index, model) in self.models().iter().enumerate() {
            f(index, model);
        }
    }

    // Mutation

    /// Append `model`. Adding a model that is already a member does nothing.
    pub fn add(&self, model: Rc<Model>) -> Result<(), EventError> {
        let index = self.len();
        self.insert(index, model)
    }

    /// Insert `model` at `index` (clamped to the length).
    pub fn insert(&self, index: usize, model: Rc<Model>) -> Result<(), EventError> {
        if self.contains(&model) {
            return Ok(());
        }
        let index = {
            let mut models = self.models.borrow_mut();
            let index = index.min(models.len());
            models.insert(index, Rc::clone(&model));
            index
        };
        self.notify(CollectionEvent::Add { model, index })
    }

    /// Remove `model`, returning the index it held.
    pub fn remove(&self, model: &Model) -> Result<Option<usize>, EventError> {
        let removed = {
            let mut models = self.models.borrow_mut();
            models
                .iter()
                .position(|m| m.cid() == model.cid())
                .map(|index| (index, models.remove(index)))
        };
        match removed {
            Some((index, model)) => {
                self.notify(CollectionEvent::Remove { model, index })?;
                Ok(Some(index))
            }
            None => Ok(None),
        }
    }

    /// Replace every member with `models`.
    pub fn reset(&self, models: Vec<Rc<Model>>) -> Result<(), EventError> {
        let previous = std::mem::replace(&mut *self.models.borrow_mut(), models);
        self.notify(CollectionEvent::Reset { previous })
    }

    /// Stable-sort the members with `compare`.
    pub fn sort_by(&self, mut compare: impl FnMut(&Model, &Model) -> Ordering) -> Result<(), EventError> {
        self.models.borrow_mut().sort_by(|a, b| compare(a, b));
        self.notify(CollectionEvent::Sort)
    }

    fn notify(&self, event: CollectionEvent) -> Result<(), EventError> {
        log::trace!("Collection {}: {} member(s)", event.name(), self.len());
        self.events.emit(event.name(), &event)
    }

    // Events

    pub fn events(&self) -> &EventBus<CollectionEvent> {
        &self.events
    }

    pub fn on<F>(&self, event: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&CollectionEvent) -> HandlerResult + 'static,
    {
        self.events.on(event, handler)
    }

    pub fn off(&self, event: &str, id: Option<ListenerId>) -> usize {
        self.events.off(event, id)
    }

    // Sync

    /// Turn a raw server response into member models.
    pub fn parse(&self, raw: Value) -> Result<Vec<Rc<Model>>, FetchError> {
        let payload = match &self.endpoint {
            Some(endpoint) => endpoint.payload(raw),
            None => raw,
        };
        match payload {
            Value::Array(items) => Ok(items
                .into_iter()
                .map(|item| Rc::new(Model::from_value(item)))
                .collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(FetchError::malformed(format!(
                "expected an array, got {other}"
            ))),
        }
    }

    /// URL of this collection's endpoint, including the last query string.
    pub fn url(&self) -> Option<String> {
        let query = self.query.borrow();
        self.endpoint.as_ref().map(|e| e.url(query.as_deref()))
    }

    /// Replace the members with what the endpoint returns.
    pub fn fetch(&self, transport: &dyn Transport) -> Result<(), FetchError> {
        let url = self.url().ok_or(FetchError::NoEndpoint)?;
        log::debug!("Fetching collection from {}", url);

        let raw = transport.get(&url)?;
        let models = self.parse(raw)?;
        Ok(self.reset(models)?)
    }

    /// Fetch with `params` as the query string, reporting the outcome to one
    /// of the callbacks.
    pub fn query<K, V>(
        &self,
        params: impl IntoIterator<Item = (K, V)>,
        transport: &dyn Transport,
        on_success: impl FnOnce(&Self),
        on_failure: impl FnOnce(&FetchError),
    ) where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        *self.query.borrow_mut() = Some(query_string(params));
        match self.fetch(transport) {
            Ok(()) => on_success(self),
            Err(error) => {
                log::debug!("Collection query failed: {}", error);
                on_failure(&error)
            }
        }
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("len", &self.len())
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
