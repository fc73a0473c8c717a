//! Attribute bags with change notification.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::collection::Collection;
use crate::error::{EventError, FetchError};
use crate::events::{EventBus, HandlerResult, ListenerId};
use crate::sync::{Endpoint, Transport, query_string};

/// Named attribute values of a model.
pub type Attributes = Map<String, Value>;

/// Notification name emitted once per `set` that changed anything.
pub const CHANGE: &str = "change";

/// Attribute names changed by one update, in the order they were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    names: Vec<String>,
}

impl Changes {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A record of named attributes.
///
/// Every update that changes at least one attribute emits `change:<name>` for
/// each changed attribute, then [`CHANGE`], each carrying the [`Changes`].
/// Server-reported validation errors land in the model's error container
/// (see [`Model::errors`]) rather than in its attributes.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use traction::model::Model;
///
/// let person = Model::from_value(json!({ "name": "Ada" }));
/// person.on("change:name", |changes| {
///     assert!(changes.contains("name"));
///     Ok(())
/// });
///
/// person.set("name", json!("Grace")).unwrap();
/// assert_eq!(person.get("name"), Some(json!("Grace")));
/// ```
pub struct Model {
    cid: Uuid,
    attributes: RefCell<Attributes>,
    events: EventBus<Changes>,
    errors: OnceCell<Rc<Collection>>,
    endpoint: Option<Endpoint>,
    query: RefCell<Option<String>>,
}

impl Model {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            cid: Uuid::new_v4(),
            attributes: RefCell::new(attributes),
            events: EventBus::new(),
            errors: OnceCell::new(),
            endpoint: None,
            query: RefCell::new(None),
        }
    }

    /// Build a model from a JSON value. A non-object value is stored under
    /// the `value` attribute.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::new(map),
            Value::Null => Self::new(Attributes::new()),
            other => {
                let mut map = Attributes::new();
                map.insert("value".to_string(), other);
                Self::new(map)
            }
        }
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Client-side identifier, unique per model instance.
    pub fn cid(&self) -> Uuid {
        self.cid
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    // Attributes

    pub fn get(&self, name: &str) -> Option<Value> {
        self.attributes.borrow().get(name).cloned()
    }

    /// String attribute, if present and a string.
    pub fn get_str(&self, name: &str) -> Option<String> {
        match self.attributes.borrow().get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.attributes
            .borrow()
            .get(name)
            .is_some_and(|v| !v.is_null())
    }

    /// Snapshot of every attribute.
    pub fn attributes(&self) -> Attributes {
        self.attributes.borrow().clone()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes())
    }

    pub fn set(&self, name: impl Into<String>, value: Value) -> Result<Changes, EventError> {
        let mut attributes = Attributes::new();
        attributes.insert(name.into(), value);
        self.set_all(attributes)
    }

    /// Merge `attributes` into the model and notify about what changed.
    pub fn set_all(&self, attributes: Attributes) -> Result<Changes, EventError> {
        let changes = {
            let mut current = self.attributes.borrow_mut();
            let mut names = Vec::new();
            for (name, value) in attributes {
                if current.get(&name) != Some(&value) {
                    current.insert(name.clone(), value);
                    names.push(name);
                }
            }
            Changes { names }
        };
        self.notify(&changes)?;
        Ok(changes)
    }

    pub fn unset(&self, name: &str) -> Result<Changes, EventError> {
        let removed = self.attributes.borrow_mut().remove(name).is_some();
        let changes = Changes {
            names: if removed { vec![name.to_string()] } else { Vec::new() },
        };
        self.notify(&changes)?;
        Ok(changes)
    }

    /// Remove every attribute.
    pub fn clear(&self) -> Result<Changes, EventError> {
        let previous = std::mem::take(&mut *self.attributes.borrow_mut());
        let changes = Changes {
            names: previous.into_iter().map(|(name, _)| name).collect(),
        };
        self.notify(&changes)?;
        Ok(changes)
    }

    fn notify(&self, changes: &Changes) -> Result<(), EventError> {
        if changes.is_empty() {
            return Ok(());
        }
        for name in &changes.names {
            self.events.emit(&format!("{CHANGE}:{name}"), changes)?;
        }
        self.events.emit(CHANGE, changes)
    }

    // Events

    pub fn events(&self) -> &EventBus<Changes> {
        &self.events
    }

    pub fn on<F>(&self, event: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&Changes) -> HandlerResult + 'static,
    {
        self.events.on(event, handler)
    }

    pub fn off(&self, event: &str, id: Option<ListenerId>) -> usize {
        self.events.off(event, id)
    }

    // Errors

    /// Container of server-reported validation errors, one model per error.
    ///
    /// It is reset on every [`parse`](Self::parse); listen to its `reset`
    /// notification to render them.
    pub fn errors(&self) -> Rc<Collection> {
        Rc::clone(self.errors.get_or_init(|| Rc::new(Collection::new())))
    }

    // Sync

    /// Extract the attributes from a raw server response.
    ///
    /// An `errors` array in the response resets the error container with one
    /// error model per entry; any other response resets it empty. Returns
    /// `None` when the response carries no payload for this model.
    pub fn parse(&self, raw: Value) -> Result<Option<Attributes>, FetchError> {
        let errors = match raw.get("errors") {
            Some(Value::Array(entries)) => entries.iter().map(error_model).collect(),
            _ => Vec::new(),
        };
        self.errors().reset(errors)?;

        let payload = match &self.endpoint {
            Some(endpoint) => endpoint.payload(raw),
            None => raw,
        };
        match payload {
            Value::Object(map) => Ok(Some(map)),
            Value::Null => Ok(None),
            other => Err(FetchError::malformed(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    /// URL of this model's endpoint, including the last query string.
    pub fn url(&self) -> Option<String> {
        let query = self.query.borrow();
        self.endpoint.as_ref().map(|e| e.url(query.as_deref()))
    }

    /// Load attributes from the endpoint through `transport`.
    pub fn fetch(&self, transport: &dyn Transport) -> Result<Changes, FetchError> {
        let url = self.url().ok_or(FetchError::NoEndpoint)?;
        log::debug!("Fetching model {} from {}", self.cid, url);

        let raw = transport.get(&url)?;
        match self.parse(raw)? {
            Some(attributes) => Ok(self.set_all(attributes)?),
            None => Ok(Changes::default()),
        }
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
            Ok(_) => on_success(self),
            Err(error) => {
                log::debug!("Query for model {} failed: {}", self.cid, error);
                on_failure(&error)
            }
        }
    }
}

fn error_model(entry: &Value) -> Rc<Model> {
    let model = match entry {
        Value::String(message) => {
            let mut map = Attributes::new();
            map.insert("message".to_string(), Value::String(message.clone()));
            Model::new(map)
        }
        other => Model::from_value(other.clone()),
    };
    Rc::new(model)
}

impl From<Attributes> for Model {
    fn from(attributes: Attributes) -> Self {
        Self::new(attributes)
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("cid", &self.cid)
            .field("attributes", &self.attributes.borrow())
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
