//! Backbone-style views over models and collections.
//!
//! - [`model`] and [`collection`]: observable attribute maps and ordered
//!   sets of them, optionally synced from a JSON endpoint.
//! - [`view`]: components with a hookable show/hide lifecycle, item
//!   renderers, repeaters and modals.
//! - [`dom`]: the element tree views render into, with effects and
//!   animators.
//!
//! Everything is single-threaded and synchronous: a mutation notifies every
//! listener, and every bound view has re-rendered, before the call returns.

pub mod collection;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod sync;
pub mod view;

pub use traction_dom as dom;

/// Commonly used types.
pub mod prelude {
    pub use crate::collection::{Collection, CollectionEvent};
    pub use crate::config::ApiConfig;
    pub use crate::error::{EventError, FetchError, HandlerError};
    pub use crate::events::{ALL, EventBus, HandlerResult, ListenerId, Subscription};
    pub use crate::model::{Attributes, CHANGE, Changes, Model};
    pub use crate::sync::{Endpoint, Transport};
    pub use crate::view::{
        Component, Hooks, ItemRenderer, Modal, Options, Overlay, Repeater, Row, Table,
        ToggleSurface, View, Visibility,
    };
    pub use traction_dom::{Effect, Element, Transition};
}
