//! Components and their specializations.
//!
//! A [`Component`] owns a rendering target and a show/hide lifecycle. What
//! it renders and how it reacts is supplied by a [`View`]:
//!
//! - `()` for a plain component,
//! - [`ItemRenderer`] for one model,
//! - [`Repeater`] for one row per member of a collection,
//! - [`Modal`] for a component driven by a [`ToggleSurface`].

mod component;
mod item;
mod modal;
mod options;
mod repeater;
mod traits;

pub use component::{Component, Visibility, WeakComponent};
pub use item::{ItemRenderer, Row, RowRenderer};
pub use modal::{Modal, Overlay, TITLE_CLASS, ToggleSurface};
pub use options::Options;
pub use repeater::{EMPTY_PLACEHOLDER_CLASS, Repeater, RepeaterRef, Table};
pub use traits::{Hooks, View};

/// Emitted when a show starts.
pub const SHOW: &str = "show";
/// Emitted once a show has completed.
pub const SHOWN: &str = "shown";
/// Emitted when a hide starts.
pub const HIDE: &str = "hide";
/// Emitted once a hide has completed.
pub const HIDDEN: &str = "hidden";
