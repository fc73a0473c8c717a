//! Hook and strategy traits for components.

use traction_dom::Delegate;

use super::{Component, Options, ToggleSurface};
use crate::collection::Collection;

/// Interception points of a component's lifecycle.
///
/// Every hook is a no-op by default. Implement only what you need.
pub trait Hooks: 'static {
    /// Called after `show` is emitted, before the element becomes visible.
    fn before_show(&self) {}

    /// Called after `shown` is emitted.
    fn after_show(&self) {}

    /// Called after `hide` is emitted, before the element is hidden.
    fn before_hide(&self) {}

    /// Called after `hidden` is emitted.
    fn after_hide(&self) {}

    /// Called whenever the bound model's error container is reset.
    fn render_errors(&self, _errors: &Collection) {}

    /// Post-construction customization, with the construction options.
    fn customize(&self, _options: &Options) {}
}

impl Hooks for () {}

/// Behavior a [`Component`] delegates to its specialization.
///
/// A plain component uses `()`. Item renderers, repeaters and modals are
/// `View`s wrapping a user type that supplies their hooks.
pub trait View: Hooks + Sized {
    /// Tag of the element created when the options carry none.
    fn tag_name(&self) -> &str {
        "div"
    }

    /// Runs once, after the component's default wiring.
    fn post_initialize(&self, _component: &Component<Self>, options: &Options) {
        self.customize(options);
    }

    /// Regenerate the component's rendering target.
    fn render(&self, _component: &Component<Self>) {}

    /// UI event handlers attached to the rendering target.
    fn bindings(&self) -> Vec<Delegate> {
        Vec::new()
    }

    /// An external surface that performs show/hide instead of the component.
    fn toggle_surface(&self) -> Option<&dyn ToggleSurface> {
        None
    }

    /// Release whatever the specialization owns when the component is
    /// destroyed.
    fn on_destroy(&self, _component: &Component<Self>) {}
}

impl View for () {}
