use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};
use traction_dom::{Animator, Effect, Element, Immediate, Transition};

use super::{HIDDEN, HIDE, Options, SHOW, SHOWN, View};
use crate::collection::Collection;
use crate::error::EventError;
use crate::events::{EventBus, HandlerResult, ListenerId, Subscription};
use crate::model::Model;

/// Visibility state of a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

struct Inner<V> {
    view: V,
    element: RefCell<Element>,
    model: Option<Rc<Model>>,
    collection: RefCell<Option<Rc<Collection>>>,
    events: EventBus<Value>,
    visibility: Cell<Visibility>,
    animator: Rc<dyn Animator>,
    subscriptions: RefCell<Vec<Subscription>>,
    extra: Map<String, Value>,
}

/// A renderable unit with a hookable show/hide lifecycle.
///
/// `Component` is a cheap handle; clones share the same component. It owns
/// one rendering target, an event bus for its lifecycle signals, and every
/// subscription it installs through [`listen_to`](Self::listen_to). Dropping
/// the last handle (or calling [`destroy`](Self::destroy)) releases those
/// subscriptions.
///
/// Specialized behavior comes from the [`View`] it is built with.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use traction::view::{Component, Options};
///
/// let panel = Component::new((), Options::new());
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// for signal in ["show", "shown", "hide", "hidden"] {
///     let seen = seen.clone();
///     panel.on(signal, move |_| {
///         seen.borrow_mut().push(signal);
///         Ok(())
///     });
/// }
///
/// panel.show(None).unwrap();
/// panel.hide(None).unwrap();
/// assert_eq!(*seen.borrow(), vec!["show", "shown", "hide", "hidden"]);
/// ```
pub struct Component<V: View> {
    inner: Rc<Inner<V>>,
}

impl<V: View> Clone for Component<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// A non-owning handle to a [`Component`].
pub struct WeakComponent<V: View> {
    inner: Weak<Inner<V>>,
}

impl<V: View> Clone for WeakComponent<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<V: View> WeakComponent<V> {
    pub fn upgrade(&self) -> Option<Component<V>> {
        self.inner.upgrade().map(|inner| Component { inner })
    }
}

impl<V: View> Component<V> {
    /// Build a component, wire its defaults, then run the view's
    /// `post_initialize` with the same options.
    pub fn new(view: V, options: Options) -> Self {
        let element = options
            .element
            .clone()
            .unwrap_or_else(|| Element::new(view.tag_name()));
        let animator: Rc<dyn Animator> = match &options.animator {
            Some(animator) => Rc::clone(animator),
            None => Rc::new(Immediate),
        };

        if options.model.is_some() && options.collection.is_some() {
            log::warn!(
                "{} built with both a model and a collection; expected one primary binding",
                std::any::type_name::<V>()
            );
        }

        let component = Self {
            inner: Rc::new(Inner {
                view,
                element: RefCell::new(element),
                model: options.model.clone(),
                collection: RefCell::new(options.collection.clone()),
                events: EventBus::new(),
                visibility: Cell::new(Visibility::Hidden),
                animator,
                subscriptions: RefCell::new(Vec::new()),
                extra: options.extra.clone(),
            }),
        };

        // Default error rendering
        if let Some(model) = &options.model {
            component.listen_to(model.errors().events(), "reset", |component, _| {
                if let Some(model) = component.model() {
                    component.view().render_errors(&model.errors());
                }
                Ok(())
            });
        }

        component.view().post_initialize(&component, &options);
        component
    }

    pub fn view(&self) -> &V {
        &self.inner.view
    }

    pub fn downgrade(&self) -> WeakComponent<V> {
        WeakComponent {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns true if both handles point at the same component.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // Bindings

    pub fn model(&self) -> Option<Rc<Model>> {
        self.inner.model.clone()
    }

    pub fn collection(&self) -> Option<Rc<Collection>> {
        self.inner.collection.borrow().clone()
    }

    pub(crate) fn set_collection(&self, collection: Option<Rc<Collection>>) {
        *self.inner.collection.borrow_mut() = collection;
    }

    /// An extension option passed at construction.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.inner.extra.get(key)
    }

    pub fn animator(&self) -> Rc<dyn Animator> {
        Rc::clone(&self.inner.animator)
    }

    // Rendering target

    pub fn element(&self) -> Element {
        self.inner.element.borrow().clone()
    }

    /// Swap the rendering target and re-attach the view's UI bindings to it.
    pub fn set_element(&self, element: Element) {
        let previous = self.inner.element.replace(element);
        previous.undelegate_all();
        self.delegate_events();
    }

    /// Regenerate the rendering target through the view.
    pub fn render(&self) -> &Self {
        self.view().render(self);
        self
    }

    /// Re-attach the view's UI bindings to the current rendering target.
    pub fn delegate_events(&self) {
        let element = self.element();
        element.undelegate_all();
        for delegate in self.view().bindings() {
            element.delegate(delegate);
        }
    }

    pub fn undelegate_events(&self) {
        self.element().undelegate_all();
    }

    // Events

    pub fn events(&self) -> &EventBus<Value> {
        &self.inner.events
    }

    pub fn on<F>(&self, event: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&Value) -> HandlerResult + 'static,
    {
        self.inner.events.on(event, handler)
    }

    /// Handle every signal of this component, with its name.
    pub fn on_all<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&str, &Value) -> HandlerResult + 'static,
    {
        self.inner.events.on_all(handler)
    }

    pub fn off(&self, event: &str, id: Option<ListenerId>) -> usize {
        self.inner.events.off(event, id)
    }

    pub fn emit(&self, event: &str) -> Result<(), EventError> {
        self.inner.events.emit(event, &Value::Null)
    }

    pub fn emit_with(&self, event: &str, args: &Value) -> Result<(), EventError> {
        self.inner.events.emit(event, args)
    }

    /// Handle `event` on `bus` for as long as this component lives.
    ///
    /// The handler receives the component itself; the subscription is
    /// released on [`destroy`](Self::destroy) or when the component drops.
    pub fn listen_to<A, F>(&self, bus: &EventBus<A>, event: impl Into<String>, handler: F)
    where
        A: 'static,
        F: Fn(&Self, &A) -> HandlerResult + 'static,
    {
        let weak = self.downgrade();
        let subscription = bus.subscribe(event, move |args| match weak.upgrade() {
            Some(component) => handler(&component, args),
            None => Ok(()),
        });
        self.inner.subscriptions.borrow_mut().push(subscription);
    }

    /// Number of subscriptions installed through `listen_to`.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.borrow().len()
    }

    // Visibility

    pub fn visibility(&self) -> Visibility {
        self.inner.visibility.get()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility() == Visibility::Visible
    }

    /// Make the component visible.
    ///
    /// Emits `show`, calls `before_show`, shows the element (through the
    /// animator when an effect is given), then emits `shown` and calls
    /// `after_show`. With an effect, the last two steps run once the
    /// animator reports completion, after the effect's own callback.
    pub fn show(&self, effect: Option<Effect>) -> Result<(), EventError> {
        if let Some(surface) = self.view().toggle_surface() {
            log::debug!("Component {}: show delegated to surface", self.element().id());
            return surface.open();
        }
        self.transition(Transition::Show, effect)
    }

    /// Make the component invisible: `hide`, `before_hide`, element hidden,
    /// `hidden`, `after_hide`.
    pub fn hide(&self, effect: Option<Effect>) -> Result<(), EventError> {
        if let Some(surface) = self.view().toggle_surface() {
            log::debug!("Component {}: hide delegated to surface", self.element().id());
            return surface.close();
        }
        self.transition(Transition::Hide, effect)
    }

    fn transition(&self, transition: Transition, effect: Option<Effect>) -> Result<(), EventError> {
        self.begin(transition)?;

        let element = self.element();
        let Some(effect) = effect else {
            element.set_visible(transition == Transition::Show);
            return self.complete(transition);
        };

        log::trace!(
            "Component {}: {:?} with effect '{}'",
            element.id(),
            transition,
            effect.name
        );
        let callback = effect.callback();
        let weak = self.downgrade();
        self.inner.animator.run(
            &element,
            transition,
            &effect,
            Box::new(move || {
                if let Some(callback) = callback {
                    callback();
                }
                if let Some(component) = weak.upgrade() {
                    if let Err(error) = component.complete(transition) {
                        log::warn!("Deferred {:?} completion failed: {}", transition, error);
                    }
                }
            }),
        );
        Ok(())
    }

    /// Opening half of a transition: emit the begin signal, run the pre-hook.
    pub(crate) fn begin(&self, transition: Transition) -> Result<(), EventError> {
        match transition {
            Transition::Show => {
                self.emit(SHOW)?;
                self.view().before_show();
            }
            Transition::Hide => {
                self.emit(HIDE)?;
                self.view().before_hide();
            }
        }
        Ok(())
    }

    /// Closing half of a transition: record the state, emit the end signal,
    /// run the post-hook.
    pub(crate) fn complete(&self, transition: Transition) -> Result<(), EventError> {
        match transition {
            Transition::Show => {
                self.inner.visibility.set(Visibility::Visible);
                self.emit(SHOWN)?;
                self.view().after_show();
            }
            Transition::Hide => {
                self.inner.visibility.set(Visibility::Hidden);
                self.emit(HIDDEN)?;
                self.view().after_hide();
            }
        }
        Ok(())
    }

    // Teardown

    /// Release every subscription, drop UI bindings and detach the rendering
    /// target. The component stays usable as a handle but no longer reacts
    /// to its model or collection.
    pub fn destroy(&self) {
        self.view().on_destroy(self);

        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        let released = subscriptions.len();
        drop(subscriptions);

        let element = self.element();
        element.undelegate_all();
        element.detach();
        log::trace!(
            "Component {} destroyed ({} subscription(s) released)",
            element.id(),
            released
        );
    }
}

impl<V: View> std::fmt::Debug for Component<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("view", &std::any::type_name::<V>())
            .field("element", &self.element().id())
            .field("visibility", &self.visibility())
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}
