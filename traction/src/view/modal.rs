use std::cell::Cell;
use std::rc::Rc;

use serde_json::Value;
use traction_dom::{Animator, Effect, Element, Immediate, Transition};

use super::{Component, HIDDEN, HIDE, Hooks, Options, SHOW, SHOWN, View};
use crate::collection::Collection;
use crate::error::EventError;
use crate::events::EventBus;

/// Class of the element whose text [`Component::title`] replaces.
pub const TITLE_CLASS: &str = "title";

/// An external dialog primitive that opens and closes on its own.
///
/// A surface announces its transitions on [`events`](Self::events) with the
/// same four signals a component uses: `show`, `shown`, `hide`, `hidden`.
pub trait ToggleSurface: 'static {
    fn open(&self) -> Result<(), EventError>;

    fn close(&self) -> Result<(), EventError>;

    fn events(&self) -> &EventBus<Value>;
}

/// A component whose visibility is driven by a [`ToggleSurface`].
///
/// `show`/`hide` on the component are forwarded to the surface. Each signal
/// the surface emits is re-emitted by the component, with its hooks run and
/// visibility state updated as if the component had toggled itself.
pub struct Modal<S: ToggleSurface> {
    surface: S,
    hooks: Box<dyn Hooks>,
}

impl<S: ToggleSurface> Modal<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            hooks: Box::new(()),
        }
    }

    pub fn hooks(mut self, hooks: impl Hooks) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: ToggleSurface> Hooks for Modal<S> {
    fn before_show(&self) {
        self.hooks.before_show();
    }

    fn after_show(&self) {
        self.hooks.after_show();
    }

    fn before_hide(&self) {
        self.hooks.before_hide();
    }

    fn after_hide(&self) {
        self.hooks.after_hide();
    }

    fn render_errors(&self, errors: &Collection) {
        self.hooks.render_errors(errors);
    }

    fn customize(&self, options: &Options) {
        self.hooks.customize(options);
    }
}

impl<S: ToggleSurface> View for Modal<S> {
    fn post_initialize(&self, component: &Component<Self>, options: &Options) {
        let bus = self.surface.events();
        component.listen_to(bus, SHOW, |modal, _| Ok(modal.begin(Transition::Show)?));
        component.listen_to(bus, SHOWN, |modal, _| Ok(modal.complete(Transition::Show)?));
        component.listen_to(bus, HIDE, |modal, _| Ok(modal.begin(Transition::Hide)?));
        component.listen_to(bus, HIDDEN, |modal, _| Ok(modal.complete(Transition::Hide)?));

        self.hooks.customize(options);
    }

    fn toggle_surface(&self) -> Option<&dyn ToggleSurface> {
        Some(&self.surface)
    }
}

impl<S: ToggleSurface> Component<Modal<S>> {
    /// Set the dialog title. Does nothing when the target has no
    /// [`TITLE_CLASS`] descendant.
    pub fn title(&self, title: &str) -> &Self {
        match self.element().find_by_class(TITLE_CLASS) {
            Some(heading) => heading.set_text(title),
            None => log::debug!("Modal {} has no title element", self.element().id()),
        }
        self
    }
}

/// A [`ToggleSurface`] that shows and hides an element, optionally through
/// an animated effect.
pub struct Overlay {
    element: Element,
    animator: Rc<dyn Animator>,
    effect: Option<Effect>,
    events: EventBus<Value>,
    open: Rc<Cell<bool>>,
}

impl Overlay {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            animator: Rc::new(Immediate),
            effect: None,
            events: EventBus::new(),
            open: Rc::new(Cell::new(false)),
        }
    }

    pub fn animator(mut self, animator: Rc<dyn Animator>) -> Self {
        self.animator = animator;
        self
    }

    /// Run `effect` on every open and close.
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// True once an open has completed, until a close completes.
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    fn toggle(&self, transition: Transition) -> Result<(), EventError> {
        let (begin, end) = match transition {
            Transition::Show => (SHOW, SHOWN),
            Transition::Hide => (HIDE, HIDDEN),
        };
        self.events.emit(begin, &Value::Null)?;

        let Some(effect) = &self.effect else {
            self.element.set_visible(transition == Transition::Show);
            self.open.set(transition == Transition::Show);
            return self.events.emit(end, &Value::Null);
        };

        let callback = effect.callback();
        let events = self.events.clone();
        let open = Rc::clone(&self.open);
        self.animator.run(
            &self.element,
            transition,
            effect,
            Box::new(move || {
                if let Some(callback) = callback {
                    callback();
                }
                open.set(transition == Transition::Show);
                if let Err(error) = events.emit(end, &Value::Null) {
                    log::warn!("Overlay '{}' signal failed: {}", end, error);
                }
            }),
        );
        Ok(())
    }
}

impl ToggleSurface for Overlay {
    fn open(&self) -> Result<(), EventError> {
        self.toggle(Transition::Show)
    }

    fn close(&self) -> Result<(), EventError> {
        self.toggle(Transition::Hide)
    }

    fn events(&self) -> &EventBus<Value> {
        &self.events
    }
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("element", &self.element.id())
            .field("effect", &self.effect.as_ref().map(|e| e.name.as_str()))
            .field("open", &self.open.get())
            .finish()
    }
}
