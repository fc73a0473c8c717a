use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use traction_dom::{Element, WeakElement};

use super::{Component, Hooks, ItemRenderer, Options, Row, View};
use crate::collection::Collection;
use crate::error::EventError;
use crate::events::{ALL, EventBus, Subscription};
use crate::model::Model;

/// Class marking the empty-state placeholder inside a repeater's container.
pub const EMPTY_PLACEHOLDER_CLASS: &str = "nodata";

type ItemFactory<R> = Rc<dyn Fn(&Rc<Model>) -> R>;

/// What a row sees of the repeater that built it.
#[derive(Clone)]
pub struct RepeaterRef {
    container: WeakElement,
    events: EventBus<Value>,
}

impl RepeaterRef {
    /// The repeater's container, while it is alive.
    pub fn container(&self) -> Option<Element> {
        self.container.upgrade()
    }

    /// The repeater's event bus.
    pub fn events(&self) -> &EventBus<Value> {
        &self.events
    }

    /// Emit `event` on the repeater's bus.
    pub fn emit(&self, event: &str, args: &Value) -> Result<(), EventError> {
        self.events.emit(event, args)
    }
}

impl std::fmt::Debug for RepeaterRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepeaterRef")
            .field("container", &self.container().map(|c| c.id()))
            .finish_non_exhaustive()
    }
}

/// A view keeping one rendered row per member of a bound collection.
///
/// Every collection notification triggers a full reconciliation: all rows
/// are destroyed and rebuilt, in collection order, from the item factory.
/// Children of the container carrying the placeholder class are left in
/// place and shown only while the collection is empty.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
///
/// use serde_json::json;
/// use traction::collection::Collection;
/// use traction::dom::Element;
/// use traction::model::{Attributes, Model};
/// use traction::view::{Component, Hooks, Options, Repeater, Row};
///
/// struct Name;
///
/// impl Hooks for Name {}
///
/// impl Row for Name {
///     fn template(&self, attributes: &Attributes) -> Element {
///         let name = attributes.get("name").and_then(|v| v.as_str()).unwrap_or_default();
///         Element::new("li").with_text(name)
///     }
/// }
///
/// let people = Rc::new(Collection::from_values([json!({ "name": "Ada" })]));
/// let list = Component::new(
///     Repeater::new(|_| Name),
///     Options::new().collection(people.clone()).element(Element::new("ul")),
/// );
///
/// people.add(Rc::new(Model::from_value(json!({ "name": "Grace" })))).unwrap();
/// assert_eq!(list.element().text_content(), "AdaGrace");
/// ```
pub struct Repeater<R: Row> {
    item_renderer: ItemFactory<R>,
    placeholder_class: String,
    hooks: Box<dyn Hooks>,
    children: RefCell<Vec<Component<ItemRenderer<R>>>>,
    binding: RefCell<Option<Subscription>>,
    reconciling: Cell<bool>,
    pending: Cell<bool>,
}

/// A repeater rendering table rows. Same behavior, named for the markup.
pub type Table<R> = Repeater<R>;

impl<R: Row> Repeater<R> {
    /// Build a repeater whose rows come from `item_renderer`, called once
    /// per member on every reconciliation.
    pub fn new(item_renderer: impl Fn(&Rc<Model>) -> R + 'static) -> Self {
        Self {
            item_renderer: Rc::new(item_renderer),
            placeholder_class: EMPTY_PLACEHOLDER_CLASS.to_string(),
            hooks: Box::new(()),
            children: RefCell::new(Vec::new()),
            binding: RefCell::new(None),
            reconciling: Cell::new(false),
            pending: Cell::new(false),
        }
    }

    /// Use `class` instead of [`EMPTY_PLACEHOLDER_CLASS`].
    pub fn placeholder_class(mut self, class: impl Into<String>) -> Self {
        self.placeholder_class = class.into();
        self
    }

    /// Hooks for the repeater itself.
    pub fn hooks(mut self, hooks: impl Hooks) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// The rows rendered by the last reconciliation, in order.
    pub fn children(&self) -> Vec<Component<ItemRenderer<R>>> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }
}

impl<R: Row> Hooks for Repeater<R> {
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

impl<R: Row> View for Repeater<R> {
    fn post_initialize(&self, component: &Component<Self>, options: &Options) {
        if let Some(collection) = &options.collection {
            component.bind(Rc::clone(collection));
        }
        self.hooks.customize(options);
    }

    fn render(&self, component: &Component<Self>) {
        component.reconcile();
    }

    fn on_destroy(&self, _component: &Component<Self>) {
        drop(self.binding.borrow_mut().take());
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in &children {
            child.destroy();
        }
    }
}

impl<R: Row> Component<Repeater<R>> {
    /// Bind `collection`, replacing (and unsubscribing from) the previous
    /// one, and reconcile now and on every notification it emits.
    pub fn bind(&self, collection: Rc<Collection>) {
        let weak = self.downgrade();
        let subscription = collection.events().subscribe(ALL, move |event| {
            if let Some(repeater) = weak.upgrade() {
                log::trace!("Repeater notified of '{}'", event.name());
                repeater.reconcile();
            }
            Ok(())
        });

        let previous = self.view().binding.replace(Some(subscription));
        drop(previous);
        self.set_collection(Some(collection));
        self.reconcile();
    }

    /// Rebuild every row from the bound collection.
    ///
    /// A notification arriving while a pass is running (a row mutating the
    /// collection from a hook, say) does not start a nested pass. The running
    /// pass finishes, then runs again against the updated membership.
    pub fn reconcile(&self) {
        let repeater = self.view();
        if repeater.reconciling.get() {
            log::trace!("Repeater {} busy; pass deferred", self.element().id());
            repeater.pending.set(true);
            return;
        }

        repeater.reconciling.set(true);
        loop {
            repeater.pending.set(false);
            self.reconcile_pass();
            if !repeater.pending.get() {
                break;
            }
        }
        repeater.reconciling.set(false);
    }

    fn reconcile_pass(&self) {
        let Some(collection) = self.collection() else {
            log::debug!("Repeater without a collection; nothing to reconcile");
            return;
        };
        let repeater = self.view();
        let container = self.element();
        let models = collection.models();

        // Placeholder visible iff empty, flipped once per pass
        for placeholder in container.children_with_class(&repeater.placeholder_class) {
            placeholder.set_visible(models.is_empty());
        }

        // Full teardown
        let previous = std::mem::take(&mut *repeater.children.borrow_mut());
        let placeholder_class = repeater.placeholder_class.as_str();
        let removed = container.remove_children(|child| !child.has_class(placeholder_class));
        for child in &previous {
            child.destroy();
        }
        drop(removed);
        drop(previous);

        // Rebuild in collection order
        let back_reference = RepeaterRef {
            container: container.downgrade(),
            events: self.events().clone(),
        };
        let children: Vec<Component<ItemRenderer<R>>> = models
            .into_iter()
            .map(|model| {
                let row = (repeater.item_renderer)(&model);
                let options = Options::new()
                    .model(model)
                    .repeater(back_reference.clone())
                    .animator(self.animator());
                let renderer = Component::new(ItemRenderer::new(row), options);

                let rendered = renderer.render();
                container.append_child(&rendered.element());
                rendered.delegate_events();
                renderer
            })
            .collect();

        log::debug!(
            "Repeater {} reconciled {} row(s)",
            container.id(),
            children.len()
        );
        *repeater.children.borrow_mut() = children;
    }
}
