//! Rendering targets for traction views.
//!
//! An [`Element`] tree stands in for the document a host renders. Views own
//! one element each, attach and detach them, toggle their visibility through
//! an [`Animator`], and bind UI handlers with [`Delegate`]s.

pub mod animation;
pub mod effect;
pub mod element;
pub mod event;

pub use animation::{Animator, Completion, FrameAnimator, Immediate};
pub use effect::{Easing, Effect, Transition, DEFAULT_DURATION};
pub use element::{find_element, Content, Element, WeakElement};
pub use event::{Delegate, UiEvent};
