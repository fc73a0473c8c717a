//! Animators carry out show/hide effects on elements.
//!
//! The host owns the clock. [`Immediate`] applies the end state at once;
//! [`FrameAnimator`] keeps transitions pending until the host advances it,
//! interpolating opacity along the way.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use crate::effect::{Effect, Transition};
use crate::element::Element;

/// Called once an animated transition has finished.
pub type Completion = Box<dyn FnOnce()>;

/// Carries out a visual transition on an element and reports completion.
pub trait Animator {
    /// Animate `target` through `transition` and call `done` when finished.
    ///
    /// `done` may be called before `run` returns (synchronous animators) or
    /// later, from whatever drives the animator.
    fn run(&self, target: &Element, transition: Transition, effect: &Effect, done: Completion);
}

fn apply_start_state(target: &Element, transition: Transition) {
    match transition {
        Transition::Show => {
            target.set_visible(true);
            target.set_opacity(0.0);
        }
        Transition::Hide => target.set_opacity(1.0),
    }
}

fn apply_end_state(target: &Element, transition: Transition) {
    target.set_visible(transition == Transition::Show);
    target.set_opacity(1.0);
}

/// Completes every effect synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Animator for Immediate {
    fn run(&self, target: &Element, transition: Transition, _effect: &Effect, done: Completion) {
        apply_end_state(target, transition);
        done();
    }
}

struct ActiveEffect {
    target: Element,
    transition: Transition,
    effect: Effect,
    started: Duration,
    done: Completion,
}

/// Frame-driven animator advanced explicitly by the host.
#[derive(Default)]
pub struct FrameAnimator {
    now: Cell<Duration>,
    active: RefCell<Vec<ActiveEffect>>,
    /// When true, effects complete instantly.
    reduced_motion: Cell<bool>,
}

impl FrameAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable reduced motion (accessibility).
    pub fn set_reduced_motion(&self, enabled: bool) {
        self.reduced_motion.set(enabled);
    }

    /// Time elapsed on this animator's clock.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Returns true if any effect is still running.
    pub fn has_active_transitions(&self) -> bool {
        !self.active.borrow().is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.borrow().len()
    }

    /// Move the clock forward, update opacities and complete finished effects.
    ///
    /// Completions run after the animator's own state is updated, so they may
    /// start new effects on this animator. Returns the number completed.
    pub fn advance(&self, delta: Duration) -> usize {
        let now = self.now.get() + delta;
        self.now.set(now);

        let finished: Vec<ActiveEffect> = {
            let mut active = self.active.borrow_mut();
            let (finished, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut *active)
                .into_iter()
                .partition(|a| now.saturating_sub(a.started) >= a.effect.duration);
            *active = pending;

            for a in active.iter() {
                let progress = a.effect.progress(now.saturating_sub(a.started));
                match a.transition {
                    Transition::Show => a.target.set_opacity(progress),
                    Transition::Hide => a.target.set_opacity(1.0 - progress),
                }
            }
            finished
        };

        let count = finished.len();
        for a in finished {
            log::trace!("Effect '{}' finished on {}", a.effect.name, a.target.id());
            apply_end_state(&a.target, a.transition);
            (a.done)();
        }
        count
    }

    /// Complete every running effect regardless of its remaining time.
    pub fn finish_all(&self) -> usize {
        let remaining = self
            .active
            .borrow()
            .iter()
            .map(|a| (a.started + a.effect.duration).saturating_sub(self.now.get()))
            .max()
            .unwrap_or_default();
        self.advance(remaining)
    }
}

impl Animator for FrameAnimator {
    fn run(&self, target: &Element, transition: Transition, effect: &Effect, done: Completion) {
        if self.reduced_motion.get() {
            Immediate.run(target, transition, effect, done);
            return;
        }

        log::trace!(
            "Effect '{}' ({:?}, {:?}) started on {}",
            effect.name,
            transition,
            effect.duration,
            target.id()
        );
        apply_start_state(target, transition);
        self.active.borrow_mut().push(ActiveEffect {
            target: target.clone(),
            transition,
            effect: effect.clone(),
            started: self.now.get(),
            done,
        });
    }
}

impl std::fmt::Debug for FrameAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameAnimator")
            .field("now", &self.now.get())
            .field("active", &self.active_count())
            .field("reduced_motion", &self.reduced_motion.get())
            .finish()
    }
}
