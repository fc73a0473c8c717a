use std::rc::Rc;
use std::time::Duration;

/// Duration used when an effect does not name one.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(400);

/// Direction of a visibility change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Show,
    Hide,
}

/// Easing function for effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Apply easing to progress (0.0 to 1.0).
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// A visual effect for a show/hide transition.
///
/// The effect is pass-through configuration: an animation name the host may
/// interpret, a duration, an easing curve and an optional completion callback
/// invoked once the transition has finished.
#[derive(Clone)]
pub struct Effect {
    pub name: String,
    pub duration: Duration,
    pub easing: Easing,
    on_complete: Option<Rc<dyn Fn()>>,
}

impl Effect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: DEFAULT_DURATION,
            easing: Easing::default(),
            on_complete: None,
        }
    }

    pub fn fade() -> Self {
        Self::new("fade")
    }

    pub fn slide() -> Self {
        Self::new("slide")
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn on_complete(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_complete = Some(Rc::new(callback));
        self
    }

    pub fn callback(&self) -> Option<Rc<dyn Fn()>> {
        self.on_complete.clone()
    }

    /// Eased progress after `elapsed`, clamped to 0.0..=1.0.
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0);
        self.easing.apply(t)
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("name", &self.name)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}
