//! Delayed self-destruct for disposable entities.
//!
//! Pool-managed entities are sent back to their pool instead of being
//! despawned; see `systems::suicide::tick_suicides`.

/// Countdown that kills its entity when it runs out.
#[derive(Debug, Clone, PartialEq)]
pub struct Suicide {
    /// Arm the countdown as soon as the entity starts (spawn or checkout).
    pub trigger_on_start: bool,
    /// Seconds between trigger and kill. Zero kills on the next tick.
    pub delay: f32,
    remaining: Option<f32>,
}

impl Suicide {
    pub fn new(delay: f32) -> Self {
        Self {
            trigger_on_start: true,
            delay,
            remaining: None,
        }
    }

    pub fn with_trigger_on_start(mut self, trigger_on_start: bool) -> Self {
        self.trigger_on_start = trigger_on_start;
        self
    }

    /// Called when the owning entity starts. Arms the countdown if configured to.
    pub fn start(&mut self) {
        if self.trigger_on_start {
            self.trigger();
        }
    }

    /// Arm (or restart) the countdown.
    pub fn trigger(&mut self) {
        self.remaining = Some(self.delay.max(0.0));
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Seconds left before the kill, if armed.
    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Advance the countdown. Returns `true` exactly once, when it expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.remaining else { return false };
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            self.remaining = Some(remaining);
            false
        }
    }
}

impl Default for Suicide {
    fn default() -> Self {
        Self::new(0.0)
    }
}
