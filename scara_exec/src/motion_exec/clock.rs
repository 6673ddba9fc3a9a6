//! Step timing abstraction for MotionExec
//!
//! Interpolated motion is paced by sleeping between steps. Hiding the sleep
//! behind a trait lets trajectory tests run instantly while still asserting
//! the delays that would have been taken.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Source of the inter-step pause during interpolated motion.
pub trait StepClock {
    /// Pause for the given duration before the next interpolation step.
    fn sleep(&mut self, duration: Duration);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Clock that really sleeps the executing thread.
#[derive(Default)]
pub struct WallClock;

/// Clock that records requested sleeps without waiting.
#[cfg(test)]
#[derive(Default)]
pub struct InstantClock {
    /// Every sleep requested, in order.
    pub sleeps: Vec<Duration>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StepClock for WallClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
impl StepClock for InstantClock {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
