//! Simulation-time countdowns
//!
//! Every delay in the game (staged releases, respawns, mode durations,
//! power-ups, round resets) is a countdown decremented once per tick. Nothing
//! runs on wall-clock time, so pausing is just not ticking.

use serde::{Deserialize, Serialize};

/// A single restartable countdown
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f32,
    running: bool,
}

impl Countdown {
    /// A running countdown
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration.max(0.0),
            running: true,
        }
    }

    /// A countdown that is not running
    pub fn stopped() -> Self {
        Self::default()
    }

    /// Restart, replacing whatever was running
    pub fn start(&mut self, duration: f32) {
        *self = Self::new(duration);
    }

    pub fn stop(&mut self) {
        *self = Self::stopped();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        if self.running { self.remaining } else { 0.0 }
    }

    /// Advance by `dt`. Returns true exactly once, on the tick it expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.stop();
            true
        } else {
            false
        }
    }
}

/// A set of pending (remaining-time, action) pairs
///
/// Actions fire in expiry order; ties fire in the order they were scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule<A> {
    pending: Vec<(f32, A)>,
}

impl<A> Default for Schedule<A> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<A> Schedule<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire after `delay`
    pub fn after(&mut self, delay: f32, action: A) {
        self.pending.push((delay.max(0.0), action));
    }

    /// Drop every pending action
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Iterate pending actions with their remaining time
    pub fn iter(&self) -> impl Iterator<Item = (f32, &A)> {
        self.pending.iter().map(|(t, a)| (*t, a))
    }

    /// Advance by `dt` and return the actions that expired this tick
    pub fn tick(&mut self, dt: f32) -> Vec<A> {
        for (remaining, _) in &mut self.pending {
            *remaining -= dt;
        }

        let mut due: Vec<(f32, usize, A)> = Vec::new();
        let mut kept = Vec::with_capacity(self.pending.len());
        for (seq, (remaining, action)) in self.pending.drain(..).enumerate() {
            if remaining <= 0.0 {
                due.push((remaining, seq, action));
            } else {
                kept.push((remaining, action));
            }
        }
        self.pending = kept;

        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, action)| action).collect()
    }
}
