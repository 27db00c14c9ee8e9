//! Bookkeeping for multiple simultaneous playbacks
//!
//! Hosts that animate several text boxes at once (a title and a caption,
//! say) register each [`Playback`] here and drive the whole set with one
//! [`PlaybackRegistry::tick_all`] per frame. The registry is plain
//! explicit state owned by the caller; nothing global, nothing shared.

use crate::driver::{Playback, StepContext, Tick};

/// An ordered collection of in-flight playbacks.
#[derive(Default)]
pub struct PlaybackRegistry<'a> {
    entries: Vec<Playback<'a>>,
}

impl<'a> PlaybackRegistry<'a> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn add(&mut self, playback: Playback<'a>) {
        self.entries.push(playback);
    }

    /// Step every active playback once, in insertion order, and drop the
    /// ones that finished or were quit. Returns each step's outcome.
    pub fn tick_all(&mut self, ctx: &mut StepContext) -> Vec<Tick> {
        let mut ticks = Vec::with_capacity(self.entries.len());
        for playback in &mut self.entries {
            ticks.push(playback.step(ctx));
        }
        self.entries.retain(|p| !p.is_finished());
        ticks
    }

    /// True when no playback has work left.
    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
