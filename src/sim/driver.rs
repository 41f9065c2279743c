/// Loop driver: input → simulate → render, once per tick, at a fixed rate.
///
/// Each iteration:
///   1. drain the input source and translate to intents
///   2. step the game state (Quit moves it to Terminated)
///   3. hand the tick's events to the observer
///   4. render, unconditionally, for the tick that just ran
///   5. wait out the rest of the tick interval
///
/// The loop ends as soon as a tick leaves the state Terminated; no further
/// ticks run. Errors from any stage end the loop immediately.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::GameError;
use crate::ui::input::{intents_for_tick, InputSource};
use crate::ui::surface::Surface;
use crate::ui::view::{render, View};
use super::event::GameEvent;
use super::step::step;
use super::world::GameState;

/// Fixed-rate pacing on the monotonic clock.
pub struct FramePacer {
    interval: Duration,
    tick_start: Instant,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        FramePacer {
            interval,
            tick_start: Instant::now(),
        }
    }

    /// `1 / fps` seconds per tick. Zero fps means no pacing at all.
    pub fn from_fps(fps: u32) -> Self {
        let interval = if fps == 0 { Duration::ZERO } else { Duration::from_secs(1) / fps };
        FramePacer::new(interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until one interval has passed since the current tick began,
    /// then start the next tick. Returns how long it slept.
    pub fn wait(&mut self) -> Duration {
        let elapsed = self.tick_start.elapsed();
        let slept = self.interval.saturating_sub(elapsed);
        if !slept.is_zero() {
            thread::sleep(slept);
        }
        self.tick_start = Instant::now();
        slept
    }
}

/// Run ticks until the state is Terminated. Returns the number of ticks run.
pub fn run<I, S, F>(
    state: &mut GameState,
    input: &mut I,
    surface: &mut S,
    view: &View,
    pacer: &mut FramePacer,
    mut observe: F,
) -> Result<u64, GameError>
where
    I: InputSource + ?Sized,
    S: Surface + ?Sized,
    F: FnMut(&[GameEvent], &mut S),
{
    let mut ticks: u64 = 0;

    while state.is_running() {
        let intents = intents_for_tick(input)?;
        let events = step(state, &intents)?;
        observe(&events, surface);
        render(state, surface, view)?;
        ticks += 1;
        pacer.wait();
    }

    Ok(ticks)
}
