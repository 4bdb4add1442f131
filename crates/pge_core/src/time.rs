//! Fixed-period tick source.
//!
//! Wall-clock time only feeds the accumulator. The simulation itself always
//! advances in equal `fixed_us` slices, so a replay produces the same result
//! whether it is paced in real time or run flat out.

use std::time::Instant;

pub struct TickSource {
    pub fixed_us: u64,
    /// Spiral-of-death cap: at most this many ticks per frame.
    pub max_steps_per_frame: u32,
    accumulator_us: u64,
    pub tick_count: u64,
    pub steps_this_frame: u32,
    paused: bool,
    last_instant: Instant,
}

impl TickSource {
    pub fn new(fixed_us: u64, max_steps_per_frame: u32) -> Self {
        Self {
            fixed_us: fixed_us.max(1),
            max_steps_per_frame: max_steps_per_frame.max(1),
            accumulator_us: 0,
            tick_count: 0,
            steps_this_frame: 0,
            paused: false,
            last_instant: Instant::now(),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Withholds further ticks. Nothing in flight needs saving.
    pub fn pause(&mut self) {
        self.paused = true;
        self.accumulator_us = 0;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.last_instant = Instant::now();
    }

    /// Measures wall-clock time since the previous frame and feeds it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant).as_micros() as u64;
        self.last_instant = now;
        self.feed(elapsed);
    }

    /// Feeds an explicit amount of elapsed time. Used by `begin_frame` and by
    /// anything that drives the clock itself.
    pub fn feed(&mut self, elapsed_us: u64) {
        self.steps_this_frame = 0;
        if self.paused {
            return;
        }
        let cap = self.fixed_us * self.max_steps_per_frame as u64;
        if elapsed_us > cap {
            log::warn!(
                "Frame took {:.1}ms, capping to {} ticks",
                elapsed_us as f64 / 1000.0,
                self.max_steps_per_frame
            );
        }
        self.accumulator_us = (self.accumulator_us + elapsed_us).min(cap);
    }

    pub fn should_step(&mut self) -> bool {
        if !self.paused && self.accumulator_us >= self.fixed_us {
            self.accumulator_us -= self.fixed_us;
            self.tick_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}
