/// Tick-driven timers.
///
/// Wall-clock time enters through `advance(dt)`. Each timer keeps the
/// unspent fraction of its current interval (`Cadence::phase`), so a pause
/// freezes both the visible count and the position inside the interval:
/// resuming continues the same interval instead of restarting it.
///
///   - `CountdownTimer`: counts a budget down to zero, signals once.
///   - `ElapsedTimer`: counts up while running, never signals.

use std::time::Duration;

/// Fixed-interval accumulator shared by timers and the animation cycle.
#[derive(Clone, Debug)]
pub struct Cadence {
    interval: Duration,
    phase: Duration,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Cadence { interval, phase: Duration::ZERO }
    }

    /// Feed `dt` and return how many whole intervals completed.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() { return 0; }
        self.phase += dt;
        let mut fired = 0;
        while self.phase >= self.interval {
            self.phase -= self.interval;
            fired += 1;
        }
        fired
    }

    /// Drop any partial interval.
    pub fn reset(&mut self) {
        self.phase = Duration::ZERO;
    }
}

// ══════════════════════════════════════════════════════════════
// Countdown
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct CountdownTimer {
    remaining: u32,
    cadence: Cadence,
    running: bool,
    /// Expiry already signalled for this activation.
    fired: bool,
}

impl CountdownTimer {
    /// A stopped timer; nothing happens until `start`.
    pub fn new(interval: Duration) -> Self {
        CountdownTimer {
            remaining: 0,
            cadence: Cadence::new(interval),
            running: false,
            fired: true,
        }
    }

    /// (Re)activate with `duration` ticks. Always resets the remaining
    /// count and the interval phase, even when already running.
    pub fn start(&mut self, duration: u32) {
        self.remaining = duration;
        self.cadence.reset();
        self.running = true;
        self.fired = false;
    }

    /// Tear down: no further ticks or expiry for this activation.
    pub fn stop(&mut self) {
        self.running = false;
        self.fired = true;
        self.cadence.reset();
    }

    /// Run flag. `false` freezes remaining time and phase.
    /// Has no effect on a stopped or expired timer.
    pub fn set_running(&mut self, running: bool) {
        if self.fired { return; }
        self.running = running;
    }

    /// Feed elapsed time. Returns true exactly once, on the call that
    /// brings the count to zero.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.running || self.fired { return false; }

        let ticks = self.cadence.advance(dt);
        self.remaining = self.remaining.saturating_sub(ticks);

        if self.remaining == 0 {
            self.fired = true;
            self.running = false;
            self.cadence.reset();
            return true;
        }
        false
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

// ══════════════════════════════════════════════════════════════
// Elapsed
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ElapsedTimer {
    elapsed: u64,
    cadence: Cadence,
    running: bool,
}

impl ElapsedTimer {
    pub fn new(interval: Duration) -> Self {
        ElapsedTimer {
            elapsed: 0,
            cadence: Cadence::new(interval),
            running: false,
        }
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn advance(&mut self, dt: Duration) {
        if !self.running { return; }
        self.elapsed += self.cadence.advance(dt) as u64;
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}

#[cfg(test)]
impl CountdownTimer {
    /// Advance exactly one interval.
    fn tick(&mut self) -> bool {
        let interval = self.cadence.interval;
        self.advance(interval)
    }

    fn is_running(&self) -> bool {
        self.running
    }

    /// Activated and not yet expired or stopped (possibly paused).
    fn is_active(&self) -> bool {
        !self.fired
    }
}

#[cfg(test)]
impl ElapsedTimer {
    fn tick(&mut self) {
        let interval = self.cadence.interval;
        self.advance(interval);
    }
}
