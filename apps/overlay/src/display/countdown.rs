//! Standalone countdown page: a seconds counter with start/pause/reset and a
//! one-second ticker task while it runs.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub const DEFAULT_COUNTDOWN_SECS: u32 = 5 * 60;
const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownStatus {
    pub minute: u32,
    pub second: u32,
    pub is_counting: bool,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    initial: u32,
    remaining: u32,
    counting: bool,
    /// Bumped on every start; a ticker only advances the run it was spawned for.
    run: u64,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            initial: seconds,
            remaining: seconds,
            counting: false,
            run: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_counting(&self) -> bool {
        self.counting
    }

    pub fn status(&self) -> CountdownStatus {
        CountdownStatus {
            minute: self.remaining / 60,
            second: self.remaining % 60,
            is_counting: self.counting,
        }
    }

    /// Starts counting and consumes the first second right away.
    /// Returns whether a ticker is needed.
    pub fn start(&mut self) -> bool {
        if self.counting {
            return false;
        }
        self.counting = true;
        self.run += 1;
        self.tick();
        self.counting
    }

    pub fn pause(&mut self) {
        self.counting = false;
    }

    pub fn reset(&mut self) {
        self.counting = false;
        self.remaining = self.initial;
    }

    /// Decrements by one second; reaching zero stops the countdown.
    pub fn tick(&mut self) {
        if self.remaining <= 1 {
            self.remaining = 0;
            self.counting = false;
        } else {
            self.remaining -= 1;
        }
    }

    /// Replaces the minutes, keeping the seconds. Also becomes the reset value.
    pub fn set_minute(&mut self, minute: u32) {
        self.set_remaining(minute.saturating_mul(60).saturating_add(self.remaining % 60));
    }

    /// Replaces the seconds, keeping the minutes. Also becomes the reset value.
    pub fn set_second(&mut self, second: u32) {
        self.set_remaining((self.remaining / 60 * 60).saturating_add(second));
    }

    fn set_remaining(&mut self, seconds: u32) {
        self.counting = false;
        self.initial = seconds;
        self.remaining = seconds;
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_SECS)
    }
}

/// One ticker step for `run`. Returns `false` once the ticker should exit.
///
/// A stop (or a stop and restart) can take the lock while a due tick is still
/// waiting on it; abort does not reach a task blocked outside an `.await`.
fn advance(countdown: &mut Countdown, run: u64) -> bool {
    if !countdown.counting || countdown.run != run {
        return false;
    }
    countdown.tick();
    countdown.is_counting()
}

/// Owns the countdown and the task that ticks it once per second.
pub struct CountdownController {
    countdown: Arc<Mutex<Countdown>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    runtime: Handle,
}

impl CountdownController {
    pub fn new(countdown: Countdown, runtime: Handle) -> Self {
        Self {
            countdown: Arc::new(Mutex::new(countdown)),
            ticker: Mutex::new(None),
            runtime,
        }
    }

    pub fn status(&self) -> CountdownStatus {
        self.countdown.lock().status()
    }

    pub fn start(&self) -> CountdownStatus {
        let mut countdown = self.countdown.lock();
        if countdown.start() {
            info!(remaining = countdown.remaining(), "countdown started");
            let shared = Arc::clone(&self.countdown);
            let run = countdown.run;
            let handle = self.runtime.spawn(async move {
                let mut ticks = interval_at(Instant::now() + TICK, TICK);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticks.tick().await;
                    if !advance(&mut shared.lock(), run) {
                        debug!("countdown ticker stopped");
                        break;
                    }
                }
            });
            self.replace_ticker(Some(handle));
        }
        countdown.status()
    }

    pub fn pause(&self) -> CountdownStatus {
        self.stop_with(Countdown::pause)
    }

    pub fn reset(&self) -> CountdownStatus {
        self.stop_with(Countdown::reset)
    }

    pub fn set_minute(&self, minute: u32) -> CountdownStatus {
        self.stop_with(|countdown| countdown.set_minute(minute))
    }

    pub fn set_second(&self, second: u32) -> CountdownStatus {
        self.stop_with(|countdown| countdown.set_second(second))
    }

    fn stop_with(&self, change: impl FnOnce(&mut Countdown)) -> CountdownStatus {
        let mut countdown = self.countdown.lock();
        change(&mut countdown);
        self.replace_ticker(None);
        countdown.status()
    }

    fn replace_ticker(&self, next: Option<JoinHandle<()>>) {
        if let Some(previous) = std::mem::replace(&mut *self.ticker.lock(), next) {
            previous.abort();
        }
    }
}

impl Drop for CountdownController {
    fn drop(&mut self) {
        self.replace_ticker(None);
    }
}
