//! Wall clock timers for the setup and solve phases.

use std::collections::HashMap;
use std::time::Duration;

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        use web_time::Instant;
    } else {
        use std::time::Instant;
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
}

impl InnerTimer {
    fn reset(&mut self) {
        *self = InnerTimer::default();
    }

    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    // accumulated time, including any running interval
    fn elapsed(&self) -> Duration {
        match self.start {
            Some(instant) => self.elapsed + instant.elapsed(),
            None => self.elapsed,
        }
    }
}

/// A collection of named timers.  Timers started through
/// [`timeit!`] nest, so that a running parent keeps counting
/// while its children run.
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    timers: HashMap<&'static str, InnerTimer>,
}

impl Timers {
    /// zero a named timer, stopping it if running
    pub fn reset_timer(&mut self, key: &'static str) {
        self.timers.entry(key).or_default().reset();
        self.stack.retain(|k| *k != key);
    }

    /// zero every timer
    pub fn reset_all(&mut self) {
        self.timers.clear();
        self.stack.clear();
    }

    pub fn start_as_current(&mut self, key: &'static str) {
        self.timers.entry(key).or_default().start();
        self.stack.push(key);
    }

    pub fn stop_current(&mut self) {
        if let Some(key) = self.stack.pop() {
            if let Some(t) = self.timers.get_mut(key) {
                t.stop();
            }
        }
    }

    /// Elapsed time of a named timer.  A running timer
    /// reports its time up to now.
    pub fn elapsed(&self, key: &'static str) -> Duration {
        self.timers
            .get(key)
            .map_or(Duration::ZERO, InnerTimer::elapsed)
    }

    /// Elapsed time of a named timer in seconds
    pub fn seconds(&self, key: &'static str) -> f64 {
        self.elapsed(key).as_secs_f64()
    }

    pub fn is_running(&self, key: &'static str) -> bool {
        self.stack.contains(&key)
    }

    pub fn print(&self) {
        let mut keys: Vec<_> = self.timers.keys().collect();
        keys.sort();
        for key in keys {
            log::debug!("timer {:} : {:?}", key, self.elapsed(key));
        }
    }
}

macro_rules! timeit {
    ($timer:expr => $key:literal; $($tt:tt)+) => {
        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;
