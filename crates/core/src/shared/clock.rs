use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock timestamps (seconds since the Unix epoch).
///
/// Runners read the clock once per frame; tests substitute a scripted clock
/// so timeouts and cooldowns can be exercised without sleeping.
pub trait Clock: Send {
    fn now(&self) -> f64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Clock whose time only moves when told to. Clones share the same time.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct ManualClock {
    now: std::sync::Arc<std::sync::Mutex<f64>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn at(now: f64) -> Self {
        let clock = Self::default();
        clock.set(now);
        clock
    }

    pub fn set(&self, now: f64) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, seconds: f64) {
        *self.now.lock().unwrap() += seconds;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap()
    }
}
