use std::collections::HashMap;

/// Latest activation state of one zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneState {
    pub active: bool,
    pub last_active_ts: f64,
    pub score: f64,
}

impl ZoneState {
    fn new(now: f64) -> Self {
        Self {
            active: false,
            last_active_ts: now,
            score: 0.0,
        }
    }
}

/// Edge emitted by [`ZoneActivationTracker::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneTransition {
    Started,
    Ended,
}

/// Debounced per-zone activation state machine.
///
/// A zone becomes active as soon as its score reaches the threshold and stays
/// active until the score has been below the threshold for longer than the
/// cooldown. State is kept per zone name.
pub struct ZoneActivationTracker {
    threshold: f64,
    cooldown_seconds: f64,
    states: HashMap<String, ZoneState>,
}

impl ZoneActivationTracker {
    pub fn new(threshold: f64, cooldown_seconds: f64) -> Self {
        Self {
            threshold,
            cooldown_seconds,
            states: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Starts tracking `name`. Returns false (keeping existing state) if the
    /// zone is already tracked.
    pub fn add_zone(&mut self, name: &str, now: f64) -> bool {
        if self.states.contains_key(name) {
            return false;
        }
        self.states.insert(name.to_string(), ZoneState::new(now));
        true
    }

    pub fn remove_zone(&mut self, name: &str) -> Option<ZoneState> {
        self.states.remove(name)
    }

    pub fn state(&self, name: &str) -> Option<&ZoneState> {
        self.states.get(name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Feeds one score for `name` observed at `now`.
    ///
    /// Zones not yet tracked are added first.
    pub fn update(&mut self, name: &str, score: f64, now: f64) -> Option<ZoneTransition> {
        let state = self
            .states
            .entry(name.to_string())
            .or_insert_with(|| ZoneState::new(now));
        state.score = score;

        if score >= self.threshold {
            state.last_active_ts = now;
            if !state.active {
                state.active = true;
                return Some(ZoneTransition::Started);
            }
            return None;
        }

        if state.active && now - state.last_active_ts > self.cooldown_seconds {
            state.active = false;
            return Some(ZoneTransition::Ended);
        }
        None
    }
}
