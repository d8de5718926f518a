/// Presence flag and the time motion was last seen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    pub presence: bool,
    pub last_motion_ts: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenceTransition {
    Started,
    Ended,
}

/// Debounced presence state machine.
///
/// Presence starts on the first frame with motion and ends only once no
/// motion has been seen for longer than the timeout.
pub struct PresenceTracker {
    no_motion_timeout: f64,
    state: MotionState,
}

impl PresenceTracker {
    pub fn new(no_motion_timeout: f64, now: f64) -> Self {
        Self {
            no_motion_timeout,
            state: MotionState {
                presence: false,
                last_motion_ts: now,
            },
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn update(&mut self, motion_detected: bool, now: f64) -> Option<PresenceTransition> {
        if motion_detected {
            self.state.last_motion_ts = now;
            if !self.state.presence {
                self.state.presence = true;
                return Some(PresenceTransition::Started);
            }
            return None;
        }

        if self.state.presence && now - self.state.last_motion_ts > self.no_motion_timeout {
            self.state.presence = false;
            return Some(PresenceTransition::Ended);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_starts_absent() {
        let tracker = PresenceTracker::new(5.0, 100.0);
        assert_eq!(
            tracker.state(),
            MotionState {
                presence: false,
                last_motion_ts: 100.0
            }
        );
    }

    #[test]
    fn test_motion_starts_presence_once() {
        let mut tracker = PresenceTracker::new(5.0, 0.0);
        assert_eq!(tracker.update(true, 1.0), Some(PresenceTransition::Started));
        assert_eq!(tracker.update(true, 2.0), None);
        assert_eq!(tracker.state().last_motion_ts, 2.0);
    }

    #[test]
    fn test_end_waits_for_timeout() {
        let mut tracker = PresenceTracker::new(5.0, 0.0);
        tracker.update(true, 10.0);
        assert_eq!(tracker.update(false, 12.0), None);
        assert_eq!(tracker.update(false, 15.0), None); // exactly the timeout
        assert_eq!(tracker.update(false, 15.1), Some(PresenceTransition::Ended));
        assert!(!tracker.state().presence);
    }

    #[test]
    fn test_no_motion_while_absent_emits_nothing() {
        let mut tracker = PresenceTracker::new(1.0, 0.0);
        for i in 0..10 {
            assert_eq!(tracker.update(false, i as f64 * 10.0), None);
        }
    }

    #[rstest]
    #[case(&[true, true, false, false, true], 1)]
    #[case(&[true, false, false, false, false, true, false], 2)]
    #[case(&[false, false, false], 0)]
    #[case(&[true, false, false, false, false, true, false, false, false, false, true], 3)]
    fn test_starts_match_absent_to_present_transitions(
        #[case] motion: &[bool],
        #[case] expected_starts: usize,
    ) {
        // one frame per second, 3 s timeout
        let mut tracker = PresenceTracker::new(3.0, 0.0);
        let transitions: Vec<_> = motion
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| tracker.update(m, i as f64))
            .collect();

        let starts = transitions
            .iter()
            .filter(|t| **t == PresenceTransition::Started)
            .count();
        assert_eq!(starts, expected_starts);

        // transitions strictly alternate, beginning with a start
        for (i, t) in transitions.iter().enumerate() {
            let expected = if i % 2 == 0 {
                PresenceTransition::Started
            } else {
                PresenceTransition::Ended
            };
            assert_eq!(*t, expected);
        }
    }
}
