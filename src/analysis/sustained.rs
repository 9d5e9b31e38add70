//! Automatic report trigger for a long aggressive stretch.

use chrono::{DateTime, Duration, Utc};

use super::Mode;

/// Arms on the first `Aggressive` cycle and fires once when the stretch has
/// lasted `threshold`. Any other mode disarms it.
#[derive(Debug, Clone)]
pub struct SustainedAggressionTrigger {
    threshold: Duration,
    since: Option<DateTime<Utc>>,
    fired: bool,
}

impl SustainedAggressionTrigger {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            since: None,
            fired: false,
        }
    }

    /// Returns `true` exactly once per aggressive stretch.
    pub fn observe(&mut self, mode: Mode, now: DateTime<Utc>) -> bool {
        if mode != Mode::Aggressive {
            if self.since.take().is_some() {
                log::debug!("aggressive stretch ended; trigger disarmed");
            }
            self.fired = false;
            return false;
        }

        let since = *self.since.get_or_insert(now);
        if !self.fired && now - since >= self.threshold {
            self.fired = true;
            return true;
        }

        false
    }

    pub fn armed_since(&self) -> Option<DateTime<Utc>> {
        self.since
    }

    pub fn reset(&mut self) {
        self.since = None;
        self.fired = false;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn fires_once_after_threshold() {
        let mut trigger = SustainedAggressionTrigger::new(Duration::minutes(30));
        assert!(!trigger.observe(Mode::Aggressive, at(0)));
        assert!(!trigger.observe(Mode::Aggressive, at(29)));
        assert!(trigger.observe(Mode::Aggressive, at(30)));
        assert!(!trigger.observe(Mode::Aggressive, at(45)));
        assert!(!trigger.observe(Mode::Aggressive, at(90)));
    }

    #[test]
    fn other_modes_disarm() {
        let mut trigger = SustainedAggressionTrigger::new(Duration::minutes(30));
        trigger.observe(Mode::Aggressive, at(0));
        assert!(!trigger.observe(Mode::Balanced, at(20)));
        assert_eq!(trigger.armed_since(), None);

        assert!(!trigger.observe(Mode::Aggressive, at(25)));
        assert!(!trigger.observe(Mode::Aggressive, at(50)));
        assert!(trigger.observe(Mode::Aggressive, at(55)));
    }

    #[test]
    fn rearms_after_a_break() {
        let mut trigger = SustainedAggressionTrigger::new(Duration::minutes(1));
        trigger.observe(Mode::Aggressive, at(0));
        assert!(trigger.observe(Mode::Aggressive, at(1)));
        trigger.observe(Mode::Calm, at(2));
        trigger.observe(Mode::Aggressive, at(3));
        assert!(trigger.observe(Mode::Aggressive, at(4)));
    }
}
