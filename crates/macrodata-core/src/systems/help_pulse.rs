//! Help pulse - periodic hint toward the shapes matching the open box.
//!
//! While a box is open a pulse starts every interval and lasts
//! [`HELP_PULSE_MS`]. Opening or closing a box restarts the interval.

use macrodata_logic::constants::timing::HELP_PULSE_MS;
use macrodata_logic::shapes::ShapeKind;

#[derive(Debug, Clone, PartialEq)]
pub struct HelpPulse {
    interval_ms: f64,
    kind: Option<ShapeKind>,
    next_at_ms: Option<f64>,
    active_until_ms: f64,
}

impl HelpPulse {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: f64::from(interval_ms.max(1)),
            kind: None,
            next_at_ms: None,
            active_until_ms: 0.0,
        }
    }

    /// Restart for the box that is now open, or stop when none is.
    pub fn rearm(&mut self, open: Option<ShapeKind>, now_ms: f64) {
        self.kind = open;
        self.active_until_ms = 0.0;
        self.next_at_ms = open.map(|_| now_ms + self.interval_ms);
    }

    /// Returns the category when a new pulse starts in this tick.
    pub fn tick(&mut self, now_ms: f64) -> Option<ShapeKind> {
        let kind = self.kind?;
        let mut next = self.next_at_ms?;
        if now_ms < next {
            return None;
        }
        let mut started = next;
        while next <= now_ms {
            started = next;
            next += self.interval_ms;
        }
        self.next_at_ms = Some(next);
        self.active_until_ms = started + HELP_PULSE_MS;
        (now_ms < self.active_until_ms).then_some(kind)
    }

    /// Category currently pulsing.
    pub fn active(&self, now_ms: f64) -> Option<ShapeKind> {
        self.kind.filter(|_| now_ms < self.active_until_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulses_only_while_open() {
        let mut pulse = HelpPulse::new(1000);
        assert_eq!(pulse.tick(5000.0), None);

        pulse.rearm(Some(ShapeKind::T), 0.0);
        assert_eq!(pulse.tick(999.0), None);
        assert_eq!(pulse.tick(1000.0), Some(ShapeKind::T));
        assert_eq!(pulse.active(1400.0), Some(ShapeKind::T));
        assert_eq!(pulse.tick(1400.0), None);
        assert_eq!(pulse.tick(2000.0), Some(ShapeKind::T));

        pulse.rearm(None, 2100.0);
        assert_eq!(pulse.active(2100.0), None);
        assert_eq!(pulse.tick(10_000.0), None);
    }

    #[test]
    fn test_pulse_lasts_its_duration() {
        let mut pulse = HelpPulse::new(10_000);
        pulse.rearm(Some(ShapeKind::Plus), 0.0);
        pulse.tick(10_000.0);
        assert_eq!(pulse.active(11_499.0), Some(ShapeKind::Plus));
        assert_eq!(pulse.active(11_500.0), None);
    }

    #[test]
    fn test_rearm_restarts_interval() {
        let mut pulse = HelpPulse::new(1000);
        pulse.rearm(Some(ShapeKind::L), 0.0);
        pulse.rearm(Some(ShapeKind::HLine), 800.0);
        assert_eq!(pulse.tick(1000.0), None);
        assert_eq!(pulse.tick(1800.0), Some(ShapeKind::HLine));
    }

    #[test]
    fn test_skipped_pulses_do_not_fire_late() {
        let mut pulse = HelpPulse::new(3000);
        pulse.rearm(Some(ShapeKind::L), 0.0);
        // a long stall lands outside the last pulse window
        assert_eq!(pulse.tick(7600.0), None);
        assert_eq!(pulse.active(7600.0), None);
        assert_eq!(pulse.tick(9000.0), Some(ShapeKind::L));
    }
}
