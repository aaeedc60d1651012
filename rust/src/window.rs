//! Availability windows on a single target day.

use chrono::{Duration, NaiveTime};

/// Closed time-of-day interval `[start, end]` during which a person takes part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Active at `instant` iff `start <= instant <= end`.
    #[inline]
    pub fn contains(&self, instant: NaiveTime) -> bool {
        overlaps(self.start, self.end, instant, instant)
    }

    /// Overlap with a slot where touching endpoints do not count.
    ///
    /// This is the student rule for matrix slots.
    #[inline]
    pub fn overlaps_slot(&self, slot_start: NaiveTime, slot_end: NaiveTime) -> bool {
        self.start < slot_end && self.end > slot_start
    }

    /// Window spans the entire slot.
    ///
    /// This is the teacher rule for matrix slots.
    #[inline]
    pub fn covers_slot(&self, slot_start: NaiveTime, slot_end: NaiveTime) -> bool {
        self.start <= slot_start && self.end >= slot_end
    }
}

/// Closed-closed overlap test on raw endpoints.
#[inline]
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Add minutes to a time of day, returning `None` if the result passes midnight.
pub fn add_minutes(time: NaiveTime, minutes: i64) -> Option<NaiveTime> {
    let (shifted, wrapped_secs) = time.overflowing_add_signed(Duration::minutes(minutes));
    if wrapped_secs != 0 {
        return None;
    }
    Some(shifted)
}

/// Format as `HH:MM`.
pub fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_contains_is_closed() {
        let window = TimeWindow::new(t(10, 0), t(11, 0));
        assert!(window.contains(t(10, 0)));
        assert!(window.contains(t(10, 30)));
        assert!(window.contains(t(11, 0)));
        assert!(!window.contains(t(9, 59)));
        assert!(!window.contains(t(11, 1)));
    }

    #[test]
    fn test_overlaps_shared_endpoint() {
        assert!(overlaps(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
        assert!(overlaps(t(10, 0), t(11, 0), t(9, 0), t(10, 0)));
        assert!(!overlaps(t(9, 0), t(10, 0), t(10, 1), t(11, 0)));
    }

    #[test]
    fn test_slot_rules_are_asymmetric() {
        let window = TimeWindow::new(t(9, 10), t(9, 40));

        // Partially inside the 09:00-09:15 slot
        assert!(window.overlaps_slot(t(9, 0), t(9, 15)));
        assert!(!window.covers_slot(t(9, 0), t(9, 15)));

        // Fully inside the 09:15-09:30 slot
        assert!(window.overlaps_slot(t(9, 15), t(9, 30)));
        assert!(window.covers_slot(t(9, 15), t(9, 30)));

        // Touching the 09:40 boundary is not an overlap
        assert!(!window.overlaps_slot(t(9, 40), t(9, 55)));
    }

    #[test]
    fn test_add_minutes_midnight() {
        assert_eq!(add_minutes(t(9, 0), 660), Some(t(20, 0)));
        assert_eq!(add_minutes(t(23, 50), 15), None);
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(hhmm(t(9, 5)), "09:05");
        assert_eq!(hhmm(t(18, 45)), "18:45");
    }
}
