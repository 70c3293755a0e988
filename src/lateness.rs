// ⏰ Lateness Evaluator - tardy if joined >= N minutes after meeting start
// The meeting start is a time of day; it is anchored to the join's own date.

use crate::error::PresenceResult;
use crate::timestamp::parse_time_of_day;
use chrono::{NaiveDateTime, NaiveTime};

/// Default tolerance before a participant counts as late
pub const DEFAULT_LATE_AFTER_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatenessEvaluator {
    meeting_start: NaiveTime,
    late_after_minutes: i64,
}

impl LatenessEvaluator {
    pub fn new(meeting_start: NaiveTime) -> Self {
        LatenessEvaluator {
            meeting_start,
            late_after_minutes: DEFAULT_LATE_AFTER_MINUTES,
        }
    }

    /// Build from a configured start such as "09:00 AM"
    pub fn from_start_str(meeting_start: &str) -> PresenceResult<Self> {
        Ok(LatenessEvaluator::new(parse_time_of_day(meeting_start)?))
    }

    pub fn with_late_after_minutes(mut self, minutes: i64) -> Self {
        self.late_after_minutes = minutes;
        self
    }

    /// Minutes between meeting start (same date) and the join; negative if early
    pub fn minutes_after_start(&self, joined_at: NaiveDateTime) -> f64 {
        let start = joined_at.date().and_time(self.meeting_start);
        (joined_at - start).num_seconds() as f64 / 60.0
    }

    pub fn is_late(&self, joined_at: NaiveDateTime) -> bool {
        self.minutes_after_start(joined_at) >= self.late_after_minutes as f64
    }
}

// ============================================================================
// TESTS
// ============================================================================
