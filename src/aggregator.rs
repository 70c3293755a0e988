// 🧩 Attendance Aggregator - one row per participant
//
// Re-joins produce several sessions for the same person. Sessions are merged:
//   - resolved identities: grouped by roster identity
//   - "Unknown":           grouped by raw display name (never merged across names)
//
// Column policy per group:
//   name, full name, class → max (representative pick)
//   similarity             → max
//   is_late                → AND (late only if every session was late)
//   join                   → earliest instant
//   leave                  → latest instant
//   duration               → sum

use crate::attendance::AnnotatedRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// AGGREGATED ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    #[serde(rename = "Identified As")]
    pub identified_as: String,

    #[serde(rename = "Name (Original Name)")]
    pub name: String,

    #[serde(rename = "Is Late")]
    pub is_late: bool,

    #[serde(rename = "Similarity")]
    pub similarity: f64,

    #[serde(rename = "Full Name")]
    pub full_name: String,

    #[serde(rename = "Identified Class")]
    pub class: String,

    #[serde(rename = "Join Time")]
    pub join_time: String,

    #[serde(rename = "Leave Time")]
    pub leave_time: String,

    #[serde(rename = "Duration (Minutes)")]
    pub duration_minutes: f64,

    #[serde(skip)]
    pub joined_at: NaiveDateTime,

    #[serde(skip)]
    pub left_at: NaiveDateTime,

    /// Number of sessions merged into this row
    #[serde(rename = "Sessions")]
    pub sessions: usize,
}

impl AggregatedRow {
    fn from_record(record: &AnnotatedRecord) -> Self {
        AggregatedRow {
            identified_as: record.identified_as().to_string(),
            name: record.record.name.clone(),
            is_late: record.is_late,
            similarity: record.similarity,
            full_name: record.full_name.clone(),
            class: record.class.clone(),
            join_time: record.record.join_time.clone(),
            leave_time: record.record.leave_time.clone(),
            duration_minutes: record.record.duration_minutes,
            joined_at: record.joined_at,
            left_at: record.left_at,
            sessions: 1,
        }
    }

    fn merge(&mut self, record: &AnnotatedRecord) {
        keep_max(&mut self.name, &record.record.name);
        keep_max(&mut self.full_name, &record.full_name);
        keep_max(&mut self.class, &record.class);

        if record.similarity > self.similarity {
            self.similarity = record.similarity;
        }

        self.is_late = self.is_late && record.is_late;

        if record.joined_at < self.joined_at {
            self.joined_at = record.joined_at;
            self.join_time = record.record.join_time.clone();
        }

        if record.left_at > self.left_at {
            self.left_at = record.left_at;
            self.leave_time = record.record.leave_time.clone();
        }

        self.duration_minutes += record.record.duration_minutes;
        self.sessions += 1;
    }

    pub fn is_known(&self) -> bool {
        self.identified_as != crate::matcher::UNKNOWN
    }
}

fn keep_max(current: &mut String, candidate: &str) {
    if candidate > current.as_str() {
        *current = candidate.to_string();
    }
}

// ============================================================================
// AGGREGATOR
// ============================================================================

pub struct AttendanceAggregator;

impl AttendanceAggregator {
    /// Merge annotated sessions into one row per participant.
    ///
    /// Output: resolved rows (ascending identity) followed by unresolved rows
    /// (ascending raw name).
    pub fn aggregate(records: &[AnnotatedRecord]) -> Vec<AggregatedRow> {
        let mut known: BTreeMap<&str, AggregatedRow> = BTreeMap::new();
        let mut unknown: BTreeMap<&str, AggregatedRow> = BTreeMap::new();

        for record in records {
            let (groups, key) = if record.identity.is_known() {
                (&mut known, record.identified_as())
            } else {
                (&mut unknown, record.record.name.as_str())
            };

            groups
                .entry(key)
                .and_modify(|row| row.merge(record))
                .or_insert_with(|| AggregatedRow::from_record(record));
        }

        debug!(
            sessions = records.len(),
            known = known.len(),
            unknown = unknown.len(),
            "Aggregated attendance"
        );

        known.into_values().chain(unknown.into_values()).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
