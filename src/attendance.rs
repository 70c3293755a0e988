// 📥 Attendance - raw export rows and their annotated form
//
// AttendanceRecord: one row of the meeting export, as read
// AnnotatedRecord:  the same row + identity, similarity, lateness

use crate::matcher::{Identity, UNKNOWN};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

// ============================================================================
// ATTENDANCE RECORD
// ============================================================================

/// One join/leave session from the export. Extra export columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "Name (Original Name)")]
    pub name: String,

    #[serde(rename = "Join Time")]
    pub join_time: String,

    #[serde(rename = "Leave Time")]
    pub leave_time: String,

    #[serde(rename = "Duration (Minutes)")]
    pub duration_minutes: f64,
}

impl AttendanceRecord {
    pub fn new(name: &str, join_time: &str, leave_time: &str, duration_minutes: f64) -> Self {
        AttendanceRecord {
            name: name.to_string(),
            join_time: join_time.to_string(),
            leave_time: leave_time.to_string(),
            duration_minutes,
        }
    }
}

/// Load every row of an attendance export
pub fn load_attendance(csv_path: &Path) -> Result<Vec<AttendanceRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open attendance file: {}", csv_path.display()))?;

    let mut records = Vec::new();

    for (line_num, result) in rdr.deserialize().enumerate() {
        let record: AttendanceRecord = result.with_context(|| {
            format!(
                "Failed to parse attendance line {} in {}",
                line_num + 2, // +2 because: 1-indexed + header row
                csv_path.display()
            )
        })?;
        records.push(record);
    }

    info!(path = %csv_path.display(), records = records.len(), "Attendance file loaded");

    Ok(records)
}

// ============================================================================
// ANNOTATED RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    pub record: AttendanceRecord,
    pub identity: Identity,
    pub similarity: f64,

    /// Roster full name, or the raw display name when unresolved
    pub full_name: String,

    /// Roster class, or "Unknown" when unresolved
    pub class: String,

    pub is_late: bool,
    pub joined_at: NaiveDateTime,
    pub left_at: NaiveDateTime,
}

impl AnnotatedRecord {
    pub fn new(
        record: AttendanceRecord,
        identity: Identity,
        similarity: f64,
        is_late: bool,
        joined_at: NaiveDateTime,
        left_at: NaiveDateTime,
    ) -> Self {
        let (full_name, class) = match &identity {
            Identity::Known(entry) => (entry.full_name.clone(), entry.class.clone()),
            Identity::Unknown => (record.name.clone(), UNKNOWN.to_string()),
        };

        AnnotatedRecord {
            record,
            identity,
            similarity,
            full_name,
            class,
            is_late,
            joined_at,
            left_at,
        }
    }

    /// "Identified As" column value
    pub fn identified_as(&self) -> &str {
        self.identity.label()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterEntry;
    use crate::timestamp::parse_timestamp;
    use std::io::Write;

    #[test]
    fn test_load_zoom_export() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "Name (Original Name),User Email,Join Time,Leave Time,Duration (Minutes),Guest"
        )
        .unwrap();
        writeln!(
            file,
            "Jane.Doe,jane@example.com,08/21/2021 09:31 AM,08/21/2021 10:00 AM,29,No"
        )
        .unwrap();
        writeln!(file, "\"Doe, John\",,08/21/2021 09:00,08/21/2021 09:45,45,Yes").unwrap();

        let records = load_attendance(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            AttendanceRecord::new("Jane.Doe", "08/21/2021 09:31 AM", "08/21/2021 10:00 AM", 29.0)
        );
        assert_eq!(records[1].name, "Doe, John");
        assert_eq!(records[1].duration_minutes, 45.0);
    }

    #[test]
    fn test_load_empty_export() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Name (Original Name),Join Time,Leave Time,Duration (Minutes)").unwrap();

        assert!(load_attendance(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_fractional_duration() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Name (Original Name),Join Time,Leave Time,Duration (Minutes)").unwrap();
        writeln!(file, "Jane,08/21/2021 09:00,08/21/2021 09:29,29.5").unwrap();

        let records = load_attendance(file.path()).unwrap();

        assert_eq!(records[0].duration_minutes, 29.5);
    }

    #[test]
    fn test_load_bad_duration_reports_line() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Name (Original Name),Join Time,Leave Time,Duration (Minutes)").unwrap();
        writeln!(file, "Jane,08/21/2021 09:00,08/21/2021 09:30,thirty").unwrap();

        let err = load_attendance(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_annotated_known_and_unknown_fill_name_and_class() {
        let joined = parse_timestamp("08/21/2021 09:31 AM").unwrap();
        let left = parse_timestamp("08/21/2021 10:00 AM").unwrap();

        let known = AnnotatedRecord::new(
            AttendanceRecord::new("Jane.Doe", "08/21/2021 09:31 AM", "08/21/2021 10:00 AM", 29.0),
            Identity::Known(RosterEntry::parse("Jane Doe [10A]").unwrap()),
            0.82,
            true,
            joined,
            left,
        );
        assert_eq!(known.identified_as(), "Jane Doe [10A]");
        assert_eq!(known.full_name, "Jane Doe");
        assert_eq!(known.class, "10A");

        let unknown = AnnotatedRecord::new(
            AttendanceRecord::new("xyz123", "08/21/2021 09:31 AM", "08/21/2021 10:00 AM", 29.0),
            Identity::Unknown,
            0.0,
            true,
            joined,
            left,
        );
        assert_eq!(unknown.identified_as(), "Unknown");
        assert_eq!(unknown.full_name, "xyz123");
        assert_eq!(unknown.class, "Unknown");
    }
}
