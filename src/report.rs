// 📤 Report Exporter - aggregated attendance → labeled spreadsheet
//
// File:  processed-presence-YYYY-MM-DD.xlsx (date of the first attendance row)
// Sheet: MMDDYYYY
// Layout: first row empty, header on the second row, data below it,
//         leading 1-based "Nomor" column.

use crate::aggregator::AggregatedRow;
use crate::attendance::AnnotatedRecord;
use crate::error::PresenceResult;
use crate::timestamp::parse_date_prefix;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Columns written after "Nomor", in order
pub const REPORT_COLUMNS: [&str; 9] = [
    "Identified As",
    "Name (Original Name)",
    "Is Late",
    "Similarity",
    "Full Name",
    "Identified Class",
    "Join Time",
    "Leave Time",
    "Duration (Minutes)",
];

pub const INDEX_COLUMN: &str = "Nomor";

/// Zero-based sheet row of the header (data starts one row below)
pub const HEADER_ROW: u32 = 1;

// ============================================================================
// REPORT TARGET
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTarget {
    pub date: NaiveDate,
    pub file_name: String,
    pub sheet_name: String,
}

impl ReportTarget {
    pub fn for_date(date: NaiveDate) -> Self {
        ReportTarget {
            date,
            file_name: format!("processed-presence-{}.xlsx", date.format("%Y-%m-%d")),
            sheet_name: date.format("%m%d%Y").to_string(),
        }
    }

    /// Derive the target from the first record's Join Time; None when empty
    pub fn from_records(records: &[AnnotatedRecord]) -> PresenceResult<Option<Self>> {
        match records.first() {
            Some(first) => {
                let prefix: String = first.record.join_time.chars().take(10).collect();
                let date = parse_date_prefix(prefix.trim())?;
                Ok(Some(ReportTarget::for_date(date)))
            }
            None => Ok(None),
        }
    }
}

// ============================================================================
// REPORT TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Header + body of the sheet, independent of the spreadsheet writer
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn from_rows(rows: &[AggregatedRow]) -> Self {
        let header = std::iter::once(INDEX_COLUMN)
            .chain(REPORT_COLUMNS)
            .map(str::to_string)
            .collect();

        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                vec![
                    Cell::Number((i + 1) as f64),
                    Cell::Text(row.identified_as.clone()),
                    Cell::Text(row.name.clone()),
                    Cell::Bool(row.is_late),
                    Cell::Number(row.similarity),
                    Cell::Text(row.full_name.clone()),
                    Cell::Text(row.class.clone()),
                    Cell::Text(row.join_time.clone()),
                    Cell::Text(row.leave_time.clone()),
                    Cell::Number(row.duration_minutes),
                ]
            })
            .collect();

        ReportTable { header, rows }
    }
}

// ============================================================================
// EXPORTER
// ============================================================================

pub struct ReportExporter {
    output_dir: PathBuf,
}

impl ReportExporter {
    pub fn new(output_dir: &Path) -> Self {
        ReportExporter {
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Write the report; returns the full path of the created file
    pub fn write(&self, rows: &[AggregatedRow], target: &ReportTarget) -> Result<PathBuf> {
        let path = self.output_dir.join(&target.file_name);
        let table = ReportTable::from_rows(rows);
        let bold = Format::new().set_bold();

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&target.sheet_name)
            .with_context(|| format!("Invalid sheet name: {}", target.sheet_name))?;

        for (col, title) in table.header.iter().enumerate() {
            worksheet.write_string_with_format(HEADER_ROW, col as u16, title, &bold)?;
        }

        for (i, cells) in table.rows.iter().enumerate() {
            let row = HEADER_ROW + 1 + i as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(text) => worksheet.write_string(row, col, text)?,
                    Cell::Number(n) => worksheet.write_number(row, col, *n)?,
                    Cell::Bool(b) => worksheet.write_boolean(row, col, *b)?,
                };
            }
        }

        workbook
            .save(&path)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;

        info!(path = %path.display(), sheet = %target.sheet_name, rows = rows.len(), "Report saved");

        Ok(path)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::AttendanceRecord;
    use crate::matcher::Identity;
    use crate::timestamp::parse_timestamp;

    fn create_test_row(identified_as: &str, name: &str, duration: f64) -> AggregatedRow {
        let joined = parse_timestamp("08/21/2021 09:31 AM").unwrap();
        let left = parse_timestamp("08/21/2021 10:00 AM").unwrap();

        AggregatedRow {
            identified_as: identified_as.to_string(),
            name: name.to_string(),
            is_late: true,
            similarity: 0.82,
            full_name: "Jane Doe".to_string(),
            class: "10A".to_string(),
            join_time: "08/21/2021 09:31 AM".to_string(),
            leave_time: "08/21/2021 10:00 AM".to_string(),
            duration_minutes: duration,
            joined_at: joined,
            left_at: left,
            sessions: 1,
        }
    }

    fn create_test_annotated(join: &str) -> AnnotatedRecord {
        let joined = parse_timestamp(join).unwrap();
        AnnotatedRecord::new(
            AttendanceRecord::new("x", join, join, 1.0),
            Identity::Unknown,
            0.0,
            false,
            joined,
            joined,
        )
    }

    #[test]
    fn test_target_from_first_record() {
        let records = vec![
            create_test_annotated("08/21/2021 09:31 AM"),
            create_test_annotated("08/22/2021 09:31 AM"),
        ];

        let target = ReportTarget::from_records(&records).unwrap().unwrap();

        assert_eq!(target.file_name, "processed-presence-2021-08-21.xlsx");
        assert_eq!(target.sheet_name, "08212021");
    }

    #[test]
    fn test_target_none_when_empty() {
        assert_eq!(ReportTarget::from_records(&[]).unwrap(), None);
    }

    #[test]
    fn test_table_layout() {
        let rows = vec![
            create_test_row("Jane Doe [10A]", "Jane.Doe", 29.0),
            create_test_row("Unknown", "xyz123", 5.0),
        ];

        let table = ReportTable::from_rows(&rows);

        assert_eq!(table.header[0], "Nomor");
        assert_eq!(&table.header[1..], &REPORT_COLUMNS.map(str::to_string)[..]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Number(1.0));
        assert_eq!(table.rows[1][0], Cell::Number(2.0));
        assert_eq!(table.rows[0][1], Cell::Text("Jane Doe [10A]".to_string()));
        assert_eq!(table.rows[0][3], Cell::Bool(true));
        assert_eq!(table.rows[1][9], Cell::Number(5.0));
    }

    #[test]
    fn test_write_creates_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path());
        let target = ReportTarget::for_date(NaiveDate::from_ymd_opt(2021, 8, 21).unwrap());

        let path = exporter
            .write(&[create_test_row("Jane Doe [10A]", "Jane.Doe", 29.0)], &target)
            .unwrap();

        assert_eq!(path, dir.path().join("processed-presence-2021-08-21.xlsx"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_write_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path());
        let target = ReportTarget::for_date(NaiveDate::from_ymd_opt(2021, 1, 2).unwrap());

        let path = exporter.write(&[], &target).unwrap();
        assert!(path.ends_with("processed-presence-2021-01-02.xlsx"));
    }
}
