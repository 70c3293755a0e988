// 🔄 Presence Pipeline - raw export rows → deduplicated attendance table
//
// AttendanceRecord ─identify─▶ ─parse + lateness─▶ AnnotatedRecord ─aggregate─▶ AggregatedRow
//
// Pure transformation: the similarity index is borrowed, input rows are
// consumed, nothing is mutated in place.

use crate::aggregator::{AggregatedRow, AttendanceAggregator};
use crate::attendance::{AnnotatedRecord, AttendanceRecord};
use crate::config::PresenceConfig;
use crate::error::PresenceResult;
use crate::lateness::LatenessEvaluator;
use crate::matcher::IdentityMatcher;
use crate::report::ReportTarget;
use crate::similarity::SimilarityIndex;
use crate::timestamp::parse_timestamp;
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// RUN SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PresenceSummary {
    pub input_records: usize,
    pub skipped_records: usize,
    pub output_rows: usize,
    pub resolved_identities: usize,
    pub unresolved_names: usize,
    pub late_identities: usize,
}

impl PresenceSummary {
    fn from_rows(input_records: usize, skipped_records: usize, rows: &[AggregatedRow]) -> Self {
        let resolved_identities = rows.iter().filter(|r| r.is_known()).count();

        PresenceSummary {
            input_records,
            skipped_records,
            output_rows: rows.len(),
            resolved_identities,
            unresolved_names: rows.len() - resolved_identities,
            late_identities: rows.iter().filter(|r| r.is_late).count(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} sessions → {} rows ({} identified, {} unknown, {} late), {} skipped",
            self.input_records,
            self.output_rows,
            self.resolved_identities,
            self.unresolved_names,
            self.late_identities,
            self.skipped_records
        )
    }
}

#[derive(Debug, Clone)]
pub struct PresenceOutcome {
    pub rows: Vec<AggregatedRow>,
    pub target: Option<ReportTarget>,
    pub summary: PresenceSummary,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct PresencePipeline<'a> {
    matcher: IdentityMatcher<'a>,
    lateness: LatenessEvaluator,
    skip_unparseable: bool,
}

impl<'a> PresencePipeline<'a> {
    /// Wire the pipeline; fails on an invalid meeting start or match threshold
    pub fn new(index: &'a SimilarityIndex, config: &PresenceConfig) -> PresenceResult<Self> {
        let threshold = config.checked_similarity_threshold()?;

        Ok(PresencePipeline {
            matcher: IdentityMatcher::new(index).with_threshold(threshold),
            lateness: config.lateness()?,
            skip_unparseable: config.skip_unparseable,
        })
    }

    /// Resolve identity and lateness for a single row
    pub fn annotate_record(&self, record: AttendanceRecord) -> PresenceResult<AnnotatedRecord> {
        let joined_at = parse_timestamp(&record.join_time)?;
        let left_at = parse_timestamp(&record.leave_time)?;

        let matched = self.matcher.identify(&record.name);
        let is_late = self.lateness.is_late(joined_at);

        debug!(
            name = %record.name,
            identified_as = matched.identity.label(),
            similarity = matched.score,
            is_late,
            "Annotated record"
        );

        Ok(AnnotatedRecord::new(
            record,
            matched.identity,
            matched.score,
            is_late,
            joined_at,
            left_at,
        ))
    }

    /// Annotate every row; returns the annotated rows and how many were skipped
    pub fn annotate(
        &self,
        records: Vec<AttendanceRecord>,
    ) -> PresenceResult<(Vec<AnnotatedRecord>, usize)> {
        let mut annotated = Vec::with_capacity(records.len());
        let mut skipped = 0;

        for (i, record) in records.into_iter().enumerate() {
            let name = record.name.clone();
            match self.annotate_record(record) {
                Ok(a) => annotated.push(a),
                Err(e) if self.skip_unparseable => {
                    warn!(row = i + 1, name = %name, error = %e, "Skipping attendance row");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            records = annotated.len(),
            "Identified As, Similarity, Full Name, Identified Class and Is Late resolved"
        );

        Ok((annotated, skipped))
    }

    /// Full run: annotate, derive the report target, aggregate
    pub fn run(&self, records: Vec<AttendanceRecord>) -> PresenceResult<PresenceOutcome> {
        let input_records = records.len();
        let (annotated, skipped) = self.annotate(records)?;

        let target = ReportTarget::from_records(&annotated)?;
        let rows = AttendanceAggregator::aggregate(&annotated);
        let summary = PresenceSummary::from_rows(input_records, skipped, &rows);

        info!("{}", summary.summary());

        Ok(PresenceOutcome {
            rows,
            target,
            summary,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
