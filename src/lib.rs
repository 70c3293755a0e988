// Zoom Presence - Core Library
// Exposes all modules for use in the CLI and tests

pub mod error;
pub mod normalizer;
pub mod roster;
pub mod similarity;
pub mod matcher;
pub mod timestamp;
pub mod lateness;
pub mod attendance;
pub mod aggregator;
pub mod report;
pub mod config;
pub mod pipeline;
pub mod cli;

// Re-export commonly used types
pub use error::{PresenceError, PresenceResult};
pub use normalizer::normalize_name;
pub use roster::{Roster, RosterEntry};
pub use similarity::{cosine_similarity, SimilarityIndex, SparseVector, TfidfVectorizer};
pub use matcher::{Identity, IdentityMatcher, MatchResult, UNKNOWN};
pub use timestamp::{parse_timestamp, TimestampLayout};
pub use lateness::LatenessEvaluator;
pub use attendance::{load_attendance, AnnotatedRecord, AttendanceRecord};
pub use aggregator::{AggregatedRow, AttendanceAggregator};
pub use report::{ReportExporter, ReportTable, ReportTarget};
pub use config::PresenceConfig;
pub use pipeline::{PresenceOutcome, PresencePipeline, PresenceSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
