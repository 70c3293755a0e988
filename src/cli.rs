//! CLI argument parsing for zoom-presence

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zoom-presence")]
#[command(version)]
#[command(about = "Reconcile meeting attendance exports against a class roster", long_about = None)]
pub struct Cli {
    /// Enable debug logging (per-record identification details)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit a similarity index from a roster of "<full name> [<class>]" entries
    BuildIndex(BuildIndexArgs),

    /// Identify, flag late arrivals and deduplicate an attendance export
    Process(ProcessArgs),
}

#[derive(Args, Debug)]
pub struct BuildIndexArgs {
    /// Roster file (.csv with a "Name" column, or one name per line)
    #[arg(short, long, value_name = "FILE")]
    pub roster: PathBuf,

    /// Where to write the index artifact
    #[arg(short, long, value_name = "FILE", default_value = "roster-index.json")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Attendance export (CSV)
    #[arg(value_name = "ATTENDANCE")]
    pub attendance: PathBuf,

    /// Similarity index artifact produced by build-index
    #[arg(short, long, value_name = "FILE", default_value = "roster-index.json")]
    pub index: PathBuf,

    /// JSON config file (fields: meeting_start, late_after_minutes,
    /// similarity_threshold, skip_unparseable)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Scheduled meeting start, e.g. "09:00 AM"
    #[arg(short = 's', long, value_name = "TIME")]
    pub meeting_start: Option<String>,

    /// Minutes after start at which a join counts as late
    #[arg(long, value_name = "MINUTES")]
    pub late_after: Option<i64>,

    /// Minimum similarity for a roster match (0.0-1.0)
    #[arg(long, value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// Skip rows with unparseable timestamps instead of aborting
    #[arg(long)]
    pub skip_unparseable: bool,

    /// Directory for the generated spreadsheet
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Also print the aggregated rows as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
