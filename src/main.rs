use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zoom_presence::cli::{BuildIndexArgs, Cli, Command, ProcessArgs};
use zoom_presence::{
    load_attendance, PresenceConfig, PresencePipeline, ReportExporter, Roster, SimilarityIndex,
};

/// Initialize tracing subscriber; RUST_LOG still wins when set
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Command::BuildIndex(args) => run_build_index(args),
        Command::Process(args) => run_process(args),
    }
}

fn run_build_index(args: BuildIndexArgs) -> Result<()> {
    let roster = Roster::from_file(&args.roster)?;
    info!(path = %args.roster.display(), entries = roster.len(), "Roster loaded");

    let index = SimilarityIndex::build(roster);
    index.save(&args.output)?;

    info!(
        path = %args.output.display(),
        terms = index.vectorizer().dimension(),
        "Similarity index saved"
    );

    Ok(())
}

fn run_process(args: ProcessArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    // Load phase: a bad index aborts before any attendance row is touched
    let index = SimilarityIndex::load(&args.index)?;
    info!(path = %args.index.display(), entries = index.len(), "Similarity index loaded");

    let pipeline = PresencePipeline::new(&index, &config).context("Invalid configuration")?;

    let records = load_attendance(&args.attendance)?;
    let outcome = pipeline.run(records)?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome.rows)
            .context("Failed to serialize attendance rows")?;
        println!("{}", json);
    }

    match &outcome.target {
        Some(target) => {
            ReportExporter::new(&args.output_dir).write(&outcome.rows, target)?;
        }
        None => warn!(
            path = %args.attendance.display(),
            "No attendance rows; report date unknown, nothing written"
        ),
    }

    Ok(())
}

/// Config file (if any) overlaid with CLI flags
fn resolve_config(args: &ProcessArgs) -> Result<PresenceConfig> {
    let mut config = match &args.config {
        Some(path) => PresenceConfig::from_file(path)?,
        None => PresenceConfig::default(),
    };

    if let Some(start) = &args.meeting_start {
        config.meeting_start = start.clone();
    }
    if let Some(minutes) = args.late_after {
        config.late_after_minutes = minutes;
    }
    if let Some(threshold) = args.threshold {
        config.similarity_threshold = threshold;
    }
    if args.skip_unparseable {
        config.skip_unparseable = true;
    }

    Ok(config)
}
