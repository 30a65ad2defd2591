use std::error::Error;
use std::path::PathBuf;

use chrono::Duration;
use clap::{Parser, error::ErrorKind};

use crate::analyzer::{Analysis, CategoryShare, Distribution};
use crate::config::CoordinatorConfig;
use crate::constants::analyzer::DEFAULT_TOP_N;
use crate::constants::collector::DEFAULT_VOLUME;
use crate::data::Category;
use crate::export::{InsightReport, write_records_csv_path};
use crate::job::JobCoordinator;

#[derive(Debug, Parser)]
#[command(
    name = "research_demo",
    disable_help_subcommand = true,
    about = "Generate and analyze a synthetic research corpus",
    long_about = "Run one research job end to end: synthesize a deterministic corpus for a topic phrase, stream it into an in-memory store, and print the sentiment, region, source, and timeline breakdowns.",
    after_help = "Identical --phrase, --volume, and --seed values always reproduce the same corpus."
)]
struct ResearchDemoCli {
    #[arg(long, default_value = "renewable energy", help = "Topic phrase to research")]
    phrase: String,
    #[arg(
        long,
        default_value_t = DEFAULT_VOLUME,
        value_parser = parse_positive_u64,
        help = "Number of records to synthesize"
    )]
    volume: u64,
    #[arg(long, help = "Optional seed override; derived from phrase and volume when absent")]
    seed: Option<u64>,
    #[arg(
        long = "bucket-hours",
        default_value_t = 24,
        value_parser = parse_positive_u64,
        help = "Timeline bucket width in hours"
    )]
    bucket_hours: u64,
    #[arg(long, value_name = "PATH", help = "Also write every record to this CSV file")]
    csv: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Also write the JSON insight report to this file")]
    report: Option<PathBuf>,
}

/// Run the research demo with CLI args (excluding the program name).
pub fn run_research_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<ResearchDemoCli, _>(
        std::iter::once("research_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let hours = i64::try_from(cli.bucket_hours)
        .map_err(|_| format!("--bucket-hours value {} is too large", cli.bucket_hours))?;
    let mut config = CoordinatorConfig::default();
    config.analyzer.bucket_width = Duration::hours(hours);

    let coordinator = JobCoordinator::new(config);
    let job = coordinator.create_job(&cli.phrase, Some(cli.volume), cli.seed)?;
    let job = coordinator.run(job.id)?;
    let analysis = coordinator
        .analysis(job.id)?
        .ok_or_else(|| format!("job {} finished without an analysis", job.id))?;

    println!("=== research job {} ({}) ===", job.id, job.status);
    println!("phrase: {}", job.spec.phrase);
    println!("volume: {}", job.spec.volume);
    println!("seed: {}", job.spec.seed);
    println!();
    print_summary(&analysis);
    print_distribution("[SENTIMENT]", &analysis.sentiment);
    print_distribution("[SOURCES]", &analysis.sources);
    print_distribution("[REGIONS]", &analysis.regions);
    print_top("[TOP REGIONS]", &analysis.top_regions);
    print_top("[TOP SOURCES]", &analysis.top_sources);
    print_timeline(&analysis);

    if let Some(path) = cli.csv {
        let records = coordinator.records(job.id)?;
        let rows = write_records_csv_path(&path, &records)?;
        println!("wrote {rows} rows to {}", path.display());
    }
    if let Some(path) = cli.report {
        InsightReport::new(job.spec.phrase.clone(), &analysis).write_json_path(&path)?;
        println!("wrote report to {}", path.display());
    }
    Ok(())
}

fn print_summary(analysis: &Analysis) {
    let summary = &analysis.summary;
    println!("[SUMMARY]");
    println!("  records: {}", summary.total_records);
    println!(
        "  sentiment: positive={} neutral={} negative={}",
        summary.positive, summary.neutral, summary.negative
    );
    println!("  average score: {:.4}", summary.average_score);
    println!("  dominant sentiment: {}", summary.dominant_sentiment_label());
    println!("  dominant region: {}", summary.dominant_region_label());
    println!("  dominant source: {}", summary.dominant_source_label());
    println!();
}

fn print_distribution<C: Category>(title: &str, distribution: &Distribution<C>) {
    println!("{title}");
    for entry in distribution.entries() {
        println!(
            "  {:<14} {:>8}  {:>6.2}%",
            entry.label,
            entry.count,
            entry.share * 100.0
        );
    }
    println!();
}

fn print_top<C>(title: &str, entries: &[CategoryShare<C>]) {
    println!("{title}");
    for (rank, entry) in entries.iter().take(DEFAULT_TOP_N).enumerate() {
        println!("  {}. {} ({})", rank + 1, entry.label, entry.count);
    }
    println!();
}

fn print_timeline(analysis: &Analysis) {
    println!("[TIMELINE]");
    for point in analysis.timeline.series() {
        println!("  {}  {:>8}", point.label, point.value);
    }
    println!();
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_positive_u64(raw: &str) -> Result<u64, String> {
    let parsed = raw
        .parse::<u64>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}
