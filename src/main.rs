//! Wiring & DI. Entry point: parse CLI, load config, bootstrap adapters, run the service.
//! No business logic here; summarization is delegated to SummarizationService.

use clap::Parser;
use dotenv::dotenv;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tg_summary::adapters::export::CsvDigestWriter;
use tg_summary::adapters::persistence::{DayFileReader, SummaryJsonWriter};
use tg_summary::adapters::ui::DayProgress;
use tg_summary::ports::{RecordSource, RunObserver, SummarySink};
use tg_summary::shared::config::AppConfig;
use tg_summary::domain::DomainError;
use tg_summary::usecases::{RequestOverrides, SummarizationService, SummaryRequest};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// Example: tg-summary -t images -m checksum -s 2020-09-18 -e 2020-11-11
#[derive(Parser, Debug)]
#[command(
    name = "tg-summary",
    version,
    about = "Group collected Telegram messages by media hash or near-duplicate text"
)]
struct Cli {
    /// Records to summarize: images, audios, videos, others or texts
    #[arg(short = 't', long, value_name = "TYPE")]
    media_type: String,

    /// checksum or phash (media), jaccard (texts)
    #[arg(short = 'm', long, value_name = "METHOD")]
    comparison_method: String,

    /// First day of the range (YYYY-MM-DD)
    #[arg(short = 's', long, value_name = "DATE")]
    start_date: String,

    /// Last day of the range, inclusive (default: start date)
    #[arg(short = 'e', long, value_name = "DATE")]
    end_date: Option<String>,

    /// Output file (default: <output_dir>/merged_data_<kind>-<method>_<start>-<end>.json)
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Directory with mensagens_<date>.json day files
    #[arg(long, value_name = "DIR")]
    messages_path: Option<PathBuf>,

    /// Minimum text length in characters (texts only)
    #[arg(long, value_name = "N")]
    min_size: Option<usize>,

    /// Jaccard similarity needed to join a cluster, in (0, 1] (texts only)
    #[arg(long, value_name = "F")]
    threshold: Option<f64>,

    /// Also cluster captions of media messages (texts only)
    #[arg(long)]
    include_captions: bool,

    /// Also write a CSV digest (one row per cluster)
    #[arg(long, value_name = "FILE")]
    digest: Option<PathBuf>,

    /// Config file (json, toml or yaml); overrides TG_SUMMARY_CONFIG
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found (check CWD)"),
    }

    let cfg = AppConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("config error: {}", e))?;

    let overrides = RequestOverrides {
        min_size: cli.min_size,
        threshold: cli.threshold,
        include_captions: cli.include_captions,
        output: cli.output,
        digest: cli.digest,
    };
    let request = SummaryRequest::parse(
        &cli.media_type,
        &cli.comparison_method,
        &cli.start_date,
        cli.end_date.as_deref(),
    )
    .map_err(run_error)?
    .apply_config(&cfg, overrides);

    let messages_path = cli
        .messages_path
        .unwrap_or_else(|| cfg.messages_path_or_default());
    let output_dir = cfg.output_dir_or_default();
    info!(
        messages = %messages_path.display(),
        output_dir = %output_dir.display(),
        "paths"
    );

    // --- Adapters ---
    let source: Arc<dyn RecordSource> = Arc::new(DayFileReader::new(&messages_path));
    let sink: Arc<dyn SummarySink> = Arc::new(SummaryJsonWriter::new());
    let digest_sink: Arc<dyn SummarySink> = Arc::new(CsvDigestWriter::new());

    let progress = if cli.no_progress || !std::io::stderr().is_terminal() {
        DayProgress::hidden()
    } else {
        DayProgress::new(request.day_count())
    };

    // --- Run ---
    let service = SummarizationService::new(source, sink, digest_sink, output_dir);
    let report = service
        .run_observed(&request, &progress as &dyn RunObserver)
        .map_err(run_error)?;

    println!("{}", report.output.display());
    if let Some(digest) = &report.digest {
        println!("{}", digest.display());
    }
    println!(
        "{} clusters from {} records ({} skipped, {} malformed lines, {}/{} day files)",
        report.stats.clusters,
        report.stats.records_absorbed,
        report.stats.records_skipped,
        report.stats.malformed_lines,
        report.stats.day_files_found,
        report.stats.days_in_range
    );

    Ok(())
}

/// Bad input is reported apart from failures while reading or writing.
fn run_error(e: DomainError) -> anyhow::Error {
    if e.is_configuration() {
        anyhow::anyhow!("invalid request: {}", e)
    } else {
        anyhow::anyhow!("summary failed: {}", e)
    }
}
