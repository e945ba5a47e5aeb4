//! # harvest — search log harvesting CLI
//!
//! - `harvest convert-csv -i logs.json -o logs.csv`: JSON log lines to CSV.
//! - `harvest associate -s searches.csv -c clicks.csv -o associated.csv`: flag clicked searches.
//! - `harvest merge -s associated.csv -o sessions.csv`: keep the last query of each search session.
//! - `harvest convert-json -i associated.csv -o associated.json`: associated CSV to JSON lines.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hv_core::{RunSummary, Segmenter, SegmenterConfig, SessionPolicy};
use hv_io::annotate::{self, ClickSet};
use hv_io::convert;
use hv_io::csv_stream::{CsvRecords, CsvSink};
use hv_io::jsonl::{JsonLines, JsonLinesSink};

mod config;
mod report;

use config::{set, Config};
use report::Report;

/// 🌾 HARVEST — Turn raw search and click logs into terminal search sessions.
#[derive(Parser)]
#[command(name = "harvest", version, about, long_about = None)]
struct Cli {
    /// Path to config file.
    #[arg(long, global = true, default_value = "harvest.toml")]
    config: PathBuf,

    /// Print per-query decisions and other debug output.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert JSON log lines into search/click CSV rows.
    ConvertCsv {
        /// Input file (one JSON log line per line).
        #[arg(short, long, default_value = "input.json")]
        input: PathBuf,

        /// Output CSV file.
        #[arg(short, long, default_value = "output.csv")]
        output: PathBuf,
    },

    /// Convert an associated CSV into JSON lines.
    ConvertJson {
        /// Input associated CSV.
        #[arg(short, long, default_value = "input.csv")]
        input: PathBuf,

        /// Output JSON-lines file.
        #[arg(short, long, default_value = "output.json")]
        output: PathBuf,
    },

    /// Flag every search that received at least one click.
    Associate {
        /// Search CSV.
        #[arg(short, long, default_value = "searches.csv")]
        search: PathBuf,

        /// Click CSV.
        #[arg(short, long, default_value = "clicks.csv")]
        click: PathBuf,

        /// Output associated CSV.
        #[arg(short, long, default_value = "associated.csv")]
        output: PathBuf,

        #[command(flatten)]
        columns: SearchColumnArgs,

        /// Index of queryID column in click CSV.
        #[arg(long = "icqid")]
        click_query_id: Option<usize>,
    },

    /// Keep only the terminal query of each search session.
    Merge {
        /// Associated search source (with click flags).
        #[arg(short, long, default_value = "searches.csv")]
        search: PathBuf,

        /// Output file.
        #[arg(short, long, default_value = "output.csv")]
        output: PathBuf,

        /// Input and output format.
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        #[command(flatten)]
        columns: MergeColumnArgs,

        /// Queries closer than this (in timestamp units) belong to the same search.
        #[arg(long, allow_negative_numbers = true)]
        time_window_ms: Option<i64>,

        /// Queries further apart than this many edits start a new search.
        #[arg(long, allow_negative_numbers = true)]
        edit_distance_threshold: Option<i64>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Jsonl,
}

#[derive(clap::Args)]
struct SearchColumnArgs {
    /// Index of timestamp column in search CSV.
    #[arg(long = "it")]
    timestamp: Option<usize>,
    /// Index of appID column in search CSV.
    #[arg(long = "ia")]
    app: Option<usize>,
    /// Index of indexName column in search CSV.
    #[arg(long = "ii")]
    index: Option<usize>,
    /// Index of queryID column in search CSV.
    #[arg(long = "iqid")]
    query_id: Option<usize>,
    /// Index of userID column in search CSV.
    #[arg(long = "iu")]
    user: Option<usize>,
    /// Index of context column in search CSV.
    #[arg(long = "ic")]
    context: Option<usize>,
    /// Index of query column in search CSV.
    #[arg(long = "iq")]
    query: Option<usize>,
    /// Index of queryParameters column in search CSV.
    #[arg(long = "iqp")]
    query_params: Option<usize>,
}

#[derive(clap::Args)]
struct MergeColumnArgs {
    /// Index of timestamp column in CSV.
    #[arg(long = "it")]
    timestamp: Option<usize>,
    /// Index of indexName column in CSV.
    #[arg(long = "ii")]
    index: Option<usize>,
    /// Index of userID column in CSV.
    #[arg(long = "iu")]
    user: Option<usize>,
    /// Index of query column in CSV.
    #[arg(long = "iq")]
    query: Option<usize>,
    /// Index of click column in CSV.
    #[arg(long = "ic")]
    click: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "hv_cli=debug,hv_core=debug,hv_io=debug"
    } else {
        "hv_cli=info,hv_core=info,hv_io=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::ConvertCsv { input, output } => {
            tracing::info!("Converting {} into {}...", input.display(), output.display());
            let mut report = Report::start("convert-csv");
            let summary = convert::json_to_csv(BufReader::new(open(&input)?), create(&output)?)
                .with_context(|| format!("Could not convert {}", input.display()))?;
            report
                .add("searches", summary.searches)
                .add("clicks", summary.clicks)
                .print();
        }

        Commands::ConvertJson { input, output } => {
            let columns = config.merge;
            columns.validate()?;

            tracing::info!("Converting {} into {}...", input.display(), output.display());
            let mut report = Report::start("convert-json");
            let summary = convert::csv_to_json(
                open(&input)?,
                BufWriter::new(create(&output)?),
                columns,
            )
            .with_context(|| format!("Could not convert {}", input.display()))?;
            report.add("searches", summary.searches).print();
        }

        Commands::Associate {
            search,
            click,
            output,
            columns: flags,
            click_query_id,
        } => {
            let mut columns = config.associate.search;
            set(&mut columns.timestamp, flags.timestamp);
            set(&mut columns.app, flags.app);
            set(&mut columns.index, flags.index);
            set(&mut columns.query_id, flags.query_id);
            set(&mut columns.user, flags.user);
            set(&mut columns.context, flags.context);
            set(&mut columns.query, flags.query);
            set(&mut columns.query_params, flags.query_params);
            columns.validate()?;

            let mut click_columns = config.associate.click;
            set(&mut click_columns.query_id, click_query_id);

            tracing::info!(
                "Processing clicks from {} and searches from {} into {}...",
                click.display(),
                search.display(),
                output.display()
            );
            let mut report = Report::start("associate");

            tracing::info!("Generating click set...");
            let clicks = ClickSet::from_csv(open(&click)?, click_columns)
                .with_context(|| format!("Error while reading click file {}", click.display()))?;

            tracing::info!("Creating search set...");
            let summary = annotate::annotate(open(&search)?, &clicks, columns, create(&output)?)
                .with_context(|| format!("Error while reading search file {}", search.display()))?;

            report
                .add("queries with clicks", clicks.len())
                .add("searches", summary.searches)
                .add("clicked searches", summary.clicked)
                .print();
        }

        Commands::Merge {
            search,
            output,
            format,
            columns: flags,
            time_window_ms,
            edit_distance_threshold,
        } => {
            let mut session = config.session;
            set(&mut session.time_window_ms, time_window_ms);
            set(&mut session.edit_distance_threshold, edit_distance_threshold);
            let segmenter = Segmenter::new(validate_session(session)?);

            let mut columns = config.merge;
            set(&mut columns.timestamp, flags.timestamp);
            set(&mut columns.index, flags.index);
            set(&mut columns.user, flags.user);
            set(&mut columns.query, flags.query);
            set(&mut columns.click, flags.click);
            columns.validate()?;

            tracing::info!(
                "Processing searches from {} into {}...",
                search.display(),
                output.display()
            );
            let mut report = Report::start("merge");
            report
                .add("time window", segmenter.policy().time_window_ms())
                .add("edit distance", segmenter.policy().edit_distance_threshold());

            tracing::info!("Merging searches...");
            let input = open(&search)?;
            let out = create(&output)?;
            let result = match format {
                Format::Csv => segmenter.run(CsvRecords::new(input, columns), &mut CsvSink::new(out)),
                Format::Jsonl => segmenter.run(
                    JsonLines::new(BufReader::new(input)),
                    &mut JsonLinesSink::new(BufWriter::new(out)),
                ),
            };

            let summary = match &result {
                Ok(summary) => summary,
                Err(e) => e.summary(),
            };
            add_run_summary(&mut report, summary).print();
            result.with_context(|| {
                format!("Could not write terminal searches to {}", output.display())
            })?;
        }
    }

    Ok(())
}

fn validate_session(session: SegmenterConfig) -> anyhow::Result<SessionPolicy> {
    session.validate().context("Invalid session settings")
}

fn add_run_summary<'a>(report: &'a mut Report, summary: &RunSummary) -> &'a mut Report {
    report
        .add("processed", summary.processed)
        .add("terminal", summary.terminal)
        .add("skipped", summary.skipped)
}

fn open(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("Could not open {}", path.display()))
}

fn create(path: &Path) -> anyhow::Result<File> {
    File::create(path).with_context(|| format!("Could not create output file {}", path.display()))
}
