#![forbid(unsafe_code)]

use error_iter::ErrorIter as _;
use fraudcount::errors::{ExportError, GranularityError, SourceError, TransactionsError};
use fraudcount::model::Granularity;
use fraudcount::pipeline::{LoadOutcome, Pipeline};
use fraudcount::source::Source;
use is_terminal::IsTerminal as _;
use onlyargs::CliError;
use onlyargs_derive::OnlyArgs;
use std::path::PathBuf;
use std::{env, process::ExitCode};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

#[derive(Debug, OnlyArgs)]
#[footer = "Additional environment variables:"]
#[footer = "  - TERM_COLOR accepts \"always\" to override automatic terminal sensing"]
struct Args {
    /// Read transaction CSV from a file.
    ///   Expects a header row with `transaction_date` and `is_fraud`
    ///   columns, located by name.
    ///
    #[long]
    input_transactions: Option<PathBuf>,

    /// Fetch transaction CSV from an HTTP URL.
    #[long]
    fetch_url: Option<String>,

    /// Time bucket granularity. Accepts {day, hour, minute}.
    #[short('g')]
    #[default("hour")]
    granularity: String,

    /// Write the aggregated series CSV to this file.
    ///   When omitted, the series is printed to stdout instead.
    ///
    #[short('o')]
    output: Option<PathBuf>,

    /// Enable verbose output.
    /// Prints the series CSV to stdout even when written to a file.
    verbose: bool,
}

#[derive(Debug, Error)]
enum Error {
    #[error("Argument parsing error")]
    Args(#[from] CliError),

    #[error("Expected exactly one of --input-transactions or --fetch-url")]
    SourceSelection,

    #[error("Granularity parsing error")]
    Granularity(#[from] GranularityError),

    #[error("Unable to load source `{0}`")]
    Source(String, #[source] SourceError),

    #[error("Unable to parse transactions from `{0}`")]
    Parse(String, #[source] TransactionsError),

    #[error("Unable to export series to {0:?}")]
    Export(PathBuf, #[source] ExportError),

    #[error("Unable to render series")]
    Render(#[from] ExportError),
}

fn main() -> ExitCode {
    // Initialize the tracing subscriber for instrumentation.
    // Uses the `RUST_LOG` environment var for configuration. E.g. `RUST_LOG=debug cargo run`
    // This is very useful to see the input CSV row that caused a drop.
    //
    // See: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/struct.EnvFilter.html#directives
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let term_color = env::var("TERM_COLOR")
        .map(|color| color == "always")
        .unwrap_or_else(|_| std::io::stdout().is_terminal());
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(term_color))
        .with(env_filter)
        .init();

    match run(onlyargs::parse()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            for source in err.sources().skip(1) {
                eprintln!("  Caused by: {source}");
            }

            ExitCode::FAILURE
        }
    }
}

fn run(args: Result<Args, CliError>) -> Result<(), Error> {
    let args = args?;

    let granularity = Granularity::try_from(args.granularity)?;

    let source = match (args.input_transactions, args.fetch_url) {
        (Some(path), None) => Source::File(path),
        (None, Some(url)) => Source::Url(url),
        _ => return Err(Error::SourceSelection),
    };
    let descriptor = source.to_string();

    let mut pipeline = Pipeline::new(granularity);
    let ticket = pipeline.begin_load();

    debug!("Loading CSV text from `{descriptor}`");
    let csv_text = source
        .load()
        .map_err(|err| Error::Source(descriptor.clone(), err))?;

    let outcome = pipeline
        .apply_load(ticket, &csv_text)
        .map_err(|err| Error::Parse(descriptor.clone(), err))?;
    let stats = match outcome {
        LoadOutcome::Applied(stats) => stats,
        LoadOutcome::EmptyInput => {
            println!(
                "`{descriptor}` has no data rows. Load a CSV with transactions to see the series."
            );
            return Ok(());
        }
        // A single synchronous load is never superseded.
        LoadOutcome::Superseded => unreachable!(),
    };

    if pipeline.buckets().is_empty() {
        println!("No valid transactions found in `{descriptor}`.");
        println!("Expected `transaction_date` and `is_fraud` columns with parseable rows.");
        println!();
    } else if let Some(path) = args.output.as_ref() {
        fraudcount::export::write_series(path, pipeline.buckets())
            .map_err(|err| Error::Export(path.clone(), err))?;

        let path = path.display();
        let underline = "=".repeat(path.to_string().len());
        println!("Aggregated series written to {path}");
        println!("========== ====== ======= == {underline}");
        println!();

        if args.verbose {
            println!("{}", pipeline.export_csv()?);
        }
    } else {
        println!("Fraud Transaction Time Series");
        println!("===== =========== ==== ======");
        println!();
        println!("{}", pipeline.export_csv()?);
    }

    stats.pretty_print();

    Ok(())
}
