//! Command-line interface for es-diff
//!
//! # Usage Examples
//!
//! ```bash
//! # Text output, one line per differing document
//! es-diff http://localhost:19200/index01/tweet http://localhost:29200/index01
//!
//! # JSON lines, larger pages, credentials from the environment
//! ESDIFF_SOURCE_PASSWORD=changeme es-diff -o json --size 1000 \
//!   --source-username elastic \
//!   http://localhost:19200/index01 http://localhost:29200/index01
//! ```
//!
//! Set `RUST_LOG=info` to see version detection and progress on stderr.

use anyhow::Context;
use clap::Parser;
use es_diff::{printer_for, run_comparison, CompareConfig, CompareOpts, OutputFormat};
use std::io::{stdout, BufWriter};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "es-diff")]
#[command(about = "Compare documents between two Elasticsearch indices")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    compare: CompareOpts,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text", env = "ESDIFF_OUTPUT")]
    output: OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Diff records own stdout
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CompareConfig::try_from(&cli.compare).context("Invalid arguments")?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping comparison");
            interrupt.cancel();
        }
    });

    let mut printer = printer_for(cli.output, BufWriter::new(stdout()));
    let summary = run_comparison(&config, printer.as_mut(), cancel)
        .await
        .with_context(|| {
            format!(
                "Failed to compare {} with {}",
                config.source, config.destination
            )
        })?;

    tracing::debug!("{} differences", summary.total());
    Ok(())
}
