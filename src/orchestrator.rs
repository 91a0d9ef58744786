//! Running one comparison: two producers, the Differ, and the printing loop.

use crate::config::CompareConfig;
use crate::error::CompareError;
use crate::printer::Printer;
use crate::resolver::resolve;
use diff_core::{differ, DiffKind, DiffRecord, Side};
use es_source::{DocumentSource, IterateRequest};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

type TaskResult = Result<(), CompareError>;

/// Counts of the records emitted by a successful run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompareSummary {
    pub added: u64,
    pub removed: u64,
    pub changed: u64,
}

impl CompareSummary {
    fn record(&mut self, kind: DiffKind) {
        match kind {
            DiffKind::Added => self.added += 1,
            DiffKind::Removed => self.removed += 1,
            DiffKind::Changed => self.changed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.added + self.removed + self.changed
    }
}

/// Resolve both endpoints and compare them, printing every difference.
///
/// Cancelling `cancel` aborts the run with [`CompareError::Cancelled`].
pub async fn run_comparison(
    config: &CompareConfig,
    printer: &mut dyn Printer,
    cancel: CancellationToken,
) -> Result<CompareSummary, CompareError> {
    let source = resolve(&config.source).await?;
    let destination = resolve(&config.destination).await?;

    compare_sources(
        source.as_ref(),
        destination.as_ref(),
        config.source_request(),
        config.destination_request(),
        printer,
        cancel,
    )
    .await
}

/// Compare two resolved sources.
///
/// Both scans and the Differ run as tasks under one cancellation scope. The
/// first error ends the run; every task has finished when this returns.
pub async fn compare_sources(
    source: &dyn DocumentSource,
    destination: &dyn DocumentSource,
    source_request: IterateRequest,
    destination_request: IterateRequest,
    printer: &mut dyn Printer,
    cancel: CancellationToken,
) -> Result<CompareSummary, CompareError> {
    let scope = cancel.child_token();
    let capacity = source_request.batch_size.max(destination_request.batch_size);
    let mut tasks: JoinSet<TaskResult> = JoinSet::new();

    info!(
        "Comparing {} (v{}) with {} (v{})",
        source.endpoint(),
        source.version(),
        destination.endpoint(),
        destination.version()
    );

    let (source_stream, source_task) = source.iterate(scope.clone(), source_request);
    tasks.spawn(async move {
        source_task
            .await
            .map_err(|e| CompareError::from_source(Side::Source, e))
    });

    let (destination_stream, destination_task) =
        destination.iterate(scope.clone(), destination_request);
    tasks.spawn(async move {
        destination_task
            .await
            .map_err(|e| CompareError::from_source(Side::Destination, e))
    });

    let (diff_tx, mut diff_rx) = mpsc::channel(capacity);
    let differ_scope = scope.clone();
    tasks.spawn(async move {
        differ(differ_scope, source_stream, destination_stream, diff_tx)
            .await
            .map_err(CompareError::from)
    });

    let mut summary = CompareSummary::default();
    let outcome = consume(&mut tasks, &mut diff_rx, printer, &scope, &mut summary).await;

    scope.cancel();
    drop(diff_rx);
    let outcome = settle(outcome, &mut tasks).await;

    let flushed = printer.finish();
    match outcome {
        Ok(()) => {
            flushed?;
            info!(
                "Comparison finished: {} added, {} removed, {} changed",
                summary.added, summary.removed, summary.changed
            );
            Ok(summary)
        }
        Err(e) => Err(e),
    }
}

/// Print diff records until the stream closes or any signal reports a failure.
async fn consume(
    tasks: &mut JoinSet<TaskResult>,
    diff_rx: &mut mpsc::Receiver<DiffRecord>,
    printer: &mut dyn Printer,
    cancel: &CancellationToken,
    summary: &mut CompareSummary,
) -> TaskResult {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CompareError::Cancelled),
            Some(joined) = tasks.join_next() => flatten(joined)?,
            record = diff_rx.recv() => match record {
                Some(record) => {
                    summary.record(record.kind);
                    printer.print(&record)?;
                }
                None => return Ok(()),
            },
        }
    }
}

/// Wait for every remaining task and pick the error that ends the run.
///
/// The first error observed wins, except that a real failure replaces a
/// `Cancelled` outcome. Cancellations caused by the teardown are ignored.
async fn settle(mut outcome: TaskResult, tasks: &mut JoinSet<TaskResult>) -> TaskResult {
    while let Some(joined) = tasks.join_next().await {
        let Err(error) = flatten(joined) else {
            continue;
        };
        if error.is_cancelled() {
            continue;
        }
        match &outcome {
            Err(first) if !first.is_cancelled() => {
                debug!("Discarding error after run already failed: {error}");
            }
            _ => outcome = Err(error),
        }
    }
    outcome
}

fn flatten(joined: Result<TaskResult, JoinError>) -> TaskResult {
    match joined {
        Ok(result) => result,
        Err(e) => Err(CompareError::Internal(format!("comparison task failed: {e}"))),
    }
}
