//! Turning paginated search dialects into bounded document streams.

use crate::document::Document;
use crate::error::{Result, SourceError};
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One page-at-a-time view of a scan, implemented by each dialect.
///
/// The pager owns its cursor state (scroll id, `search_after` values) and
/// the iterate request it was created for.
#[async_trait::async_trait]
pub trait Pager: Send {
    /// Fetch the next page. An empty page means the scan is exhausted.
    async fn fetch_page(&mut self) -> Result<Vec<Document>>;

    /// Release any server-side cursor. Called once when the scan stops.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Event delivered on a document stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    Document(Document),
    /// The source failed; no further events follow.
    Failed(SourceError),
    /// Every document was delivered; no further events follow.
    Exhausted,
}

/// Task producing a document stream. Resolves once production stops.
pub type SourceTask = BoxFuture<'static, Result<()>>;

/// Receiving half of a source's bounded hand-off channel.
#[derive(Debug)]
pub struct DocumentStream {
    events: mpsc::Receiver<SourceEvent>,
}

impl DocumentStream {
    /// Wait for the next event. `None` means the producer went away.
    pub async fn recv(&mut self) -> Option<SourceEvent> {
        self.events.recv().await
    }

    /// Number of events buffered and not yet received.
    #[cfg(test)]
    fn buffered(&self) -> usize {
        self.events.len()
    }
}

/// Create a bounded hand-off channel for document events.
pub fn document_channel(capacity: usize) -> (mpsc::Sender<SourceEvent>, DocumentStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, DocumentStream { events: rx })
}

/// Drive `pager` until exhaustion, pushing documents onto a bounded stream.
///
/// The returned task must be spawned by the caller. Every fetch and push is
/// raced against `cancel`. A failure is delivered once on the stream as
/// [`SourceEvent::Failed`] and also returned from the task.
pub fn paginate<P>(
    pager: P,
    cancel: CancellationToken,
    capacity: usize,
    label: impl Into<String>,
) -> (DocumentStream, SourceTask)
where
    P: Pager + 'static,
{
    let (tx, stream) = document_channel(capacity);
    let label = label.into();
    let task = run_pager(pager, tx, cancel, label).boxed();
    (stream, task)
}

async fn run_pager<P: Pager>(
    mut pager: P,
    tx: mpsc::Sender<SourceEvent>,
    cancel: CancellationToken,
    label: String,
) -> Result<()> {
    let outcome = produce(&mut pager, &tx, &cancel, &label).await;

    if !cancel.is_cancelled() {
        let closed = tokio::select! {
            biased;
            _ = cancel.cancelled() => Ok(()),
            closed = pager.close() => closed,
        };
        if let Err(e) = closed {
            warn!("{label}: failed to release scan cursor: {e}");
        }
    }

    match outcome {
        Ok(total) => {
            debug!("{label}: exhausted after {total} documents");
            push(&tx, &cancel, SourceEvent::Exhausted).await
        }
        Err(SourceError::Cancelled) => {
            debug!("{label}: cancelled");
            Err(SourceError::Cancelled)
        }
        Err(e) => {
            debug!("{label}: failed: {e}");
            // The consumer may already be gone; the task result still carries the error.
            let _ = push(&tx, &cancel, SourceEvent::Failed(e.clone())).await;
            Err(e)
        }
    }
}

async fn produce<P: Pager>(
    pager: &mut P,
    tx: &mpsc::Sender<SourceEvent>,
    cancel: &CancellationToken,
    label: &str,
) -> Result<u64> {
    let mut total = 0u64;
    let mut pages = 0u64;
    loop {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SourceError::Cancelled),
            page = pager.fetch_page() => page?,
        };
        pages += 1;

        if page.is_empty() {
            return Ok(total);
        }

        debug!("{label}: page {pages} with {} documents", page.len());

        for doc in page {
            push(tx, cancel, SourceEvent::Document(doc)).await?;
            total += 1;
        }
    }
}

async fn push(
    tx: &mpsc::Sender<SourceEvent>,
    cancel: &CancellationToken,
    event: SourceEvent,
) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SourceError::Cancelled),
        sent = tx.send(event) => sent.map_err(|_| SourceError::Cancelled),
    }
}
