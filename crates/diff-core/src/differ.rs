//! Streaming sorted-merge comparison of two document streams.

use crate::error::{DifferError, Result, Side};
use crate::record::DiffRecord;
use es_source::{Document, DocumentKey, DocumentStream, SourceError, SourceEvent};
use std::cmp::Ordering;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Read position on one input, enforcing strictly increasing keys.
struct Cursor {
    side: Side,
    stream: DocumentStream,
    previous: Option<DocumentKey>,
    exhausted: bool,
}

impl Cursor {
    fn new(side: Side, stream: DocumentStream) -> Self {
        Self {
            side,
            stream,
            previous: None,
            exhausted: false,
        }
    }

    /// Next document, or `None` once the side is exhausted.
    async fn next(&mut self, cancel: &CancellationToken) -> Result<Option<Document>> {
        if self.exhausted {
            return Ok(None);
        }

        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DifferError::Cancelled),
            event = self.stream.recv() => event,
        };

        match event {
            Some(SourceEvent::Document(doc)) => {
                if let Some(previous) = &self.previous {
                    if doc.key <= *previous {
                        return Err(DifferError::PreconditionViolated {
                            side: self.side,
                            previous: previous.clone(),
                            current: doc.key,
                        });
                    }
                }
                self.previous = Some(doc.key.clone());
                Ok(Some(doc))
            }
            Some(SourceEvent::Exhausted) => {
                self.exhausted = true;
                Ok(None)
            }
            Some(SourceEvent::Failed(error)) => Err(DifferError::Source {
                side: self.side,
                error,
            }),
            // The producer vanished without a terminal event.
            None if cancel.is_cancelled() => Err(DifferError::Cancelled),
            None => Err(DifferError::Source {
                side: self.side,
                error: SourceError::Terminated,
            }),
        }
    }
}

/// Merge-compare two key-ordered streams, sending one record per differing key.
///
/// Keys only in `source` yield [`DiffKind::Removed`](crate::DiffKind::Removed),
/// keys only in `destination` yield [`DiffKind::Added`](crate::DiffKind::Added),
/// keys on both sides with differing fields yield
/// [`DiffKind::Changed`](crate::DiffKind::Changed). Records are sent in key
/// order. On the first error from either input nothing more is sent.
pub async fn differ(
    cancel: CancellationToken,
    source: DocumentStream,
    destination: DocumentStream,
    out: mpsc::Sender<DiffRecord>,
) -> Result<()> {
    let mut source = Cursor::new(Side::Source, source);
    let mut destination = Cursor::new(Side::Destination, destination);

    let mut src = source.next(&cancel).await?;
    let mut dst = destination.next(&cancel).await?;
    let mut compared = 0u64;
    let mut emitted = 0u64;

    loop {
        let (record, advance_src, advance_dst) = match (src.take(), dst.take()) {
            (None, None) => break,
            (Some(s), None) => (Some(DiffRecord::removed(s)), true, false),
            (None, Some(d)) => (Some(DiffRecord::added(d)), false, true),
            (Some(s), Some(d)) => match s.key.cmp(&d.key) {
                Ordering::Less => {
                    dst = Some(d);
                    (Some(DiffRecord::removed(s)), true, false)
                }
                Ordering::Greater => {
                    src = Some(s);
                    (Some(DiffRecord::added(d)), false, true)
                }
                Ordering::Equal => (DiffRecord::compare(s, d), true, true),
            },
        };
        compared += 1;

        if let Some(record) = record {
            emit(&out, &cancel, record).await?;
            emitted += 1;
        }

        if advance_src {
            src = source.next(&cancel).await?;
        }
        if advance_dst {
            dst = destination.next(&cancel).await?;
        }
    }

    tracing::debug!("Differ finished: {compared} keys compared, {emitted} differences");
    Ok(())
}

async fn emit(
    out: &mpsc::Sender<DiffRecord>,
    cancel: &CancellationToken,
    record: DiffRecord,
) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DifferError::Cancelled),
        sent = out.send(record) => sent.map_err(|_| DifferError::Cancelled),
    }
}
