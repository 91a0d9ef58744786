//! DocumentSource trait definition.

use crate::config::EndpointConfig;
use crate::pager::{DocumentStream, SourceTask};
use crate::request::IterateRequest;
use es_version::EsVersion;
use tokio_util::sync::CancellationToken;

/// An endpoint that can be scanned as a key-ordered document stream.
///
/// Implementations hide the pagination dialect of one Elasticsearch major
/// version. The resolver picks an implementation once per endpoint; nothing
/// downstream branches on the version again.
///
/// # Usage Pattern
///
/// ```ignore
/// let (stream, task) = source.iterate(cancel.clone(), request);
/// tasks.spawn(task);
/// while let Some(event) = stream.recv().await { /* ... */ }
/// ```
pub trait DocumentSource: Send + Sync {
    /// Version reported by the endpoint.
    fn version(&self) -> &EsVersion;

    /// The endpoint being scanned.
    fn endpoint(&self) -> &EndpointConfig;

    /// Start a scan.
    ///
    /// Returns the stream to read documents from and the producing task,
    /// which the caller spawns. Documents arrive in non-decreasing key order.
    fn iterate(
        &self,
        cancel: CancellationToken,
        request: IterateRequest,
    ) -> (DocumentStream, SourceTask);
}
