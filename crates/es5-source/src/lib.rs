//! Elasticsearch 5.x document source.
//!
//! 5.x has no `search_after`-friendly id field, so scans use the scroll API
//! sorted on `_uid`, with typed `/{index}/{type}/_search` paths.

mod scroll;

use es_source::{
    paginate, DocumentSource, DocumentStream, EndpointConfig, EsVersion, IterateRequest,
    SourceTask, Transport,
};
use tokio_util::sync::CancellationToken;

pub use scroll::{ScrollPager, SCROLL_KEEP_ALIVE};

/// Document source for Elasticsearch 5.x servers.
pub struct Es5Source {
    transport: Transport,
    version: EsVersion,
}

impl Es5Source {
    pub fn new(transport: Transport, version: EsVersion) -> Self {
        Self { transport, version }
    }
}

impl DocumentSource for Es5Source {
    fn version(&self) -> &EsVersion {
        &self.version
    }

    fn endpoint(&self) -> &EndpointConfig {
        self.transport.endpoint()
    }

    fn iterate(
        &self,
        cancel: CancellationToken,
        request: IterateRequest,
    ) -> (DocumentStream, SourceTask) {
        let capacity = request.batch_size;
        let label = format!("{} (v{})", self.transport.endpoint(), self.version);
        let pager = ScrollPager::new(self.transport.clone(), request);
        paginate(pager, cancel, capacity, label)
    }
}
