//! Elasticsearch 6.x document source.
//!
//! Scans page with `search_after` on typed `/{index}/{type}/_search` paths.

use es_source::search_after::SearchAfterPager;
use es_source::{
    paginate, DocumentSource, DocumentStream, EndpointConfig, EsVersion, IterateRequest,
    SourceTask, Transport,
};
use tokio_util::sync::CancellationToken;

/// Document source for Elasticsearch 6.x servers.
pub struct Es6Source {
    transport: Transport,
    version: EsVersion,
}

impl Es6Source {
    pub fn new(transport: Transport, version: EsVersion) -> Self {
        Self { transport, version }
    }

    /// Pager for one scan of this endpoint.
    pub fn pager(&self, request: IterateRequest) -> SearchAfterPager {
        let path = self.transport.search_path(true);
        SearchAfterPager::new(self.transport.clone(), request, path, "_id")
    }
}

impl DocumentSource for Es6Source {
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
        let pager = self.pager(request);
        tracing::debug!("{label}: scanning {}", pager.path());
        paginate(pager, cancel, capacity, label)
    }
}
