//! Elasticsearch 7.x document source.
//!
//! Mapping types are gone in 7.x, so scans use typeless `/{index}/_search`
//! paths. Total hit counting is disabled since the scan never needs it.

use es_source::search_after::SearchAfterPager;
use es_source::{
    paginate, DocumentSource, DocumentStream, EndpointConfig, EsVersion, IterateRequest,
    SourceTask, Transport,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Document source for Elasticsearch 7.x servers.
pub struct Es7Source {
    transport: Transport,
    version: EsVersion,
}

impl Es7Source {
    pub fn new(transport: Transport, version: EsVersion) -> Self {
        if let Some(doc_type) = transport.endpoint().doc_type() {
            tracing::warn!(
                "Ignoring type '{doc_type}' for {}: v{version} has no mapping types",
                transport.endpoint()
            );
        }
        Self { transport, version }
    }

    /// Pager for one scan of this endpoint.
    pub fn pager(&self, request: IterateRequest) -> SearchAfterPager {
        let path = self.transport.search_path(false);
        SearchAfterPager::new(self.transport.clone(), request, path, "_id")
            .with_body_field("track_total_hits", json!(false))
    }
}

impl DocumentSource for Es7Source {
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
