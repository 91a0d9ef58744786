//! In-memory document sources for exercising the comparison engine
//! without a search backend.

use crate::config::EndpointConfig;
use crate::document::{Document, DocumentKey};
use crate::error::{Result, SourceError};
use crate::pager::{paginate, DocumentStream, Pager, SourceTask};
use crate::request::IterateRequest;
use crate::traits::DocumentSource;
use es_version::EsVersion;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

/// Build a document whose id is the key's display form.
///
/// Non-object sources are treated as empty.
pub fn document(key: impl Into<DocumentKey>, source: Value) -> Document {
    let key = key.into();
    let source = match source {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Document::new(key.clone(), key.to_string(), source)
}

/// Serves a fixed list of documents, in the given order, in pages of the
/// request's batch size.
#[derive(Debug, Clone)]
pub struct MemorySource {
    endpoint: EndpointConfig,
    version: EsVersion,
    documents: Vec<Document>,
    failure: Option<(usize, SourceError)>,
}

impl MemorySource {
    pub fn new(name: &str, documents: Vec<Document>) -> Self {
        Self {
            endpoint: EndpointConfig::in_memory(name),
            version: EsVersion {
                number: "0.0.0".to_string(),
                major: 0,
                minor: 0,
                patch: 0,
            },
            documents,
            failure: None,
        }
    }

    /// Fail with `error` instead of serving the page after `pages` pages.
    pub fn failing_after(mut self, pages: usize, error: SourceError) -> Self {
        self.failure = Some((pages, error));
        self
    }
}

impl DocumentSource for MemorySource {
    fn version(&self) -> &EsVersion {
        &self.version
    }

    fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    fn iterate(
        &self,
        cancel: CancellationToken,
        request: IterateRequest,
    ) -> (DocumentStream, SourceTask) {
        let pager = MemoryPager {
            documents: self.documents.clone(),
            batch_size: request.batch_size,
            position: 0,
            pages_served: 0,
            failure: self.failure.clone(),
        };
        let label = self.endpoint.to_string();
        paginate(pager, cancel, request.batch_size, label)
    }
}

struct MemoryPager {
    documents: Vec<Document>,
    batch_size: usize,
    position: usize,
    pages_served: usize,
    failure: Option<(usize, SourceError)>,
}

#[async_trait::async_trait]
impl Pager for MemoryPager {
    async fn fetch_page(&mut self) -> Result<Vec<Document>> {
        if let Some((pages, error)) = &self.failure {
            if self.pages_served == *pages {
                return Err(error.clone());
            }
        }
        let end = (self.position + self.batch_size).min(self.documents.len());
        let page = self.documents[self.position..end].to_vec();
        self.position = end;
        self.pages_served += 1;
        Ok(page)
    }
}
