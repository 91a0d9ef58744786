//! `search_after` pagination, shared by the dialects that support it.

use crate::document::Document;
use crate::error::{Result, SourceError};
use crate::pager::Pager;
use crate::request::IterateRequest;
use crate::transport::Transport;
use serde_json::{Map, Value};

/// Pages through a sorted search by passing the last hit's sort values
/// back as `search_after`.
pub struct SearchAfterPager {
    transport: Transport,
    request: IterateRequest,
    path: String,
    body: Map<String, Value>,
    search_after: Option<Vec<Value>>,
    pages: u64,
}

impl SearchAfterPager {
    /// `id_field` is the field sorted on when the request is keyed by id.
    pub fn new(
        transport: Transport,
        request: IterateRequest,
        path: String,
        id_field: &str,
    ) -> Self {
        let body = request.search_body(id_field);
        Self {
            transport,
            request,
            path,
            body,
            search_after: None,
            pages: 0,
        }
    }

    /// Add a dialect-specific field to every search body.
    pub fn with_body_field(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key.to_string(), value);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Body of the next search request.
    pub fn request_body(&self) -> Value {
        let mut body = self.body.clone();
        if let Some(after) = &self.search_after {
            body.insert("search_after".to_string(), Value::Array(after.clone()));
        }
        Value::Object(body)
    }
}

#[async_trait::async_trait]
impl Pager for SearchAfterPager {
    async fn fetch_page(&mut self) -> Result<Vec<Document>> {
        let response = self.transport.search(&self.path, &self.request_body()).await?;
        self.pages += 1;

        if self.pages == 1 {
            if let Some(total) = &response.hits.total {
                tracing::debug!("{}: {} matching documents", self.path, total.value());
            }
        }

        let hits = response.hits.hits;
        if let Some(last) = hits.last() {
            let after = last
                .sort
                .clone()
                .filter(|values| !values.is_empty())
                .ok_or_else(|| {
                    SourceError::MalformedDocument(
                        "hit without sort values, cannot page past it".to_string(),
                    )
                })?;
            self.search_after = Some(after);
        }

        hits.into_iter()
            .map(|hit| Document::from_hit(hit, &self.request))
            .collect()
    }
}
