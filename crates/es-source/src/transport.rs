//! HTTP transport shared by the dialect crates.

use crate::config::EndpointConfig;
use crate::error::{Result, SourceError};
use crate::response::SearchResponse;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// JSON-over-HTTP client bound to one endpoint.
#[derive(Clone, Debug)]
pub struct Transport {
    client: Client,
    endpoint: EndpointConfig,
}

impl Transport {
    pub fn new(endpoint: EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SourceError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint.base_url())
    }

    /// Search path for the configured index, with the type segment when
    /// `include_type` is set and a type is configured.
    pub fn search_path(&self, include_type: bool) -> String {
        match (self.endpoint.index(), self.endpoint.doc_type()) {
            (None, _) => "/_search".to_string(),
            (Some(index), Some(doc_type)) if include_type => format!("/{index}/{doc_type}/_search"),
            (Some(index), _) => format!("/{index}/_search"),
        }
    }

    /// Send a request with an optional JSON body and decode the JSON response.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = self.url(path);

        let mut request = self.client.request(method.clone(), &url);
        if self.endpoint.has_credentials() {
            request = request.basic_auth(
                self.endpoint.username().unwrap_or_default(),
                self.endpoint.password(),
            );
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!("{method} {url}");

        let response = request.send().await.map_err(|e| SourceError::Http {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| SourceError::Http {
            url: url.clone(),
            reason: format!("failed to read response body: {e}"),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode {
            url,
            reason: e.to_string(),
        })
    }

    pub async fn search(&self, path: &str, body: &Value) -> Result<SearchResponse> {
        self.send_json(Method::POST, path, Some(body)).await
    }
}
