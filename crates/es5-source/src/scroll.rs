use es_source::{Document, IterateRequest, Pager, SourceError, Transport};
use reqwest::Method;
use serde_json::{json, Value};

/// How long the server keeps a scroll context alive between pages.
pub const SCROLL_KEEP_ALIVE: &str = "1m";

/// Sortable id field on 5.x; `_id` itself is not sortable there.
const ID_FIELD: &str = "_uid";

const SCROLL_PATH: &str = "/_search/scroll";

/// Pages through a sorted scroll context.
pub struct ScrollPager {
    transport: Transport,
    request: IterateRequest,
    scroll_id: Option<String>,
    started: bool,
}

impl ScrollPager {
    pub fn new(transport: Transport, request: IterateRequest) -> Self {
        Self {
            transport,
            request,
            scroll_id: None,
            started: false,
        }
    }

    /// Path and body opening the scroll context.
    pub fn initial_request(&self) -> (String, Value) {
        let path = format!(
            "{}?scroll={SCROLL_KEEP_ALIVE}",
            self.transport.search_path(true)
        );
        (path, Value::Object(self.request.search_body(ID_FIELD)))
    }

    /// Body fetching the page after `scroll_id`.
    pub fn continuation_body(scroll_id: &str) -> Value {
        json!({ "scroll": SCROLL_KEEP_ALIVE, "scroll_id": scroll_id })
    }
}

#[async_trait::async_trait]
impl Pager for ScrollPager {
    async fn fetch_page(&mut self) -> Result<Vec<Document>, SourceError> {
        let response = match (&self.scroll_id, self.started) {
            (None, false) => {
                let (path, body) = self.initial_request();
                let response = self.transport.search(&path, &body).await?;
                if let Some(total) = &response.hits.total {
                    tracing::debug!("{path}: {} matching documents", total.value());
                }
                response
            }
            (Some(scroll_id), _) => {
                self.transport
                    .search(SCROLL_PATH, &Self::continuation_body(scroll_id))
                    .await?
            }
            (None, true) => {
                return Err(SourceError::Decode {
                    url: self.transport.url(SCROLL_PATH),
                    reason: "previous page carried no _scroll_id".to_string(),
                })
            }
        };
        self.started = true;

        if response.scroll_id.is_some() {
            self.scroll_id = response.scroll_id;
        }

        response
            .hits
            .hits
            .into_iter()
            .map(|hit| Document::from_hit(hit, &self.request))
            .collect()
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        if let Some(scroll_id) = self.scroll_id.take() {
            let body = json!({ "scroll_id": [scroll_id] });
            self.transport
                .send_json::<Value>(Method::DELETE, SCROLL_PATH, Some(&body))
                .await?;
        }
        Ok(())
    }
}
