use serde_json::{json, Map, Value};

/// Parameters of one scan over an endpoint.
///
/// Immutable for the lifetime of the scan. `batch_size` bounds the number of
/// documents fetched per round-trip and the capacity of the hand-off channel.
#[derive(Debug, Clone, PartialEq)]
pub struct IterateRequest {
    /// Raw query fragment applied verbatim; `None` means `match_all`.
    pub filter: Option<Value>,
    /// Field used to order the scan and to key documents.
    pub sort_field: String,
    pub batch_size: usize,
}

impl IterateRequest {
    pub fn new(sort_field: impl Into<String>, batch_size: usize) -> Self {
        Self {
            filter: None,
            sort_field: sort_field.into(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn with_filter(mut self, filter: Option<Value>) -> Self {
        self.filter = filter;
        self
    }

    /// Whether documents are keyed by their `_id` rather than a field.
    pub fn sorts_by_document_id(&self) -> bool {
        matches!(self.sort_field.as_str(), "" | "_id" | "_uid")
    }

    pub fn query(&self) -> Value {
        self.filter
            .clone()
            .unwrap_or_else(|| json!({ "match_all": {} }))
    }

    /// Ascending sort clause. `id_field` is the dialect's sortable id field.
    ///
    /// Missing values sort first so that the backend order agrees with
    /// [`crate::DocumentKey`], where null is the smallest key.
    pub fn sort_clause(&self, id_field: &str) -> Value {
        let mut clause = Map::new();
        if self.sorts_by_document_id() {
            clause.insert(id_field.to_string(), json!({ "order": "asc" }));
        } else {
            clause.insert(
                self.sort_field.clone(),
                json!({ "order": "asc", "missing": "_first" }),
            );
        }
        Value::Array(vec![Value::Object(clause)])
    }

    /// Body of the first search request of a scan.
    pub fn search_body(&self, id_field: &str) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("size".to_string(), json!(self.batch_size));
        body.insert("sort".to_string(), self.sort_clause(id_field));
        body.insert("query".to_string(), self.query());
        body
    }
}
