//! Documents and their ordering keys.

use crate::error::{Result, SourceError};
use crate::request::IterateRequest;
use crate::response::SearchHit;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

/// Key a document is ordered and matched by.
///
/// Ordering mirrors an ascending backend sort with missing values first:
/// `Null < Bool < Number < Text`. Numbers compare numerically regardless of
/// their JSON representation, strings compare by bytes.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DocumentKey {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl DocumentKey {
    /// Build a key from a scalar JSON value. Arrays and objects are rejected.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => Ok(Self::Number(n.clone())),
            Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(SourceError::MalformedDocument(format!(
                "sort value {other} is not a scalar"
            ))),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let x = a.as_f64().unwrap_or_default();
    let y = b.as_f64().unwrap_or_default();
    x.total_cmp(&y)
}

impl Ord for DocumentKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => compare_numbers(a, b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for DocumentKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DocumentKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DocumentKey {}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DocumentKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for DocumentKey {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for DocumentKey {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

/// One document read from an index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub key: DocumentKey,
    pub id: String,
    pub source: Map<String, Value>,
}

impl Document {
    pub fn new(key: DocumentKey, id: impl Into<String>, source: Map<String, Value>) -> Self {
        Self {
            key,
            id: id.into(),
            source,
        }
    }

    /// Convert a search hit, deriving its key from the request's sort field.
    ///
    /// The key is the hit's first sort value when present, else the field
    /// looked up in `_source`, else null. Scans sorted by id are keyed by `_id`.
    pub fn from_hit(hit: SearchHit, request: &IterateRequest) -> Result<Self> {
        let id = hit
            .id
            .ok_or_else(|| SourceError::MalformedDocument("hit without _id".to_string()))?;

        let source = match hit.source {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(SourceError::MalformedDocument(format!(
                    "_source of '{id}' is not an object: {other}"
                )))
            }
        };

        let key = if request.sorts_by_document_id() {
            DocumentKey::Text(id.clone())
        } else if let Some(value) = hit.sort.as_ref().and_then(|values| values.first()) {
            DocumentKey::from_value(value)?
        } else {
            match lookup_field(&source, &request.sort_field) {
                Some(value) => DocumentKey::from_value(value)?,
                None => DocumentKey::Null,
            }
        };

        Ok(Self { key, id, source })
    }
}

/// Find a possibly dotted field in a document source.
///
/// A trailing `.keyword` sub-field resolves to its parent field.
fn lookup_field<'a>(source: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    if let Some(value) = source.get(field) {
        return Some(value);
    }
    let mut parts = field.split('.');
    let mut current = source.get(parts.next()?)?;
    for part in parts {
        match current.get(part) {
            Some(next) => current = next,
            None if part == "keyword" => return Some(current),
            None => return None,
        }
    }
    Some(current)
}
