//! Diff records and field-level deltas.

use es_source::{Document, DocumentKey};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Outcome of comparing one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Present in the destination only.
    Added,
    /// Present in the source only.
    Removed,
    /// Present on both sides with at least one differing field.
    Changed,
}

impl std::fmt::Display for DiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "Added"),
            Self::Removed => write!(f, "Removed"),
            Self::Changed => write!(f, "Changed"),
        }
    }
}

/// One differing field. `None` means the field is absent on that side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDelta {
    pub field: String,
    pub source: Option<Value>,
    pub destination: Option<Value>,
}

/// One emitted comparison outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffRecord {
    pub key: DocumentKey,
    pub kind: DiffKind,
    pub source: Option<Document>,
    pub destination: Option<Document>,
    pub deltas: Vec<FieldDelta>,
}

impl DiffRecord {
    pub fn removed(source: Document) -> Self {
        Self {
            key: source.key.clone(),
            kind: DiffKind::Removed,
            source: Some(source),
            destination: None,
            deltas: vec![],
        }
    }

    pub fn added(destination: Document) -> Self {
        Self {
            key: destination.key.clone(),
            kind: DiffKind::Added,
            source: None,
            destination: Some(destination),
            deltas: vec![],
        }
    }

    /// Compare two documents sharing a key. `None` when every field matches.
    pub fn compare(source: Document, destination: Document) -> Option<Self> {
        let deltas = field_deltas(&source.source, &destination.source);
        if deltas.is_empty() {
            return None;
        }
        Some(Self {
            key: source.key.clone(),
            kind: DiffKind::Changed,
            source: Some(source),
            destination: Some(destination),
            deltas,
        })
    }
}

/// Every top-level field whose value differs, ordered by field name.
///
/// A field missing on one side differs from any present value, `null` included.
pub fn field_deltas(
    source: &Map<String, Value>,
    destination: &Map<String, Value>,
) -> Vec<FieldDelta> {
    let fields: BTreeSet<&String> = source.keys().chain(destination.keys()).collect();
    fields
        .into_iter()
        .filter_map(|field| {
            let src = source.get(field);
            let dst = destination.get(field);
            (src != dst).then(|| FieldDelta {
                field: field.clone(),
                source: src.cloned(),
                destination: dst.cloned(),
            })
        })
        .collect()
}
