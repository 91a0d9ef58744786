//! Ordered document sources over Elasticsearch endpoints.
//!
//! This crate defines the `DocumentSource` trait that abstracts over the
//! search dialects of different Elasticsearch major versions. The `es5-source`,
//! `es6-source` and `es7-source` crates implement it, so the comparison engine
//! only ever sees a uniform, key-ordered stream of [`Document`]s.
//!
//! Dialect crates only describe how to fetch one page (see [`Pager`]); the
//! shared [`paginate`] task turns pages into a bounded, cancellable stream.

mod config;
mod document;
mod error;
mod pager;
mod request;
mod response;
pub mod search_after;
pub mod testing;
mod traits;
mod transport;

pub use config::EndpointConfig;
pub use document::{Document, DocumentKey};
pub use error::SourceError;
pub use es_version::{EsMajorVersion, EsVersion};
pub use pager::{document_channel, paginate, DocumentStream, Pager, SourceEvent, SourceTask};
pub use request::IterateRequest;
pub use response::{SearchHit, SearchHits, SearchResponse, TotalHits};
pub use traits::DocumentSource;
pub use transport::Transport;
