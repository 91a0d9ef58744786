//! es-diff library
//!
//! Compares two Elasticsearch endpoints document by document and reports
//! every document that was added, removed, or changed.
//!
//! # Supported servers
//!
//! Each endpoint is probed once for its version and served by a dedicated
//! source crate:
//!
//! - `es5_source` - Elasticsearch 5.x, scroll API sorted by `_uid`
//! - `es6_source` - Elasticsearch 6.x, `search_after` on typed paths
//! - `es7_source` - Elasticsearch 7.x, `search_after` on typeless paths
//!
//! The two sides may run different major versions. Both are streamed in
//! ascending key order and merged by `diff_core::differ`, so memory use is
//! bounded by the batch size, not the index size.
//!
//! # CLI Usage
//!
//! ```bash
//! # Compare an index across clusters
//! es-diff http://localhost:19200/index01/tweet http://localhost:29200/index01
//!
//! # Match on a field instead of _id, filtering both sides
//! es-diff --sort name.keyword \
//!   --sf '{"term":{"user":"olivere"}}' \
//!   --df '{"term":{"name.keyword":"Oliver"}}' \
//!   http://localhost:19200/index01 http://localhost:29200/index01
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod printer;
pub mod resolver;

pub use config::{CompareConfig, CompareOpts};
pub use error::CompareError;
pub use orchestrator::{compare_sources, run_comparison, CompareSummary};
pub use printer::{printer_for, JsonPrinter, OutputFormat, Printer, TextPrinter};
pub use resolver::resolve;
