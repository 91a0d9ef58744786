//! Streaming comparison of two key-ordered document streams.
//!
//! The [`differ`] consumes one [`es_source::DocumentStream`] per endpoint and
//! emits a [`DiffRecord`] for every key that was added, removed, or changed,
//! without ever buffering more than one document per side.
//!
//! ```text
//! source stream ──┐
//!                 ├── differ ──> DiffRecord channel ──> printer
//! dest stream  ───┘
//! ```

mod differ;
mod error;
mod record;

pub use differ::differ;
pub use error::{DifferError, Side};
pub use record::{field_deltas, DiffKind, DiffRecord, FieldDelta};
