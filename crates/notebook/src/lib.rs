//! # nbhistory notebook model
//!
//! Wire/boundary support for notebook documents as they live on disk.
//!
//! A notebook is JSON: top-level metadata, a format version pair, and an ordered list of
//! cells. This crate parses that JSON into strongly typed values and renders it back so that
//! a parse followed by a render is JSON-equivalent to the input, with two deliberate
//! exceptions:
//!
//! - code cell `outputs` are accepted on input and never rendered, and
//! - fields this model does not know about are dropped.
//!
//! The only field with representation-sensitive round-tripping is a cell's `source`, which
//! may be a single string or a list of strings; see [`Source`].
//!
//! This crate does no I/O. Versioning and artifact layout live in `nbhistory-core`.

pub mod cell;
pub mod document;
pub mod source;

pub use cell::{Cell, CellBase, CellKind, CodeCell, MarkdownCell, RawCell};
pub use document::Notebook;
pub use source::Source;

/// Opaque JSON object used for notebook and cell metadata and for attachments.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Errors returned by the notebook model.
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    /// The input did not match the notebook schema. `path` locates the failing value,
    /// e.g. `cells[2].source`.
    #[error("invalid notebook at {path}: {message}")]
    Parse { path: String, message: String },

    /// A value could not be rendered without breaking the on-disk representation.
    #[error("cannot encode notebook: {0}")]
    Encode(String),
}

/// Type alias for Results that can fail with a [`NotebookError`].
pub type NotebookResult<T> = Result<T, NotebookError>;
