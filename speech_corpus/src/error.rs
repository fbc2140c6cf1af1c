//! Errors raised when a source document does not have the shape an extractor relies on.

use thiserror::Error;

/// A document is missing something an extractor cannot do without, or contains
/// something it cannot interpret. Such a document produces no rows at all.
#[derive(Error, Debug)]
pub enum StructureError {
    #[error("Could not find {0}")]
    MissingAnchor(&'static str),
    #[error("Unexpected document structure: {0}")]
    Unexpected(String),
}

impl StructureError {
    pub fn unexpected(msg:impl Into<String>) -> Self { StructureError::Unexpected(msg.into()) }
}
