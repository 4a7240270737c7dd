//! crates/book_catalog_core/src/error.rs
//!
//! Batch-level failures of the Goodreads import. Anything listed here aborts
//! the whole import; row-level problems are absorbed by the importer instead.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The upload has no header row at all.
    #[error("The CSV file has no header row")]
    MissingHeader,

    /// The header row lacks one or more required columns.
    #[error("The CSV file is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The upload could not be read as CSV.
    #[error("The CSV file could not be read: {0}")]
    Unreadable(String),

    /// Loading the working set or pruning failed in the store.
    #[error("Catalog store error during import: {0}")]
    Store(#[from] PortError),
}

impl ImportError {
    /// True for failures caused by the uploaded file rather than the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ImportError::Store(_))
    }
}
