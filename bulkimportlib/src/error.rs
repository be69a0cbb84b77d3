//! Error types for bulkimportlib

use thiserror::Error;

/// Errors that can occur while configuring or running an import source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BulkImportError {
    /// A source option is missing or malformed
    #[error("invalid configuration for '{key}': {message}")]
    InvalidConfiguration { key: String, message: String },

    /// A counter was incremented without being pre-registered
    #[error("unknown counter: {0}")]
    UnknownCounter(String),

    /// The scan observed a cancellation request
    #[error("scan cancelled")]
    Cancelled,

    /// An item could not be constructed
    #[error("invalid item '{name}': {message}")]
    InvalidItem { name: String, message: String },

    /// An item references a parent folder that was never emitted
    #[error("item '{item}' references unknown parent folder '{parent}'")]
    UnknownParent { item: String, parent: String },

    /// No source is registered under this name
    #[error("unknown import source: {0}")]
    UnknownSource(String),

    /// A source with this name is already registered
    #[error("import source already registered: {0}")]
    DuplicateSource(String),
}

impl BulkImportError {
    /// True for the routine cancellation outcome, which callers should not
    /// report as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BulkImportError::Cancelled)
    }

    pub(crate) fn invalid_configuration(
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        BulkImportError::InvalidConfiguration {
            key: key.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_item(name: impl Into<String>, message: impl Into<String>) -> Self {
        BulkImportError::InvalidItem {
            name: name.into(),
            message: message.into(),
        }
    }
}
