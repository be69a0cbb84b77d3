//! Cooperative cancellation for running scans.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::BulkImportError;
use crate::Result;

/// Shared cancellation flag.
///
/// Clones observe the same flag, so a token handed to a scan can be cancelled
/// from another thread or from inside the consumer callback. Sources check it
/// between items, never in the middle of one.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Return `Err(BulkImportError::Cancelled)` once cancellation has been
    /// requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(BulkImportError::Cancelled)
        } else {
            Ok(())
        }
    }
}
