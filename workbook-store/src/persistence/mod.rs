//! Persistence strategies.
//!
//! The store commits in memory first and then hands the flattened
//! [`WorkspaceDocument`] to a [`Persistence`] backend. Backends are keyed by
//! workspace id and never see partially built snapshots.

mod file;
mod memory;

pub use file::FilePersistence;
pub use memory::MemoryPersistence;

use workbook_core::WorkspaceId;

use crate::document::WorkspaceDocument;
use crate::error::PersistenceError;

/// Outcome of a single save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The document was written.
    Written,
    /// The stored document already had identical content.
    Unchanged,
}

/// A durable home for workspace documents.
pub trait Persistence: Send + Sync {
    /// Load the document for `id`, or `None` if it was never saved.
    fn load(&self, id: &WorkspaceId) -> Result<Option<WorkspaceDocument>, PersistenceError>;

    /// Replace the stored document for `document.id`.
    fn save(&self, document: &WorkspaceDocument) -> Result<SaveOutcome, PersistenceError>;

    /// Ids of every stored workspace, sorted.
    fn list(&self) -> Result<Vec<WorkspaceId>, PersistenceError>;
}
