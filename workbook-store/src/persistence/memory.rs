//! In-memory backend for tests and throwaway sessions.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use workbook_core::WorkspaceId;

use super::{Persistence, SaveOutcome};
use crate::document::WorkspaceDocument;
use crate::error::PersistenceError;

#[derive(Debug, Default)]
pub struct MemoryPersistence {
    documents: RwLock<BTreeMap<WorkspaceId, WorkspaceDocument>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self, id: &WorkspaceId) -> Result<Option<WorkspaceDocument>, PersistenceError> {
        Ok(self.documents.read().get(id).cloned())
    }

    fn save(&self, document: &WorkspaceDocument) -> Result<SaveOutcome, PersistenceError> {
        let mut documents = self.documents.write();
        if documents.get(&document.id) == Some(document) {
            return Ok(SaveOutcome::Unchanged);
        }
        documents.insert(document.id.clone(), document.clone());
        Ok(SaveOutcome::Written)
    }

    fn list(&self) -> Result<Vec<WorkspaceId>, PersistenceError> {
        Ok(self.documents.read().keys().cloned().collect())
    }
}
