//! File backend: one JSON document per workspace.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   workspaces/                 (mode 0700)
//!     <workspace_id>.json       (mode 0600)
//! ```
//!
//! ## Save protocol
//!
//! 1. Serialize the document (pretty JSON, trailing newline).
//! 2. SHA-256 hash the bytes.
//! 3. Compare with the digest of the last write (or of the file on disk).
//! 4. Skip if identical.
//! 5. Write to `<id>.json.tmp`, `chmod 0600`.
//! 6. Rename to `<id>.json` (atomic on POSIX).
//! 7. Remember the digest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use workbook_core::WorkspaceId;

use super::{Persistence, SaveOutcome};
use crate::document::WorkspaceDocument;
use crate::error::{io_err, PersistenceError};

#[derive(Debug)]
pub struct FilePersistence {
    root: PathBuf,
    digests: Mutex<HashMap<WorkspaceId, String>>,
}

impl FilePersistence {
    /// Backend rooted at `root`; directories are created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            digests: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/workspaces/`
    pub fn workspaces_dir(&self) -> PathBuf {
        self.root.join("workspaces")
    }

    /// `<root>/workspaces/<id>.json`. Pure, no I/O.
    pub fn document_path(&self, id: &WorkspaceId) -> Result<PathBuf, PersistenceError> {
        let name = id.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(PersistenceError::Backend(format!(
                "workspace id '{name}' cannot be used as a file name"
            )));
        }
        Ok(self.workspaces_dir().join(format!("{name}.json")))
    }

    fn ensure_dir(&self) -> Result<PathBuf, PersistenceError> {
        let dir = self.workspaces_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
            set_dir_permissions(&dir)?;
        }
        Ok(dir)
    }

    fn stored_digest(
        &self,
        id: &WorkspaceId,
        path: &Path,
    ) -> Result<Option<String>, PersistenceError> {
        if let Some(digest) = self.digests.lock().get(id) {
            return Ok(Some(digest.clone()));
        }
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
        Ok(Some(digest(&bytes)))
    }
}

fn digest(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

impl Persistence for FilePersistence {
    fn load(&self, id: &WorkspaceId) -> Result<Option<WorkspaceDocument>, PersistenceError> {
        let path = self.document_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
        let document = serde_json::from_slice(&bytes)?;
        self.digests.lock().insert(id.clone(), digest(&bytes));
        Ok(Some(document))
    }

    fn save(&self, document: &WorkspaceDocument) -> Result<SaveOutcome, PersistenceError> {
        let path = self.document_path(&document.id)?;
        let mut json = serde_json::to_string_pretty(document)?;
        json.push('\n');
        let new_digest = digest(json.as_bytes());

        if self.stored_digest(&document.id, &path)?.as_deref() == Some(new_digest.as_str()) {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(SaveOutcome::Unchanged);
        }

        self.ensure_dir()?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
        set_file_permissions(&tmp)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&path, e));
        }

        self.digests.lock().insert(document.id.clone(), new_digest);
        tracing::info!("wrote: {}", path.display());
        Ok(SaveOutcome::Written)
    }

    fn list(&self) -> Result<Vec<WorkspaceId>, PersistenceError> {
        let dir = self.workspaces_dir();
        if !dir.exists() {
            return Ok(vec![]);
        }
        let mut ids: Vec<WorkspaceId> = std::fs::read_dir(&dir)
            .map_err(|e| io_err(&dir, e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                name.strip_suffix(".json").map(WorkspaceId::from)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), PersistenceError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), PersistenceError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), PersistenceError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), PersistenceError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
