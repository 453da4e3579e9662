//! # workbook-store
//!
//! Snapshot store for a workbook workspace.
//!
//! Open a [`WorkspaceStore`] over a [`Persistence`] backend, then mutate it
//! through its operations. Each successful mutation publishes a new
//! immutable [`Snapshot`] that readers can hold while writes continue.

pub mod config;
pub mod document;
pub mod error;
pub mod persistence;
pub mod snapshot;
pub mod store;

pub use config::{PersistenceMode, StoreConfig};
pub use document::{GroupDocument, PageDocument, WorkspaceDocument};
pub use error::{ConfigError, Entity, PersistenceError, StoreError};
pub use persistence::{FilePersistence, MemoryPersistence, Persistence, SaveOutcome};
pub use snapshot::{PageHit, Snapshot};
pub use store::{GroupPatch, PagePatch, WorkspaceStore};
