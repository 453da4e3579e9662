//! [`WorkspaceStore`], the mutation and query engine.
//!
//! # Protocol
//!
//! Every mutation runs the same steps under the writer lock:
//!
//! 1. Read the committed snapshot (no workspace → silent no-op).
//! 2. Resolve the target group/page, failing with `NotFound`.
//! 3. Validate any payload through the template registry.
//! 4. Build the next snapshot, replacing only the touched rows.
//! 5. Publish it as the committed version.
//! 6. Save it through the injected [`Persistence`].
//!
//! Steps 2–4 work on a private clone, so a failure leaves the committed
//! snapshot untouched. Readers take an `Arc` of the committed snapshot and
//! are never blocked by steps 2–6 of an in-flight write.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;

use workbook_core::types::normalize_name;
use workbook_core::{
    validate, Group, GroupId, GroupPreset, Page, PageId, TemplateData, TemplateKind,
    WorkspaceId, WorkspaceInfo,
};

use crate::config::StoreConfig;
use crate::document::WorkspaceDocument;
use crate::error::{Entity, PersistenceError, StoreError};
use crate::persistence::{Persistence, SaveOutcome};
use crate::snapshot::{PageHit, Snapshot};

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Partial update of a group's own fields.
///
/// `None` leaves a field alone; a blank `name` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
    pub expanded: Option<bool>,
    pub favorite: Option<bool>,
}

impl GroupPatch {
    /// Apply to `group`, returning whether anything changed.
    fn apply(self, group: &mut Group) -> bool {
        let before = group.clone();
        if let Some(name) = self.name.as_deref().and_then(normalize_name) {
            group.name = name;
        }
        if let Some(icon) = self.icon {
            group.icon = icon;
        }
        if let Some(expanded) = self.expanded {
            group.expanded = expanded;
        }
        if let Some(favorite) = self.favorite {
            group.favorite = favorite;
        }
        *group != before
    }
}

/// Partial update of a page.
///
/// Changing `kind` without `data` resets the payload to the new kind's
/// default; `data` is validated against the resulting kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePatch {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
    pub favorite: Option<bool>,
    pub kind: Option<TemplateKind>,
    pub data: Option<Value>,
}

impl PagePatch {
    fn apply(self, page: &mut Page) -> Result<bool, StoreError> {
        let kind = self.kind.unwrap_or_else(|| page.kind());
        let data = match self.data {
            Some(raw) => Some(validate(kind, raw)?),
            None if kind != page.kind() => Some(TemplateData::default_for(kind)),
            None => None,
        };

        let before = page.clone();
        if let Some(name) = self.name.as_deref().and_then(normalize_name) {
            page.name = name;
        }
        if let Some(icon) = self.icon {
            page.icon = icon;
        }
        if let Some(favorite) = self.favorite {
            page.favorite = favorite;
        }
        if let Some(data) = data {
            if *page.data != data {
                page.data = Arc::new(data);
            }
        }
        Ok(*page != before)
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct WriterState {
    /// Version of the last commit whose save failed, if not yet flushed.
    unpersisted: Option<u64>,
}

/// Owner of one workspace session.
///
/// Starts `Uninitialized`; [`initialize_workspace`](Self::initialize_workspace)
/// or [`open`](Self::open) moves it to `Ready`. Mutations are serialized;
/// queries read the most recently committed snapshot.
pub struct WorkspaceStore {
    state: watch::Sender<Option<Arc<Snapshot>>>,
    writer: Mutex<WriterState>,
    persistence: Arc<dyn Persistence>,
    seed_presets: Vec<GroupPreset>,
}

impl WorkspaceStore {
    /// An uninitialized store writing through `persistence`.
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state,
            writer: Mutex::new(WriterState::default()),
            persistence,
            seed_presets: Vec::new(),
        }
    }

    /// Groups created by [`initialize_workspace`](Self::initialize_workspace).
    pub fn with_seed_presets(mut self, presets: impl IntoIterator<Item = GroupPreset>) -> Self {
        self.seed_presets = presets.into_iter().collect();
        self
    }

    /// An uninitialized store built from `config`.
    pub fn from_config_at(config: &StoreConfig, home: &Path) -> Self {
        Self::new(config.persistence_at(home))
            .with_seed_presets(config.seed_presets.iter().copied())
    }

    /// Load a stored workspace and enter `Ready`.
    ///
    /// Every page payload is validated against its kind; a document that
    /// fails validation is refused as a whole.
    pub fn open(persistence: Arc<dyn Persistence>, id: &WorkspaceId) -> Result<Self, StoreError> {
        let document = persistence
            .load(id)
            .map_err(StoreError::Load)?
            .ok_or_else(|| StoreError::not_found(Entity::Workspace, id))?;
        let mut snapshot = document.into_snapshot()?;
        snapshot.set_version(1);
        tracing::info!(
            workspace = %id,
            groups = snapshot.group_count(),
            pages = snapshot.page_count(),
            "opened workspace"
        );
        let store = Self::new(persistence);
        store.state.send_replace(Some(Arc::new(snapshot)));
        Ok(store)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The committed snapshot, or `None` while uninitialized.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.borrow().clone()
    }

    /// Receiver that observes every committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.state.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        self.snapshot().map(|s| s.info().id.clone())
    }

    pub fn get_group(&self, id: &GroupId) -> Option<Group> {
        self.snapshot()?.group(id).cloned()
    }

    pub fn get_page(&self, group_id: &GroupId, page_id: &PageId) -> Option<Page> {
        self.snapshot()?.page(group_id, page_id).cloned()
    }

    /// Pages of a group in position order.
    pub fn get_pages(&self, group_id: &GroupId) -> Vec<Page> {
        let Some(snapshot) = self.snapshot() else {
            return Vec::new();
        };
        let pages = snapshot.pages(group_id).cloned().collect();
        pages
    }

    pub fn favorite_pages(&self) -> Vec<PageHit> {
        self.snapshot()
            .map(|s| s.favorite_pages())
            .unwrap_or_default()
    }

    /// Case-insensitive substring search over page and group names.
    /// A blank query returns nothing.
    pub fn search_pages(&self, query: &str) -> Vec<PageHit> {
        self.snapshot()
            .map(|s| s.search(query))
            .unwrap_or_default()
    }

    pub fn current_page(&self) -> Option<PageHit> {
        self.snapshot()?.current_page()
    }

    /// `true` when the last commit has not reached durable storage.
    pub fn is_dirty(&self) -> bool {
        self.writer.lock().unpersisted.is_some()
    }

    /// Save the committed snapshot again, e.g. after a
    /// [`StoreError::Persistence`]. `None` while uninitialized.
    pub fn flush(&self) -> Result<Option<SaveOutcome>, StoreError> {
        let mut writer = self.writer.lock();
        match self.snapshot() {
            Some(snapshot) => self.persist(&mut writer, &snapshot).map(Some),
            None => Ok(None),
        }
    }

    // -----------------------------------------------------------------------
    // Workspace
    // -----------------------------------------------------------------------

    /// Create the workspace and enter `Ready`.
    ///
    /// Idempotent: once ready, returns the existing id unchanged. A blank
    /// name or owner is a validation error.
    pub fn initialize_workspace(
        &self,
        name: &str,
        owner_id: &str,
    ) -> Result<WorkspaceId, StoreError> {
        let mut writer = self.writer.lock();
        if let Some(current) = self.snapshot() {
            return Ok(current.info().id.clone());
        }

        let info = WorkspaceInfo::new(name, owner_id)?;
        let id = info.id.clone();
        let mut snapshot = Snapshot::new(info);
        for preset in &self.seed_presets {
            let (group, pages) = preset.instantiate();
            snapshot.push_group(group, pages);
        }
        snapshot.set_version(1);

        let snapshot = Arc::new(snapshot);
        self.state.send_replace(Some(Arc::clone(&snapshot)));
        tracing::info!(workspace = %id, owner = owner_id, "initialized workspace");
        self.persist(&mut writer, &snapshot)?;
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// Append an empty group. `None` if absorbed (blank name, no workspace).
    pub fn add_group(&self, name: &str) -> Result<Option<GroupId>, StoreError> {
        let Some(name) = normalize_name(name) else {
            return Ok(None);
        };
        self.apply("add_group", |snap| {
            let group = Group::new(name);
            let id = group.id.clone();
            snap.push_group(group, vec![]);
            Ok(Some(id))
        })
    }

    /// Append a group pre-populated from `preset`.
    pub fn add_group_from_preset(
        &self,
        preset: GroupPreset,
    ) -> Result<Option<GroupId>, StoreError> {
        self.apply("add_group_from_preset", |snap| {
            let (group, pages) = preset.instantiate();
            let id = group.id.clone();
            snap.push_group(group, pages);
            Ok(Some(id))
        })
    }

    pub fn update_group(&self, id: &GroupId, patch: GroupPatch) -> Result<(), StoreError> {
        self.edit_group("update_group", id, |group| patch.apply(group))
    }

    /// Rename a group; a blank name is ignored.
    pub fn rename_group(&self, id: &GroupId, name: &str) -> Result<(), StoreError> {
        let patch = GroupPatch {
            name: Some(name.to_owned()),
            ..GroupPatch::default()
        };
        self.edit_group("rename_group", id, |group| patch.apply(group))
    }

    pub fn toggle_group_expanded(&self, id: &GroupId) -> Result<(), StoreError> {
        self.edit_group("toggle_group_expanded", id, |group| {
            group.expanded = !group.expanded;
            true
        })
    }

    pub fn toggle_group_favorite(&self, id: &GroupId) -> Result<(), StoreError> {
        self.edit_group("toggle_group_favorite", id, |group| {
            group.favorite = !group.favorite;
            true
        })
    }

    /// Remove a group and all of its pages.
    pub fn delete_group(&self, id: &GroupId) -> Result<(), StoreError> {
        self.apply("delete_group", |snap| {
            snap.resolve_group(id)?;
            snap.remove_group(id);
            Ok(Some(()))
        })
        .map(drop)
    }

    /// Move the group at `start` to `end`, shifting the groups between.
    pub fn reorder_groups(&self, start: usize, end: usize) -> Result<(), StoreError> {
        self.apply("reorder_groups", |snap| {
            let len = snap.group_count();
            check_index(start, len)?;
            check_index(end, len)?;
            if start == end {
                return Ok(None);
            }
            snap.move_group(start, end);
            Ok(Some(()))
        })
        .map(drop)
    }

    // -----------------------------------------------------------------------
    // Pages
    // -----------------------------------------------------------------------

    /// Append a page with the default payload for `kind`.
    pub fn add_page(
        &self,
        group_id: &GroupId,
        name: &str,
        kind: TemplateKind,
    ) -> Result<Option<PageId>, StoreError> {
        self.apply("add_page", |snap| {
            let mut group = snap.resolve_group(group_id)?.clone();
            let Some(name) = normalize_name(name) else {
                return Ok(None);
            };
            let page = Page::new(group_id.clone(), name, kind, group.len());
            let id = page.id.clone();
            group.page_ids.push_back(id.clone());
            group.touch();
            snap.put_group(group);
            snap.put_page(page);
            Ok(Some(id))
        })
    }

    pub fn update_page(
        &self,
        group_id: &GroupId,
        page_id: &PageId,
        patch: PagePatch,
    ) -> Result<(), StoreError> {
        self.edit_page("update_page", group_id, page_id, |page| patch.apply(page))
    }

    /// Rename a page; a blank name is ignored.
    pub fn rename_page(
        &self,
        group_id: &GroupId,
        page_id: &PageId,
        name: &str,
    ) -> Result<(), StoreError> {
        let patch = PagePatch {
            name: Some(name.to_owned()),
            ..PagePatch::default()
        };
        self.edit_page("rename_page", group_id, page_id, |page| patch.apply(page))
    }

    pub fn toggle_page_favorite(
        &self,
        group_id: &GroupId,
        page_id: &PageId,
    ) -> Result<(), StoreError> {
        self.edit_page("toggle_page_favorite", group_id, page_id, |page| {
            page.favorite = !page.favorite;
            Ok(true)
        })
    }

    /// Replace a page's payload after validating it against the page's kind.
    /// On failure nothing is written.
    pub fn update_page_data(
        &self,
        group_id: &GroupId,
        page_id: &PageId,
        data: Value,
    ) -> Result<(), StoreError> {
        self.edit_page("update_page_data", group_id, page_id, |page| {
            let data = validate(page.kind(), data)?;
            if *page.data == data {
                return Ok(false);
            }
            page.data = Arc::new(data);
            Ok(true)
        })
    }

    /// Remove a page and close the gap in its group's positions.
    pub fn delete_page(&self, group_id: &GroupId, page_id: &PageId) -> Result<(), StoreError> {
        self.apply("delete_page", |snap| {
            snap.resolve_page(group_id, page_id)?;
            let mut group = snap.resolve_group(group_id)?.clone();
            if let Some(index) = group.index_of(page_id) {
                group.page_ids.remove(index);
            }
            group.touch();
            snap.put_group(group);
            snap.remove_page(page_id);
            snap.renumber(group_id);
            Ok(Some(()))
        })
        .map(drop)
    }

    /// Move a page to the end of another group.
    ///
    /// The source group's positions are compacted. Moving within the same
    /// group is a no-op that keeps the page's position.
    pub fn move_page(
        &self,
        from: &GroupId,
        to: &GroupId,
        page_id: &PageId,
    ) -> Result<(), StoreError> {
        self.apply("move_page", |snap| {
            let mut page = snap.resolve_page(from, page_id)?.clone();
            let mut dest = snap.resolve_group(to)?.clone();
            if from == to {
                return Ok(None);
            }
            let mut source = snap.resolve_group(from)?.clone();
            if let Some(index) = source.index_of(page_id) {
                source.page_ids.remove(index);
            }
            source.touch();

            page.group_id = to.clone();
            page.position = dest.len();
            page.touch();
            dest.page_ids.push_back(page_id.clone());
            dest.touch();

            snap.put_group(source);
            snap.put_group(dest);
            snap.put_page(page);
            snap.renumber(from);
            snap.follow_page(page_id, to);
            Ok(Some(()))
        })
        .map(drop)
    }

    /// Move the page at `start` to `end` within one group and re-rank.
    pub fn reorder_pages(
        &self,
        group_id: &GroupId,
        start: usize,
        end: usize,
    ) -> Result<(), StoreError> {
        self.apply("reorder_pages", |snap| {
            let mut group = snap.resolve_group(group_id)?.clone();
            let len = group.len();
            check_index(start, len)?;
            check_index(end, len)?;
            if start == end {
                return Ok(None);
            }
            let id = group.page_ids.remove(start);
            group.page_ids.insert(end, id);
            group.touch();
            snap.put_group(group);
            snap.renumber(group_id);
            Ok(Some(()))
        })
        .map(drop)
    }

    /// Record the session's selected page.
    pub fn set_current_page(&self, group_id: &GroupId, page_id: &PageId) -> Result<(), StoreError> {
        self.apply("set_current_page", |snap| {
            snap.resolve_page(group_id, page_id)?;
            let already = snap
                .current_page()
                .is_some_and(|hit| &hit.group.id == group_id && &hit.page.id == page_id);
            if already {
                return Ok(None);
            }
            snap.set_current(group_id.clone(), page_id.clone());
            Ok(Some(()))
        })
        .map(drop)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn edit_group(
        &self,
        op: &'static str,
        id: &GroupId,
        edit: impl FnOnce(&mut Group) -> bool,
    ) -> Result<(), StoreError> {
        self.apply(op, |snap| {
            let mut group = snap.resolve_group(id)?.clone();
            if !edit(&mut group) {
                return Ok(None);
            }
            group.touch();
            snap.put_group(group);
            Ok(Some(()))
        })
        .map(drop)
    }

    fn edit_page(
        &self,
        op: &'static str,
        group_id: &GroupId,
        page_id: &PageId,
        edit: impl FnOnce(&mut Page) -> Result<bool, StoreError>,
    ) -> Result<(), StoreError> {
        self.apply(op, |snap| {
            let mut page = snap.resolve_page(group_id, page_id)?.clone();
            if !edit(&mut page)? {
                return Ok(None);
            }
            page.touch();
            snap.put_page(page);
            Ok(Some(()))
        })
        .map(drop)
    }

    /// Run one mutation through the commit protocol.
    ///
    /// `build` edits a private copy of the committed snapshot and returns
    /// `Ok(None)` when there is nothing to commit.
    fn apply<T>(
        &self,
        op: &'static str,
        build: impl FnOnce(&mut Snapshot) -> Result<Option<T>, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let mut writer = self.writer.lock();
        let Some(current) = self.snapshot() else {
            tracing::debug!(op, "no workspace; ignoring");
            return Ok(None);
        };

        let mut next = Snapshot::clone(&current);
        let Some(value) = build(&mut next)? else {
            tracing::trace!(op, "nothing to commit");
            return Ok(None);
        };
        next.set_version(current.version() + 1);
        debug_assert_eq!(next.verify(), Ok(()), "{op} broke a tree invariant");

        let next = Arc::new(next);
        self.state.send_replace(Some(Arc::clone(&next)));
        tracing::debug!(op, version = next.version(), "committed");

        self.persist(&mut writer, &next)?;
        Ok(Some(value))
    }

    fn persist(
        &self,
        writer: &mut WriterState,
        snapshot: &Snapshot,
    ) -> Result<SaveOutcome, StoreError> {
        let version = snapshot.version();
        let saved = WorkspaceDocument::from_snapshot(snapshot)
            .map_err(PersistenceError::from)
            .and_then(|document| self.persistence.save(&document));
        match saved {
            Ok(outcome) => {
                writer.unpersisted = None;
                tracing::trace!(version, ?outcome, "persisted");
                Ok(outcome)
            }
            Err(source) => {
                writer.unpersisted = Some(version);
                tracing::warn!(
                    version,
                    error = %source,
                    "persisting snapshot failed; in-memory commit kept"
                );
                Err(StoreError::Persistence { version, source })
            }
        }
    }
}

fn check_index(index: usize, len: usize) -> Result<(), StoreError> {
    if index >= len {
        return Err(StoreError::OutOfRange { index, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryPersistence;
    use serde_json::json;

    fn ready() -> (WorkspaceStore, GroupId) {
        let store = WorkspaceStore::new(Arc::new(MemoryPersistence::new()));
        store.initialize_workspace("W", "u1").expect("init");
        let group = store.add_group("Tasks").expect("add_group").expect("group id");
        (store, group)
    }

    #[test]
    fn uninitialized_mutations_are_noops() {
        let store = WorkspaceStore::new(Arc::new(MemoryPersistence::new()));
        let g = GroupId::from("g");
        let p = PageId::from("p");
        assert_eq!(store.add_group("X").expect("add_group"), None);
        assert_eq!(store.add_page(&g, "P", TemplateKind::Tasks).expect("add_page"), None);
        store.rename_group(&g, "Y").expect("rename");
        store.delete_page(&g, &p).expect("delete");
        store.reorder_groups(0, 5).expect("reorder");
        store.update_page_data(&g, &p, json!(null)).expect("data");
        assert!(!store.is_ready());
        assert!(store.snapshot().is_none());
        assert!(store.search_pages("x").is_empty());
    }

    #[test]
    fn blank_names_are_absorbed() {
        let (store, g) = ready();
        let version = store.snapshot().expect("snapshot").version();
        assert_eq!(store.add_group("   ").expect("add_group"), None);
        assert_eq!(store.add_page(&g, "\t", TemplateKind::Generic).expect("add_page"), None);
        store.rename_group(&g, "").expect("rename");
        assert_eq!(store.snapshot().expect("snapshot").version(), version);
        assert_eq!(store.get_group(&g).expect("group").name, "Tasks");
    }

    #[test]
    fn rename_trims_whitespace() {
        let (store, g) = ready();
        store.rename_group(&g, "  Chores  ").expect("rename");
        assert_eq!(store.get_group(&g).expect("group").name, "Chores");
    }

    #[test]
    fn group_patch_applies_fields_and_ignores_blank_name() {
        let (store, g) = ready();
        store
            .update_group(
                &g,
                GroupPatch {
                    name: Some(" ".into()),
                    icon: Some(Some("📝".into())),
                    expanded: Some(false),
                    favorite: Some(true),
                },
            )
            .expect("update_group");
        let group = store.get_group(&g).expect("group");
        assert_eq!(group.name, "Tasks");
        assert_eq!(group.icon.as_deref(), Some("📝"));
        assert!(!group.expanded);
        assert!(group.favorite);
    }

    #[test]
    fn empty_patch_commits_nothing() {
        let (store, g) = ready();
        let before = store.snapshot().expect("snapshot");
        store.update_group(&g, GroupPatch::default()).expect("update_group");
        assert!(Arc::ptr_eq(&before, &store.snapshot().expect("snapshot")));
    }

    #[test]
    fn page_patch_kind_change_resets_payload() {
        let (store, g) = ready();
        let p = store.add_page(&g, "Today", TemplateKind::Tasks).expect("add_page").expect("id");
        store
            .update_page_data(
                &g,
                &p,
                json!({"tasks": [{"id": "t", "title": "x", "completed": false}]}),
            )
            .expect("data");
        store
            .update_page(
                &g,
                &p,
                PagePatch {
                    kind: Some(TemplateKind::Kanban),
                    ..PagePatch::default()
                },
            )
            .expect("update_page");
        let page = store.get_page(&g, &p).expect("page");
        assert_eq!(page.kind(), TemplateKind::Kanban);
        assert_eq!(*page.data, TemplateData::default_for(TemplateKind::Kanban));
    }

    #[test]
    fn page_patch_validates_data_against_new_kind() {
        let (store, g) = ready();
        let p = store.add_page(&g, "Today", TemplateKind::Tasks).expect("add_page").expect("id");
        let err = store
            .update_page(
                &g,
                &p,
                PagePatch {
                    name: Some("Renamed".into()),
                    kind: Some(TemplateKind::Budget),
                    data: Some(json!({"tasks": []})),
                    ..PagePatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "got: {err}");
        let page = store.get_page(&g, &p).expect("page");
        assert_eq!(page.name, "Today", "whole patch is rejected");
        assert_eq!(page.kind(), TemplateKind::Tasks);
    }

    #[test]
    fn versions_increase_per_commit() {
        let (store, g) = ready();
        let v1 = store.snapshot().expect("snapshot").version();
        store.toggle_group_favorite(&g).expect("toggle");
        let v2 = store.snapshot().expect("snapshot").version();
        assert_eq!(v2, v1 + 1);
    }

    #[test]
    fn set_current_page_and_delete_clears_it() {
        let (store, g) = ready();
        let p = store.add_page(&g, "Today", TemplateKind::Tasks).expect("add_page").expect("id");
        store.set_current_page(&g, &p).expect("set_current_page");
        assert_eq!(store.current_page().map(|h| h.page.id), Some(p.clone()));
        store.delete_page(&g, &p).expect("delete_page");
        assert!(store.current_page().is_none());
    }

    #[test]
    fn check_index_bounds() {
        assert!(check_index(0, 1).is_ok());
        assert!(matches!(check_index(1, 1), Err(StoreError::OutOfRange { index: 1, len: 1 })));
    }
}
