//! Immutable workspace snapshots.
//!
//! A [`Snapshot`] is an arena: groups and pages sit in flat `im` maps keyed
//! by id, with the display order kept as id vectors. Cloning a snapshot is
//! O(1) and a mutation rewrites only the rows it touches, so every committed
//! version can be shared with readers while the next one is being built.

use im::{HashMap, Vector};

use workbook_core::{Group, GroupId, Page, PageId, WorkspaceInfo};

use crate::error::{Entity, StoreError};

/// A `(Group, Page)` pair returned by projections.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHit {
    pub group: Group,
    pub page: Page,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    info: WorkspaceInfo,
    group_order: Vector<GroupId>,
    groups: HashMap<GroupId, Group>,
    pages: HashMap<PageId, Page>,
    current: Option<(GroupId, PageId)>,
}

impl Snapshot {
    /// Empty workspace at version 0.
    pub fn new(info: WorkspaceInfo) -> Self {
        Self {
            version: 0,
            info,
            group_order: Vector::new(),
            groups: HashMap::new(),
            pages: HashMap::new(),
            current: None,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Commit counter; strictly increasing across the store's lifetime.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn info(&self) -> &WorkspaceInfo {
        &self.info
    }

    pub fn group_count(&self) -> usize {
        self.group_order.len()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Groups in display order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.group_order.iter().filter_map(|id| self.groups.get(id))
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn group_index(&self, id: &GroupId) -> Option<usize> {
        self.group_order.index_of(id)
    }

    /// Pages of `group_id` in position order; empty if the group is unknown.
    pub fn pages<'a>(&'a self, group_id: &GroupId) -> impl Iterator<Item = &'a Page> + 'a {
        self.groups
            .get(group_id)
            .into_iter()
            .flat_map(move |g| g.page_ids.iter().filter_map(move |id| self.pages.get(id)))
    }

    /// The page `page_id`, provided it belongs to `group_id`.
    pub fn page(&self, group_id: &GroupId, page_id: &PageId) -> Option<&Page> {
        self.pages
            .get(page_id)
            .filter(|page| &page.group_id == group_id)
    }

    /// The session's selected page, while it still resolves.
    pub fn current_page(&self) -> Option<PageHit> {
        let (group_id, page_id) = self.current.as_ref()?;
        self.hit(group_id, page_id)
    }

    /// Every favorite page, in tree order.
    pub fn favorite_pages(&self) -> Vec<PageHit> {
        self.walk(|_, page| page.favorite)
    }

    /// Case-insensitive substring match on page and group names.
    ///
    /// A blank query matches nothing. A group whose name matches contributes
    /// all of its pages.
    pub fn search(&self, query: &str) -> Vec<PageHit> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.walk(|group, page| {
            group.name.to_lowercase().contains(&needle)
                || page.name.to_lowercase().contains(&needle)
        })
    }

    fn walk(&self, mut keep: impl FnMut(&Group, &Page) -> bool) -> Vec<PageHit> {
        let mut hits = Vec::new();
        for group in self.groups() {
            for page in self.pages(&group.id) {
                if keep(group, page) {
                    hits.push(PageHit {
                        group: group.clone(),
                        page: page.clone(),
                    });
                }
            }
        }
        hits
    }

    fn hit(&self, group_id: &GroupId, page_id: &PageId) -> Option<PageHit> {
        Some(PageHit {
            group: self.group(group_id)?.clone(),
            page: self.page(group_id, page_id)?.clone(),
        })
    }

    /// Check the structural invariants of the tree.
    ///
    /// Group ids are unique, every listed page exists and names its group,
    /// positions are dense `0..n` in list order, and no page is orphaned.
    pub fn verify(&self) -> Result<(), String> {
        if self.group_order.len() != self.groups.len() {
            return Err(format!(
                "group order lists {} ids but {} groups are stored",
                self.group_order.len(),
                self.groups.len()
            ));
        }
        let mut reachable = 0;
        for id in self.group_order.iter() {
            let group = self
                .groups
                .get(id)
                .ok_or_else(|| format!("group '{id}' is ordered but not stored"))?;
            for (index, page_id) in group.page_ids.iter().enumerate() {
                let page = self
                    .pages
                    .get(page_id)
                    .ok_or_else(|| format!("page '{page_id}' listed in '{id}' is missing"))?;
                if page.group_id != group.id {
                    return Err(format!(
                        "page '{page_id}' names group '{}' but sits in '{id}'",
                        page.group_id
                    ));
                }
                if page.position != index {
                    return Err(format!(
                        "page '{page_id}' has position {} at index {index}",
                        page.position
                    ));
                }
                reachable += 1;
            }
        }
        if reachable != self.pages.len() {
            return Err(format!(
                "{} pages stored but only {reachable} reachable",
                self.pages.len()
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Row replacement, used by the store while building the next version
    // -----------------------------------------------------------------------

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub(crate) fn resolve_group(&self, id: &GroupId) -> Result<&Group, StoreError> {
        self.groups
            .get(id)
            .ok_or_else(|| StoreError::not_found(Entity::Group, id))
    }

    pub(crate) fn resolve_page(
        &self,
        group_id: &GroupId,
        page_id: &PageId,
    ) -> Result<&Page, StoreError> {
        self.resolve_group(group_id)?;
        self.page(group_id, page_id)
            .ok_or_else(|| StoreError::not_found(Entity::Page, page_id))
    }

    pub(crate) fn put_group(&mut self, group: Group) {
        self.groups.insert(group.id.clone(), group);
    }

    pub(crate) fn put_page(&mut self, page: Page) {
        self.pages.insert(page.id.clone(), page);
    }

    /// Append a group with its already-linked pages.
    pub(crate) fn push_group(&mut self, group: Group, pages: Vec<Page>) {
        self.group_order.push_back(group.id.clone());
        for page in pages {
            self.put_page(page);
        }
        self.put_group(group);
    }

    /// Remove a group and every page it owns.
    pub(crate) fn remove_group(&mut self, id: &GroupId) -> Option<Group> {
        let group = self.groups.remove(id)?;
        if let Some(index) = self.group_order.index_of(id) {
            self.group_order.remove(index);
        }
        for page_id in group.page_ids.iter() {
            self.pages.remove(page_id);
        }
        if matches!(&self.current, Some((g, _)) if g == id) {
            self.current = None;
        }
        Some(group)
    }

    pub(crate) fn remove_page(&mut self, page_id: &PageId) -> Option<Page> {
        let page = self.pages.remove(page_id)?;
        if matches!(&self.current, Some((_, p)) if p == page_id) {
            self.current = None;
        }
        Some(page)
    }

    pub(crate) fn move_group(&mut self, from: usize, to: usize) {
        let id = self.group_order.remove(from);
        self.group_order.insert(to, id);
    }

    /// Rewrite `position` for pages of `group_id` whose rank changed.
    /// Untouched rows stay shared with the previous version.
    pub(crate) fn renumber(&mut self, group_id: &GroupId) {
        let Some(group) = self.groups.get(group_id) else {
            return;
        };
        let stale: Vec<(PageId, usize)> = group
            .page_ids
            .iter()
            .enumerate()
            .filter(|(index, id)| self.pages.get(*id).is_some_and(|p| p.position != *index))
            .map(|(index, id)| (id.clone(), index))
            .collect();
        for (id, index) in stale {
            if let Some(page) = self.pages.get_mut(&id) {
                page.position = index;
            }
        }
    }

    pub(crate) fn set_current(&mut self, group_id: GroupId, page_id: PageId) {
        self.current = Some((group_id, page_id));
    }

    /// Keep the selection on `page_id` after it moved into `group_id`.
    pub(crate) fn follow_page(&mut self, page_id: &PageId, group_id: &GroupId) {
        if let Some((g, p)) = &mut self.current {
            if p == page_id {
                *g = group_id.clone();
            }
        }
    }
}
