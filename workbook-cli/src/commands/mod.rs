pub mod config;
pub mod group;
pub mod init;
pub mod page;
pub mod query;
pub mod show;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;

use workbook_core::{Group, GroupId, Page, PageId, WorkspaceId};
use workbook_store::{Persistence, Snapshot, StoreConfig, WorkspaceStore};

/// Home, configuration and workspace selection for one invocation.
pub struct Session {
    pub home: PathBuf,
    pub config: StoreConfig,
    workspace: Option<String>,
}

impl Session {
    pub fn from_env(workspace: Option<String>) -> Result<Self> {
        let home = workbook_store::config::home()?;
        let config = StoreConfig::load_at(&home).context("failed to load workbook config")?;
        Ok(Self {
            home,
            config,
            workspace,
        })
    }

    pub fn persistence(&self) -> Arc<dyn Persistence> {
        self.config.persistence_at(&self.home)
    }

    /// An uninitialized store wired to the configured backend.
    pub fn new_store(&self) -> WorkspaceStore {
        WorkspaceStore::from_config_at(&self.config, &self.home)
    }

    /// Open the selected workspace.
    ///
    /// Without `--workspace`, the single stored workspace is used.
    pub fn open(&self) -> Result<WorkspaceStore> {
        let persistence = self.persistence();
        let id = match &self.workspace {
            Some(id) => WorkspaceId::from(id.as_str()),
            None => {
                let ids = persistence.list().context("failed to list workspaces")?;
                match ids.as_slice() {
                    [] => bail!(
                        "No workspaces found. Run `workbook init --name <name> --owner <id>` first."
                    ),
                    [only] => only.clone(),
                    many => {
                        let names: Vec<&str> = many.iter().map(|id| id.as_str()).collect();
                        bail!(
                            "Multiple workspaces found ({}). Specify --workspace <id>.",
                            names.join(", ")
                        )
                    }
                }
            }
        };
        tracing::debug!(workspace = %id, home = %self.home.display(), "opening workspace");
        WorkspaceStore::open(persistence, &id)
            .with_context(|| format!("failed to open workspace '{id}'"))
    }
}

/// The committed snapshot of an opened store.
pub fn snapshot(store: &WorkspaceStore) -> Result<Arc<Snapshot>> {
    store.snapshot().ok_or_else(|| anyhow!("workspace is not loaded"))
}

/// Resolve a group by exact id, then by case-insensitive name.
pub fn find_group(snapshot: &Snapshot, key: &str) -> Result<GroupId> {
    let id = GroupId::from(key);
    if snapshot.group(&id).is_some() {
        return Ok(id);
    }
    let wanted = key.trim();
    let matches: Vec<&Group> = snapshot
        .groups()
        .filter(|g| g.name.eq_ignore_ascii_case(wanted))
        .collect();
    match matches.as_slice() {
        [group] => Ok(group.id.clone()),
        [] => bail!("no group with id or name '{key}'"),
        _ => bail!("group name '{key}' is ambiguous; use its id"),
    }
}

/// Resolve a page of `group_id` by exact id, then by case-insensitive name.
pub fn find_page(snapshot: &Snapshot, group_id: &GroupId, key: &str) -> Result<PageId> {
    let id = PageId::from(key);
    if snapshot.page(group_id, &id).is_some() {
        return Ok(id);
    }
    let wanted = key.trim();
    let matches: Vec<&Page> = snapshot
        .pages(group_id)
        .filter(|p| p.name.eq_ignore_ascii_case(wanted))
        .collect();
    match matches.as_slice() {
        [page] => Ok(page.id.clone()),
        [] => bail!("no page with id or name '{key}' in this group"),
        _ => bail!("page name '{key}' is ambiguous; use its id"),
    }
}

/// Resolve `<group> <page>` arguments against the current snapshot.
pub fn find_group_page(
    store: &WorkspaceStore,
    group: &str,
    page: &str,
) -> Result<(GroupId, PageId)> {
    let snapshot = snapshot(store)?;
    let group_id = find_group(&snapshot, group)?;
    let page_id = find_page(&snapshot, &group_id, page)?;
    Ok((group_id, page_id))
}

pub fn star(favorite: bool) -> String {
    if favorite {
        "★".yellow().to_string()
    } else {
        String::new()
    }
}

pub fn done(message: impl std::fmt::Display) {
    println!("{} {message}", "✓".green());
}
