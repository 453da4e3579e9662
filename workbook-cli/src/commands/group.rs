//! `workbook group ...`

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use workbook_core::GroupPreset;
use workbook_store::GroupPatch;

use super::{done, find_group, snapshot, Session};

/// Manage groups of the selected workspace.
#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// Append an empty group.
    Add {
        name: String,
        /// Emoji or short label shown before the name.
        #[arg(long)]
        icon: Option<String>,
    },

    /// Append a group pre-filled from a preset (personal, work, finance, study, fitness).
    Preset { preset: GroupPreset },

    /// Rename a group (by id or name).
    Rename { group: String, name: String },

    /// Delete a group and all of its pages.
    Delete { group: String },

    /// Expand or collapse a group.
    Toggle { group: String },

    /// Mark or unmark a group as favorite.
    Favorite { group: String },

    /// Move the group at index <FROM> to index <TO>.
    Move { from: usize, to: usize },
}

pub fn run(session: &Session, cmd: GroupCommand) -> Result<()> {
    let store = session.open()?;
    match cmd {
        GroupCommand::Add { name, icon } => {
            let Some(id) = store.add_group(&name).context("failed to add group")? else {
                bail!("group name must not be blank");
            };
            if icon.is_some() {
                let patch = GroupPatch {
                    icon: Some(icon),
                    ..GroupPatch::default()
                };
                store.update_group(&id, patch).context("failed to set group icon")?;
            }
            done(format_args!("Added group '{}' ({id})", name.trim()));
        }
        GroupCommand::Preset { preset } => {
            let id = store
                .add_group_from_preset(preset)
                .context("failed to add preset group")?
                .context("workspace is not loaded")?;
            let group = store.get_group(&id).context("preset group vanished")?;
            done(format_args!(
                "Added '{}' with {} pages ({id})",
                group.name,
                group.len()
            ));
        }
        GroupCommand::Rename { group, name } => {
            let id = find_group(&*snapshot(&store)?, &group)?;
            if name.trim().is_empty() {
                bail!("group name must not be blank");
            }
            store.rename_group(&id, &name).context("failed to rename group")?;
            done(format_args!("Renamed '{group}' to '{}'", name.trim()));
        }
        GroupCommand::Delete { group } => {
            let id = find_group(&*snapshot(&store)?, &group)?;
            let pages = store.get_pages(&id).len();
            store.delete_group(&id).context("failed to delete group")?;
            done(format_args!("Deleted group '{group}' and {pages} pages"));
        }
        GroupCommand::Toggle { group } => {
            let id = find_group(&*snapshot(&store)?, &group)?;
            store.toggle_group_expanded(&id).context("failed to toggle group")?;
            let expanded = store.get_group(&id).is_some_and(|g| g.expanded);
            done(format_args!(
                "'{group}' is now {}",
                if expanded { "expanded" } else { "collapsed" }
            ));
        }
        GroupCommand::Favorite { group } => {
            let id = find_group(&*snapshot(&store)?, &group)?;
            store.toggle_group_favorite(&id).context("failed to toggle favorite")?;
            let favorite = store.get_group(&id).is_some_and(|g| g.favorite);
            done(format_args!(
                "'{group}' {}",
                if favorite { "marked as favorite" } else { "is no longer a favorite" }
            ));
        }
        GroupCommand::Move { from, to } => {
            store.reorder_groups(from, to).context("failed to move group")?;
            done(format_args!("Moved group {from} to {to}"));
        }
    }
    Ok(())
}
