//! `workbook page ...`

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::Value;

use workbook_core::{TemplateData, TemplateKind};
use workbook_store::PagePatch;

use super::{done, find_group, find_group_page, snapshot, star, Session};

/// Manage pages. Groups and pages are addressed by id or name.
#[derive(Subcommand, Debug)]
pub enum PageCommand {
    /// Append a page with the empty payload for its kind.
    Add {
        group: String,
        name: String,
        /// Template kind of the new page.
        #[arg(long, short = 'k', default_value_t = TemplateKind::Generic)]
        kind: TemplateKind,
        /// Emoji or short label shown before the name.
        #[arg(long)]
        icon: Option<String>,
    },

    /// Rename a page.
    Rename { group: String, page: String, name: String },

    /// Delete a page.
    Delete { group: String, page: String },

    /// Mark or unmark a page as favorite.
    Favorite { group: String, page: String },

    /// Move a page to the end of another group.
    Move { group: String, page: String, to: String },

    /// Move the page at index <FROM> to index <TO> within a group.
    Reorder { group: String, from: usize, to: usize },

    /// Replace a page's payload; reads stdin unless --json or --file is given.
    SetData {
        group: String,
        page: String,
        /// Payload as an inline JSON string.
        #[arg(long, conflicts_with = "file")]
        json: Option<String>,
        /// Path to a JSON payload file.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print a page and its payload.
    Show {
        group: String,
        page: String,
        /// Print only the payload JSON.
        #[arg(long)]
        json: bool,
    },
}

pub fn run(session: &Session, cmd: PageCommand) -> Result<()> {
    let store = session.open()?;
    match cmd {
        PageCommand::Add {
            group,
            name,
            kind,
            icon,
        } => {
            let group_id = find_group(&*snapshot(&store)?, &group)?;
            let Some(id) = store
                .add_page(&group_id, &name, kind)
                .context("failed to add page")?
            else {
                bail!("page name must not be blank");
            };
            if icon.is_some() {
                let patch = PagePatch {
                    icon: Some(icon),
                    ..PagePatch::default()
                };
                store.update_page(&group_id, &id, patch).context("failed to set page icon")?;
            }
            done(format_args!("Added {kind} page '{}' to '{group}' ({id})", name.trim()));
        }
        PageCommand::Rename { group, page, name } => {
            let (group_id, page_id) = find_group_page(&store, &group, &page)?;
            if name.trim().is_empty() {
                bail!("page name must not be blank");
            }
            store
                .rename_page(&group_id, &page_id, &name)
                .context("failed to rename page")?;
            done(format_args!("Renamed '{page}' to '{}'", name.trim()));
        }
        PageCommand::Delete { group, page } => {
            let (group_id, page_id) = find_group_page(&store, &group, &page)?;
            store.delete_page(&group_id, &page_id).context("failed to delete page")?;
            done(format_args!("Deleted page '{page}' from '{group}'"));
        }
        PageCommand::Favorite { group, page } => {
            let (group_id, page_id) = find_group_page(&store, &group, &page)?;
            store
                .toggle_page_favorite(&group_id, &page_id)
                .context("failed to toggle favorite")?;
            let favorite = store.get_page(&group_id, &page_id).is_some_and(|p| p.favorite);
            done(format_args!(
                "'{page}' {}",
                if favorite { "marked as favorite" } else { "is no longer a favorite" }
            ));
        }
        PageCommand::Move { group, page, to } => {
            let (from_id, page_id) = find_group_page(&store, &group, &page)?;
            let to_id = find_group(&*snapshot(&store)?, &to)?;
            store.move_page(&from_id, &to_id, &page_id).context("failed to move page")?;
            let position = store.get_page(&to_id, &page_id).map(|p| p.position);
            match position {
                Some(position) if from_id != to_id => {
                    done(format_args!("Moved '{page}' to '{to}' at position {position}"))
                }
                _ => println!("'{page}' is already in '{to}'"),
            }
        }
        PageCommand::Reorder { group, from, to } => {
            let group_id = find_group(&*snapshot(&store)?, &group)?;
            store
                .reorder_pages(&group_id, from, to)
                .context("failed to reorder pages")?;
            done(format_args!("Moved page {from} to {to} in '{group}'"));
        }
        PageCommand::SetData {
            group,
            page,
            json,
            file,
        } => {
            let (group_id, page_id) = find_group_page(&store, &group, &page)?;
            let data = read_payload(json, file)?;
            store
                .update_page_data(&group_id, &page_id, data)
                .with_context(|| format!("failed to update '{page}'"))?;
            done(format_args!("Updated data of '{page}'"));
        }
        PageCommand::Show { group, page, json } => {
            let (group_id, page_id) = find_group_page(&store, &group, &page)?;
            let page = store
                .get_page(&group_id, &page_id)
                .context("page vanished")?;
            let payload = page.data.to_value().context("failed to encode payload")?;
            let rendered =
                serde_json::to_string_pretty(&payload).context("failed to serialize payload")?;
            if json {
                println!("{rendered}");
                return Ok(());
            }
            println!("{} {}", page.name.bold(), star(page.favorite));
            println!("  kind:     {}", page.kind());
            println!("  position: {}", page.position);
            println!("  updated:  {}", page.updated_at.to_rfc3339());
            println!("  summary:  {}", summary(&page.data));
            println!("{rendered}");
        }
    }
    Ok(())
}

fn read_payload(json: Option<String>, file: Option<PathBuf>) -> Result<Value> {
    let text = match (json, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read payload file '{}'", path.display()))?,
        (None, None) => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read payload from stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("payload is not valid JSON")
}

/// One-line description of a payload's contents.
fn summary(data: &TemplateData) -> String {
    fn count(n: usize, noun: &str) -> String {
        format!("{n} {noun}{}", if n == 1 { "" } else { "s" })
    }

    match data {
        TemplateData::Generic(value) => match value {
            Value::Object(map) => count(map.len(), "field"),
            _ => "free-form value".to_string(),
        },
        TemplateData::Budget(d) => format!(
            "{}, balance {:.2}",
            count(d.items.len(), "item"),
            d.balance()
        ),
        TemplateData::Bugs(d) => count(d.bugs.len(), "bug"),
        TemplateData::Calendar(d) => count(d.events.len(), "event"),
        TemplateData::Kanban(d) => format!(
            "{}, {}",
            count(d.columns.len(), "column"),
            count(d.columns.iter().map(|c| c.cards.len()).sum(), "card")
        ),
        TemplateData::Table(d) => format!(
            "{}, {}",
            count(d.columns.len(), "column"),
            count(d.rows.len(), "row")
        ),
        TemplateData::Tasks(d) => {
            let completed = d.tasks.iter().filter(|t| t.completed).count();
            format!("{completed}/{} done", d.tasks.len())
        }
        TemplateData::Sprint(d) => count(d.sprints.len(), "sprint"),
        TemplateData::Study(d) => format!(
            "{}, {:.1}h logged",
            count(d.subjects.len(), "subject"),
            d.subjects.iter().map(|s| s.hours_logged()).sum::<f64>()
        ),
        TemplateData::Roadmap(d) => count(d.milestones.len(), "milestone"),
        TemplateData::Projects(d) => count(d.projects.len(), "project"),
        TemplateData::Diet(d) => match d.latest_day() {
            Some(day) => format!(
                "{}, {} kcal on {day}",
                count(d.meals.len(), "meal"),
                d.calories_on(day)
            ),
            None => count(d.meals.len(), "meal"),
        },
        TemplateData::Workout(d) => count(d.workouts.len(), "workout"),
    }
}
