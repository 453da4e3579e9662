//! `workbook show [--json]`: the group/page tree.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use workbook_store::{Snapshot, WorkspaceDocument};

use super::{snapshot, star, Session};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Emit the stored workspace document as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct TreeRow {
    #[tabled(rename = "#")]
    position: String,
    #[tabled(rename = "page")]
    page: String,
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "★")]
    favorite: String,
    #[tabled(rename = "id")]
    id: String,
}

impl ShowArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let store = session.open()?;
        let snapshot = snapshot(&store)?;
        if self.json {
            let document = WorkspaceDocument::from_snapshot(&snapshot)
                .context("failed to build workspace document")?;
            let rendered = serde_json::to_string_pretty(&document)
                .context("failed to serialize workspace JSON")?;
            println!("{rendered}");
            return Ok(());
        }
        print_tree(&snapshot);
        Ok(())
    }
}

fn print_tree(snapshot: &Snapshot) {
    let info = snapshot.info();
    println!(
        "{} | {} groups | {} pages | owner {}",
        info.name.bold(),
        snapshot.group_count(),
        snapshot.page_count(),
        info.owner_id,
    );

    if snapshot.group_count() == 0 {
        println!("No groups yet.");
        println!("Run: workbook group add <name>");
        return;
    }

    for (index, group) in snapshot.groups().enumerate() {
        let marker = if group.expanded { "▾" } else { "▸" };
        let icon = group.icon.as_deref().map(|i| format!("{i} ")).unwrap_or_default();
        println!(
            "\n{marker} {index}. {icon}{} {} {}",
            group.name.bold(),
            star(group.favorite),
            format!("({})", group.id).bright_black(),
        );
        if !group.expanded {
            println!("  {} pages hidden", group.len());
            continue;
        }
        if group.is_empty() {
            println!("  (empty)");
            continue;
        }
        let rows: Vec<TreeRow> = snapshot
            .pages(&group.id)
            .map(|page| TreeRow {
                position: page.position.to_string(),
                page: match &page.icon {
                    Some(icon) => format!("{icon} {}", page.name),
                    None => page.name.clone(),
                },
                kind: page.kind().to_string(),
                favorite: star(page.favorite),
                id: page.id.to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}
