//! `workbook favorites` and `workbook search <query>`

use anyhow::Result;
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use workbook_store::PageHit;

use super::Session;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Case-insensitive text matched against page and group names.
    pub query: String,
}

#[derive(Tabled)]
struct HitRow {
    #[tabled(rename = "group")]
    group: String,
    #[tabled(rename = "page")]
    page: String,
    #[tabled(rename = "kind")]
    kind: String,
}

impl SearchArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let store = session.open()?;
        let hits = store.search_pages(&self.query);
        if hits.is_empty() {
            println!("No pages match '{}'.", self.query.trim());
            return Ok(());
        }
        print_hits(hits);
        Ok(())
    }
}

pub fn favorites(session: &Session) -> Result<()> {
    let store = session.open()?;
    let hits = store.favorite_pages();
    if hits.is_empty() {
        println!("No favorite pages.");
        println!("Run: workbook page favorite <group> <page>");
        return Ok(());
    }
    print_hits(hits);
    Ok(())
}

fn print_hits(hits: Vec<PageHit>) {
    let rows: Vec<HitRow> = hits
        .into_iter()
        .map(|hit| HitRow {
            group: hit.group.name,
            kind: hit.page.kind().to_string(),
            page: hit.page.name,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
