//! `workbook init --name <name> --owner <id>`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use workbook_store::{FilePersistence, PersistenceMode};

use super::{done, Session};

/// Create a new workspace and save it.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Display name of the workspace.
    #[arg(long, short = 'n')]
    pub name: String,

    /// Owner id supplied by the identity provider.
    #[arg(long, short = 'o')]
    pub owner: String,
}

impl InitArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let store = session.new_store();
        let id = store
            .initialize_workspace(&self.name, &self.owner)
            .with_context(|| format!("failed to create workspace '{}'", self.name))?;

        done(format_args!("Created workspace '{}' ({id})", self.name.trim()));
        match session.config.persistence {
            PersistenceMode::File => {
                let backend = FilePersistence::new(session.config.data_dir_at(&session.home));
                println!("  Saved to: {}", backend.document_path(&id)?.display());
            }
            PersistenceMode::Memory => {
                println!("  {}", "persistence is 'memory'; nothing was saved".yellow());
            }
        }
        Ok(())
    }
}
