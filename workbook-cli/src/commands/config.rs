//! `workbook config`

use anyhow::{Context, Result};

use workbook_store::config::config_path_at;

use super::Session;

pub fn run(session: &Session) -> Result<()> {
    let path = config_path_at(&session.home);
    let origin = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Config:   {}{origin}", path.display());
    println!("Data dir: {}", session.config.data_dir_at(&session.home).display());
    println!();
    print!(
        "{}",
        session.config.to_yaml().context("failed to serialize config")?
    );
    Ok(())
}
