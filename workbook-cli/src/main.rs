//! Workbook: hierarchical workspace manager CLI.
//!
//! # Usage
//!
//! ```text
//! workbook init --name <name> --owner <id>
//! workbook show [--json]
//! workbook config
//! workbook group add|preset|rename|delete|toggle|favorite|move ...
//! workbook page add|rename|delete|favorite|move|reorder|set-data|show ...
//! workbook favorites
//! workbook search <query>
//! ```
//!
//! Global flags: `--workspace <id>` picks the stored workspace (optional when
//! exactly one exists), `--verbose` raises the log level to `debug`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    group::GroupCommand, init::InitArgs, page::PageCommand, query::SearchArgs, show::ShowArgs,
    Session,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "workbook",
    version,
    about = "Organize pages of typed templates into groups",
    long_about = None,
)]
struct Cli {
    /// Workspace id to operate on.
    #[arg(long, short = 'w', global = true)]
    workspace: Option<String>,

    /// Log store activity to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new workspace.
    Init(InitArgs),

    /// Print the group/page tree.
    Show(ShowArgs),

    /// Print the effective configuration.
    Config,

    /// Manage groups.
    Group {
        #[command(subcommand)]
        command: GroupCommand,
    },

    /// Manage pages within groups.
    Page {
        #[command(subcommand)]
        command: PageCommand,
    },

    /// List favorite pages.
    Favorites,

    /// Find pages by page or group name.
    Search(SearchArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = Session::from_env(cli.workspace)?;
    match cli.command {
        Commands::Init(args) => args.run(&session),
        Commands::Show(args) => args.run(&session),
        Commands::Config => commands::config::run(&session),
        Commands::Group { command } => commands::group::run(&session, command),
        Commands::Page { command } => commands::page::run(&session, command),
        Commands::Favorites => commands::query::favorites(&session),
        Commands::Search(args) => args.run(&session),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
