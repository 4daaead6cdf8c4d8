//! Command-line interface for notes-pipeline
//!
//! Provides `sync`, `process`, `covers` and `completions` subcommands.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod covers;
mod process;
mod sync;
mod utils;

/// Publish a notes repository into a Hexo blog
#[derive(Parser)]
#[command(name = "notes-pipeline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy eligible notes and images into the site, then post-process them
    Sync(Box<sync::SyncArgs>),

    /// Rewrite image links, front matter and template syntax in place
    Process(Box<process::ProcessArgs>),

    /// Renumber a cover pool directory into cover-1.jpg, cover-2.jpg, ...
    Covers(covers::CoversArgs),

    /// Print shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Sync(args) => sync::run(*args, cli.verbose),
        Commands::Process(args) => process::run(*args, cli.verbose),
        Commands::Covers(args) => covers::run(args),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "notes-pipeline", &mut std::io::stdout());
            Ok(())
        }
    }
}
