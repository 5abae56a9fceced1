//! assetpack - publish and bundle static assets declared by installed packages.

mod assets;
mod cli;
mod compress;
mod database;
mod error;
mod freshness;
mod logger;
mod preset;
mod registry;
mod utils;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use database::Database;
use registry::{ConflictMode, Registry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.verbose);

    let db_path = expand_database_path(&cli.database);
    let db = Database::load(&db_path)
        .with_context(|| format!("loading database {}", db_path.display()))?;

    if let Commands::Prune { dry_run } = &cli.command {
        let mut db = db;
        cli::prune::prune(&mut db, &db_path, *dry_run)?;
        return Ok(());
    }

    let base = db_path.parent().unwrap_or_else(|| Path::new("."));
    let mode = if cli.keep_first {
        ConflictMode::KeepFirst
    } else {
        ConflictMode::Fail
    };
    let registry = Registry::new(db, base, mode);

    match &cli.command {
        Commands::Publish { package, clean } => {
            cli::publish::publish(&registry, package.as_deref(), *clean)
        }
        Commands::Bundle {
            preset,
            minify,
            strict,
        } => cli::bundle::run(&registry, preset, *minify, *strict),
        Commands::Validate => cli::validate::validate(&registry),
        Commands::Prune { .. } => unreachable!(),
    }
}

/// Expand `~` in the database path from the CLI.
fn expand_database_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}
