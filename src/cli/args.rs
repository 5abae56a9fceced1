//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// assetpack: publish and bundle static assets declared by installed packages
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Asset database file
    #[arg(short = 'D', long, global = true, default_value = "assetpack.json", value_hint = clap::ValueHint::FilePath)]
    pub database: PathBuf,

    /// Keep the first definition on preset name conflicts instead of failing
    #[arg(long, global = true)]
    pub keep_first: bool,

    /// Enable verbose output for debugging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Publish package asset directories into the document root
    #[command(visible_alias = "p")]
    Publish {
        /// Publish only this package
        #[arg(short, long)]
        package: Option<String>,

        /// Copy everything, ignoring freshness checks
        #[arg(short, long)]
        clean: bool,
    },

    /// Build merged or minified bundles for a preset and print its tags
    #[command(visible_alias = "b")]
    Bundle {
        /// Preset name
        preset: String,

        /// Minify instead of merge
        #[arg(short, long)]
        minify: bool,

        /// Fail on compressor errors instead of degrading to best effort
        #[arg(short, long)]
        strict: bool,
    },

    /// Validate the database: statements, presets and name conflicts
    #[command(visible_alias = "v")]
    Validate,

    /// Drop packages whose asset sources vanished and rewrite the database
    Prune {
        /// Report without rewriting the database
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}
