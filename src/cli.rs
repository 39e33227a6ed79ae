//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Postern git-backed blog index CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: postern.toml)
    #[arg(short = 'C', long, default_value = "postern.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared query arguments for List and Show commands
#[derive(clap::Args, Debug, Clone)]
pub struct QueryArgs {
    /// Language partition to query (default: first configured language)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Emit JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the index and keep it synchronized until interrupted
    Run {
        /// Poll interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,

        /// enable polling
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        polling: Option<bool>,
    },

    /// Build the index once and print a per-language summary
    Build,

    /// List indexed documents, newest first
    List {
        #[command(flatten)]
        query_args: QueryArgs,

        /// Only documents in this category
        #[arg(long)]
        category: Option<String>,

        /// Only documents carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Only documents created in this YYYY-MM bucket
        #[arg(long)]
        month: Option<String>,

        /// Maximum number of documents to print
        #[arg(long)]
        limit: Option<usize>,

        /// Skip this many documents first
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Include unpublished drafts
        #[arg(short, long)]
        drafts: bool,
    },

    /// Show a single document by identity
    Show {
        /// Document identity (file stem)
        slug: String,

        #[command(flatten)]
        query_args: QueryArgs,

        /// Print the rendered HTML body as well
        #[arg(short, long)]
        body: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_run(&self) -> bool {
        matches!(self.command, Commands::Run { .. })
    }
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build)
    }
    pub const fn is_list(&self) -> bool {
        matches!(self.command, Commands::List { .. })
    }
    pub const fn is_show(&self) -> bool {
        matches!(self.command, Commands::Show { .. })
    }
}
