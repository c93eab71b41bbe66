// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kit-deployer")]
#[command(about = "Commit container image references into YAML deployment files on GitHub")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the configuration file (default: discovered in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new kit-deployer.yml configuration file
    Init {
        /// Docker registry host
        #[arg(long)]
        registry: Option<String>,

        /// Image repository name
        #[arg(long)]
        repository: Option<String>,

        /// GitHub repository holding the deployment files (owner/name)
        #[arg(long)]
        github_repository: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Deploy an explicit image reference
    Image {
        /// Image reference to write, e.g. registry.example.com/app:prod-abc123
        image: String,

        #[command(flatten)]
        options: CommitOptions,
    },

    /// Deploy the image built for a commit (registry/repository:branch-commit)
    Commit {
        /// Commit id the image was tagged with
        commit_id: String,

        #[command(flatten)]
        options: CommitOptions,
    },

    /// Show which file and property a deployment would update
    Target {
        /// Branch whose deployment file to resolve
        #[arg(short, long)]
        branch: String,

        /// Use a local manifest instead of fetching it
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct CommitOptions {
    /// Branch whose deployment file to update
    #[arg(short, long)]
    pub branch: String,

    /// Commit message
    #[arg(short, long)]
    pub message: Option<String>,

    /// Committer name (requires --committer-email)
    #[arg(long, requires = "committer_email")]
    pub committer_name: Option<String>,

    /// Committer email (requires --committer-name)
    #[arg(long, requires = "committer_name")]
    pub committer_email: Option<String>,

    /// Show what would be committed without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Use a local manifest instead of fetching it
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Maximum number of read-decide-write attempts
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Give up after this long (e.g. 5m)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
}
