//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Restore graph - closures, change detection and restore plans for project graphs
#[derive(Parser, Debug)]
#[command(name = "restore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List every project reachable from a project, itself included
    Closure {
        /// Dependency graph spec file
        dg_spec: PathBuf,

        /// Unique name of the project
        project: String,
    },

    /// List the projects whose closure contains a project
    Parents {
        /// Dependency graph spec file
        dg_spec: PathBuf,

        /// Unique name of the project
        project: String,
    },

    /// Print projects in restore order, children first
    ///
    /// Orders the restore roots of the spec unless projects are named.
    Order {
        /// Dependency graph spec file
        dg_spec: PathBuf,

        /// Unique names to order (defaults to the restore roots)
        projects: Vec<String>,
    },

    /// Decide whether a restore is needed
    ///
    /// Compares the graph with the cache store recorded at the last restore,
    /// then validates installed packages against lock files. The store is
    /// only rewritten when nothing is required or with --record.
    ///
    /// Examples:
    ///   restore check dg.json
    ///   restore check dg.json --packages ~/.restore/packages
    ///   restore check dg.json --record
    Check {
        /// Dependency graph spec file
        dg_spec: PathBuf,

        /// Cache store location (defaults to obj/restore-cache.json next to the spec)
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Package folders in lookup order (defaults to settings)
        #[arg(short, long, env = "RESTORE_CHECK_PACKAGES", value_delimiter = ',')]
        packages: Vec<PathBuf>,

        /// Report a restore as required even when nothing changed
        #[arg(long)]
        force: bool,

        /// Record the current graph as restored
        #[arg(long)]
        record: bool,
    },

    /// Show the restore request built for each restore root
    Plan {
        /// Dependency graph spec file
        dg_spec: PathBuf,
    },
}
