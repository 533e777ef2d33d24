//! Command implementations for restore-cli

pub mod check;
pub mod graph;
pub mod plan;

pub use check::{CheckOptions, run_check};
pub use graph::{run_closure, run_order, run_parents};
pub use plan::run_plan;

use colored::Colorize;
use restore_core::ProjectReference;

use crate::error::Result;

/// Print project names, one per line or as a JSON array.
fn print_names(title: &str, projects: &[ProjectReference], json: bool) -> Result<()> {
    if json {
        let names: Vec<&str> = projects.iter().map(|p| p.unique_name.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    println!("{} ({})", title.bold(), projects.len());
    if projects.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for project in projects {
        println!("  {} {}", "+".green(), project.unique_name.cyan());
    }
    Ok(())
}
