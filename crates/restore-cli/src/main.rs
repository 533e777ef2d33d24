//! Restore graph CLI
//!
//! Front end over dependency-graph spec files: closures, parents, restore
//! order, change detection and restore plans.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(cmd) => execute_command(cmd, cli.json).await,
        None => {
            println!("{} restore graph CLI", "restore".green().bold());
            println!();
            println!("Run {} for available commands.", "restore --help".cyan());
            Ok(())
        }
    }
}

async fn execute_command(cmd: Commands, json: bool) -> Result<()> {
    match cmd {
        Commands::Closure { dg_spec, project } => commands::run_closure(&dg_spec, &project, json),
        Commands::Parents { dg_spec, project } => {
            commands::run_parents(&dg_spec, &project, json).await
        }
        Commands::Order { dg_spec, projects } => {
            commands::run_order(&dg_spec, &projects, json).await
        }
        Commands::Check {
            dg_spec,
            cache,
            packages,
            force,
            record,
        } => {
            let options = commands::CheckOptions {
                cache,
                packages,
                force,
                record,
                json,
            };
            commands::run_check(&dg_spec, &options).await
        }
        Commands::Plan { dg_spec } => commands::run_plan(&dg_spec, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_with_packages() {
        let cli = Cli::parse_from([
            "restore",
            "check",
            "dg.json",
            "--packages",
            "/a,/b",
            "--force",
            "--json",
        ]);

        assert!(cli.json);
        match cli.command {
            Some(Commands::Check {
                packages,
                force,
                record,
                ..
            }) => {
                assert_eq!(packages.len(), 2);
                assert!(force);
                assert!(!record);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn order_projects_default_to_empty() {
        let cli = Cli::parse_from(["restore", "order", "dg.json"]);
        assert_eq!(
            cli.command,
            Some(Commands::Order {
                dg_spec: "dg.json".into(),
                projects: vec![],
            })
        );
    }
}
