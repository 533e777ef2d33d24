//! Plan command: show restore requests per root

use colored::Colorize;
use restore_core::{FileSettingsResolver, ProviderCache, RestoreRequestBuilder};
use std::path::Path;
use std::sync::Arc;

use crate::context::GraphContext;
use crate::error::Result;

/// Run the plan command
pub fn run_plan(dg_spec: &Path, json: bool) -> Result<()> {
    let ctx = GraphContext::load(dg_spec)?;
    let builder = RestoreRequestBuilder::new(
        Arc::new(FileSettingsResolver::new()),
        Arc::new(ProviderCache::new()),
    );
    let requests = builder.create_requests(&ctx.spec)?;

    if json {
        let plan: Vec<serde_json::Value> = requests
            .iter()
            .map(|summary| {
                let request = &summary.request;
                let providers = &request.providers;
                serde_json::json!({
                    "uniqueName": summary.unique_name,
                    "inputPath": summary.input_path.as_str(),
                    "outputType": request.output_type.to_string(),
                    "outputPath": request.output_path.as_str(),
                    "lockFilePath": request.lock_file_path.as_str(),
                    "globalPackagesFolder": providers.global_folder().root().as_str(),
                    "fallbackFolders": providers
                        .fallback_folders()
                        .iter()
                        .map(|f| f.root().as_str())
                        .collect::<Vec<_>>(),
                    "sources": providers.sources(),
                    "projects": request
                        .external_projects
                        .iter()
                        .map(|p| p.unique_name.as_str())
                        .collect::<Vec<_>>(),
                    "maxParallelism": request.max_parallelism,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} ({} roots, {} provider sets)",
        "Restore plan".bold(),
        requests.len(),
        builder.provider_cache().len()
    );

    for summary in &requests {
        let request = &summary.request;
        let providers = &request.providers;

        println!();
        println!(
            "{} {}",
            summary.unique_name.cyan().bold(),
            format!("({})", request.output_type).dimmed()
        );
        println!("  input:     {}", summary.input_path);
        println!("  lock file: {}", request.lock_file_path);
        println!("  packages:  {}", providers.global_folder().root());
        for fallback in providers.fallback_folders() {
            println!("  fallback:  {}", fallback.root());
        }
        for source in providers.sources() {
            println!("  source:    {}", source);
        }
        let names: Vec<&str> = request
            .external_projects
            .iter()
            .map(|p| p.unique_name.as_str())
            .collect();
        println!("  projects:  {}", names.join(", "));
    }

    Ok(())
}
