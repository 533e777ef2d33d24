//! Check command: decide whether a restore is needed

use colored::Colorize;
use restore_core::{
    CacheStore, FileSettingsResolver, ReferenceCache, SettingsResolver,
    cache_has_changes_or_removals, is_restore_required, removed_projects,
};
use restore_fs::NormalizedPath;
use std::path::{Path, PathBuf};

use crate::context::GraphContext;
use crate::error::Result;

/// Options for the check command beyond the spec file.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub cache: Option<PathBuf>,
    pub packages: Vec<PathBuf>,
    pub force: bool,
    /// Save the current graph as the restored state.
    pub record: bool,
    pub json: bool,
}

/// Run the check command
pub async fn run_check(dg_spec: &Path, options: &CheckOptions) -> Result<()> {
    let ctx = GraphContext::load(dg_spec)?;
    let cache_path = match &options.cache {
        Some(path) => NormalizedPath::new(path).full_path(),
        None => ctx.dir().join("obj").join("restore-cache.json"),
    };

    let mut session = ReferenceCache::new();
    let previous = CacheStore::load(&cache_path)?;
    let current = ctx.snapshot(&mut session).await?;

    let graph_changed = cache_has_changes_or_removals(&previous, &current);
    let removed = removed_projects(&previous, &current);

    let folders = if options.packages.is_empty() {
        settings_folders(&ctx.dir())?
    } else {
        options
            .packages
            .iter()
            .map(|p| NormalizedPath::new(p).full_path())
            .collect()
    };

    let projects = ctx.projects();
    let packages_stale = is_restore_required(&projects, &folders, &mut session)?;
    let required = options.force || graph_changed || packages_stale;

    // The store describes the graph as of the last restore.
    let recorded = options.record || !required;
    if recorded {
        current.save(&cache_path)?;
    }
    tracing::info!(
        graph_changed,
        packages_stale,
        required,
        recorded,
        cache = %cache_path,
        "restore check finished"
    );

    if options.json {
        let removed: Vec<&str> = removed.iter().map(|p| p.as_str()).collect();
        let report = serde_json::json!({
            "graphChanged": graph_changed,
            "removedProjects": removed,
            "restoreRequired": required,
            "recorded": recorded,
            "cacheStore": cache_path.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if required {
        println!("{}", "Restore required".yellow().bold());
        if graph_changed {
            println!("  {} project graph changed", "-".yellow());
        }
        for path in &removed {
            println!("  {} removed {}", "-".yellow(), path);
        }
        if packages_stale {
            println!("  {} installed packages do not match lock files", "-".yellow());
        }
        if options.force {
            println!("  {} forced", "-".yellow());
        }
    } else {
        println!("{}", "Up to date".green().bold());
    }

    if options.record {
        println!("Recorded graph in {}", cache_path);
    }

    Ok(())
}

/// Global folder then fallbacks, as configured for `dir`.
fn settings_folders(dir: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
    let resolver = FileSettingsResolver::new();
    let settings = resolver.load_settings(dir)?;

    let mut folders = vec![resolver.effective_global_folder(dir, &settings)];
    folders.extend(resolver.effective_fallback_folders(dir, &settings));
    Ok(folders)
}
