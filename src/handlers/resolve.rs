//! Handler for the `resolve` command.
//!
//! Walks the cluster tree, renders every resolvable HelmRelease and prints
//! the resulting manifest inventory. Nothing is written.

use std::path::PathBuf;

use super::Collaborators;
use super::output::{Inventory, format_inventory_table, format_report};
use crate::cli::OutputFormat;
use crate::config::types::Config;
use crate::error::Result;
use crate::gitops::Pipeline;

/// Configuration for the resolve command
pub struct ResolveOptions {
    pub path: PathBuf,
    /// Overrides `gitops.cluster_folder`
    pub cluster_folder: Option<PathBuf>,
    pub format: OutputFormat,
}

pub fn handle_resolve(options: ResolveOptions, config: &Config) -> Result<()> {
    let collaborators = Collaborators::from_config(config);
    let pipeline = Pipeline::new(&collaborators.locator, &collaborators.engine)
        .with_entry_file(&config.gitops.entry_file)
        .with_cluster_folder(options.cluster_folder.or_else(|| config.gitops.cluster_folder.clone()));

    let run = pipeline.resolve(&options.path)?;
    for warning in &run.warnings {
        log::warn!("{}", warning);
    }
    let report = run.report(0, Vec::new(), false);

    match options.format {
        OutputFormat::Table => {
            println!("{}", format_inventory_table(&run));
            print!("{}", format_report(&report));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&Inventory::new(&run, &report))?);
        }
    }

    Ok(())
}
