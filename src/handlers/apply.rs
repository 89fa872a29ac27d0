//! Handler for the `apply` command.

use log::info;
use std::path::PathBuf;

use super::Collaborators;
use super::output::format_report;
use crate::cli::OutputFormat;
use crate::config::types::Config;
use crate::error::Result;
use crate::gitops::Pipeline;
use crate::rightsize::load_recommendations;

/// Configuration for the apply command
pub struct ApplyOptions {
    pub path: PathBuf,
    /// Optimizer JSON output
    pub recommendations: PathBuf,
    /// Overrides `gitops.cluster_folder`
    pub cluster_folder: Option<PathBuf>,
    /// Report pending writes instead of writing
    pub dry_run: bool,
    pub format: OutputFormat,
}

pub fn handle_apply(options: ApplyOptions, config: &Config) -> Result<()> {
    let recommendations = load_recommendations(&options.recommendations)?;
    info!(
        "Loaded {} recommendations from {}",
        recommendations.len(),
        options.recommendations.display()
    );

    let collaborators = Collaborators::from_config(config);
    let pipeline = Pipeline::new(&collaborators.locator, &collaborators.engine)
        .with_entry_file(&config.gitops.entry_file)
        .with_cluster_folder(options.cluster_folder.or_else(|| config.gitops.cluster_folder.clone()))
        .with_patcher(collaborators.patcher.clone())
        .dry_run(options.dry_run);

    let (_, report) = pipeline.execute(&options.path, &recommendations)?;

    match options.format {
        OutputFormat::Table => print!("{}", format_report(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
