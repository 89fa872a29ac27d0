//! One walk, resolve, patch and save invocation.

use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::charts::{ChartRenderer, TemplateEngine, resolve_charts};
use super::git::GitLocator;
use super::registry::SourceRegistry;
use super::store::DocumentStore;
use super::types::{Chart, HelmReleaseRecord};
use super::walker::{DEFAULT_ENTRY_FILE, ManifestWalker};
use super::writer;
use crate::error::Result;
use crate::rightsize::{PatchEngine, Recommendation};

/// Everything one invocation discovers and mutates.
///
/// A run is created by the walker, enriched by chart resolution and
/// rendering, patched, and finally saved. It is never reused.
#[derive(Debug, Default)]
pub struct ResolutionRun {
    pub registry: SourceRegistry,
    pub documents: DocumentStore,
    pub releases: Vec<HelmReleaseRecord>,
    pub charts: Vec<Chart>,
    /// Recovered problems, in the order they were hit.
    pub warnings: Vec<String>,
}

impl ResolutionRun {
    /// Resolve every release to a chart. Unresolvable releases become warnings.
    pub fn resolve_charts(&mut self, locator: &dyn GitLocator) -> usize {
        let resolution = resolve_charts(&self.releases, &self.registry, locator);
        self.warnings
            .extend(resolution.skipped.iter().map(|e| e.to_string()));
        self.charts = resolution.charts;
        self.charts.len()
    }

    /// Render every resolved chart into the document store.
    pub fn render_charts(&mut self, engine: &dyn TemplateEngine) -> Result<usize> {
        let renderer = ChartRenderer::new(engine);
        let mut added = 0;
        for chart in &self.charts {
            added += renderer.render_into(chart, &mut self.documents)?;
        }
        Ok(added)
    }

    /// Patch Deployments from recommendations. Returns the number of patched documents.
    pub fn apply(&mut self, patcher: &PatchEngine, recommendations: &[Recommendation]) -> Result<usize> {
        let outcome = patcher.apply(&mut self.documents, recommendations)?;
        self.warnings.extend(outcome.warnings);
        Ok(outcome.patched)
    }

    /// Write changed locations to disk.
    pub fn save(&self) -> Result<Vec<PathBuf>> {
        writer::save(&self.documents)
    }

    pub fn report(&self, patched: usize, written: Vec<PathBuf>, dry_run: bool) -> RunReport {
        RunReport {
            documents: self.documents.len(),
            releases: self.releases.len(),
            charts: self.charts.len(),
            patched,
            warnings: self.warnings.clone(),
            written,
            dry_run,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub documents: usize,
    pub releases: usize,
    pub charts: usize,
    pub patched: usize,
    pub warnings: Vec<String>,
    /// Files written, or that would be written on a dry run.
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Collaborators and switches for [`Pipeline`].
pub struct Pipeline<'a> {
    pub cluster_folder: Option<PathBuf>,
    pub entry_file: String,
    pub locator: &'a dyn GitLocator,
    pub engine: &'a dyn TemplateEngine,
    pub patcher: PatchEngine,
    pub dry_run: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(locator: &'a dyn GitLocator, engine: &'a dyn TemplateEngine) -> Self {
        Self {
            cluster_folder: None,
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
            locator,
            engine,
            patcher: PatchEngine::default(),
            dry_run: false,
        }
    }

    pub fn with_cluster_folder(mut self, cluster_folder: Option<PathBuf>) -> Self {
        self.cluster_folder = cluster_folder;
        self
    }

    pub fn with_entry_file(mut self, entry_file: impl Into<String>) -> Self {
        self.entry_file = entry_file.into();
        self
    }

    pub fn with_patcher(mut self, patcher: PatchEngine) -> Self {
        self.patcher = patcher;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Walk the tree, then resolve and render every chart.
    pub fn resolve(&self, root: &Path) -> Result<ResolutionRun> {
        let mut walker = ManifestWalker::new(root).with_entry_file(&self.entry_file);
        walker.walk_cluster(self.cluster_folder.as_deref())?;
        let mut run = walker.finish();

        run.resolve_charts(self.locator);
        run.render_charts(self.engine)?;
        Ok(run)
    }

    /// Full cycle. Nothing is written unless every patch succeeds.
    pub fn execute(&self, root: &Path, recommendations: &[Recommendation]) -> Result<(ResolutionRun, RunReport)> {
        let mut run = self.resolve(root)?;
        let patched = run.apply(&self.patcher, recommendations)?;

        let written = if self.dry_run {
            writer::pending_locations(&run.documents)?
        } else {
            run.save()?
        };

        for warning in &run.warnings {
            warn!("{}", warning);
        }
        info!(
            "Patched {} of {} documents, {} files {}",
            patched,
            run.documents.len(),
            written.len(),
            if self.dry_run { "pending" } else { "written" }
        );

        let report = run.report(patched, written, self.dry_run);
        Ok((run, report))
    }
}
