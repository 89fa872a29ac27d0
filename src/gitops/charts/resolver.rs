//! Mapping HelmReleases to chart directories.

use log::{debug, warn};
use std::path::{Component, Path, PathBuf};

use crate::error::FluxfitError;
use crate::gitops::git::GitLocator;
use crate::gitops::registry::SourceRegistry;
use crate::gitops::types::{Chart, HelmReleaseRecord, SourceKind};

/// Outcome of resolving a batch of releases.
#[derive(Debug, Default)]
pub struct ChartResolution {
    pub charts: Vec<Chart>,
    /// Releases that produced no chart. Always [`FluxfitError::Resolution`].
    pub skipped: Vec<FluxfitError>,
}

/// Resolve every release to a chart directory.
///
/// A release that cannot be resolved is logged and skipped; it never aborts
/// the batch.
pub fn resolve_charts(
    releases: &[HelmReleaseRecord],
    registry: &SourceRegistry,
    locator: &dyn GitLocator,
) -> ChartResolution {
    let mut resolution = ChartResolution::default();

    for release in releases {
        match resolve_chart(release, registry, locator) {
            Ok(chart) => {
                debug!(
                    "Release {} uses chart at {}",
                    release.qualified_name(),
                    chart.location.display()
                );
                resolution.charts.push(chart);
            }
            Err(e) => {
                warn!("{}", e);
                resolution.skipped.push(e);
            }
        }
    }

    resolution
}

fn resolve_chart(
    release: &HelmReleaseRecord,
    registry: &SourceRegistry,
    locator: &dyn GitLocator,
) -> Result<Chart, FluxfitError> {
    let source_ref = &release.source_ref;
    let unresolved = |message: String| FluxfitError::Resolution {
        release: release.qualified_name(),
        message,
    };

    match source_ref.kind.as_str() {
        "GitRepository" => {
            let namespace = release.source_namespace();
            let source = registry
                .find(SourceKind::GitRepository, &source_ref.name, namespace)
                .ok_or_else(|| {
                    unresolved(format!(
                        "no GitRepository {}/{} declared",
                        namespace, source_ref.name
                    ))
                })?;

            let local_dir = locator.locate(&source.url);
            Ok(Chart {
                location: local_dir.join(relative_chart_path(&release.chart_name)),
                release: release.clone(),
            })
        }
        // TODO: render HelmRepository charts once a chart pull step exists.
        "HelmRepository" => Err(unresolved(format!(
            "HelmRepository source {} is not supported",
            source_ref.name
        ))),
        other => Err(unresolved(format!("unknown source ref kind '{}'", other))),
    }
}

/// Chart path inside its source, without `.` or root components.
fn relative_chart_path(chart: &str) -> PathBuf {
    Path::new(chart)
        .components()
        .filter(|c| matches!(c, Component::Normal(_) | Component::ParentDir))
        .collect()
}
