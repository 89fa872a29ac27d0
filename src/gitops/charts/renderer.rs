//! Rendering resolved charts into manifest documents.
//!
//! Template evaluation itself is delegated to a [`TemplateEngine`]; this
//! module owns value coalescing and splitting the rendered output.

use log::{debug, info, warn};
use serde_yaml::Value;
use std::collections::BTreeMap;

use super::loader::{LoadedChart, load_chart};
use super::values::coalesce_values;
use crate::error::{FluxfitError, Result};
use crate::gitops::flux::ObjectHeader;
use crate::gitops::split::split_documents;
use crate::gitops::store::DocumentStore;
use crate::gitops::types::{Chart, ManifestDocument};

/// Release information exposed to templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub release_name: String,
    pub namespace: String,
}

/// Rendered output keyed by template name (e.g. `podinfo/templates/deployment.yaml`).
pub type RenderedTemplates = BTreeMap<String, String>;

/// Evaluates a chart's templates against a final value set.
pub trait TemplateEngine {
    fn render(
        &self,
        chart: &LoadedChart,
        values: &Value,
        context: &RenderContext,
    ) -> std::result::Result<RenderedTemplates, String>;
}

/// Renders charts and appends their documents to a store.
pub struct ChartRenderer<'a> {
    engine: &'a dyn TemplateEngine,
}

impl<'a> ChartRenderer<'a> {
    pub fn new(engine: &'a dyn TemplateEngine) -> Self {
        Self { engine }
    }

    /// Load and render a chart with its release values coalesced over the defaults.
    pub fn render(&self, chart: &Chart) -> Result<RenderedTemplates> {
        let loaded = load_chart(&chart.location)?;
        if loaded.metadata.is_library() {
            debug!("Skipping library chart {}", loaded.metadata.name);
            return Ok(RenderedTemplates::new());
        }

        let overrides = chart.release.values.clone().unwrap_or(Value::Null);
        let values = coalesce_values(&loaded.default_values, &overrides);
        let context = RenderContext {
            release_name: chart.release.release_name.clone(),
            namespace: chart.release.target_namespace.clone(),
        };

        self.engine
            .render(&loaded, &values, &context)
            .map_err(|message| FluxfitError::Render {
                chart: chart.location.clone(),
                message,
            })
    }

    /// Render a chart and append every rendered document to `store`.
    ///
    /// Documents are located at `<rendered root>/<template name>` (see
    /// [`Chart::rendered_root`]) and the chart directory is marked read-only
    /// in the store. Returns the number of documents added.
    pub fn render_into(&self, chart: &Chart, store: &mut DocumentStore) -> Result<usize> {
        let rendered = self.render(chart)?;
        store.protect(&chart.location);

        let root = chart.rendered_root();
        let mut added = 0;

        for (template, output) in &rendered {
            let location = root.join(template);
            for body in split_documents(output) {
                let header = ObjectHeader::from_document(&body).unwrap_or_else(|e| {
                    warn!("{}: unreadable rendered document: {}", location.display(), e);
                    ObjectHeader::default()
                });
                store.push(ManifestDocument::new(header, &location, body));
                added += 1;
            }
        }

        info!(
            "Rendered {} documents from chart {} for release {}",
            added,
            chart.location.display(),
            chart.release.qualified_name()
        );
        Ok(added)
    }
}
