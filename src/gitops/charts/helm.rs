//! [`TemplateEngine`] backed by the `helm template` command.

use log::debug;
use serde_yaml::Value;
use std::io::Write;
use std::process::Command;

use super::loader::LoadedChart;
use super::renderer::{RenderContext, RenderedTemplates, TemplateEngine};
use super::values::restore_deletions;
use crate::gitops::split::{join_documents, split_documents};

const SOURCE_MARKER: &str = "# Source: ";

/// Shells out to `helm template` with the coalesced values in a temporary file.
///
/// Defaults the release deleted are written as explicit nulls.
#[derive(Debug, Clone)]
pub struct HelmTemplateEngine {
    binary: String,
    kube_version: Option<String>,
}

impl Default for HelmTemplateEngine {
    fn default() -> Self {
        Self::new("helm")
    }
}

impl HelmTemplateEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            kube_version: None,
        }
    }

    pub fn with_kube_version(mut self, kube_version: Option<String>) -> Self {
        self.kube_version = kube_version;
        self
    }

    /// Check if the helm binary can be executed.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("version")
            .arg("--short")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl TemplateEngine for HelmTemplateEngine {
    fn render(
        &self,
        chart: &LoadedChart,
        values: &Value,
        context: &RenderContext,
    ) -> Result<RenderedTemplates, String> {
        if !self.is_available() {
            return Err(format!("{} binary not found in PATH", self.binary));
        }

        let mut values_file = tempfile::Builder::new()
            .prefix("fluxfit-values-")
            .suffix(".yaml")
            .tempfile()
            .map_err(|e| format!("failed to create values file: {}", e))?;
        let values = restore_deletions(&chart.default_values, values);
        let values_yaml =
            serde_yaml::to_string(&values).map_err(|e| format!("failed to encode values: {}", e))?;
        values_file
            .write_all(values_yaml.as_bytes())
            .map_err(|e| format!("failed to write values file: {}", e))?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg("template")
            .arg(&context.release_name)
            .arg(&chart.dir)
            .arg("--namespace")
            .arg(&context.namespace)
            .arg("-f")
            .arg(values_file.path());
        if let Some(kube_version) = &self.kube_version {
            cmd.arg("--kube-version").arg(kube_version);
        }

        debug!("Running {:?}", cmd);
        let output = cmd.output().map_err(|e| e.to_string())?;
        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
        }

        Ok(split_rendered_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Group `helm template` output by the template named in each `# Source:` line.
///
/// Documents without a source marker are dropped.
pub fn split_rendered_output(output: &str) -> RenderedTemplates {
    let mut grouped: std::collections::BTreeMap<String, Vec<String>> = Default::default();

    for doc in split_documents(output) {
        let Some((first, rest)) = doc.split_once('\n') else {
            continue;
        };
        let Some(template) = first.strip_prefix(SOURCE_MARKER) else {
            continue;
        };
        grouped
            .entry(template.trim().to_string())
            .or_default()
            .push(rest.to_string());
    }

    grouped
        .into_iter()
        .map(|(template, docs)| (template, join_documents(&docs)))
        .collect()
}
