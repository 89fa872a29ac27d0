//! Loading chart metadata and default values from a chart directory.

use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FluxfitError, Result};

const CHART_FILES: &[&str] = &["Chart.yaml", "Chart.yml"];
const VALUES_FILES: &[&str] = &["values.yaml", "values.yml"];

/// The subset of `Chart.yaml` the renderer needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartMetadata {
    #[serde(rename = "apiVersion", default)]
    pub api_version: Option<String>,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "type", default)]
    pub chart_type: Option<String>,
}

impl ChartMetadata {
    pub fn is_library(&self) -> bool {
        self.chart_type.as_deref() == Some("library")
    }
}

/// A chart read from disk, ready to be rendered.
#[derive(Debug, Clone)]
pub struct LoadedChart {
    pub dir: PathBuf,
    pub metadata: ChartMetadata,
    /// The chart's own `values.yaml` (an empty mapping if absent).
    pub default_values: Value,
}

/// Load a chart directory.
pub fn load_chart(dir: &Path) -> Result<LoadedChart> {
    let render_error = |message: String| FluxfitError::Render {
        chart: dir.to_path_buf(),
        message,
    };

    let chart_file = CHART_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| render_error("no Chart.yaml found".to_string()))?;

    let content = fs::read_to_string(&chart_file)
        .map_err(|e| render_error(format!("failed to read {}: {}", chart_file.display(), e)))?;
    let metadata: ChartMetadata = serde_yaml::from_str(&content)
        .map_err(|e| render_error(format!("invalid Chart.yaml: {}", e)))?;

    let default_values = match VALUES_FILES.iter().map(|n| dir.join(n)).find(|p| p.is_file()) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .map_err(|e| render_error(format!("failed to read {}: {}", path.display(), e)))?;
            match serde_yaml::from_str::<Value>(&content)
                .map_err(|e| render_error(format!("invalid values.yaml: {}", e)))?
            {
                Value::Null => Value::Mapping(Default::default()),
                values => values,
            }
        }
        None => Value::Mapping(Default::default()),
    };

    Ok(LoadedChart {
        dir: dir.to_path_buf(),
        metadata,
        default_values,
    })
}
