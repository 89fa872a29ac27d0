//! Optimizer recommendations and decoding of the optimizer's JSON output.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{FluxfitError, Result};

/// Recommended resources for one workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub workload_name: String,
    pub workload_namespace: String,
    pub per_container: Vec<ContainerRecommendation>,
}

/// Recommended values for one labelled resource entry.
///
/// `None` means the optimizer had no recommendation for that slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerRecommendation {
    /// Entry label, e.g. `web - Overall`.
    pub label: String,
    pub cpu_request: Option<String>,
    pub cpu_limit: Option<String>,
    pub memory_request: Option<String>,
    pub memory_limit: Option<String>,
}

// ============================================================================
// Optimizer output
// ============================================================================

#[derive(Debug, Deserialize)]
struct WorkloadResult {
    #[serde(rename = "Properties", alias = "properties", default)]
    properties: HashMap<String, String>,
    #[serde(rename = "Resources", alias = "resources", default)]
    resources: Vec<ResourceResult>,
}

#[derive(Debug, Deserialize)]
struct ResourceResult {
    #[serde(rename = "Overview", alias = "overview", default)]
    overview: HashMap<String, String>,
    #[serde(rename = "Details", alias = "details", default)]
    details: HashMap<String, DetailValue>,
}

#[derive(Debug, Deserialize)]
struct DetailValue {
    #[serde(rename = "Recommended", alias = "recommended", default)]
    recommended: String,
}

impl ResourceResult {
    fn recommended(&self, key: &str) -> Option<String> {
        self.details
            .get(key)
            .map(|d| d.recommended.trim())
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    fn into_container(self) -> ContainerRecommendation {
        ContainerRecommendation {
            label: self.overview.get("name").cloned().unwrap_or_default(),
            cpu_request: self.recommended("cpu_request"),
            cpu_limit: self.recommended("cpu_limit"),
            memory_request: self.recommended("memory_request"),
            memory_limit: self.recommended("memory_limit"),
        }
    }
}

/// Decode the optimizer's JSON result into recommendations.
///
/// Records without a `name` property are skipped.
pub fn parse_recommendations(json: &str) -> std::result::Result<Vec<Recommendation>, serde_json::Error> {
    let results: Vec<WorkloadResult> = serde_json::from_str(json)?;

    Ok(results
        .into_iter()
        .filter_map(|result| {
            let Some(name) = result.properties.get("name").filter(|n| !n.is_empty()).cloned() else {
                warn!("Skipping optimizer result without a workload name");
                return None;
            };
            Some(Recommendation {
                workload_name: name,
                workload_namespace: result.properties.get("namespace").cloned().unwrap_or_default(),
                per_container: result
                    .resources
                    .into_iter()
                    .map(ResourceResult::into_container)
                    .collect(),
            })
        })
        .collect())
}

/// Read and decode an optimizer result file.
pub fn load_recommendations(path: &Path) -> Result<Vec<Recommendation>> {
    let content = fs::read_to_string(path).map_err(|e| FluxfitError::io(path, e))?;
    parse_recommendations(&content).map_err(|e| FluxfitError::parse(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"[
      {
        "Properties": {"name": "web", "namespace": "apps", "type": "Deployment"},
        "Resources": [
          {
            "Overview": {"name": "web - Overall"},
            "Details": {
              "cpu_request": {"Current": "100m", "Recommended": "250m"},
              "cpu_limit": {"Current": "1", "Recommended": ""},
              "memory_limit": {"Current": "1Gi", "Recommended": "512Mi"}
            }
          },
          {
            "Overview": {"name": "web - sidecar"},
            "Details": {}
          }
        ]
      },
      {
        "Properties": {"namespace": "apps"},
        "Resources": []
      }
    ]"#;

    #[test]
    fn test_parse_optimizer_output() {
        let recs = parse_recommendations(OUTPUT).unwrap();
        assert_eq!(recs.len(), 1);

        let rec = &recs[0];
        assert_eq!(rec.workload_name, "web");
        assert_eq!(rec.workload_namespace, "apps");
        assert_eq!(rec.per_container.len(), 2);

        let overall = &rec.per_container[0];
        assert_eq!(overall.label, "web - Overall");
        assert_eq!(overall.cpu_request.as_deref(), Some("250m"));
        assert_eq!(overall.cpu_limit, None);
        assert_eq!(overall.memory_request, None);
        assert_eq!(overall.memory_limit.as_deref(), Some("512Mi"));
    }

    #[test]
    fn test_lowercase_field_names() {
        let json = r#"[{"properties": {"name": "api"}, "resources": [{"overview": {"name": "api - Overall"}, "details": {"memory_request": {"recommended": "1.5 GiB"}}}]}]"#;
        let recs = parse_recommendations(json).unwrap();
        assert_eq!(recs[0].workload_namespace, "");
        assert_eq!(recs[0].per_container[0].memory_request.as_deref(), Some("1.5 GiB"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_recommendations(&path), Err(FluxfitError::Parse { .. })));
    }
}
