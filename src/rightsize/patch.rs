//! Applying recommendations to Deployment documents.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Container, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity as K8sQuantity;
use log::{debug, info, warn};
use std::collections::BTreeMap;

use super::quantity::{Quantity, parse_cpu, parse_memory};
use super::recommendation::{ContainerRecommendation, Recommendation};
use crate::error::{FluxfitError, Result};
use crate::gitops::split::unescape_document;
use crate::gitops::store::DocumentStore;

/// Suffix the optimizer appends to a container name to label its overall entry.
pub const DEFAULT_LABEL_SUFFIX: &str = " - Overall";

const DEPLOYMENT_KIND: &str = "Deployment";
const DEPLOYMENT_API_VERSION: &str = "apps/v1";

/// Result of applying a batch of recommendations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Number of Deployment documents rewritten.
    pub patched: usize,
    /// Recommendations that matched no Deployment.
    pub warnings: Vec<String>,
}

/// Rewrites container resources of Deployments in a [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct PatchEngine {
    label_suffix: String,
}

impl Default for PatchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_SUFFIX)
    }
}

impl PatchEngine {
    pub fn new(label_suffix: impl Into<String>) -> Self {
        Self {
            label_suffix: label_suffix.into(),
        }
    }

    /// Apply every recommendation.
    ///
    /// A recommendation without a matching Deployment becomes a warning. An
    /// unparseable quantity fails the whole batch.
    pub fn apply(&self, store: &mut DocumentStore, recommendations: &[Recommendation]) -> Result<PatchOutcome> {
        let mut outcome = PatchOutcome::default();

        for rec in recommendations {
            let Some(idx) = store.position(
                DEPLOYMENT_KIND,
                DEPLOYMENT_API_VERSION,
                &rec.workload_name,
                &rec.workload_namespace,
            ) else {
                let message = format!(
                    "deployment template not found {} {}",
                    rec.workload_name, rec.workload_namespace
                );
                warn!("{}", message);
                outcome.warnings.push(message);
                continue;
            };

            let Some(document) = store.get_mut(idx) else {
                continue;
            };
            let mut deployment: Deployment = serde_yaml::from_str(&unescape_document(&document.raw_content))
                .map_err(|e| FluxfitError::parse(&document.location, format!("invalid Deployment: {}", e)))?;

            let touched = self.patch_deployment(&mut deployment, rec)?;
            if touched == 0 {
                debug!(
                    "No container of {}/{} matches a recommendation",
                    rec.workload_namespace, rec.workload_name
                );
                continue;
            }

            let content = serde_yaml::to_string(&deployment)
                .map_err(|e| FluxfitError::parse(&document.location, format!("cannot encode Deployment: {}", e)))?;
            document.update_content(content);
            outcome.patched += 1;
            info!(
                "Patched {} container(s) of Deployment {}/{} in {}",
                touched,
                rec.workload_namespace,
                rec.workload_name,
                document.location.display()
            );
        }

        Ok(outcome)
    }

    /// Patch matching containers in place. Returns how many matched.
    fn patch_deployment(&self, deployment: &mut Deployment, rec: &Recommendation) -> Result<usize> {
        let Some(pod_spec) = deployment
            .spec
            .as_mut()
            .and_then(|spec| spec.template.spec.as_mut())
        else {
            return Ok(0);
        };

        let mut touched = 0;
        for container in &mut pod_spec.containers {
            let label = format!("{}{}", container.name, self.label_suffix);
            if let Some(entry) = rec.per_container.iter().rfind(|c| c.label == label) {
                replace_resources(container, entry)?;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

/// Replace requests and limits with exactly the recommended slots.
fn replace_resources(container: &mut Container, entry: &ContainerRecommendation) -> Result<()> {
    let mut requests = BTreeMap::new();
    let mut limits = BTreeMap::new();

    insert_quantity(&mut requests, "cpu", entry.cpu_request.as_deref(), parse_cpu)?;
    insert_quantity(&mut requests, "memory", entry.memory_request.as_deref(), parse_memory)?;
    insert_quantity(&mut limits, "cpu", entry.cpu_limit.as_deref(), parse_cpu)?;
    insert_quantity(&mut limits, "memory", entry.memory_limit.as_deref(), parse_memory)?;

    let resources = container.resources.get_or_insert_with(ResourceRequirements::default);
    resources.requests = (!requests.is_empty()).then_some(requests);
    resources.limits = (!limits.is_empty()).then_some(limits);
    Ok(())
}

fn insert_quantity(
    map: &mut BTreeMap<String, K8sQuantity>,
    key: &str,
    value: Option<&str>,
    parse: fn(&str) -> Result<Quantity>,
) -> Result<()> {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        map.insert(key.to_string(), parse(value)?.to_k8s());
    }
    Ok(())
}
