//! Typed bodies for the Kustomize and Flux CRDs the walker understands.
//!
//! Only the fields the resolver reads are modelled; everything else in a
//! manifest is ignored on decode.

use serde::{Deserialize, Serialize};

use super::split::unescape_document;

pub const KUSTOMIZE_API_VERSION: &str = "kustomize.config.k8s.io/v1beta1";
pub const FLUX_KUSTOMIZE_API_VERSION: &str = "kustomize.toolkit.fluxcd.io/v1";
pub const HELM_RELEASE_API_VERSION: &str = "helm.toolkit.fluxcd.io/v2beta1";
pub const GIT_REPOSITORY_API_VERSION: &str = "source.toolkit.fluxcd.io/v1";
pub const HELM_REPOSITORY_V1_API_VERSION: &str = "source.toolkit.fluxcd.io/v1beta1";
pub const HELM_REPOSITORY_V2_API_VERSION: &str = "source.toolkit.fluxcd.io/v1beta2";

/// Object metadata subset shared by every manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

/// The `apiVersion`/`kind`/`metadata` header of any manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectHeader {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
}

impl ObjectHeader {
    /// Read the header of a document body.
    ///
    /// Documents that are not mappings (empty, comment-only, scalars) and
    /// mappings with unexpected header shapes yield an empty header.
    pub fn from_document(body: &str) -> Result<Self, serde_yaml::Error> {
        match serde_yaml::from_str::<serde_yaml::Value>(&unescape_document(body))? {
            value @ serde_yaml::Value::Mapping(_) => Ok(serde_yaml::from_value(value).unwrap_or_default()),
            _ => Ok(Self::default()),
        }
    }
}

/// A plain Kustomize `kustomization.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KustomizeConfig {
    #[serde(default)]
    pub resources: Vec<String>,
}

/// A Flux `Kustomization` reconciled by the kustomize-controller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FluxKustomization {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: FluxKustomizationSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FluxKustomizationSpec {
    #[serde(default)]
    pub path: String,
}

/// A Flux `HelmRelease`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HelmRelease {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: HelmReleaseSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmReleaseSpec {
    #[serde(default)]
    pub release_name: Option<String>,
    #[serde(default)]
    pub target_namespace: Option<String>,
    #[serde(default)]
    pub chart: HelmChartTemplate,
    #[serde(default)]
    pub values: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HelmChartTemplate {
    #[serde(default)]
    pub spec: HelmChartTemplateSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartTemplateSpec {
    #[serde(default)]
    pub chart: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub source_ref: CrossNamespaceObjectReference,
}

/// Reference from a HelmRelease to its chart source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossNamespaceObjectReference {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// A Flux `GitRepository` source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitRepository {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: GitRepositorySpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySpec {
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "ref")]
    pub reference: Option<GitRepositoryRef>,
    #[serde(default)]
    pub secret_ref: Option<LocalObjectReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitRepositoryRef {
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub semver: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
}

impl GitRepositoryRef {
    /// The most specific reference set on the source.
    pub fn as_reference(&self) -> Option<String> {
        self.commit
            .clone()
            .or_else(|| self.tag.clone())
            .or_else(|| self.semver.clone())
            .or_else(|| self.branch.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectReference {
    #[serde(default)]
    pub name: String,
}

/// A Flux `HelmRepository` source (v1beta1 and v1beta2 share this shape).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HelmRepository {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: HelmRepositorySpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmRepositorySpec {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub secret_ref: Option<LocalObjectReference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helm_release_decodes_chart_and_values() {
        let release: HelmRelease = serde_yaml::from_str(
            r#"
apiVersion: helm.toolkit.fluxcd.io/v2beta1
kind: HelmRelease
metadata:
  name: podinfo
  namespace: apps
spec:
  releaseName: web
  targetNamespace: frontend
  chart:
    spec:
      chart: ./charts/podinfo
      sourceRef:
        kind: GitRepository
        name: podinfo
        namespace: flux-system
  values:
    replicaCount: 2
"#,
        )
        .unwrap();

        assert_eq!(release.metadata.name, "podinfo");
        assert_eq!(release.spec.release_name.as_deref(), Some("web"));
        assert_eq!(release.spec.chart.spec.chart, "./charts/podinfo");
        assert_eq!(release.spec.chart.spec.source_ref.kind, "GitRepository");
        assert_eq!(
            release.spec.chart.spec.source_ref.namespace.as_deref(),
            Some("flux-system")
        );
        assert!(release.spec.values.is_some());
    }

    #[test]
    fn test_git_repository_reference_prefers_commit() {
        let repo: GitRepository = serde_yaml::from_str(
            r#"
metadata:
  name: infra
spec:
  url: https://github.com/acme/infra
  ref:
    branch: main
    commit: 0a1b2c
"#,
        )
        .unwrap();

        let reference = repo.spec.reference.unwrap().as_reference();
        assert_eq!(reference.as_deref(), Some("0a1b2c"));
    }

    #[test]
    fn test_header_from_empty_or_comment_document() {
        assert_eq!(ObjectHeader::from_document("").unwrap(), ObjectHeader::default());
        assert_eq!(
            ObjectHeader::from_document("# only a comment\n").unwrap(),
            ObjectHeader::default()
        );
        assert!(ObjectHeader::from_document("a: [unclosed\n").is_err());
    }

    #[test]
    fn test_header_tolerates_missing_fields() {
        let header: ObjectHeader = serde_yaml::from_str("kind: Namespace\n").unwrap();
        assert_eq!(header.kind, "Namespace");
        assert!(header.api_version.is_empty());
        assert!(header.metadata.name.is_empty());
    }
}
