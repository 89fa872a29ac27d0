//! Core data model of a resolution run.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::flux::{CrossNamespaceObjectReference, ObjectHeader};

// ============================================================================
// Manifest documents
// ============================================================================

/// One YAML document discovered in the working tree or rendered from a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestDocument {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
    /// File the document is written back to. Several documents may share it.
    pub location: PathBuf,
    /// The document body exactly as split from its file (or re-serialized by a patch).
    #[serde(skip)]
    pub raw_content: String,
    pub changed: bool,
    /// Kept only so its file is rewritten whole. Hidden from lookups and the inventory.
    #[serde(skip)]
    pub passthrough: bool,
}

impl ManifestDocument {
    pub fn new(header: ObjectHeader, location: impl Into<PathBuf>, raw_content: String) -> Self {
        Self {
            api_version: header.api_version,
            kind: header.kind,
            name: header.metadata.name,
            namespace: header.metadata.namespace,
            location: location.into(),
            raw_content,
            changed: false,
            passthrough: false,
        }
    }

    /// A document the walker consumed (source, release or Kustomization).
    pub fn new_passthrough(header: ObjectHeader, location: impl Into<PathBuf>, raw_content: String) -> Self {
        Self {
            passthrough: true,
            ..Self::new(header, location, raw_content)
        }
    }

    /// Whether the document is the `(kind, apiVersion, name, namespace)` identity given.
    pub fn is(&self, kind: &str, api_version: &str, name: &str, namespace: &str) -> bool {
        self.kind == kind
            && self.api_version == api_version
            && self.name == name
            && self.namespace == namespace
    }

    /// Replace the body and flag the document for write-back.
    pub fn update_content(&mut self, content: String) {
        self.raw_content = content;
        self.changed = true;
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Kind of a Flux source declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceKind {
    GitRepository,
    HelmRepositoryV1,
    HelmRepositoryV2,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitRepository => "GitRepository",
            Self::HelmRepositoryV1 => "HelmRepository (v1beta1)",
            Self::HelmRepositoryV2 => "HelmRepository (v1beta2)",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A GitRepository or HelmRepository declared somewhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub kind: SourceKind,
    pub name: String,
    pub namespace: String,
    pub url: String,
    /// Branch, tag, semver range or commit for git sources.
    pub reference: Option<String>,
    /// Name of the secret holding credentials, if any.
    pub credentials_ref: Option<String>,
}

// ============================================================================
// Helm releases and charts
// ============================================================================

/// A HelmRelease captured during the walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HelmReleaseRecord {
    pub name: String,
    pub namespace: String,
    /// Release name used when rendering (`spec.releaseName` or `metadata.name`).
    pub release_name: String,
    /// Namespace exposed to templates (`spec.targetNamespace` or the release namespace).
    pub target_namespace: String,
    /// Path of the chart inside its source.
    pub chart_name: String,
    pub source_ref: CrossNamespaceObjectReference,
    #[serde(skip)]
    pub values: Option<serde_yaml::Value>,
    /// File the release was declared in.
    pub location: PathBuf,
}

impl HelmReleaseRecord {
    /// Namespace of the referenced source, defaulting to the release namespace.
    pub fn source_namespace(&self) -> &str {
        self.source_ref
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(&self.namespace)
    }

    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

/// A release resolved to a chart directory on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub location: PathBuf,
    pub release: HelmReleaseRecord,
}

/// Directory, next to a chart, that holds its rendered output.
pub const RENDERED_DIR: &str = ".rendered";

impl Chart {
    /// Directory rendered documents are located under:
    /// `<chart parent>/.rendered/<target namespace>/<release name>`.
    ///
    /// It lies outside the chart directory, so patched output never lands on a template.
    pub fn rendered_root(&self) -> PathBuf {
        self.location
            .parent()
            .unwrap_or(&self.location)
            .join(RENDERED_DIR)
            .join(&self.release.target_namespace)
            .join(&self.release.release_name)
    }
}
