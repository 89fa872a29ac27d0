use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::gitops::walker::DEFAULT_ENTRY_FILE;
use crate::rightsize::DEFAULT_LABEL_SUFFIX;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gitops: GitOpsConfig,
    pub helm: HelmConfig,
    pub patch: PatchConfig,
}

/// Where the cluster tree and chart sources live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitOpsConfig {
    /// Cluster folder relative to the working tree. Searched for when unset.
    pub cluster_folder: Option<PathBuf>,
    pub entry_file: String,
    /// Directory holding already cloned chart sources, as `<host>/<path>`.
    pub clone_root: PathBuf,
}

impl Default for GitOpsConfig {
    fn default() -> Self {
        Self {
            cluster_folder: None,
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
            clone_root: std::env::temp_dir().join("fluxfit-gits"),
        }
    }
}

/// Chart rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    pub binary: String,
    pub kube_version: Option<String>,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            binary: "helm".to_string(),
            kube_version: None,
        }
    }
}

/// Recommendation matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    pub container_label_suffix: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            container_label_suffix: DEFAULT_LABEL_SUFFIX.to_string(),
        }
    }
}
