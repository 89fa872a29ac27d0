//! Recursive resolution of a Flux cluster tree.
//!
//! Starting from the cluster's `gotk-sync.yaml`, the walker follows plain
//! Kustomize `resources` lists and Flux `Kustomization` paths, captures
//! source and HelmRelease declarations, and stores every other document as
//! an opaque [`ManifestDocument`]. Captured declarations stay in the store as
//! passthrough bodies so rewriting their file keeps them.

use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::flux::{
    FLUX_KUSTOMIZE_API_VERSION, FluxKustomization, GIT_REPOSITORY_API_VERSION, GitRepository,
    HELM_RELEASE_API_VERSION, HELM_REPOSITORY_V1_API_VERSION, HELM_REPOSITORY_V2_API_VERSION,
    HelmRelease, HelmRepository, KUSTOMIZE_API_VERSION, KustomizeConfig, ObjectHeader,
};
use super::run::ResolutionRun;
use super::split::{split_documents, unescape_document};
use super::types::{HelmReleaseRecord, ManifestDocument, SourceEntry, SourceKind};
use crate::error::{FluxfitError, Result};

/// File that marks a Flux cluster folder.
pub const DEFAULT_ENTRY_FILE: &str = "gotk-sync.yaml";

/// Only files with this name trigger recursion when a directory is walked.
pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";

/// One split document being dispatched.
struct DocumentContext<'a> {
    /// File the document came from.
    path: &'a Path,
    /// Directory containing `path`.
    dir: &'a Path,
    header: &'a ObjectHeader,
    body: &'a str,
}

type Handler = fn(&mut ManifestWalker, &DocumentContext<'_>) -> Result<()>;

/// Handlers for the `(apiVersion, kind)` pairs the walker understands.
/// Anything missing from this table is stored as an opaque document.
static HANDLERS: &[(&str, &str, Handler)] = &[
    (KUSTOMIZE_API_VERSION, "Kustomization", ManifestWalker::on_kustomization),
    (FLUX_KUSTOMIZE_API_VERSION, "Kustomization", ManifestWalker::on_flux_kustomization),
    (HELM_RELEASE_API_VERSION, "HelmRelease", ManifestWalker::on_helm_release),
    (GIT_REPOSITORY_API_VERSION, "GitRepository", ManifestWalker::on_git_repository),
    (HELM_REPOSITORY_V1_API_VERSION, "HelmRepository", ManifestWalker::on_helm_repository_v1),
    (HELM_REPOSITORY_V2_API_VERSION, "HelmRepository", ManifestWalker::on_helm_repository_v2),
];

fn handler_for(api_version: &str, kind: &str) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(v, k, _)| *v == api_version && *k == kind)
        .map(|(_, _, handler)| *handler)
}

/// Whether an `(apiVersion, kind)` pair has a dedicated handler.
pub fn is_recognized(api_version: &str, kind: &str) -> bool {
    handler_for(api_version, kind).is_some()
}

/// Resolve a working tree into a fresh [`ResolutionRun`].
///
/// When `cluster_folder` is `None` the tree is searched for `gotk-sync.yaml`.
pub fn resolve(root: &Path, cluster_folder: Option<&Path>) -> Result<ResolutionRun> {
    let mut walker = ManifestWalker::new(root);
    walker.walk_cluster(cluster_folder)?;
    Ok(walker.finish())
}

/// Walks one working tree, accumulating into an owned [`ResolutionRun`].
pub struct ManifestWalker {
    root: PathBuf,
    entry_file: String,
    visited: HashSet<PathBuf>,
    run: ResolutionRun,
}

impl ManifestWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
            visited: HashSet::new(),
            run: ResolutionRun::default(),
        }
    }

    /// Use a different cluster entry file name.
    pub fn with_entry_file(mut self, entry_file: impl Into<String>) -> Self {
        self.entry_file = entry_file.into();
        self
    }

    pub fn finish(self) -> ResolutionRun {
        self.run
    }

    /// Locate the cluster folder (searching if needed) and walk from its entry file.
    pub fn walk_cluster(&mut self, cluster_folder: Option<&Path>) -> Result<()> {
        let folder = match cluster_folder.filter(|f| !f.as_os_str().is_empty()) {
            Some(folder) => self.root.join(folder),
            None => find_cluster_folder(&self.root, &self.entry_file)?,
        };
        debug!("Resolving cluster folder {}", folder.display());

        let entry = folder.join(&self.entry_file);
        self.walk(&entry)
    }

    /// Resolve a single file or directory.
    pub fn walk(&mut self, path: &Path) -> Result<()> {
        let canonical = fs::canonicalize(path).map_err(|e| FluxfitError::io(path, e))?;
        if !self.visited.insert(canonical) {
            debug!("Skipping already resolved path {}", path.display());
            return Ok(());
        }

        let metadata = fs::metadata(path).map_err(|e| FluxfitError::io(path, e))?;
        if metadata.is_dir() {
            self.walk_directory(path)
        } else if path.extension().is_some_and(|ext| ext == "yaml") {
            self.walk_file(path)
        } else {
            Err(FluxfitError::parse(path, "unknown file kind"))
        }
    }

    fn walk_directory(&mut self, dir: &Path) -> Result<()> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| FluxfitError::io(dir, e))? {
            let entry = entry.map_err(|e| FluxfitError::io(dir, e))?;
            names.push(entry.file_name());
        }
        names.sort();

        for name in names.into_iter().filter(|n| n == KUSTOMIZATION_FILE) {
            self.walk(&dir.join(name))?;
        }
        Ok(())
    }

    fn walk_file(&mut self, path: &Path) -> Result<()> {
        debug!("Reading manifests from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| FluxfitError::io(path, e))?;
        let dir = path.parent().unwrap_or(&self.root).to_path_buf();

        for body in split_documents(&content) {
            let header = self.parse_header(path, &body);
            let ctx = DocumentContext {
                path,
                dir: &dir,
                header: &header,
                body: &body,
            };

            match handler_for(&header.api_version, &header.kind) {
                Some(handler) => {
                    self.run.documents.push(ManifestDocument::new_passthrough(
                        header.clone(),
                        path,
                        body.clone(),
                    ));
                    handler(self, &ctx)?
                }
                None => self
                    .run
                    .documents
                    .push(ManifestDocument::new(header.clone(), path, body.clone())),
            }
        }
        Ok(())
    }

    fn parse_header(&mut self, path: &Path, body: &str) -> ObjectHeader {
        match ObjectHeader::from_document(body) {
            Ok(header) => header,
            Err(e) => {
                let message = format!("{}: unreadable document header: {}", path.display(), e);
                warn!("{}", message);
                self.run.warnings.push(message);
                ObjectHeader::default()
            }
        }
    }

    // ------------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------------

    fn on_kustomization(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        let kustomization: KustomizeConfig = decode(ctx)?;
        for resource in &kustomization.resources {
            if resource.contains("://") {
                let message = format!(
                    "{}: remote resource {} is not resolved",
                    ctx.path.display(),
                    resource
                );
                warn!("{}", message);
                self.run.warnings.push(message);
                continue;
            }
            self.walk(&ctx.dir.join(resource))?;
        }
        Ok(())
    }

    fn on_flux_kustomization(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        let kustomization: FluxKustomization = decode(ctx)?;
        let path = kustomization.spec.path.trim();
        if path.is_empty() {
            return Ok(());
        }
        let target = self.root.join(path.trim_start_matches('/'));
        self.walk(&target)
    }

    fn on_helm_release(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        let release: HelmRelease = decode(ctx)?;
        let name = release.metadata.name;
        let namespace = release.metadata.namespace;
        let release_name = release
            .spec
            .release_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| name.clone());
        let target_namespace = release
            .spec
            .target_namespace
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| namespace.clone());

        self.run.releases.push(HelmReleaseRecord {
            name,
            namespace,
            release_name,
            target_namespace,
            chart_name: release.spec.chart.spec.chart,
            source_ref: release.spec.chart.spec.source_ref,
            values: release.spec.values,
            location: ctx.path.to_path_buf(),
        });
        Ok(())
    }

    fn on_git_repository(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        let repo: GitRepository = decode(ctx)?;
        self.run.registry.insert(SourceEntry {
            kind: SourceKind::GitRepository,
            name: repo.metadata.name,
            namespace: repo.metadata.namespace,
            url: repo.spec.url,
            reference: repo.spec.reference.and_then(|r| r.as_reference()),
            credentials_ref: repo.spec.secret_ref.map(|s| s.name),
        });
        Ok(())
    }

    fn on_helm_repository_v1(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        self.insert_helm_repository(ctx, SourceKind::HelmRepositoryV1)
    }

    fn on_helm_repository_v2(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        self.insert_helm_repository(ctx, SourceKind::HelmRepositoryV2)
    }

    fn insert_helm_repository(&mut self, ctx: &DocumentContext<'_>, kind: SourceKind) -> Result<()> {
        let repo: HelmRepository = decode(ctx)?;
        self.run.registry.insert(SourceEntry {
            kind,
            name: repo.metadata.name,
            namespace: repo.metadata.namespace,
            url: repo.spec.url,
            reference: None,
            credentials_ref: repo.spec.secret_ref.map(|s| s.name),
        });
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(ctx: &DocumentContext<'_>) -> Result<T> {
    serde_yaml::from_str(&unescape_document(ctx.body)).map_err(|e| {
        FluxfitError::parse(
            ctx.path,
            format!("failed to parse {} yaml: {}", ctx.header.kind, e),
        )
    })
}

/// Find the directory containing the cluster entry file.
pub fn find_cluster_folder(root: &Path, entry_file: &str) -> Result<PathBuf> {
    walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name() == entry_file)
        .and_then(|e| e.path().parent().map(Path::to_path_buf))
        .ok_or_else(|| {
            FluxfitError::NotFound(format!("no {} under {}", entry_file, root.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_dispatch_table_covers_recognized_pairs() {
        assert!(is_recognized(KUSTOMIZE_API_VERSION, "Kustomization"));
        assert!(is_recognized(FLUX_KUSTOMIZE_API_VERSION, "Kustomization"));
        assert!(is_recognized(HELM_RELEASE_API_VERSION, "HelmRelease"));
        assert!(is_recognized(GIT_REPOSITORY_API_VERSION, "GitRepository"));
        assert!(is_recognized(HELM_REPOSITORY_V1_API_VERSION, "HelmRepository"));
        assert!(is_recognized(HELM_REPOSITORY_V2_API_VERSION, "HelmRepository"));
        assert!(!is_recognized("apps/v1", "Deployment"));
        assert!(!is_recognized(KUSTOMIZE_API_VERSION, "HelmRelease"));
    }

    #[test]
    fn test_missing_entry_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "apps/app.yaml", "kind: ConfigMap\n");

        let err = resolve(dir.path(), None).unwrap_err();
        assert!(matches!(err, FluxfitError::NotFound(_)));
    }

    #[test]
    fn test_non_yaml_resource_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "clusters/prod/gotk-sync.yaml",
            "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - README.md\n",
        );
        write(dir.path(), "clusters/prod/README.md", "# hi\n");

        let err = resolve(dir.path(), None).unwrap_err();
        assert!(matches!(err, FluxfitError::Parse { .. }));
    }

    #[test]
    fn test_directory_only_follows_kustomization_file() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "clusters/prod/gotk-sync.yaml",
            "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - ../../apps\n",
        );
        write(
            dir.path(),
            "apps/kustomization.yaml",
            "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - web.yaml\n",
        );
        write(dir.path(), "apps/web.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: web\n");
        write(dir.path(), "apps/ignored.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: ignored\n");

        let run = resolve(dir.path(), None).unwrap();
        let names: Vec<_> = run.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["web"]);
    }

    #[test]
    fn test_cycles_are_resolved_once() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "clusters/prod/gotk-sync.yaml",
            "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - loop.yaml\n",
        );
        write(
            dir.path(),
            "clusters/prod/loop.yaml",
            "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - gotk-sync.yaml\n  - cm.yaml\n---\napiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - cm.yaml\n",
        );
        write(dir.path(), "clusters/prod/cm.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: once\n");

        let run = resolve(dir.path(), None).unwrap();
        assert_eq!(run.documents.len(), 1);
    }

    #[test]
    fn test_explicit_cluster_folder() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "clusters/staging/gotk-sync.yaml",
            "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: staging\n",
        );
        write(
            dir.path(),
            "clusters/prod/gotk-sync.yaml",
            "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: prod\n",
        );

        let run = resolve(dir.path(), Some(Path::new("clusters/prod"))).unwrap();
        assert_eq!(run.documents.iter().next().unwrap().name, "prod");
    }

    #[test]
    fn test_remote_resources_are_skipped_with_warning() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "gotk-sync.yaml",
            "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - https://github.com/fluxcd/flux2/manifests/install\n",
        );

        let run = resolve(dir.path(), None).unwrap();
        assert!(run.documents.is_empty());
        assert_eq!(run.warnings.len(), 1);
    }

    #[test]
    fn test_captured_declarations_survive_regrouping() {
        let dir = TempDir::new().unwrap();
        let bundle = "apiVersion: source.toolkit.fluxcd.io/v1\nkind: GitRepository\nmetadata:\n  name: charts\n  namespace: flux-system\nspec:\n  url: https://github.com/acme/charts.git\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: settings\n";
        write(
            dir.path(),
            "clusters/prod/gotk-sync.yaml",
            "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - bundle.yaml\n",
        );
        write(dir.path(), "clusters/prod/bundle.yaml", bundle);

        let run = resolve(dir.path(), None).unwrap();
        assert_eq!(run.documents.len(), 1);
        assert_eq!(run.registry.len(), 1);

        let location = dir.path().join("clusters/prod/bundle.yaml");
        let group = run
            .documents
            .group_by_location()
            .into_iter()
            .find(|g| g.location == location)
            .unwrap();
        assert_eq!(group.content, bundle);
    }
}
