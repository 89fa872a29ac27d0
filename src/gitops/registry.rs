//! Registry of Flux source declarations collected during a walk.

use serde::Serialize;

use super::types::{SourceEntry, SourceKind};

/// GitRepository and HelmRepository declarations, one list per kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceRegistry {
    git_repositories: Vec<SourceEntry>,
    helm_repositories_v1: Vec<SourceEntry>,
    helm_repositories_v2: Vec<SourceEntry>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source in the list matching its kind.
    pub fn insert(&mut self, entry: SourceEntry) {
        self.list_mut(entry.kind).push(entry);
    }

    /// Find a source of the given kind by name and namespace.
    pub fn find(&self, kind: SourceKind, name: &str, namespace: &str) -> Option<&SourceEntry> {
        self.list(kind)
            .iter()
            .find(|entry| entry.name == name && entry.namespace == namespace)
    }

    pub fn entries(&self, kind: SourceKind) -> &[SourceEntry] {
        self.list(kind)
    }

    /// All sources, git repositories first.
    pub fn iter(&self) -> impl Iterator<Item = &SourceEntry> {
        self.git_repositories
            .iter()
            .chain(&self.helm_repositories_v1)
            .chain(&self.helm_repositories_v2)
    }

    pub fn len(&self) -> usize {
        self.git_repositories.len() + self.helm_repositories_v1.len() + self.helm_repositories_v2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn list(&self, kind: SourceKind) -> &Vec<SourceEntry> {
        match kind {
            SourceKind::GitRepository => &self.git_repositories,
            SourceKind::HelmRepositoryV1 => &self.helm_repositories_v1,
            SourceKind::HelmRepositoryV2 => &self.helm_repositories_v2,
        }
    }

    fn list_mut(&mut self, kind: SourceKind) -> &mut Vec<SourceEntry> {
        match kind {
            SourceKind::GitRepository => &mut self.git_repositories,
            SourceKind::HelmRepositoryV1 => &mut self.helm_repositories_v1,
            SourceKind::HelmRepositoryV2 => &mut self.helm_repositories_v2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: SourceKind, name: &str, namespace: &str) -> SourceEntry {
        SourceEntry {
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
            url: format!("https://example.com/{}", name),
            reference: None,
            credentials_ref: None,
        }
    }

    #[test]
    fn test_find_matches_kind_name_and_namespace() {
        let mut registry = SourceRegistry::new();
        registry.insert(entry(SourceKind::GitRepository, "charts", "flux-system"));
        registry.insert(entry(SourceKind::HelmRepositoryV2, "charts", "flux-system"));

        assert_eq!(registry.len(), 2);
        assert!(registry
            .find(SourceKind::GitRepository, "charts", "flux-system")
            .is_some());
        assert!(registry.find(SourceKind::GitRepository, "charts", "apps").is_none());
        assert!(registry
            .find(SourceKind::HelmRepositoryV1, "charts", "flux-system")
            .is_none());
        assert_eq!(registry.entries(SourceKind::HelmRepositoryV2).len(), 1);
    }
}
