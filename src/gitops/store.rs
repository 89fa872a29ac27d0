//! Ordered collection of every manifest document in a run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::split::join_documents;
use super::types::ManifestDocument;

/// Documents in discovery order, addressable by index and grouped by location.
///
/// Passthrough documents take part in write-back only: [`iter`](Self::iter),
/// [`len`](Self::len) and identity lookups skip them. Indices address every
/// stored document.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<ManifestDocument>,
    read_only: Vec<PathBuf>,
}

/// All documents sharing one file location, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationGroup {
    pub location: PathBuf,
    pub content: String,
    pub changed: bool,
}

fn is_visible(doc: &&ManifestDocument) -> bool {
    !doc.passthrough
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: ManifestDocument) {
        self.documents.push(document);
    }

    pub fn extend(&mut self, documents: impl IntoIterator<Item = ManifestDocument>) {
        self.documents.extend(documents);
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestDocument> {
        self.documents.iter().filter(is_visible)
    }

    pub fn get(&self, idx: usize) -> Option<&ManifestDocument> {
        self.documents.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut ManifestDocument> {
        self.documents.get_mut(idx)
    }

    /// Index of the last document with the given identity.
    pub fn position(&self, kind: &str, api_version: &str, name: &str, namespace: &str) -> Option<usize> {
        self.documents
            .iter()
            .rposition(|doc| !doc.passthrough && doc.is(kind, api_version, name, namespace))
    }

    pub fn documents_at<'a>(&'a self, location: &'a Path) -> impl Iterator<Item = &'a ManifestDocument> {
        self.iter().filter(move |doc| doc.location == location)
    }

    /// Mark a directory as never writable (a chart's source files).
    pub fn protect(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.read_only.contains(&dir) {
            self.read_only.push(dir);
        }
    }

    /// The protected directory containing `location`, if any.
    pub fn protected_root(&self, location: &Path) -> Option<&Path> {
        self.read_only
            .iter()
            .find(|dir| location.starts_with(dir))
            .map(PathBuf::as_path)
    }

    /// Group documents by location, in order of each location's first appearance.
    pub fn group_by_location(&self) -> Vec<LocationGroup> {
        let mut order: Vec<&Path> = Vec::new();
        let mut bodies: HashMap<&Path, (Vec<&str>, bool)> = HashMap::new();

        for doc in &self.documents {
            let entry = bodies.entry(doc.location.as_path()).or_insert_with(|| {
                order.push(doc.location.as_path());
                (Vec::new(), false)
            });
            entry.0.push(doc.raw_content.as_str());
            entry.1 |= doc.changed;
        }

        order
            .into_iter()
            .filter_map(|location| {
                let (docs, changed) = bodies.remove(location)?;
                Some(LocationGroup {
                    location: location.to_path_buf(),
                    content: join_documents(&docs),
                    changed,
                })
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a DocumentStore {
    type Item = &'a ManifestDocument;
    type IntoIter = std::iter::Filter<std::slice::Iter<'a, ManifestDocument>, fn(&&'a ManifestDocument) -> bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents
            .iter()
            .filter(is_visible as fn(&&'a ManifestDocument) -> bool)
    }
}
