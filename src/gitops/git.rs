//! Locating already-cloned git sources on the local filesystem.

use std::path::{Path, PathBuf};

/// Maps a git source URL to the local directory holding its working tree.
pub trait GitLocator {
    fn locate(&self, url: &str) -> PathBuf;
}

/// Locator for clones laid out as `<clone_root>/<host>/<repository path>`.
#[derive(Debug, Clone)]
pub struct ClonePathLocator {
    clone_root: PathBuf,
}

impl ClonePathLocator {
    pub fn new(clone_root: impl Into<PathBuf>) -> Self {
        Self {
            clone_root: clone_root.into(),
        }
    }

    pub fn clone_root(&self) -> &Path {
        &self.clone_root
    }
}

impl GitLocator for ClonePathLocator {
    fn locate(&self, url: &str) -> PathBuf {
        let (host, path) = split_git_url(url);
        let mut dir = self.clone_root.join(host);
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != "..") {
            dir.push(segment);
        }
        dir
    }
}

/// Split a git URL into host and repository path, without any `.git` suffix.
///
/// Handles `scheme://[user@]host[:port]/path` and scp-like `user@host:path`.
pub fn split_git_url(url: &str) -> (String, String) {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    let (authority, path) = match url.split_once("://") {
        Some((_, rest)) => rest.split_once('/').unwrap_or((rest, "")),
        None => match url.split_once(':') {
            Some((authority, path)) => (authority, path),
            None => ("", url),
        },
    };

    let host = authority.rsplit('@').next().unwrap_or(authority);
    (host.to_string(), path.trim_matches('/').to_string())
}
