//! GitOps tree resolution.
//!
//! Walks a Flux cluster repository into a [`DocumentStore`], resolves and
//! renders the HelmReleases it declares, and writes patched documents back.

pub mod charts;
pub mod flux;
pub mod git;
pub mod registry;
pub mod run;
pub mod split;
pub mod store;
pub mod types;
pub mod walker;
pub mod writer;

pub use git::{ClonePathLocator, GitLocator};
pub use registry::SourceRegistry;
pub use run::{Pipeline, ResolutionRun, RunReport};
pub use split::{join_documents, split_documents, unescape_document};
pub use store::{DocumentStore, LocationGroup};
pub use types::{Chart, HelmReleaseRecord, ManifestDocument, SourceEntry, SourceKind};
pub use walker::{ManifestWalker, find_cluster_folder, resolve};
