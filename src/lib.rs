//! # fluxfit
//!
//! Resolves a Flux GitOps repository into a flat inventory of Kubernetes
//! manifests and applies resource right-sizing recommendations to the
//! Deployments it declares.
//!
//! ## Features
//!
//! - **Tree resolution**: follows Kustomize `resources`, Flux `Kustomization`
//!   paths and HelmReleases from the cluster's `gotk-sync.yaml`
//! - **Chart rendering**: HelmReleases backed by a GitRepository are rendered
//!   with their values coalesced over the chart defaults
//! - **Patching**: container requests and limits are replaced from optimizer output
//! - **Minimal diffs**: only files holding a patched document are rewritten
//!
//! ## Example
//!
//! ```rust,no_run
//! use fluxfit::gitops::{ClonePathLocator, Pipeline};
//! use fluxfit::gitops::charts::HelmTemplateEngine;
//! use fluxfit::rightsize::load_recommendations;
//! use std::path::Path;
//!
//! # fn main() -> fluxfit::Result<()> {
//! let locator = ClonePathLocator::new("/tmp/fluxfit-gits");
//! let engine = HelmTemplateEngine::default();
//! let recommendations = load_recommendations(Path::new("out.json"))?;
//!
//! let (_, report) = Pipeline::new(&locator, &engine).execute(Path::new("./fleet"), &recommendations)?;
//! println!("patched {} deployments", report.patched);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod gitops;
pub mod handlers;
pub mod rightsize;

// Re-export commonly used types and functions
pub use error::{FluxfitError, Result};
pub use gitops::{DocumentStore, ManifestWalker, Pipeline, ResolutionRun, RunReport, resolve};
pub use rightsize::{PatchEngine, Recommendation};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
