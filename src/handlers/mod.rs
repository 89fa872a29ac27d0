// Handler modules
pub mod apply;
pub mod output;
pub mod resolve;

pub use apply::{ApplyOptions, handle_apply};
pub use resolve::{ResolveOptions, handle_resolve};

use crate::config::types::Config;
use crate::gitops::ClonePathLocator;
use crate::gitops::charts::HelmTemplateEngine;
use crate::rightsize::PatchEngine;

/// Collaborators built from configuration, owned for the length of a command.
pub(crate) struct Collaborators {
    pub locator: ClonePathLocator,
    pub engine: HelmTemplateEngine,
    pub patcher: PatchEngine,
}

impl Collaborators {
    pub fn from_config(config: &Config) -> Self {
        Self {
            locator: ClonePathLocator::new(&config.gitops.clone_root),
            engine: HelmTemplateEngine::new(&config.helm.binary)
                .with_kube_version(config.helm.kube_version.clone()),
            patcher: PatchEngine::new(&config.patch.container_label_suffix),
        }
    }
}
