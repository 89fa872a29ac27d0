pub mod types;

use crate::error::{FluxfitError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".fluxfit.toml";

/// Get the global config file path (~/.fluxfit.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (<working tree>/.fluxfit.toml)
pub fn local_config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_FILE_NAME)
}

/// Load configuration.
///
/// An explicit file must exist. Otherwise the working tree's file is tried,
/// then the global one, then defaults.
pub fn load_config(project_path: Option<&Path>, explicit: Option<&Path>) -> Result<types::Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    if let Some(local) = project_path.map(local_config_path).filter(|p| p.exists()) {
        return read_config(&local);
    }

    match global_config_path().filter(|p| p.exists()) {
        Some(global) => read_config(&global),
        None => Ok(types::Config::default()),
    }
}

fn read_config(path: &Path) -> Result<types::Config> {
    log::debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| FluxfitError::io(path, e))?;
    toml::from_str(&content)
        .map_err(|e| FluxfitError::Config(format!("{}: {}", path.display(), e)))
}
