//! Writing modified manifests back to disk.

use log::{debug, info};
use std::fs;
use std::path::PathBuf;

use super::store::{DocumentStore, LocationGroup};
use crate::error::{FluxfitError, Result};

/// Changed locations, refusing any that fall inside a protected chart directory.
fn changed_groups(store: &DocumentStore) -> Result<Vec<LocationGroup>> {
    let groups: Vec<LocationGroup> = store
        .group_by_location()
        .into_iter()
        .filter(|group| {
            if !group.changed {
                debug!("Unchanged, not writing {}", group.location.display());
            }
            group.changed
        })
        .collect();

    for group in &groups {
        if let Some(chart) = store.protected_root(&group.location) {
            return Err(FluxfitError::ReadOnlyLocation {
                path: group.location.clone(),
                chart: chart.to_path_buf(),
            });
        }
    }

    Ok(groups)
}

/// Locations that would be written by [`save`], without touching the disk.
pub fn pending_locations(store: &DocumentStore) -> Result<Vec<PathBuf>> {
    Ok(changed_groups(store)?
        .into_iter()
        .map(|group| group.location)
        .collect())
}

/// Rewrite every location holding at least one changed document.
///
/// Locations whose documents are all unchanged are left alone. Every location
/// is checked against protected chart directories before the first write.
/// Returns the written paths in discovery order.
pub fn save(store: &DocumentStore) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for group in changed_groups(store)? {
        let mut content = group.content;
        if !content.ends_with('\n') {
            content.push('\n');
        }

        if let Some(parent) = group.location.parent() {
            fs::create_dir_all(parent).map_err(|e| FluxfitError::io(parent, e))?;
        }
        fs::write(&group.location, content).map_err(|e| FluxfitError::io(&group.location, e))?;

        info!("Wrote {}", group.location.display());
        written.push(group.location);
    }

    Ok(written)
}
