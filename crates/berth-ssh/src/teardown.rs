// ABOUTME: Best-effort removal of a retired target's config and known_hosts files.
// ABOUTME: Missing files and delete failures are logged, never returned.

use crate::store::{ArtifactKind, ArtifactStore, DirStore};
use std::path::Path;

/// Remove `{config_dir}/{target}.conf` and `{config_dir}/{target}.known_hosts`.
pub fn remove_target(config_dir: &Path, target: &str) {
    remove_artifacts(&DirStore::new(config_dir), target);
}

/// Delete every artifact kind for `target` from `store`, ignoring errors.
pub fn remove_artifacts<S: ArtifactStore + ?Sized>(store: &S, target: &str) {
    for kind in ArtifactKind::ALL {
        match store.delete(target, kind) {
            Ok(true) => tracing::debug!(target_name = target, ?kind, "removed artifact"),
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(target_name = target, ?kind, error = %e, "ignoring failed removal")
            }
        }
    }
}
