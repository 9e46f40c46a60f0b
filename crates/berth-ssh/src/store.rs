// ABOUTME: Path-keyed store for per-target artifacts (host config, known_hosts).
// ABOUTME: DirStore maps each (target, kind) pair to `{dir}/{target}.{ext}`.

use crate::error::{Result, SshError};
use crate::fs::{create_private_dir, write_with_mode};
use std::path::PathBuf;

const ARTIFACT_MODE: u32 = 0o644;

/// The kinds of files kept for each target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// SSH client config stanza (`{target}.conf`).
    HostConfig,
    /// Pinned host key record (`{target}.known_hosts`).
    KnownHosts,
}

impl ArtifactKind {
    /// All kinds, in the order they are removed on teardown.
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::HostConfig, ArtifactKind::KnownHosts];

    /// File extension used by the directory store.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::HostConfig => "conf",
            ArtifactKind::KnownHosts => "known_hosts",
        }
    }
}

/// Create/read/delete access to per-target artifacts.
///
/// Provisioning logic only talks to this trait, so the persistence mechanism
/// can change without touching it.
pub trait ArtifactStore {
    /// Where the artifact lives, as referenced from SSH config.
    fn locate(&self, target: &str, kind: ArtifactKind) -> PathBuf;

    /// Replace the artifact's contents in full.
    fn put(&self, target: &str, kind: ArtifactKind, contents: &str) -> Result<()>;

    /// Read the artifact, `None` if it does not exist.
    fn get(&self, target: &str, kind: ArtifactKind) -> Result<Option<String>>;

    /// Delete the artifact. Returns whether anything was removed.
    fn delete(&self, target: &str, kind: ArtifactKind) -> Result<bool>;
}

/// Check that a target name is usable as a file stem and as a `Host` pattern.
pub fn validate_target_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("is empty")
    } else if name.starts_with('.') || name.starts_with('-') {
        Some("must not start with '.' or '-'")
    } else if name.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        Some("may only contain ASCII letters, digits, '-', '_' and '.'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SshError::InvalidTargetName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Artifacts stored as plain files in one directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactStore for DirStore {
    fn locate(&self, target: &str, kind: ArtifactKind) -> PathBuf {
        self.dir.join(format!("{target}.{}", kind.extension()))
    }

    fn put(&self, target: &str, kind: ArtifactKind, contents: &str) -> Result<()> {
        validate_target_name(target)?;
        create_private_dir(&self.dir)?;

        let path = self.locate(target, kind);
        write_with_mode(&path, contents.as_bytes(), ARTIFACT_MODE)
            .map_err(|e| SshError::WriteArtifact { path, source: e })
    }

    fn get(&self, target: &str, kind: ArtifactKind) -> Result<Option<String>> {
        validate_target_name(target)?;

        let path = self.locate(target, kind);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SshError::ReadArtifact { path, source: e }),
        }
    }

    fn delete(&self, target: &str, kind: ArtifactKind) -> Result<bool> {
        validate_target_name(target)?;

        let path = self.locate(target, kind);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SshError::WriteArtifact { path, source: e }),
        }
    }
}
