// ABOUTME: Ties the key store, writers and include step into target setup/removal.
// ABOUTME: One Provisioner per SSH directory; targets share the identity and ~/.ssh/config.

use crate::error::Result;
use crate::host_config::HostConfigEntry;
use crate::include::{ensure_include, IncludeStatus, CONFIG_DIR_NAME};
use crate::key::ensure_identity;
use crate::known_hosts::KnownHostsEntry;
use crate::store::{validate_target_name, ArtifactKind, ArtifactStore, DirStore};
use crate::teardown::remove_artifacts;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default file name of the shared identity inside the SSH directory.
pub const DEFAULT_IDENTITY_NAME: &str = "berth_ed25519";

/// Default comment stored in the identity.
pub const DEFAULT_IDENTITY_COMMENT: &str = "berth";

/// Where SSH material lives for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshLayout {
    pub ssh_dir: PathBuf,
    pub identity_file: PathBuf,
    pub identity_comment: String,
}

impl SshLayout {
    /// Layout rooted at `ssh_dir` with the default identity name and comment.
    pub fn new(ssh_dir: impl Into<PathBuf>) -> Self {
        let ssh_dir = ssh_dir.into();
        Self {
            identity_file: ssh_dir.join(DEFAULT_IDENTITY_NAME),
            identity_comment: DEFAULT_IDENTITY_COMMENT.to_string(),
            ssh_dir,
        }
    }

    /// Layout for the current user (~/.ssh).
    pub fn for_current_user() -> Option<Self> {
        dirs::home_dir().map(|h| Self::new(h.join(".ssh")))
    }

    /// Directory holding the per-target stanzas.
    pub fn config_dir(&self) -> PathBuf {
        self.ssh_dir.join(CONFIG_DIR_NAME)
    }
}

/// What [`Provisioner::setup_target`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPaths {
    pub host_config: PathBuf,
    pub known_hosts: PathBuf,
    pub include: IncludeStatus,
}

/// Sets up and tears down per-target SSH material.
#[derive(Debug, Clone)]
pub struct Provisioner<S = DirStore> {
    layout: SshLayout,
    store: S,
}

impl Provisioner<DirStore> {
    /// Provisioner that stores target artifacts in `layout.config_dir()`.
    pub fn new(layout: SshLayout) -> Self {
        let store = DirStore::new(layout.config_dir());
        Self { layout, store }
    }
}

impl<S: ArtifactStore> Provisioner<S> {
    pub fn with_store(layout: SshLayout, store: S) -> Self {
        Self { layout, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ensure the shared identity exists.
    pub fn ensure_identity<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        ensure_identity(out, &self.layout.identity_file, &self.layout.identity_comment)
    }

    /// Identity path as referenced from host configs.
    pub fn identity_file(&self) -> &Path {
        &self.layout.identity_file
    }

    /// Provision everything needed for `ssh {target}` to reach a loopback port.
    ///
    /// The target name and host key are validated before anything is written.
    /// A missing include directive in an existing ~/.ssh/config is reported in
    /// the returned status and on `out`, not as an error.
    pub fn setup_target<W: Write + ?Sized>(
        &self,
        out: &mut W,
        target: &str,
        port: u16,
        host_key_line: &str,
    ) -> Result<TargetPaths> {
        validate_target_name(target)?;
        let known_hosts = KnownHostsEntry::new(port, host_key_line)?;

        self.ensure_identity(out)?;

        known_hosts.store(&self.store, target)?;
        let known_hosts_path = self.store.locate(target, ArtifactKind::KnownHosts);

        let host_config = HostConfigEntry {
            target: target.to_string(),
            port,
            identity_file: self.layout.identity_file.clone(),
            known_hosts_file: known_hosts_path.clone(),
        };
        host_config.store(&self.store)?;

        let include = ensure_include(out, &self.layout.ssh_dir)?;

        tracing::info!(target_name = target, port, "provisioned ssh target");

        Ok(TargetPaths {
            host_config: self.store.locate(target, ArtifactKind::HostConfig),
            known_hosts: known_hosts_path,
            include,
        })
    }

    /// Remove a target's artifacts. The identity and ~/.ssh/config are shared
    /// and stay as they are.
    pub fn remove_target(&self, target: &str) {
        remove_artifacts(&self.store, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SshError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const HOST_KEY: &str =
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIO3mepiIGcR/X0pUqTHo4qI27NLDq/DXpX/C2m+nGcM9";

    #[derive(Default)]
    struct MemoryStore {
        files: RefCell<HashMap<(String, ArtifactKind), String>>,
    }

    impl ArtifactStore for MemoryStore {
        fn locate(&self, target: &str, kind: ArtifactKind) -> PathBuf {
            PathBuf::from(format!("mem://{target}.{}", kind.extension()))
        }

        fn put(&self, target: &str, kind: ArtifactKind, contents: &str) -> Result<()> {
            self.files
                .borrow_mut()
                .insert((target.to_string(), kind), contents.to_string());
            Ok(())
        }

        fn get(&self, target: &str, kind: ArtifactKind) -> Result<Option<String>> {
            Ok(self.files.borrow().get(&(target.to_string(), kind)).cloned())
        }

        fn delete(&self, target: &str, kind: ArtifactKind) -> Result<bool> {
            Ok(self
                .files
                .borrow_mut()
                .remove(&(target.to_string(), kind))
                .is_some())
        }
    }

    #[test]
    fn test_layout_defaults() {
        let layout = SshLayout::new("/home/u/.ssh");
        assert_eq!(layout.config_dir(), PathBuf::from("/home/u/.ssh/config.d"));
        assert_eq!(
            layout.identity_file,
            PathBuf::from("/home/u/.ssh/berth_ed25519")
        );
        assert_eq!(layout.identity_comment, "berth");
    }

    #[test]
    fn test_setup_through_custom_store() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let provisioner =
            Provisioner::with_store(SshLayout::new(temp_dir.path()), MemoryStore::default());

        let mut out = Vec::new();
        let paths = provisioner
            .setup_target(&mut out, "box1", 2222, HOST_KEY)
            .expect("should set up target");

        assert_eq!(paths.known_hosts, PathBuf::from("mem://box1.known_hosts"));
        let conf = provisioner
            .store()
            .get("box1", ArtifactKind::HostConfig)
            .unwrap()
            .expect("host config should be stored");
        assert!(conf.contains("  UserKnownHostsFile mem://box1.known_hosts\n"));
        assert!(!temp_dir.path().join("config.d").exists());

        provisioner.remove_target("box1");
        assert!(provisioner.store().files.borrow().is_empty());
    }

    #[test]
    fn test_invalid_target_writes_nothing() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let provisioner = Provisioner::new(SshLayout::new(temp_dir.path()));

        let mut out = Vec::new();
        let err = provisioner
            .setup_target(&mut out, "bad name", 2222, HOST_KEY)
            .unwrap_err();

        assert!(matches!(err, SshError::InvalidTargetName { .. }));
        assert!(!provisioner.identity_file().exists());
        assert!(std::fs::read_dir(temp_dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_invalid_host_key_writes_nothing() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let provisioner = Provisioner::new(SshLayout::new(temp_dir.path()));

        let mut out = Vec::new();
        let err = provisioner
            .setup_target(&mut out, "box1", 2222, "ssh-ed25519 !!!")
            .unwrap_err();

        assert!(matches!(err, SshError::InvalidHostKey { .. }));
        assert!(std::fs::read_dir(temp_dir.path()).unwrap().next().is_none());
    }
}
