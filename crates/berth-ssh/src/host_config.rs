// ABOUTME: Per-target SSH client config stanza rendering and persistence.
// ABOUTME: Binds a target name to a loopback port with a pinned identity and known_hosts.

use crate::error::Result;
use crate::store::{validate_target_name, ArtifactKind, ArtifactStore, DirStore};
use std::path::{Path, PathBuf};

/// Remote user every target is reached as.
pub const TARGET_USER: &str = "user";

/// Loopback address targets listen on.
pub const LOOPBACK: &str = "127.0.0.1";

/// One `Host` block in `{config_dir}/{target}.conf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfigEntry {
    pub target: String,
    pub port: u16,
    pub identity_file: PathBuf,
    pub known_hosts_file: PathBuf,
}

impl HostConfigEntry {
    /// Render the stanza. Output is deterministic for the same inputs.
    pub fn render(&self) -> String {
        format!(
            concat!(
                "Host {target}\n",
                "  HostName {loopback}\n",
                "  Port {port}\n",
                "  User {user}\n",
                "  IdentityFile {identity}\n",
                "  IdentitiesOnly yes\n",
                "  UserKnownHostsFile {known_hosts}\n",
                "  StrictHostKeyChecking yes\n",
            ),
            loopback = LOOPBACK,
            user = TARGET_USER,
            target = self.target,
            port = self.port,
            identity = config_path_arg(&self.identity_file),
            known_hosts = config_path_arg(&self.known_hosts_file),
        )
    }

    /// Write the stanza to `store`, replacing any previous version.
    pub fn store<S: ArtifactStore + ?Sized>(&self, store: &S) -> Result<()> {
        validate_target_name(&self.target)?;
        store.put(&self.target, ArtifactKind::HostConfig, &self.render())?;
        tracing::debug!(
            target_name = %self.target,
            port = self.port,
            path = %store.locate(&self.target, ArtifactKind::HostConfig).display(),
            "wrote host config"
        );
        Ok(())
    }
}

/// Write `{config_dir}/{target}.conf` for one target, overwriting it in full.
pub fn write_host_config(
    config_dir: &Path,
    target: &str,
    port: u16,
    identity_file: &Path,
    known_hosts_file: &Path,
) -> Result<()> {
    HostConfigEntry {
        target: target.to_string(),
        port,
        identity_file: identity_file.to_path_buf(),
        known_hosts_file: known_hosts_file.to_path_buf(),
    }
    .store(&DirStore::new(config_dir))
}

// ssh_config splits arguments on whitespace unless they are double-quoted.
fn config_path_arg(path: &Path) -> String {
    let path = path.display().to_string();
    if path.contains(char::is_whitespace) {
        format!("\"{path}\"")
    } else {
        path
    }
}
