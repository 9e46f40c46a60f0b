// ABOUTME: Pinned host key records scoped to a single loopback port.
// ABOUTME: Writes one `[127.0.0.1]:port key` line per target.

use crate::error::{Result, SshError};
use crate::fs::write_with_mode;
use crate::host_config::LOOPBACK;
use crate::store::{ArtifactKind, ArtifactStore};
use ssh_key::PublicKey;
use std::path::Path;

const KNOWN_HOSTS_MODE: u32 = 0o644;

/// A validated known_hosts record for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownHostsEntry {
    port: u16,
    host_key: String,
}

impl KnownHostsEntry {
    /// Build a record from a host public key in authorized-key format.
    ///
    /// Surrounding whitespace is dropped. The rest must be a single line that
    /// parses as an OpenSSH public key.
    pub fn new(port: u16, host_key_line: &str) -> Result<Self> {
        let host_key = host_key_line.trim();
        if host_key.contains(['\n', '\r']) {
            return Err(SshError::InvalidHostKey {
                line: host_key.to_string(),
                reason: "contains a line break".to_string(),
                source: None,
            });
        }
        PublicKey::from_openssh(host_key).map_err(|e| SshError::InvalidHostKey {
            line: host_key.to_string(),
            reason: "not an OpenSSH public key".to_string(),
            source: Some(e),
        })?;

        Ok(Self {
            port,
            host_key: host_key.to_string(),
        })
    }

    pub fn render(&self) -> String {
        format!("[{LOOPBACK}]:{} {}\n", self.port, self.host_key)
    }

    /// Write the record to `store` under `target`, replacing any previous one.
    pub fn store<S: ArtifactStore + ?Sized>(&self, store: &S, target: &str) -> Result<()> {
        store.put(target, ArtifactKind::KnownHosts, &self.render())
    }
}

/// Write a single-line known_hosts file at `path`, overwriting it in full.
pub fn write_known_hosts(path: &Path, port: u16, host_key_line: &str) -> Result<()> {
    let entry = KnownHostsEntry::new(port, host_key_line)?;
    write_with_mode(path, entry.render().as_bytes(), KNOWN_HOSTS_MODE).map_err(|e| {
        SshError::WriteArtifact {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HOST_KEY: &str =
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIO3mepiIGcR/X0pUqTHo4qI27NLDq/DXpX/C2m+nGcM9";

    #[test]
    fn test_render_scopes_to_loopback_port() {
        let entry = KnownHostsEntry::new(2222, HOST_KEY).unwrap();
        assert_eq!(entry.render(), format!("[127.0.0.1]:2222 {HOST_KEY}\n"));
    }

    #[test]
    fn test_new_trims_trailing_newline() {
        let entry = KnownHostsEntry::new(22, &format!("  {HOST_KEY} root@box1\n")).unwrap();
        assert_eq!(entry.render(), format!("[127.0.0.1]:22 {HOST_KEY} root@box1\n"));
    }

    #[test]
    fn test_new_rejects_embedded_line_breaks() {
        for injected in [
            format!("{HOST_KEY} c\n[127.0.0.1]:2222 {HOST_KEY}"),
            format!("{HOST_KEY} c\r[127.0.0.1]:2222 {HOST_KEY}"),
        ] {
            let err = KnownHostsEntry::new(2222, &injected).unwrap_err();
            assert!(
                matches!(err, SshError::InvalidHostKey { source: None, .. }),
                "{injected:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_write_known_hosts_is_single_line() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("box1.known_hosts");

        let injected = format!("{HOST_KEY} c\n[127.0.0.1]:2222 {HOST_KEY}");
        assert!(write_known_hosts(&path, 2222, &injected).is_err());
        assert!(!path.exists());

        write_known_hosts(&path, 2222, &format!("{HOST_KEY} root@box1\n")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_new_rejects_garbage() {
        let err = KnownHostsEntry::new(22, "definitely not a key").unwrap_err();
        assert!(matches!(err, SshError::InvalidHostKey { .. }));
    }

    #[test]
    fn test_write_known_hosts_overwrites() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("box1.known_hosts");
        std::fs::write(&path, "[127.0.0.1]:1 old-key\n[127.0.0.1]:2 other\n").unwrap();

        write_known_hosts(&path, 2222, HOST_KEY).expect("should write known_hosts");

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("[127.0.0.1]:2222 {HOST_KEY}\n")
        );
    }

    #[test]
    fn test_write_known_hosts_invalid_key_writes_nothing() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("box1.known_hosts");

        assert!(write_known_hosts(&path, 2222, "").is_err());
        assert!(!path.exists());
    }
}
