// ABOUTME: Error types for identity and target provisioning using thiserror.
// ABOUTME: Every filesystem variant carries the path it failed on.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while provisioning SSH material.
#[derive(Error, Debug)]
pub enum SshError {
    /// Failed to read a key file from disk.
    #[error("failed to read SSH key from {path}: {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse an SSH private key.
    #[error("failed to parse SSH key from {path}: {source}")]
    ParseKey {
        path: PathBuf,
        #[source]
        source: ssh_key::Error,
    },

    /// Failed to generate an SSH key.
    #[error("failed to generate SSH key: {0}")]
    GenerateKey(#[source] ssh_key::Error),

    /// Failed to serialize a key.
    #[error("failed to serialize key: {0}")]
    SerializeKey(#[source] ssh_key::Error),

    /// Failed to write a key file to disk.
    #[error("failed to write key to {path}: {source}")]
    WriteKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the aggregate SSH config file.
    #[error("failed to read SSH config from {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the aggregate SSH config file.
    #[error("failed to write SSH config to {path}: {source}")]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a per-target artifact.
    #[error("failed to read {path}: {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a per-target artifact.
    #[error("failed to write {path}: {source}")]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target name cannot be used as a file stem and Host pattern.
    #[error("invalid target name {name:?}: {reason}")]
    InvalidTargetName { name: String, reason: &'static str },

    /// Host key line is not a single-line OpenSSH public key.
    #[error("invalid host public key {line:?}: {reason}")]
    InvalidHostKey {
        line: String,
        reason: String,
        #[source]
        source: Option<ssh_key::Error>,
    },

    /// Key comment would break the single-line public key format.
    #[error("invalid key comment {comment:?}: must not contain line breaks")]
    InvalidComment { comment: String },

    /// Failed to write to the progress sink.
    #[error("failed to write progress output: {0}")]
    Progress(#[source] std::io::Error),
}

/// Result type alias using SshError.
pub type Result<T> = std::result::Result<T, SshError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_read_key_error_display() {
        let err = SshError::ReadKey {
            path: PathBuf::from("/path/to/key"),
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
        };
        let display = format!("{}", err);
        assert!(display.contains("failed to read SSH key"));
        assert!(display.contains("/path/to/key"));
    }

    #[test]
    fn test_parse_key_error_display() {
        let err = SshError::ParseKey {
            path: PathBuf::from("/path/to/invalid_key"),
            source: ssh_key::Error::AlgorithmUnknown,
        };
        let display = format!("{}", err);
        assert!(display.contains("failed to parse SSH key"));
        assert!(display.contains("/path/to/invalid_key"));
    }

    #[test]
    fn test_write_config_error_display() {
        let err = SshError::WriteConfig {
            path: PathBuf::from("/home/u/.ssh/config"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        };
        let display = format!("{}", err);
        assert!(display.contains("failed to write SSH config"));
        assert!(display.contains("/home/u/.ssh/config"));
    }

    #[test]
    fn test_write_artifact_error_display() {
        let err = SshError::WriteArtifact {
            path: PathBuf::from("/ssh/config.d/box1.conf"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert!(err.to_string().contains("box1.conf"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_invalid_target_name_display() {
        let err = SshError::InvalidTargetName {
            name: "a/b".to_string(),
            reason: "contains a path separator",
        };
        let display = err.to_string();
        assert!(display.contains("\"a/b\""));
        assert!(display.contains("path separator"));
    }

    #[test]
    fn test_error_source_io_variants() {
        let cases = [
            SshError::CreateDirectory {
                path: PathBuf::from("/path"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            },
            SshError::ReadConfig {
                path: PathBuf::from("/path"),
                source: io::Error::new(io::ErrorKind::Other, "error"),
            },
            SshError::Progress(io::Error::new(io::ErrorKind::BrokenPipe, "closed")),
        ];
        for err in cases {
            assert!(err.source().is_some(), "{err:?} should expose its source");
        }
    }

    #[test]
    fn test_error_source_ssh_key_variants() {
        assert!(SshError::GenerateKey(ssh_key::Error::AlgorithmUnknown)
            .source()
            .is_some());
        assert!(SshError::SerializeKey(ssh_key::Error::AlgorithmUnknown)
            .source()
            .is_some());
    }

    #[test]
    fn test_invalid_host_key_source_is_optional() {
        let parsed = SshError::InvalidHostKey {
            line: "ssh-ed25519 !!!".to_string(),
            reason: "not an OpenSSH public key".to_string(),
            source: Some(ssh_key::Error::AlgorithmUnknown),
        };
        assert!(parsed.source().is_some());

        let multi_line = SshError::InvalidHostKey {
            line: "a\nb".to_string(),
            reason: "contains a line break".to_string(),
            source: None,
        };
        assert!(multi_line.source().is_none());
        assert!(multi_line.to_string().contains("contains a line break"));
    }

    #[test]
    fn test_invalid_comment_display() {
        let err = SshError::InvalidComment {
            comment: "a\nHost evil".to_string(),
        };
        assert!(err.to_string().contains("line breaks"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_error_no_source_invalid_target_name() {
        let err = SshError::InvalidTargetName {
            name: String::new(),
            reason: "is empty",
        };
        assert!(err.source().is_none());
    }
}
