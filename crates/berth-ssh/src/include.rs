// ABOUTME: Makes per-target stanzas reachable from the user's ~/.ssh/config.
// ABOUTME: Creates the config when absent; only warns when it has other content.

use crate::error::{Result, SshError};
use crate::fs::{create_private_dir, write_with_mode};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory under the SSH dir holding per-target stanzas.
pub const CONFIG_DIR_NAME: &str = "config.d";

/// The line that pulls every per-target stanza into the aggregate config.
pub const INCLUDE_DIRECTIVE: &str = "Include config.d/*.conf";

const INCLUDE_COMMENT: &str = "# Load all configuration files in config.d/.";
const AGGREGATE_CONFIG_MODE: u32 = 0o600;

/// Outcome of [`ensure_include`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeStatus {
    /// The directive was already there; nothing was written.
    AlreadyPresent,
    /// The config was absent or empty and has been created with the directive.
    Created,
    /// The config has user content without the directive. It was left
    /// untouched and a warning was emitted.
    NeedsManualEdit,
}

/// Path of the aggregate config file: `{ssh_dir}/config`.
pub fn aggregate_config_path(ssh_dir: &Path) -> PathBuf {
    ssh_dir.join("config")
}

/// Whether any line of `content` is the include directive, ignoring
/// leading, trailing and repeated whitespace.
pub fn has_include(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.split_whitespace().eq(INCLUDE_DIRECTIVE.split_whitespace()))
}

/// Ensure `{ssh_dir}/config` includes the per-target directory.
///
/// - Directive present anywhere: no-op.
/// - File absent, empty or whitespace-only: written (0600) with a comment and
///   the directive.
/// - Anything else: the file is left byte-for-byte unchanged and a warning
///   naming the file and the missing line is written to `out`.
///
/// # Errors
/// Returns an error if the file exists but cannot be read, or if creating it
/// fails. A missing directive in a non-empty file is not an error.
pub fn ensure_include<W: Write + ?Sized>(
    out: &mut W,
    ssh_dir: &Path,
) -> Result<IncludeStatus> {
    let config_path = aggregate_config_path(ssh_dir);

    let data = match std::fs::read(&config_path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            return Err(SshError::ReadConfig {
                path: config_path,
                source: e,
            })
        }
    };
    let content = String::from_utf8_lossy(&data);

    if has_include(&content) {
        tracing::debug!(path = %config_path.display(), "include directive already present");
        return Ok(IncludeStatus::AlreadyPresent);
    }

    if content.trim().is_empty() {
        create_private_dir(ssh_dir)?;
        let body = format!("{INCLUDE_COMMENT}\n{INCLUDE_DIRECTIVE}\n");
        write_with_mode(&config_path, body.as_bytes(), AGGREGATE_CONFIG_MODE).map_err(|e| {
            SshError::WriteConfig {
                path: config_path.clone(),
                source: e,
            }
        })?;
        tracing::info!(path = %config_path.display(), "created ssh config with include");
        return Ok(IncludeStatus::Created);
    }

    tracing::warn!(
        path = %config_path.display(),
        directive = INCLUDE_DIRECTIVE,
        "ssh config lacks include directive; leaving it unchanged"
    );
    writeln!(
        out,
        concat!(
            "Warning: {} does not load per-target configs.\n",
            "  Add this line before any Host or Match block:\n",
            "    {}"
        ),
        config_path.display(),
        INCLUDE_DIRECTIVE
    )
    .map_err(SshError::Progress)?;

    Ok(IncludeStatus::NeedsManualEdit)
}
