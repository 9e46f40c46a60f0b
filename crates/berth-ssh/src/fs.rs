// ABOUTME: Small filesystem helpers shared by the key store and artifact writers.
// ABOUTME: Owner-only directory creation and writes that pin an exact file mode.

use crate::error::{Result, SshError};
use std::io::{self, Write};
use std::path::Path;

/// Create `path` and any missing parents. New directories get 0700 on Unix;
/// directories that already exist are left alone.
pub(crate) fn create_private_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Ok(());
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder
        .create(path)
        .map_err(|e| SshError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Write `contents` to `path`, truncating any previous content, and leave the
/// file with exactly `mode` regardless of umask or a pre-existing mode.
pub(crate) fn write_with_mode(path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}
