// ABOUTME: Identity key store: ensures an ed25519 key pair exists on disk.
// ABOUTME: Never regenerates an existing private key; repairs a missing .pub file.

use crate::error::{Result, SshError};
use crate::fs::{create_private_dir, write_with_mode};
use ssh_key::private::{Ed25519Keypair, KeypairData};
use ssh_key::{HashAlg, LineEnding, PrivateKey};
use std::io::Write;
use std::path::{Path, PathBuf};

const PRIVATE_KEY_MODE: u32 = 0o600;
const PUBLIC_KEY_MODE: u32 = 0o644;

/// Get the default identity path (~/.ssh/berth_ed25519).
pub fn default_identity_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".ssh").join("berth_ed25519"))
}

/// Path of the public half for a private key: `{path}.pub`.
///
/// The suffix is appended to the whole file name, so `key.old` maps to
/// `key.old.pub`.
pub fn public_key_path(key_path: &Path) -> PathBuf {
    let mut name = key_path.as_os_str().to_owned();
    name.push(".pub");
    PathBuf::from(name)
}

/// Load an existing SSH private key from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_key(key_path: &Path) -> Result<PrivateKey> {
    let key_data = std::fs::read_to_string(key_path).map_err(|e| SshError::ReadKey {
        path: key_path.to_path_buf(),
        source: e,
    })?;

    PrivateKey::from_openssh(&key_data).map_err(|e| SshError::ParseKey {
        path: key_path.to_path_buf(),
        source: e,
    })
}

/// Render the authorized-key line for a private key's public half.
///
/// The line ends with a newline, ready to be written as a `.pub` file.
pub fn authorized_key_line(private_key: &PrivateKey) -> Result<String> {
    let line = private_key
        .public_key()
        .to_openssh()
        .map_err(SshError::SerializeKey)?;
    Ok(format!("{line}\n"))
}

/// Check that `comment` keeps the public key on a single line.
pub fn validate_comment(comment: &str) -> Result<()> {
    if comment.contains(['\n', '\r']) {
        return Err(SshError::InvalidComment {
            comment: comment.to_string(),
        });
    }
    Ok(())
}

/// Ensure an ed25519 identity exists at `key_path`.
///
/// If a file already exists there it is treated as the private key and only
/// the public half is checked (see [`ensure_public_key`]). Otherwise a new key
/// pair is generated and a single progress line is written to `out`.
///
/// # Errors
/// Returns an error if a new key would get a multi-line comment, or if
/// generation, serialization or any file write fails. A failed write may leave
/// a partial file behind.
pub fn ensure_identity<W: Write + ?Sized>(
    out: &mut W,
    key_path: &Path,
    comment: &str,
) -> Result<()> {
    if key_path.exists() {
        tracing::debug!(path = %key_path.display(), "identity already exists");
        return ensure_public_key(key_path);
    }

    validate_comment(comment)?;
    writeln!(out, "- Generating {comment} at {} ...", key_path.display())
        .map_err(SshError::Progress)?;
    generate_key(key_path, comment)?;
    Ok(())
}

/// Regenerate `{priv_path}.pub` from the private key if it is missing.
///
/// An existing public key file is not compared against the private key.
///
/// # Errors
/// Returns an error if the private key cannot be read or parsed, or the public
/// key cannot be written.
pub fn ensure_public_key(priv_path: &Path) -> Result<()> {
    let pub_path = public_key_path(priv_path);
    if pub_path.exists() {
        return Ok(());
    }

    let private_key = load_key(priv_path)?;
    write_public_key(&private_key, &pub_path)?;
    tracing::info!(path = %pub_path.display(), "restored missing public key");
    Ok(())
}

/// Generate a new ed25519 key pair and save it to disk.
///
/// Creates the parent directory (0700) if needed, writes the private key in
/// OpenSSH format with 0600 and the public key next to it with 0644.
///
/// # Errors
/// Returns an error if the comment contains a line break, or if directory
/// creation, key generation, or file writing fails.
pub fn generate_key(key_path: &Path, comment: &str) -> Result<PrivateKey> {
    validate_comment(comment)?;
    if let Some(parent) = key_path.parent() {
        create_private_dir(parent)?;
    }

    let keypair = Ed25519Keypair::random(&mut rand::thread_rng());
    let private_key = PrivateKey::new(KeypairData::from(keypair), comment)
        .map_err(SshError::GenerateKey)?;

    let private_key_str = private_key
        .to_openssh(LineEnding::LF)
        .map_err(SshError::SerializeKey)?;

    write_with_mode(key_path, private_key_str.as_bytes(), PRIVATE_KEY_MODE).map_err(|e| {
        SshError::WriteKey {
            path: key_path.to_path_buf(),
            source: e,
        }
    })?;

    let pub_path = public_key_path(key_path);
    write_public_key(&private_key, &pub_path)?;

    tracing::info!(
        private = %key_path.display(),
        public = %pub_path.display(),
        fingerprint = %private_key.fingerprint(HashAlg::Sha256),
        "generated ssh identity"
    );

    Ok(private_key)
}

fn write_public_key(private_key: &PrivateKey, pub_path: &Path) -> Result<()> {
    let line = authorized_key_line(private_key)?;
    write_with_mode(pub_path, line.as_bytes(), PUBLIC_KEY_MODE).map_err(|e| {
        SshError::WriteKey {
            path: pub_path.to_path_buf(),
            source: e,
        }
    })
}
