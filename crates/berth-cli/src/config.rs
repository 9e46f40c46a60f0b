// ABOUTME: Configuration for the berth CLI.
// ABOUTME: Optional TOML file; every field falls back to a default under ~/.ssh.

use anyhow::{Context, Result};
use berth_ssh::SshLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SSH directory holding `config` and `config.d/` (default: ~/.ssh)
    pub ssh_dir: Option<String>,

    /// Private key shared by all targets (default: {ssh_dir}/berth_ed25519)
    pub identity_file: Option<String>,

    /// Comment stored in a newly generated identity
    pub identity_comment: Option<String>,
}

impl Config {
    /// Load config from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config from {}", path.display()))
            }
        };
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Get the default config file path (~/.config/berth/config.toml)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .context("Could not determine home directory")
            })?
            .join("berth");
        Ok(config_dir.join("config.toml"))
    }

    /// Resolve defaults and `~` into a concrete layout.
    pub fn layout(&self) -> Result<SshLayout> {
        let ssh_dir = match &self.ssh_dir {
            Some(dir) => expand(dir),
            None => dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".ssh"),
        };

        let mut layout = SshLayout::new(ssh_dir);
        if let Some(identity) = &self.identity_file {
            layout.identity_file = expand(identity);
        }
        if let Some(comment) = &self.identity_comment {
            layout.identity_comment = comment.clone();
        }
        Ok(layout)
    }

    /// The effective configuration with every field filled in.
    pub fn resolved(&self) -> Result<Config> {
        let layout = self.layout()?;
        Ok(Config {
            ssh_dir: Some(layout.ssh_dir.display().to_string()),
            identity_file: Some(layout.identity_file.display().to_string()),
            identity_comment: Some(layout.identity_comment),
        })
    }
}

fn expand(path: &str) -> PathBuf {
    shellexpand::tilde(path).into_owned().into()
}
