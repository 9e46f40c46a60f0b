// ABOUTME: SSH provisioning for loopback targets such as local containers.
// ABOUTME: Provides identity keys, per-target config, host key pinning and ~/.ssh/config wiring.

//! # berth-ssh
//!
//! Provisions the SSH material needed to reach locally addressable targets
//! (containers or VMs forwarded to a loopback port) with a plain
//! `ssh <target>`.
//!
//! ## Features
//!
//! - **Identity**: ensure a shared ed25519 key pair exists, and restore its
//!   `.pub` file from the private key if it goes missing
//! - **Host config**: one `Host` stanza per target in `~/.ssh/config.d/`
//! - **Known hosts**: one pinned `[127.0.0.1]:port` record per target
//! - **Include**: make `~/.ssh/config` load `config.d/*.conf`, creating the
//!   file when absent and only warning when it already has user content
//! - **Teardown**: best-effort removal of a target's files
//!
//! ## Example
//!
//! ```no_run
//! use berth_ssh::{Provisioner, SshLayout};
//!
//! let layout = SshLayout::for_current_user().expect("home directory should exist");
//! let provisioner = Provisioner::new(layout);
//!
//! let host_key = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIO3mepiIGcR/X0pUqTHo4qI27NLDq/DXpX/C2m+nGcM9";
//! let mut out = std::io::stderr();
//! let paths = provisioner
//!     .setup_target(&mut out, "box1", 2222, host_key)
//!     .expect("target should provision");
//! println!("wrote {}", paths.host_config.display());
//!
//! provisioner.remove_target("box1");
//! ```

mod error;
mod fs;
mod host_config;
mod include;
mod key;
mod known_hosts;
mod provision;
mod store;
mod teardown;

pub use error::{Result, SshError};
pub use host_config::{write_host_config, HostConfigEntry, LOOPBACK, TARGET_USER};
pub use include::{
    aggregate_config_path, ensure_include, has_include, IncludeStatus, CONFIG_DIR_NAME,
    INCLUDE_DIRECTIVE,
};
pub use key::{
    authorized_key_line, default_identity_path, ensure_identity, ensure_public_key, generate_key,
    load_key, public_key_path, validate_comment,
};
pub use known_hosts::{write_known_hosts, KnownHostsEntry};
pub use provision::{
    Provisioner, SshLayout, TargetPaths, DEFAULT_IDENTITY_COMMENT, DEFAULT_IDENTITY_NAME,
};
pub use store::{validate_target_name, ArtifactKind, ArtifactStore, DirStore};
pub use teardown::{remove_artifacts, remove_target};

// Re-export ssh_key types for convenience
pub use ssh_key::{PrivateKey, PublicKey};
