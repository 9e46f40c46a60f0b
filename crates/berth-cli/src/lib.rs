// ABOUTME: CLI library components for the berth CLI.
// ABOUTME: Configuration loading shared by the berth subcommands.

//! # berth-cli
//!
//! Command-line interface for provisioning SSH access to local targets.
//!
//! ```text
//! berth
//! ├── key                           # Ensure the shared identity exists
//! ├── include                       # Wire config.d/ into ~/.ssh/config
//! ├── setup <target> --port N       # Provision one target
//! ├── remove <target>               # Remove a target's files
//! └── config                        # Show the effective configuration
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Provision a container listening on 127.0.0.1:2222
//! berth setup box1 --port 2222 --host-key-file ./ssh_host_ed25519_key.pub
//! ssh box1
//!
//! # Forget it again
//! berth remove box1
//! ```

pub mod config;

pub use config::Config;

/// Version of the berth CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
