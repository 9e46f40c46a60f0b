// ABOUTME: CLI entry point for berth.
// ABOUTME: Dispatches key, include, setup, remove and config subcommands.

use anyhow::{Context, Result};
use berth_cli::Config;
use berth_ssh::{IncludeStatus, Provisioner, SshLayout};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "berth")]
#[command(about = "SSH access to local containers on loopback ports")]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults to ~/.config/berth/config.toml)
    #[arg(long, global = true, env = "BERTH_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure the shared identity exists and print its public key
    Key {
        /// Private key path (defaults to the configured identity)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Comment for a newly generated key
        #[arg(long)]
        comment: Option<String>,
    },

    /// Make ~/.ssh/config include the per-target configs
    Include {
        /// SSH directory (defaults to the configured one)
        #[arg(long)]
        ssh_dir: Option<PathBuf>,
    },

    /// Provision SSH access to a target listening on a loopback port
    Setup {
        /// Target name, used as the ssh host alias
        target: String,

        /// Loopback port the target's sshd is forwarded to
        #[arg(long, short)]
        port: u16,

        /// Target's host public key line (e.g. "ssh-ed25519 AAAA...")
        #[arg(long, conflicts_with = "host_key_file", required_unless_present = "host_key_file")]
        host_key: Option<String>,

        /// File containing the target's host public key
        #[arg(long)]
        host_key_file: Option<PathBuf>,
    },

    /// Remove a target's config and known_hosts files
    Remove {
        /// Target name
        target: String,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    berth_log::init(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    match cli.command {
        Commands::Key { path, comment } => run_key(&config, path, comment),
        Commands::Include { ssh_dir } => run_include(&config, ssh_dir),
        Commands::Setup {
            target,
            port,
            host_key,
            host_key_file,
        } => run_setup(&config, &target, port, host_key, host_key_file),
        Commands::Remove { target } => run_remove(&config, &target),
        Commands::Config => run_config(&config),
    }
}

/// Ensure the identity and print its public key
fn run_key(config: &Config, path: Option<PathBuf>, comment: Option<String>) -> Result<()> {
    let layout = config.layout()?;
    let path = path.unwrap_or(layout.identity_file);
    let comment = comment.unwrap_or(layout.identity_comment);

    berth_ssh::ensure_identity(&mut std::io::stderr(), &path, &comment)
        .context("Failed to ensure identity")?;

    let key = berth_ssh::load_key(&path)?;
    print!("{}", berth_ssh::authorized_key_line(&key)?);
    Ok(())
}

/// Ensure ~/.ssh/config includes config.d/*.conf
fn run_include(config: &Config, ssh_dir: Option<PathBuf>) -> Result<()> {
    let ssh_dir = match ssh_dir {
        Some(dir) => dir,
        None => config.layout()?.ssh_dir,
    };

    let status = berth_ssh::ensure_include(&mut std::io::stderr(), &ssh_dir)
        .context("Failed to update ssh config")?;
    let config_path = berth_ssh::aggregate_config_path(&ssh_dir);
    match status {
        IncludeStatus::AlreadyPresent => {
            println!("{} already includes config.d", config_path.display())
        }
        IncludeStatus::Created => println!("Created {}", config_path.display()),
        IncludeStatus::NeedsManualEdit => {}
    }
    Ok(())
}

/// Provision one target
fn run_setup(
    config: &Config,
    target: &str,
    port: u16,
    host_key: Option<String>,
    host_key_file: Option<PathBuf>,
) -> Result<()> {
    let host_key = match (host_key, host_key_file) {
        (Some(line), _) => line,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read host key from {}", path.display()))?,
        (None, None) => anyhow::bail!("either --host-key or --host-key-file is required"),
    };

    let provisioner = provisioner(config)?;
    let mut err = std::io::stderr();
    let paths = provisioner
        .setup_target(&mut err, target, port, &host_key)
        .with_context(|| format!("Failed to set up {target}"))?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "Configured {target} on 127.0.0.1:{port}")?;
    writeln!(out, "  Config:      {}", paths.host_config.display())?;
    writeln!(out, "  Known hosts: {}", paths.known_hosts.display())?;
    if paths.include == IncludeStatus::NeedsManualEdit {
        writeln!(out, "Connect with: ssh -F {} {target}", paths.host_config.display())?;
    } else {
        writeln!(out, "Connect with: ssh {target}")?;
    }
    Ok(())
}

/// Remove a target's files
fn run_remove(config: &Config, target: &str) -> Result<()> {
    provisioner(config)?.remove_target(target);
    println!("Removed {target}");
    Ok(())
}

/// Print the effective configuration as TOML
fn run_config(config: &Config) -> Result<()> {
    let resolved = config.resolved()?;
    print!(
        "{}",
        toml::to_string_pretty(&resolved).context("Failed to serialize config")?
    );
    Ok(())
}

fn provisioner(config: &Config) -> Result<Provisioner> {
    let layout: SshLayout = config.layout()?;
    Ok(Provisioner::new(layout))
}
