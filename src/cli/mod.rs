//! CLI surface for autonfs
//!
//! Subcommands:
//! - `autonfs debug <alias>` - probe a host, print its facts
//! - `autonfs wake` - send a WoL packet, wait for a port to open
//! - `autonfs watch` - run the server-side idle watcher
//! - `autonfs apply -f autonfs.yaml` - declarative deployment
//! - `autonfs deploy <alias>` - legacy single-mount deployment
//! - `autonfs undeploy [<alias>]` - remove deployed units

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};

mod commands;

pub use commands::run_command;

#[derive(Parser, Debug)]
#[command(name = "autonfs")]
#[command(about = "On-demand NFS: wake servers on first access, power them off when idle")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test SSH connectivity and print discovered host facts
    Debug(DebugArgs),

    /// Send a Wake-on-LAN packet and wait for a TCP port to open
    Wake(WakeArgs),

    /// Monitor NFS clients and system load; power off when idle
    Watch(WatchArgs),

    /// Deploy every host declared in a YAML config
    Apply(ApplyArgs),

    /// Deploy a single mount to one host (legacy)
    Deploy(DeployArgs),

    /// Remove local units and optionally clean up the server
    Undeploy(UndeployArgs),
}

/// Arguments for the debug command
#[derive(Parser, Debug)]
pub struct DebugArgs {
    /// SSH alias of the host to probe
    pub alias: String,
}

/// Arguments for the wake command
#[derive(Parser, Debug)]
pub struct WakeArgs {
    /// MAC address of the server's NIC
    #[arg(long)]
    pub mac: String,

    /// IP address to probe for readiness
    #[arg(long)]
    pub ip: String,

    /// Broadcast address for the magic packet
    #[arg(long, default_value = "255.255.255.255")]
    pub bcast: Ipv4Addr,

    /// TCP port to wait on (NFS)
    #[arg(long, default_value = "2049")]
    pub port: u16,

    /// Give up after this long
    #[arg(long, default_value = "120s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Idle span after which the machine powers off
    #[arg(long, default_value = "30m", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Load average below which the system counts as quiescent
    #[arg(long, default_value = "0.5")]
    pub load: f64,

    /// Seconds between signal evaluations
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub poll: Duration,

    /// Log the verdicts but never power off
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the declarative apply command
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Config file path
    #[arg(short = 'f', long = "file", default_value = "autonfs.yaml")]
    pub file: PathBuf,

    /// Preview the changes without applying them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Deploy the watcher in dry-run mode (log only)
    #[arg(long)]
    pub watcher_dry_run: bool,
}

/// Arguments for the legacy deploy command
#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// SSH alias of the server
    pub alias: String,

    /// Local mount point
    #[arg(long)]
    pub local_dir: String,

    /// Remote directory to export
    #[arg(long)]
    pub remote_dir: String,

    /// Idle shutdown time
    #[arg(long, default_value = "30m")]
    pub idle: String,

    /// Load threshold
    #[arg(long, default_value = "0.5")]
    pub load: String,

    /// Preview the changes without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Deploy the watcher in dry-run mode (log only)
    #[arg(long)]
    pub watcher_dry_run: bool,
}

/// Arguments for the undeploy command
#[derive(Parser, Debug)]
pub struct UndeployArgs {
    /// SSH alias; when given, the server-side units are removed too
    pub alias: Option<String>,

    /// Local mount point whose units are removed
    #[arg(long)]
    pub local_dir: String,
}
