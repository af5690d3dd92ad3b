//! Declarative configuration for autonfs
//!
//! The `apply` subcommand is driven by a YAML file declaring hosts and their
//! mounts:
//!
//! ```yaml
//! hosts:
//!   - alias: nas
//!     idle_timeout: 30m
//!     wake_timeout: 120s
//!     mounts:
//!       - local: /mnt/data
//!         remote: /srv/data
//! ```
//!
//! Parsing and validation are pure functions over the file content; the I/O
//! boundary is `load_config_file`.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default idle timeout applied when a host omits `idle_timeout`
pub const DEFAULT_IDLE_TIMEOUT: &str = "5m";

/// Default wake timeout applied when a host omits `wake_timeout`
pub const DEFAULT_WAKE_TIMEOUT: &str = "120s";

/// Default one-minute load threshold applied when a host omits `load_threshold`
pub const DEFAULT_LOAD_THRESHOLD: &str = "0.5";

/// Top-level structure of autonfs.yaml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub hosts: Vec<HostSpec>,
}

/// One managed server and the mounts a client takes from it
#[derive(Debug, Clone, Deserialize)]
pub struct HostSpec {
    /// SSH alias or hostname
    pub alias: String,

    /// Ordered list of directory mappings
    pub mounts: Vec<MountSpec>,

    /// Idle span after which the server powers off (e.g. "30m")
    #[serde(default)]
    pub idle_timeout: Option<String>,

    /// Deadline for wake-then-mount (e.g. "120s")
    #[serde(default)]
    pub wake_timeout: Option<String>,

    /// One-minute load average below which the server counts as quiescent
    #[serde(default)]
    pub load_threshold: Option<String>,

    /// Reserved: custom shutdown command (parsed, not yet wired to the watcher)
    #[serde(default)]
    pub shutdown_cmd: Option<String>,
}

impl HostSpec {
    /// Idle timeout with the default applied
    pub fn idle_timeout(&self) -> &str {
        self.idle_timeout.as_deref().unwrap_or(DEFAULT_IDLE_TIMEOUT)
    }

    /// Wake timeout with the default applied
    pub fn wake_timeout(&self) -> &str {
        self.wake_timeout.as_deref().unwrap_or(DEFAULT_WAKE_TIMEOUT)
    }

    /// Load threshold with the default applied
    pub fn load_threshold(&self) -> &str {
        self.load_threshold
            .as_deref()
            .unwrap_or(DEFAULT_LOAD_THRESHOLD)
    }
}

/// A single directory mapping between client and server
#[derive(Debug, Clone, Deserialize)]
pub struct MountSpec {
    /// Local mount point (absolute)
    pub local: String,

    /// Remote export path (absolute)
    pub remote: String,

    /// NFS mount options; falls back to the built-in set when omitted
    #[serde(default)]
    pub options: Option<String>,
}

/// Parse YAML content into a validated `Config`.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(content)
        .map_err(|e| Error::InvalidInput(format!("failed to parse config: {e}")))?;
    validate(&config)?;
    Ok(config)
}

/// Load and parse a config file from disk.
///
/// This is the I/O boundary; it reads the file and delegates to the pure
/// parsing function.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

fn validate(config: &Config) -> Result<()> {
    if config.hosts.is_empty() {
        return Err(Error::InvalidInput("no hosts defined in config".into()));
    }

    for (i, host) in config.hosts.iter().enumerate() {
        if host.alias.is_empty() {
            return Err(Error::InvalidInput(format!("host #{i} missing alias")));
        }
        if host.mounts.is_empty() {
            return Err(Error::InvalidInput(format!(
                "host {} has no mounts defined",
                host.alias
            )));
        }
        for (j, mount) in host.mounts.iter().enumerate() {
            if mount.local.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "host {} mount #{j} missing local path",
                    host.alias
                )));
            }
            if mount.remote.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "host {} mount #{j} missing remote path",
                    host.alias
                )));
            }
            if !mount.local.starts_with('/') {
                return Err(Error::InvalidInput(format!(
                    "host {} mount #{j} local path must be absolute: {}",
                    host.alias, mount.local
                )));
            }
            if !mount.remote.starts_with('/') {
                return Err(Error::InvalidInput(format!(
                    "host {} mount #{j} remote path must be absolute: {}",
                    host.alias, mount.remote
                )));
            }
        }

        validate_duration(&host.alias, "idle_timeout", host.idle_timeout.as_deref())?;
        validate_duration(&host.alias, "wake_timeout", host.wake_timeout.as_deref())?;

        if let Some(threshold) = &host.load_threshold {
            threshold.parse::<f64>().map_err(|_| {
                Error::InvalidInput(format!(
                    "host {} invalid load_threshold: {threshold}",
                    host.alias
                ))
            })?;
        }
    }
    Ok(())
}

fn validate_duration(alias: &str, field: &str, value: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        humantime::parse_duration(value)
            .map_err(|e| Error::InvalidInput(format!("host {alias} invalid {field}: {e}")))?;
    }
    Ok(())
}
