//! Minimal `~/.ssh/config` resolution
//!
//! The deployer addresses servers by SSH alias. This parser extracts the
//! handful of keywords we need (`HostName`, `User`, `Port`, `IdentityFile`)
//! from the user's config, following OpenSSH's first-obtained-value-wins
//! rule. Everything else in the file is ignored.

use std::path::PathBuf;

/// Connection parameters resolved for an alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    pub alias: String,
    pub host: String,
    pub user: String,
    pub port: u16,
    /// IdentityFile from the config, tilde-expanded
    pub identity_file: Option<PathBuf>,
}

/// Resolve an alias against the user's `~/.ssh/config`.
///
/// A missing or unreadable config is not an error; the alias is used as the
/// hostname with default user and port.
pub fn resolve(alias: &str) -> ResolvedHost {
    let content = home_dir()
        .map(|home| home.join(".ssh").join("config"))
        .and_then(|path| std::fs::read_to_string(path).ok())
        .unwrap_or_default();
    resolve_from(&content, alias)
}

/// Resolve an alias against config content (pure; testable).
pub fn resolve_from(content: &str, alias: &str) -> ResolvedHost {
    let mut host = None;
    let mut user = None;
    let mut port = None;
    let mut identity = None;

    let mut in_matching_block = false;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (keyword, value) = match split_keyword(line) {
            Some(pair) => pair,
            None => continue,
        };

        if keyword.eq_ignore_ascii_case("host") {
            in_matching_block = value.split_whitespace().any(|p| pattern_matches(p, alias));
            continue;
        }
        if !in_matching_block {
            continue;
        }

        // First obtained value wins, per ssh_config(5)
        match keyword.to_ascii_lowercase().as_str() {
            "hostname" if host.is_none() => host = Some(value.to_string()),
            "user" if user.is_none() => user = Some(value.to_string()),
            "port" if port.is_none() => port = value.parse::<u16>().ok(),
            "identityfile" if identity.is_none() => identity = Some(expand_tilde(value)),
            _ => {}
        }
    }

    ResolvedHost {
        alias: alias.to_string(),
        host: host.unwrap_or_else(|| alias.to_string()),
        user: user
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "root".to_string()),
        port: port.unwrap_or(22),
        identity_file: identity,
    }
}

fn split_keyword(line: &str) -> Option<(&str, &str)> {
    // ssh_config allows `Key value` and `Key=value`
    if let Some((k, v)) = line.split_once('=') {
        return Some((k.trim(), v.trim()));
    }
    let mut parts = line.splitn(2, char::is_whitespace);
    let keyword = parts.next()?;
    let value = parts.next()?.trim();
    Some((keyword, value))
}

/// Match an ssh_config host pattern (`*` wildcard only) against an alias
fn pattern_matches(pattern: &str, alias: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return alias.starts_with(prefix);
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return alias.ends_with(suffix);
    }
    pattern == alias
}

/// Expand a leading `~/` against the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Conventional default private keys, in preference order
pub fn default_identity_files() -> Vec<PathBuf> {
    let Some(home) = home_dir() else {
        return Vec::new();
    };
    let ssh = home.join(".ssh");
    ["id_rsa", "id_ed25519", "id_ecdsa"]
        .iter()
        .map(|name| ssh.join(name))
        .filter(|p: &PathBuf| p.exists())
        .collect()
}
