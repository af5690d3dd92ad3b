//! Cross-compilation of the autonfs binary for a remote host
//!
//! The deployer learns the server's machine token from `uname -m` and needs
//! a Linux binary for that architecture. The token maps through a small
//! closed lookup to a build architecture, which in turn selects a fully
//! static target triple (no C linkage, so the produced binary runs on any
//! distro).

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::error::{Error, Result};

/// Build architecture derived from a `uname -m` token.
///
/// Unknown tokens pass through unchanged so exotic targets still build when
/// the local toolchain supports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildArch {
    Amd64,
    Arm64,
    Arm,
    Other(String),
}

impl BuildArch {
    /// Map a `uname -m` token to a build architecture
    pub fn from_uname(token: &str) -> Self {
        match token {
            "x86_64" => BuildArch::Amd64,
            "aarch64" => BuildArch::Arm64,
            "armv7l" => BuildArch::Arm,
            other => BuildArch::Other(other.to_string()),
        }
    }

    /// Canonical short name (`amd64`, `arm64`, `arm`, or the raw token)
    pub fn as_str(&self) -> &str {
        match self {
            BuildArch::Amd64 => "amd64",
            BuildArch::Arm64 => "arm64",
            BuildArch::Arm => "arm",
            BuildArch::Other(token) => token,
        }
    }

    /// Static Linux target triple for this architecture
    pub fn target_triple(&self) -> String {
        match self {
            BuildArch::Amd64 => "x86_64-unknown-linux-musl".to_string(),
            BuildArch::Arm64 => "aarch64-unknown-linux-musl".to_string(),
            BuildArch::Arm => "armv7-unknown-linux-musleabihf".to_string(),
            BuildArch::Other(token) => format!("{token}-unknown-linux-musl"),
        }
    }
}

/// Whether a build architecture matches the machine we are running on
pub fn is_native_arch(arch: &BuildArch) -> bool {
    arch.as_str() == BuildArch::from_uname(std::env::consts::ARCH).as_str()
}

/// Cross-build the autonfs binary for `arch`, placing it at `output`.
pub fn build_for_arch(arch: &BuildArch, output: &Path) -> Result<()> {
    let triple = arch.target_triple();
    info!(
        "compiling {} target {} -> {}",
        if is_native_arch(arch) { "native" } else { "cross" },
        triple,
        output.display()
    );

    let status = Command::new("cargo")
        .args(["build", "--release", "--target", &triple])
        .status()
        .map_err(|e| Error::FileIo(std::io::Error::other(format!("spawn cargo: {e}"))))?;

    if !status.success() {
        return Err(Error::FileIo(std::io::Error::other(format!(
            "cargo build for {triple} exited with {status}"
        ))));
    }

    let artifact = Path::new("target").join(&triple).join("release").join("autonfs");
    std::fs::copy(&artifact, output)?;
    Ok(())
}
