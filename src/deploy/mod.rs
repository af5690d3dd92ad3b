//! Declarative deployer
//!
//! `apply` drives each host in the config through the same idempotent
//! pipeline: probe the server over SSH, cross-build the binary for its
//! architecture, render the systemd units and NFS export rules, diff them
//! against what is installed, and push only the delta. Services restart
//! only when their unit content changed; re-running an unchanged config
//! performs no writes and no restarts.
//!
//! The two side-effect surfaces (the SSH transport and the local system)
//! are behind traits so the whole pipeline runs against doubles in tests.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::build::{build_for_arch, BuildArch};
use crate::config::{Config, HostSpec, MountSpec};
use crate::error::{Error, Result};
use crate::probe::{self, RemoteFacts};
use crate::ssh::{RemoteTransport, SshSession};
use crate::units::{self, ExportEntry, RenderContext};

/// Where the binary lands on the server
pub const REMOTE_BINARY_PATH: &str = "/usr/local/bin/autonfs";

/// Watcher service unit name and install path
pub const WATCHER_UNIT: &str = "autonfs-watcher.service";
pub const WATCHER_UNIT_PATH: &str = "/etc/systemd/system/autonfs-watcher.service";

/// Exports file install path
pub const EXPORTS_PATH: &str = "/etc/exports.d/autonfs.exports";

// Remote staging paths (moved into place by the fused install command)
const STAGED_BINARY: &str = "/tmp/autonfs";
const STAGED_UNIT: &str = "/tmp/autonfs-watcher.service";
const STAGED_EXPORTS: &str = "/tmp/autonfs.exports";

/// Local command execution and file reading, injectable for tests
pub trait LocalExecutor {
    /// Run a command with inherited stdio (interactive sudo works)
    fn run_cmd(&mut self, name: &str, args: &[&str]) -> Result<()>;

    /// Read a local file
    fn read_file(&mut self, path: &str) -> Result<Vec<u8>>;
}

/// Production executor backed by `std::process::Command`
pub struct SystemExecutor;

impl LocalExecutor for SystemExecutor {
    fn run_cmd(&mut self, name: &str, args: &[&str]) -> Result<()> {
        let status = std::process::Command::new(name).args(args).status()?;
        if !status.success() {
            return Err(Error::RemoteCommandFailed {
                code: status.code().unwrap_or(-1),
                output: format!("{name} {}", args.join(" ")),
            });
        }
        Ok(())
    }

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }
}

/// Binary production for a target architecture, injectable for tests
pub trait ArtifactBuilder {
    fn build(&mut self, arch: &BuildArch, output: &Path) -> Result<()>;
}

/// Production builder: cross-compiles via cargo
pub struct CargoBuilder;

impl ArtifactBuilder for CargoBuilder {
    fn build(&mut self, arch: &BuildArch, output: &Path) -> Result<()> {
        build_for_arch(arch, output)
    }
}

/// Options for the declarative `apply`
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Preview only: render and diff, mutate nothing
    pub dry_run: bool,
    /// Deploy the watcher unit with `--dry-run` (it logs instead of
    /// powering off)
    pub watcher_dry_run: bool,
}

/// Options for the legacy single-mount `deploy` command
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub alias: String,
    pub local_dir: String,
    pub remote_dir: String,
    pub idle_timeout: String,
    pub load_threshold: String,
    pub dry_run: bool,
    pub watcher_dry_run: bool,
}

/// The deployer; owns its collaborators for the run
pub struct Deployer {
    /// Injected transport is reused for every host; otherwise one session
    /// is established per host alias
    transport: Option<Box<dyn RemoteTransport>>,
    builder: Box<dyn ArtifactBuilder>,
    local: Box<dyn LocalExecutor>,
}

impl Default for Deployer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deployer {
    /// Production deployer: per-host SSH sessions, cargo builds, real
    /// local execution
    pub fn new() -> Self {
        Self {
            transport: None,
            builder: Box::new(CargoBuilder),
            local: Box::new(SystemExecutor),
        }
    }

    /// Construct with injected collaborators (tests)
    pub fn with_deps(
        transport: Box<dyn RemoteTransport>,
        builder: Box<dyn ArtifactBuilder>,
        local: Box<dyn LocalExecutor>,
    ) -> Self {
        Self {
            transport: Some(transport),
            builder,
            local,
        }
    }

    /// Apply a declarative config: every host, sequentially.
    ///
    /// A failure aborts the run at the failing host; already-applied hosts
    /// are not rolled back (re-running converges).
    pub fn apply(&mut self, config: &Config, opts: &ApplyOptions) -> Result<()> {
        for host in &config.hosts {
            if let Err(e) = self.apply_host(host, opts) {
                warn!("deployment to host {} failed: {e}", host.alias);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Legacy single-mount deploy: synthesize a config and delegate.
    pub fn deploy(&mut self, opts: &DeployOptions) -> Result<()> {
        if !opts.dry_run {
            // Warm up sudo so later local steps do not stall mid-pipeline
            if self.local.run_cmd("sudo", &["-v"]).is_err() {
                warn!("could not obtain sudo privileges; local steps may fail");
            }
        }

        let config = Config {
            hosts: vec![HostSpec {
                alias: opts.alias.clone(),
                mounts: vec![MountSpec {
                    local: opts.local_dir.clone(),
                    remote: opts.remote_dir.clone(),
                    options: None,
                }],
                idle_timeout: Some(opts.idle_timeout.clone()),
                wake_timeout: None,
                load_threshold: Some(opts.load_threshold.clone()),
                shutdown_cmd: None,
            }],
        };

        self.apply(
            &config,
            &ApplyOptions {
                dry_run: opts.dry_run,
                watcher_dry_run: opts.watcher_dry_run,
            },
        )
    }

    fn apply_host(&mut self, host: &HostSpec, opts: &ApplyOptions) -> Result<()> {
        info!(
            "deploying to host {}{}",
            host.alias,
            if opts.dry_run { " [dry-run]" } else { "" }
        );

        // 1-2. Connect and probe
        let mut owned_session;
        let transport: &mut dyn RemoteTransport = match self.transport.as_mut() {
            Some(t) => t.as_mut(),
            None => {
                owned_session = SshSession::new(&host.alias);
                owned_session.connect()?;
                &mut owned_session
            }
        };

        let facts = probe::probe(transport)?;
        info!(
            "remote: {} ({}, {})",
            facts.hostname, facts.ip, facts.arch
        );

        // 3. Local egress IP toward the server: that is the address NFS
        // export rules must grant
        let client_ip = outbound_ip(&facts.ip);

        // 4. Cross-build
        let arch = BuildArch::from_uname(&facts.arch);
        let staged_binary = std::env::temp_dir().join(format!("autonfs-bin-{}", arch.as_str()));
        if opts.dry_run {
            info!("[dry-run] would build binary for {}", arch.as_str());
        } else {
            self.builder.build(&arch, &staged_binary)?;
        }

        // 5. Render server artifacts
        let ctx = server_context(host, &facts, &client_ip, opts.watcher_dry_run);
        let service_content = units::render_watcher_service(&ctx);
        let exports_content = units::render_exports(&ctx);

        // 6. Remote diff
        let service_changed = remote_changed(transport, WATCHER_UNIT_PATH, &service_content);
        let exports_changed = remote_changed(transport, EXPORTS_PATH, &exports_content);

        // 7. Remote apply
        if opts.dry_run {
            info!("[dry-run] would upload binary to {REMOTE_BINARY_PATH}");
            if service_changed {
                info!("[dry-run] would install and restart {WATCHER_UNIT}");
            }
            if exports_changed {
                info!("[dry-run] would install exports to {EXPORTS_PATH}");
            }
        } else {
            transport.upload(&staged_binary, STAGED_BINARY)?;
            upload_rendered(transport, &service_content, STAGED_UNIT)?;
            upload_rendered(transport, &exports_content, STAGED_EXPORTS)?;

            let mut install_cmds = vec![
                format!("mv {STAGED_BINARY} {REMOTE_BINARY_PATH}"),
                format!("chmod +x {REMOTE_BINARY_PATH}"),
                format!("mv {STAGED_UNIT} {WATCHER_UNIT_PATH}"),
                "mkdir -p /etc/exports.d".to_string(),
                format!("mv {STAGED_EXPORTS} {EXPORTS_PATH}"),
                "systemctl daemon-reload".to_string(),
                // Self-healing: a disabled or stopped watcher comes back
                format!("systemctl enable --now {WATCHER_UNIT}"),
                "exportfs -ra".to_string(),
            ];
            if service_changed {
                info!("watcher service changed, scheduling restart");
                install_cmds.push(format!("systemctl restart {WATCHER_UNIT}"));
            }

            let fused = format!("sudo bash -c 'set -e; {}'", install_cmds.join(" && "));
            transport.run_tty(&fused)?;
        }

        // 8-9. Local units
        self.apply_local_units(host, &facts, opts)?;

        info!("host {} applied", host.alias);
        Ok(())
    }

    fn apply_local_units(
        &mut self,
        host: &HostSpec,
        facts: &RemoteFacts,
        opts: &ApplyOptions,
    ) -> Result<()> {
        let binary_path = local_binary_path();
        let mut any_changed = false;

        for mount in &host.mounts {
            let unit_name = units::escape_unit_path(&mount.local);
            let mount_file = format!("/etc/systemd/system/{unit_name}.mount");
            let automount_file = format!("/etc/systemd/system/{unit_name}.automount");
            let automount_unit = format!("{unit_name}.automount");

            let ctx = RenderContext {
                server_ip: facts.ip.clone(),
                mac: facts.mac.clone(),
                binary_path: binary_path.clone(),
                remote_dir: mount.remote.clone(),
                local_dir: mount.local.clone(),
                mount_options: mount.options.clone(),
                idle_timeout: host.idle_timeout().to_string(),
                wake_timeout: host.wake_timeout().to_string(),
                ..Default::default()
            };

            let mount_content = units::render_mount(&ctx);
            let automount_content = units::render_automount(&ctx);

            let mut unit_changed = false;
            for (path, content) in [
                (&mount_file, &mount_content),
                (&automount_file, &automount_content),
            ] {
                if !local_changed(self.local.as_mut(), path, content) {
                    continue;
                }
                info!("updating {path}");
                if opts.dry_run {
                    info!("[dry-run] would write {path}");
                } else {
                    self.local_write(path, content)?;
                }
                unit_changed = true;
                any_changed = true;
            }

            // Always ensure the automount is enabled and running
            if opts.dry_run {
                info!("[dry-run] would enable --now {automount_unit}");
            } else {
                self.local
                    .run_cmd("sudo", &["systemctl", "enable", "--now", &automount_unit])?;
            }

            // Restart only when this mount's units changed
            if unit_changed {
                if opts.dry_run {
                    info!("[dry-run] would restart {automount_unit}");
                } else {
                    // The unit must be re-read before the restart picks up
                    // the new content
                    self.local.run_cmd("sudo", &["systemctl", "daemon-reload"])?;
                    self.local
                        .run_cmd("sudo", &["systemctl", "restart", &automount_unit])?;
                }
            }
        }

        if any_changed {
            if opts.dry_run {
                info!("[dry-run] would daemon-reload");
            } else {
                self.local.run_cmd("sudo", &["systemctl", "daemon-reload"])?;
            }
        }
        Ok(())
    }

    /// Remove the per-mount units locally and, when an alias is given, the
    /// watcher and exports on the server. Every step is best-effort so a
    /// failure never blocks the remaining cleanup.
    pub fn undeploy(&mut self, alias: Option<&str>, local_dir: &str) -> Result<()> {
        let _ = self.local.run_cmd("sudo", &["-v"]);

        let unit_name = units::escape_unit_path(local_dir);
        let automount_unit = format!("{unit_name}.automount");
        let mount_unit = format!("{unit_name}.mount");
        let mount_file = format!("/etc/systemd/system/{mount_unit}");
        let automount_file = format!("/etc/systemd/system/{automount_unit}");

        info!("removing local units for {local_dir}");
        let _ = self
            .local
            .run_cmd("sudo", &["systemctl", "disable", "--now", &automount_unit]);
        let _ = self.local.run_cmd("sudo", &["systemctl", "stop", &mount_unit]);
        let _ = self
            .local
            .run_cmd("sudo", &["systemctl", "disable", &mount_unit]);
        let _ = self.local.run_cmd("sudo", &["rm", "-f", &mount_file]);
        let _ = self.local.run_cmd("sudo", &["rm", "-f", &automount_file]);
        let _ = self.local.run_cmd("sudo", &["systemctl", "daemon-reload"]);

        if let Some(alias) = alias {
            info!("cleaning up remote host {alias}");
            let mut owned_session;
            let transport: &mut dyn RemoteTransport = match self.transport.as_mut() {
                Some(t) => t.as_mut(),
                None => {
                    owned_session = SshSession::new(alias);
                    owned_session.connect()?;
                    &mut owned_session
                }
            };

            let cleanup = [
                format!("systemctl disable --now {WATCHER_UNIT} || true"),
                format!("rm -f {WATCHER_UNIT_PATH}"),
                format!("rm -f {EXPORTS_PATH}"),
                "systemctl daemon-reload".to_string(),
                "exportfs -r || true".to_string(),
            ];
            let fused = format!("sudo bash -c '{}'", cleanup.join(" && "));
            transport.run_tty(&fused)?;
            info!("remote cleanup done");
        }

        info!("undeploy completed");
        Ok(())
    }

    /// Atomic local install: write to a temp file, then move into place
    /// with elevated privileges so the visible file transitions in one step.
    fn local_write(&mut self, path: &str, content: &str) -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;

        let tmp_path = tmp.path().to_string_lossy().to_string();
        self.local.run_cmd("sudo", &["mv", &tmp_path, path])?;
        Ok(())
    }
}

/// Build the render context for the server-side artifacts
fn server_context(
    host: &HostSpec,
    facts: &RemoteFacts,
    client_ip: &str,
    watcher_dry_run: bool,
) -> RenderContext {
    RenderContext {
        server_ip: facts.ip.clone(),
        client_ip: client_ip.to_string(),
        mac: facts.mac.clone(),
        binary_path: REMOTE_BINARY_PATH.to_string(),
        idle_timeout: host.idle_timeout().to_string(),
        wake_timeout: host.wake_timeout().to_string(),
        load_threshold: host.load_threshold().to_string(),
        watcher_dry_run,
        exports: host
            .mounts
            .iter()
            .map(|m| ExportEntry {
                path: m.remote.clone(),
                client_ip: client_ip.to_string(),
            })
            .collect(),
        ..Default::default()
    }
}

/// The local IP the OS routes toward `target`; this is the client address
/// the server's export rules must grant.
///
/// Connecting a UDP socket assigns the local address without sending any
/// datagram; the port is immaterial.
pub fn outbound_ip(target: &str) -> String {
    let socket = match std::net::UdpSocket::bind("0.0.0.0:0") {
        Ok(s) => s,
        Err(_) => return "0.0.0.0".to_string(),
    };
    if socket.connect((target, 80)).is_err() {
        return "0.0.0.0".to_string();
    }
    socket
        .local_addr()
        .map(|a| a.ip().to_string())
        .unwrap_or_else(|_| "0.0.0.0".to_string())
}

/// Compare a remote file against freshly rendered content.
///
/// The transport trims combined output, so the comparison normalizes
/// trailing whitespace. A missing file or read error counts as changed.
fn remote_changed(transport: &mut dyn RemoteTransport, path: &str, content: &str) -> bool {
    match transport.run(&format!("cat {path}")) {
        Ok(existing) => existing != content.trim_end(),
        Err(_) => true,
    }
}

/// Compare a local file against freshly rendered content; missing or
/// unreadable counts as changed.
fn local_changed(local: &mut dyn LocalExecutor, path: &str, content: &str) -> bool {
    match local.read_file(path) {
        Ok(existing) => existing != content.as_bytes(),
        Err(_) => true,
    }
}

/// Stage rendered content on the remote host via a local temp file
fn upload_rendered(
    transport: &mut dyn RemoteTransport,
    content: &str,
    remote_path: &str,
) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new()?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    transport.upload(tmp.path(), remote_path)
}

/// Path the client units invoke for the wake hook: the running executable,
/// falling back to the installed location.
fn local_binary_path() -> String {
    std::env::current_exe()
        .map(|p: PathBuf| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| REMOTE_BINARY_PATH.to_string())
}
