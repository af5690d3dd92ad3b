//! SSH transport
//!
//! One persistent session per host, addressed by `~/.ssh/config` alias.
//! Three capabilities are exposed through the `RemoteTransport` trait so the
//! deployer and probe can run against a test double:
//!
//! - `run`: non-interactive exec, combined trimmed output
//! - `run_tty`: interactive exec on a PTY with the local terminal in raw
//!   mode (remote `sudo` password prompts work)
//! - `upload`: SCP file transfer
//!
//! Authentication tries the agent first, then the alias's configured
//! identity file, then the conventional default keys. Host-key checking is
//! deliberately not performed in the current design.

mod ssh_config;
mod terminal;

pub use ssh_config::{resolve_from, ResolvedHost};
pub use terminal::RawModeGuard;

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use ssh2::Session;
use tracing::debug;

use crate::error::{Error, Result};

/// TCP dial timeout for the initial connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote operations the deployer and probe depend on.
///
/// Production implementation is `SshSession`; tests inject doubles.
pub trait RemoteTransport {
    /// Run a command non-interactively; returns trimmed stdout+stderr.
    /// Non-zero exit maps to `RemoteCommandFailed` carrying the output.
    fn run(&mut self, cmd: &str) -> Result<String>;

    /// Run a command on a PTY with local stdin/stdout wired through
    fn run_tty(&mut self, cmd: &str) -> Result<()>;

    /// Upload a local file to a remote path
    fn upload(&mut self, local: &Path, remote: &str) -> Result<()>;
}

/// A persistent SSH session to one host
pub struct SshSession {
    resolved: ResolvedHost,
    session: Option<Session>,
}

impl SshSession {
    /// Resolve an alias against the user's SSH configuration.
    ///
    /// No connection is made yet; `connect` (or the first command) does
    /// that lazily.
    pub fn new(alias: &str) -> Self {
        Self {
            resolved: ssh_config::resolve(alias),
            session: None,
        }
    }

    /// Host the session resolves to
    pub fn host(&self) -> &str {
        &self.resolved.host
    }

    /// User the session authenticates as
    pub fn user(&self) -> &str {
        &self.resolved.user
    }

    /// Establish the connection if not already connected.
    pub fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let target = format!("{}:{}", self.resolved.host, self.resolved.port);
        let addr = target
            .to_socket_addrs()
            .map_err(|e| Error::Transport(format!("resolve {target}: {e}")))?
            .next()
            .ok_or_else(|| Error::Transport(format!("no address for {target}")))?;

        let tcp = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .map_err(|e| Error::Transport(format!("connect {target}: {e}")))?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;

        self.authenticate(&mut session)?;
        if !session.authenticated() {
            return Err(Error::Transport(format!(
                "all authentication methods failed for {}@{}",
                self.resolved.user, self.resolved.host
            )));
        }

        debug!(
            "ssh session established: {}@{}",
            self.resolved.user, self.resolved.host
        );
        self.session = Some(session);
        Ok(())
    }

    /// Agent first, then the configured identity, then default keys.
    fn authenticate(&self, session: &mut Session) -> Result<()> {
        let user = &self.resolved.user;

        if session.userauth_agent(user).is_ok() && session.authenticated() {
            return Ok(());
        }

        let mut keys = Vec::new();
        if let Some(identity) = &self.resolved.identity_file {
            keys.push(identity.clone());
        }
        keys.extend(ssh_config::default_identity_files());

        for key in keys {
            if !key.exists() {
                continue;
            }
            match session.userauth_pubkey_file(user, None, &key, None) {
                Ok(()) if session.authenticated() => return Ok(()),
                Ok(()) => {}
                Err(e) => debug!("key {} rejected: {}", key.display(), e),
            }
        }
        Ok(())
    }

    /// Close the connection; later commands reconnect.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            let _ = session.disconnect(None, "closing", None);
        }
    }

    fn session(&mut self) -> Result<&Session> {
        self.connect()?;
        Ok(self.session.as_ref().expect("connected above"))
    }
}

impl RemoteTransport for SshSession {
    fn run(&mut self, cmd: &str) -> Result<String> {
        let session = self.session()?;
        let mut channel = session.channel_session()?;
        channel.exec(cmd)?;

        let mut output = String::new();
        channel.read_to_string(&mut output)?;
        let mut stderr = String::new();
        channel.stderr().read_to_string(&mut stderr)?;
        output.push_str(&stderr);

        channel.wait_close()?;
        let code = channel.exit_status()?;
        if code != 0 {
            return Err(Error::RemoteCommandFailed {
                code,
                output: output.trim().to_string(),
            });
        }
        Ok(output.trim().to_string())
    }

    fn run_tty(&mut self, cmd: &str) -> Result<()> {
        let session = self.session()?;
        let mut channel = session.channel_session()?;
        channel.request_pty("xterm", None, Some((80, 40, 0, 0)))?;
        channel.exec(cmd)?;

        // Raw mode for the duration; the guard restores on every exit path
        let _raw = RawModeGuard::new();

        session.set_blocking(false);
        let pump_result = pump_channel(&mut channel);
        session.set_blocking(true);
        pump_result?;

        channel.wait_close()?;
        let code = channel.exit_status()?;
        if code != 0 {
            return Err(Error::RemoteCommandFailed {
                code,
                output: String::new(),
            });
        }
        Ok(())
    }

    fn upload(&mut self, local: &Path, remote: &str) -> Result<()> {
        let content = std::fs::read(local)?;

        let session = self.session()?;
        let mut channel = session.scp_send(Path::new(remote), 0o644, content.len() as u64, None)?;
        channel.write_all(&content)?;
        channel.send_eof()?;
        channel.wait_eof()?;
        channel.close()?;
        channel.wait_close()?;
        debug!("uploaded {} -> {}", local.display(), remote);
        Ok(())
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Shuttle bytes between the local terminal and a non-blocking PTY channel
/// until the remote side closes.
fn pump_channel(channel: &mut ssh2::Channel) -> Result<()> {
    use nix::fcntl::{fcntl, FcntlArg, OFlag};
    use std::os::fd::AsFd;

    let mut stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    // Non-blocking stdin so the pump loop never stalls waiting for keys
    let stdin_flags = fcntl(stdin.as_fd(), FcntlArg::F_GETFL)
        .map(OFlag::from_bits_truncate)
        .unwrap_or(OFlag::empty());
    let _ = fcntl(
        stdin.as_fd(),
        FcntlArg::F_SETFL(stdin_flags | OFlag::O_NONBLOCK),
    );

    let mut buf = [0u8; 4096];
    let result = loop {
        // Remote stdout -> local stdout
        match channel.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                if let Err(e) = stdout.write_all(&buf[..n]).and_then(|_| stdout.flush()) {
                    break Err(Error::FileIo(e));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => break Err(Error::Transport(format!("pty read: {e}"))),
        }

        // Remote stderr -> local stdout (combined, PTY merges most of it)
        match channel.stderr().read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                if let Err(e) = stdout.write_all(&buf[..n]).and_then(|_| stdout.flush()) {
                    break Err(Error::FileIo(e));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => break Err(Error::Transport(format!("pty stderr read: {e}"))),
        }

        if channel.eof() {
            break Ok(());
        }

        // Local keystrokes -> remote
        match stdin.read(&mut buf) {
            Ok(0) => {
                // Local stdin closed; let the remote finish on its own
            }
            Ok(n) => {
                if let Err(e) = channel.write_all(&buf[..n]) {
                    if e.kind() != std::io::ErrorKind::WouldBlock {
                        break Err(Error::Transport(format!("pty write: {e}")));
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => break Err(Error::FileIo(e)),
        }

        std::thread::sleep(Duration::from_millis(10));
    };

    // Restore stdin flags before handing the terminal back
    let _ = fcntl(stdin.as_fd(), FcntlArg::F_SETFL(stdin_flags));
    result
}
