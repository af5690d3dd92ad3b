//! Server-side idle watcher
//!
//! Fuses three kernel-derived signals into an activity verdict every tick
//! and powers the machine off after a sustained idle span:
//!
//! 1. one-minute load average (`/proc/loadavg`)
//! 2. attached NFSv4 clients (`/proc/fs/nfsd/clients/*/info`)
//! 3. NFS RPC operation deltas (`/proc/net/rpc/nfsd`, `proc3`/`proc4` lines)
//!
//! A false idle verdict destroys in-flight work, so the verdict is a pure
//! function with a strict priority (load, then clients, then ops), the ops
//! delta keeps an explicit "no prior sample" state instead of a zero
//! sentinel, and every signal-read failure demotes that signal for the tick
//! rather than fabricating activity or idleness.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::Result;

/// Default tick cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Why a tick counted as active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveReason {
    /// Load average at or above the configured threshold
    HighLoad,
    /// At least one NFSv4 client attached (authoritative)
    ClientsAttached,
    /// RPC operation counters advanced since the previous sample
    NfsActivity,
}

impl ActiveReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveReason::HighLoad => "high load",
            ActiveReason::ClientsAttached => "clients attached",
            ActiveReason::NfsActivity => "NFS activity",
        }
    }
}

/// Per-tick activity verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Active(ActiveReason),
    Idle,
}

/// Watcher lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No idle pressure
    Monitoring,
    /// Accumulating idle time since the contained instant
    IdleCountdown { since: Instant },
    /// Power-off has been committed
    Shutdown,
}

/// Where the watcher reads its kernel signals.
///
/// Defaults to the real proc surfaces; tests point these at fixtures.
#[derive(Debug, Clone)]
pub struct SignalSources {
    /// Load averages; first whitespace-separated token is load1
    pub loadavg: PathBuf,
    /// NFSv4 client directory; one subdirectory per attached client
    pub clients_dir: PathBuf,
    /// NFS RPC statistics; `proc3`/`proc4` lines carry operation counters
    pub rpc_stats: PathBuf,
}

impl Default for SignalSources {
    fn default() -> Self {
        Self {
            loadavg: PathBuf::from("/proc/loadavg"),
            clients_dir: PathBuf::from("/proc/fs/nfsd/clients"),
            rpc_stats: PathBuf::from("/proc/net/rpc/nfsd"),
        }
    }
}

/// Action committed when the idle timeout is exceeded.
///
/// Injectable so tests observe commits without powering off the host.
pub trait ShutdownAction: Send {
    fn shutdown(&mut self) -> Result<()>;
}

/// Production action: `systemctl poweroff`
pub struct SystemdPoweroff;

impl ShutdownAction for SystemdPoweroff {
    fn shutdown(&mut self) -> Result<()> {
        let status = std::process::Command::new("systemctl")
            .arg("poweroff")
            .status()?;
        if !status.success() {
            return Err(crate::error::Error::RemoteCommandFailed {
                code: status.code().unwrap_or(-1),
                output: "systemctl poweroff".to_string(),
            });
        }
        Ok(())
    }
}

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Idle span that must elapse uninterrupted before power-off
    pub idle_timeout: Duration,
    /// Load threshold; load1 at or above this counts as active
    pub load_threshold: f64,
    /// Tick cadence
    pub poll_interval: Duration,
    /// Log what would happen instead of committing the shutdown
    pub dry_run: bool,
}

impl WatchConfig {
    pub fn new(idle_timeout: Duration, load_threshold: f64) -> Self {
        Self {
            idle_timeout,
            load_threshold,
            poll_interval: DEFAULT_POLL_INTERVAL,
            dry_run: false,
        }
    }
}

/// The idle watcher.
///
/// Owns its state for the process lifetime; nothing else mutates it.
pub struct Watcher {
    sources: SignalSources,
    action: Box<dyn ShutdownAction>,
    /// Instant of the most recent transition to non-active (or process
    /// start), the baseline the idle countdown measures from
    idle_since: Instant,
    /// Cumulative ops total from the last successful read; `None` until the
    /// first success and after any failed read, so a fresh read never
    /// produces a bogus delta
    last_ops_total: Option<u64>,
    phase: Phase,
    tick: u64,
}

impl Watcher {
    pub fn new(sources: SignalSources, action: Box<dyn ShutdownAction>) -> Self {
        Self {
            sources,
            action,
            // Starting counts as the last non-active transition: a watcher
            // restart must never power off immediately, and a restart during
            // an active mount resets right away because the client set is
            // authoritative.
            idle_since: Instant::now(),
            last_ops_total: None,
            phase: Phase::Monitoring,
            tick: 0,
        }
    }

    /// Run the watch loop until `cancel` fires.
    ///
    /// Cancellation is honored between ticks; an in-progress tick (bounded
    /// by local file I/O) runs to completion.
    pub async fn watch(&mut self, config: WatchConfig, mut cancel: watch::Receiver<bool>) {
        info!(
            idle_timeout = ?config.idle_timeout,
            load_threshold = config.load_threshold,
            poll_interval = ?config.poll_interval,
            dry_run = config.dry_run,
            "watcher started"
        );

        self.idle_since = Instant::now();
        self.phase = Phase::Monitoring;

        let mut ticker = tokio::time::interval(config.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The interval fires immediately once; consume that so the first
        // evaluation happens a full period after start
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(&config);
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("watcher cancelled");
                        return;
                    }
                }
            }
        }
    }

    /// One evaluation: read signals, fuse, advance the state machine.
    fn tick(&mut self, config: &WatchConfig) {
        self.tick += 1;
        let now = Instant::now();

        let load1 = self.read_load1();
        let clients = self.read_clients();
        let ops_delta = self.read_ops_delta();

        let verdict = fuse(load1, config.load_threshold, clients.len(), ops_delta);

        match verdict {
            Verdict::Active(reason) => {
                debug!(
                    tick = self.tick,
                    load1 = load1.unwrap_or(0.0),
                    clients = clients.len(),
                    "active: {}",
                    reason.as_str()
                );
                self.idle_since = now;
                self.phase = Phase::Monitoring;
            }
            Verdict::Idle => {
                let since = match self.phase {
                    Phase::IdleCountdown { since } => since,
                    Phase::Monitoring | Phase::Shutdown => self.idle_since,
                };
                let idle_for = now.duration_since(since);
                debug!(tick = self.tick, idle_secs = idle_for.as_secs_f64(), "idle");

                if idle_for > config.idle_timeout {
                    // A successful commit is terminal; don't re-issue the
                    // poweroff while the machine is going down
                    if self.phase != Phase::Shutdown {
                        self.commit_shutdown(config, now, idle_for);
                    }
                } else {
                    self.phase = Phase::IdleCountdown { since };
                }
            }
        }
    }

    fn commit_shutdown(&mut self, config: &WatchConfig, now: Instant, idle_for: Duration) {
        if config.dry_run {
            info!(
                idle_secs = idle_for.as_secs_f64(),
                "would power off (dry-run)"
            );
            // Reset so the log is not spammed every tick
            self.idle_since = now;
            self.phase = Phase::Monitoring;
            return;
        }

        info!(
            idle_secs = idle_for.as_secs_f64(),
            "idle timeout exceeded, powering off"
        );
        match self.action.shutdown() {
            Ok(()) => {
                // The kernel takes the process down with the machine
                self.phase = Phase::Shutdown;
            }
            Err(e) => {
                // Keep ticking; power-off may succeed on a later attempt
                error!("shutdown failed: {e}");
            }
        }
    }

    /// First token of the load-average file; `None` demotes the signal
    fn read_load1(&self) -> Option<f64> {
        let content = std::fs::read_to_string(&self.sources.loadavg).ok()?;
        content.split_whitespace().next()?.parse().ok()
    }

    /// IPs of attached NFSv4 clients.
    ///
    /// Each subdirectory with a well-formed `address:` line in its `info`
    /// file contributes one client. The kernel directory races against
    /// client churn, so malformed or unreadable entries are skipped
    /// silently. A missing directory means zero clients.
    fn read_clients(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.sources.clients_dir) else {
            return Vec::new();
        };

        let mut clients = Vec::new();
        for entry in entries.flatten() {
            let info_path = entry.path().join("info");
            let Ok(content) = std::fs::read_to_string(&info_path) else {
                continue;
            };
            if let Some(ip) = parse_client_address(&content) {
                clients.push(ip);
            }
        }
        clients
    }

    /// Ops delta since the previous successful sample.
    ///
    /// `None` means no data this tick (read failed); the verdict treats it
    /// the same as a zero delta. The first successful read after start or
    /// after a failure is bootstrap and reports zero.
    fn read_ops_delta(&mut self) -> Option<u64> {
        let Ok(content) = std::fs::read_to_string(&self.sources.rpc_stats) else {
            // A failed read invalidates the sample; the next success is
            // bootstrap again
            self.last_ops_total = None;
            return None;
        };

        let current = sum_proc_ops(&content);
        let delta = match self.last_ops_total {
            Some(last) => current.saturating_sub(last),
            None => 0,
        };
        self.last_ops_total = Some(current);
        Some(delta)
    }
}

/// Fuse the three signals into a verdict. Pure; priority order is fixed:
/// high load, then attached clients (authoritative even with a zero ops
/// delta), then ops activity, otherwise idle. A missing load sample cannot
/// claim high load; a missing ops sample cannot claim activity.
pub fn fuse(
    load1: Option<f64>,
    load_threshold: f64,
    client_count: usize,
    ops_delta: Option<u64>,
) -> Verdict {
    if let Some(load) = load1 {
        if load >= load_threshold {
            return Verdict::Active(ActiveReason::HighLoad);
        }
    }
    if client_count > 0 {
        return Verdict::Active(ActiveReason::ClientsAttached);
    }
    if ops_delta.unwrap_or(0) > 0 {
        return Verdict::Active(ActiveReason::NfsActivity);
    }
    Verdict::Idle
}

/// Extract the IP from an NFSv4 client `info` file.
///
/// The relevant line looks like `address: "192.168.1.200:54321"`.
fn parse_client_address(info: &str) -> Option<String> {
    for line in info.lines() {
        let Some(rest) = line.trim().strip_prefix("address:") else {
            continue;
        };
        let value = rest.trim().trim_matches('"');
        let Some((ip, _port)) = value.rsplit_once(':') else {
            continue;
        };
        if ip.is_empty() {
            continue;
        }
        return Some(ip.to_string());
    }
    None
}

/// Sum all operation counters on `proc3`/`proc4` lines.
///
/// The token after the line tag is the field count, not a counter; the
/// remainder are per-operation totals.
fn sum_proc_ops(content: &str) -> u64 {
    let mut total = 0u64;
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("proc3") | Some("proc4") => {}
            _ => continue,
        }
        let _field_count = fields.next();
        for field in fields {
            total = total.saturating_add(field.parse::<u64>().unwrap_or(0));
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Shutdown double that counts commits
    struct CountingShutdown {
        calls: Arc<AtomicUsize>,
    }

    impl ShutdownAction for CountingShutdown {
        fn shutdown(&mut self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Shutdown double that always fails
    struct FailingShutdown {
        calls: Arc<AtomicUsize>,
    }

    impl ShutdownAction for FailingShutdown {
        fn shutdown(&mut self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(crate::error::Error::RemoteCommandFailed {
                code: 1,
                output: "poweroff refused".to_string(),
            })
        }
    }

    struct Fixture {
        _dir: TempDir,
        sources: SignalSources,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let loadavg = dir.path().join("loadavg");
            let clients_dir = dir.path().join("clients");
            let rpc_stats = dir.path().join("nfsd");

            std::fs::write(&loadavg, "0.00 0.00 0.00 1/100 1").unwrap();
            std::fs::create_dir(&clients_dir).unwrap();
            std::fs::write(&rpc_stats, "proc3 2 0 0\nproc4 2 0 0\n").unwrap();

            let sources = SignalSources {
                loadavg,
                clients_dir,
                rpc_stats,
            };
            Self { _dir: dir, sources }
        }

        fn set_load(&self, value: &str) {
            std::fs::write(&self.sources.loadavg, value).unwrap();
        }

        fn set_rpc(&self, content: &str) {
            std::fs::write(&self.sources.rpc_stats, content).unwrap();
        }

        fn add_client(&self, name: &str, address: &str) {
            let client = self.sources.clients_dir.join(name);
            std::fs::create_dir(&client).unwrap();
            std::fs::write(client.join("info"), format!("address: \"{address}\"\n")).unwrap();
        }
    }

    fn counting_watcher(fixture: &Fixture) -> (Watcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let watcher = Watcher::new(
            fixture.sources.clone(),
            Box::new(CountingShutdown {
                calls: calls.clone(),
            }),
        );
        (watcher, calls)
    }

    fn fast_config(idle_ms: u64) -> WatchConfig {
        WatchConfig {
            idle_timeout: Duration::from_millis(idle_ms),
            load_threshold: 0.5,
            poll_interval: Duration::from_millis(50),
            dry_run: false,
        }
    }

    // =========================================================================
    // Verdict fusion
    // =========================================================================

    #[test]
    fn test_fuse_priority_order() {
        // High load wins over everything
        assert_eq!(
            fuse(Some(1.5), 0.5, 3, Some(10)),
            Verdict::Active(ActiveReason::HighLoad)
        );
        // Clients win over ops, even with a zero delta
        assert_eq!(
            fuse(Some(0.1), 0.5, 1, Some(0)),
            Verdict::Active(ActiveReason::ClientsAttached)
        );
        // Ops delta alone
        assert_eq!(
            fuse(Some(0.1), 0.5, 0, Some(7)),
            Verdict::Active(ActiveReason::NfsActivity)
        );
        // Nothing
        assert_eq!(fuse(Some(0.1), 0.5, 0, Some(0)), Verdict::Idle);
    }

    #[test]
    fn test_fuse_threshold_is_inclusive() {
        assert_eq!(
            fuse(Some(0.5), 0.5, 0, None),
            Verdict::Active(ActiveReason::HighLoad)
        );
        assert_eq!(fuse(Some(0.49), 0.5, 0, None), Verdict::Idle);
    }

    #[test]
    fn test_fuse_missing_signals_never_fabricate_activity() {
        assert_eq!(fuse(None, 0.5, 0, None), Verdict::Idle);
    }

    // =========================================================================
    // Signal readers
    // =========================================================================

    #[test]
    fn test_read_load1() {
        let fixture = Fixture::new();
        fixture.set_load("1.50 0.50 0.20 1/500 12345");
        let (watcher, _) = counting_watcher(&fixture);
        assert_eq!(watcher.read_load1(), Some(1.50));
    }

    #[test]
    fn test_read_load1_missing_file() {
        let fixture = Fixture::new();
        std::fs::remove_file(&fixture.sources.loadavg).unwrap();
        let (watcher, _) = counting_watcher(&fixture);
        assert_eq!(watcher.read_load1(), None);
    }

    #[test]
    fn test_read_clients_empty_and_populated() {
        let fixture = Fixture::new();
        let (watcher, _) = counting_watcher(&fixture);
        assert!(watcher.read_clients().is_empty());

        fixture.add_client("client_1", "192.168.1.200:54321");
        let clients = watcher.read_clients();
        assert_eq!(clients, vec!["192.168.1.200".to_string()]);
    }

    #[test]
    fn test_read_clients_skips_malformed_entries() {
        let fixture = Fixture::new();
        fixture.add_client("good", "10.0.0.1:1024");

        // Entry without an info file
        std::fs::create_dir(fixture.sources.clients_dir.join("empty")).unwrap();
        // Entry with junk info
        let junk = fixture.sources.clients_dir.join("junk");
        std::fs::create_dir(&junk).unwrap();
        std::fs::write(junk.join("info"), "clientid: 0xdead\n").unwrap();

        let (watcher, _) = counting_watcher(&fixture);
        assert_eq!(watcher.read_clients(), vec!["10.0.0.1".to_string()]);
    }

    #[test]
    fn test_read_clients_missing_dir_is_zero_clients() {
        let fixture = Fixture::new();
        std::fs::remove_dir(&fixture.sources.clients_dir).unwrap();
        let (watcher, _) = counting_watcher(&fixture);
        assert!(watcher.read_clients().is_empty());
    }

    #[test]
    fn test_sum_proc_ops_skips_field_count() {
        let content = "net 100 200\nrpc 300 5\n\
                       proc2 18 9 9 9 9 9 9 9 9 9 9 9 9 9 9 9 9 9 9\n\
                       proc3 22 10 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n\
                       proc4 2 5 0\n";
        // proc3 contributes 10, proc4 contributes 5; proc2 and headers ignored
        assert_eq!(sum_proc_ops(content), 15);
    }

    #[test]
    fn test_ops_delta_bootstrap_semantics() {
        let fixture = Fixture::new();
        fixture.set_rpc("proc3 2 100 0\nproc4 2 50 0\n");
        let (mut watcher, _) = counting_watcher(&fixture);

        // First read: data exists but no prior sample, delta is zero
        assert_eq!(watcher.read_ops_delta(), Some(0));

        // Counters advance
        fixture.set_rpc("proc3 2 110 0\nproc4 2 55 0\n");
        assert_eq!(watcher.read_ops_delta(), Some(15));

        // Read failure invalidates the sample
        std::fs::remove_file(&fixture.sources.rpc_stats).unwrap();
        assert_eq!(watcher.read_ops_delta(), None);

        // Next success is bootstrap again, not a giant delta against zero
        fixture.set_rpc("proc3 2 200 0\nproc4 2 90 0\n");
        assert_eq!(watcher.read_ops_delta(), Some(0));
    }

    #[test]
    fn test_parse_client_address() {
        assert_eq!(
            parse_client_address("address: \"192.168.1.200:54321\"\n"),
            Some("192.168.1.200".to_string())
        );
        assert_eq!(
            parse_client_address("clientid: 0x1\naddress: \"10.1.1.1:2049\"\n"),
            Some("10.1.1.1".to_string())
        );
        assert_eq!(parse_client_address("clientid: 0x1\n"), None);
        assert_eq!(parse_client_address("address: \"\"\n"), None);
    }

    // =========================================================================
    // State machine
    // =========================================================================

    #[test]
    fn test_active_tick_resets_countdown() {
        let fixture = Fixture::new();
        fixture.set_load("2.00 1.00 0.50 5/500 999");
        let (mut watcher, calls) = counting_watcher(&fixture);
        let config = fast_config(0);

        // Even with a countdown about to expire, an active tick resets
        watcher.idle_since = Instant::now() - Duration::from_secs(3600);
        watcher.tick(&config);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(watcher.phase, Phase::Monitoring);
        assert!(watcher.idle_since.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_idle_tick_past_timeout_commits() {
        let fixture = Fixture::new();
        let (mut watcher, calls) = counting_watcher(&fixture);
        let config = fast_config(100);

        watcher.idle_since = Instant::now() - Duration::from_secs(10);
        watcher.tick(&config);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(watcher.phase, Phase::Shutdown);
    }

    #[test]
    fn test_idle_tick_within_timeout_counts_down() {
        let fixture = Fixture::new();
        let (mut watcher, calls) = counting_watcher(&fixture);
        let config = fast_config(60_000);

        let baseline = Instant::now() - Duration::from_secs(10);
        watcher.idle_since = baseline;
        watcher.tick(&config);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(watcher.phase, Phase::IdleCountdown { since: baseline });

        // A second idle tick keeps the same baseline
        watcher.tick(&config);
        assert_eq!(watcher.phase, Phase::IdleCountdown { since: baseline });
    }

    #[test]
    fn test_failed_commit_keeps_ticking() {
        let fixture = Fixture::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut watcher = Watcher::new(
            fixture.sources.clone(),
            Box::new(FailingShutdown {
                calls: calls.clone(),
            }),
        );
        let config = fast_config(100);

        watcher.idle_since = Instant::now() - Duration::from_secs(10);
        watcher.tick(&config);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Commit failed: not terminal, the next tick tries again
        assert_ne!(watcher.phase, Phase::Shutdown);

        watcher.tick(&config);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dry_run_resets_instead_of_committing() {
        let fixture = Fixture::new();
        let (mut watcher, calls) = counting_watcher(&fixture);
        let mut config = fast_config(100);
        config.dry_run = true;

        watcher.idle_since = Instant::now() - Duration::from_secs(10);
        watcher.tick(&config);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(watcher.phase, Phase::Monitoring);
        assert!(watcher.idle_since.elapsed() < Duration::from_secs(1));
    }

    // =========================================================================
    // Loop integration
    // =========================================================================

    #[tokio::test]
    async fn test_idle_watcher_commits_shutdown() {
        let fixture = Fixture::new();
        let (mut watcher, calls) = counting_watcher(&fixture);
        let config = fast_config(200);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            watcher.watch(config, cancel_rx).await;
        });

        // Idle from the start: the commit should land within ~250-300ms
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(
            calls.load(Ordering::SeqCst) >= 1,
            "shutdown should have been committed"
        );

        cancel_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_attached_client_holds_off_shutdown() {
        let fixture = Fixture::new();
        fixture.add_client("client_1", "192.168.1.200:54321");
        let (mut watcher, calls) = counting_watcher(&fixture);
        let config = fast_config(200);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            watcher.watch(config, cancel_rx).await;
        });

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            0,
            "attached client must hold off shutdown even with zero ops delta"
        );

        cancel_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancellation_stops_loop() {
        let fixture = Fixture::new();
        let (mut watcher, _calls) = counting_watcher(&fixture);
        let config = fast_config(60_000);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            watcher.watch(config, cancel_rx).await;
        });

        cancel_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("watcher should stop promptly on cancel")
            .unwrap();
    }
}
