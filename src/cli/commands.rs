//! Command implementations for the CLI
//!
//! Each handler maps one subcommand onto the library modules. Blocking
//! work (SSH, builds) runs on the blocking pool; the watcher and the port
//! prober stay on the async runtime.

use tokio::sync::watch;
use tracing::{info, warn};

use super::{ApplyArgs, Commands, DebugArgs, DeployArgs, UndeployArgs, WakeArgs, WatchArgs};
use crate::config;
use crate::deploy::{ApplyOptions, DeployOptions, Deployer};
use crate::error::{Error, Result};
use crate::probe;
use crate::ssh::SshSession;
use crate::watcher::{SignalSources, SystemdPoweroff, WatchConfig, Watcher};
use crate::wol::{wait_for_port, MagicPacket};

/// Dispatch a parsed subcommand.
pub async fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Debug(args) => run_debug(args).await,
        Commands::Wake(args) => run_wake(args).await,
        Commands::Watch(args) => run_watch(args).await,
        Commands::Apply(args) => run_apply(args).await,
        Commands::Deploy(args) => run_deploy(args).await,
        Commands::Undeploy(args) => run_undeploy(args).await,
    }
}

async fn run_debug(args: DebugArgs) -> Result<()> {
    spawn_blocking(move || {
        let mut session = SshSession::new(&args.alias);
        info!("connecting to {} as {}", session.host(), session.user());
        session.connect()?;

        let facts = probe::probe(&mut session)?;
        println!("------------------------------------------------");
        println!("Hostname    : {}", facts.hostname);
        println!("Architecture: {}", facts.arch);
        println!("Interface   : {}", facts.interface);
        println!("IPv4        : {} (for NFS mount)", facts.ip);
        println!("MAC Address : {} (for WoL wake)", facts.mac);
        println!("------------------------------------------------");
        Ok(())
    })
    .await
}

async fn run_wake(args: WakeArgs) -> Result<()> {
    let packet = MagicPacket::new(&args.mac)?;

    // A failed send is not fatal: the server may already be awake, and the
    // port wait below decides the outcome either way
    match packet.send(args.bcast) {
        Ok(()) => info!("magic packet sent to {}", args.mac),
        Err(e) => warn!("WoL send failed: {e}"),
    }

    info!(
        "waiting for {}:{} (timeout {:?})",
        args.ip, args.port, args.timeout
    );
    wait_for_port(&args.ip, args.port, args.timeout).await?;
    info!("host is online");
    Ok(())
}

async fn run_watch(args: WatchArgs) -> Result<()> {
    let mut watcher = Watcher::new(SignalSources::default(), Box::new(SystemdPoweroff));
    let config = WatchConfig {
        idle_timeout: args.timeout,
        load_threshold: args.load,
        poll_interval: args.poll,
        dry_run: args.dry_run,
    };

    // Cancel cleanly on SIGINT or SIGTERM (systemctl stop); an in-flight
    // tick finishes first
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
        let _ = cancel_tx.send(true);
    });

    watcher.watch(config, cancel_rx).await;
    Ok(())
}

async fn run_apply(args: ApplyArgs) -> Result<()> {
    info!("loading config from {}", args.file.display());
    let config = config::load_config_file(&args.file)?;

    spawn_blocking(move || {
        let mut deployer = Deployer::new();
        deployer.apply(
            &config,
            &ApplyOptions {
                dry_run: args.dry_run,
                watcher_dry_run: args.watcher_dry_run,
            },
        )
    })
    .await
}

async fn run_deploy(args: DeployArgs) -> Result<()> {
    spawn_blocking(move || {
        let mut deployer = Deployer::new();
        deployer.deploy(&DeployOptions {
            alias: args.alias,
            local_dir: args.local_dir,
            remote_dir: args.remote_dir,
            idle_timeout: args.idle,
            load_threshold: args.load,
            dry_run: args.dry_run,
            watcher_dry_run: args.watcher_dry_run,
        })
    })
    .await
}

async fn run_undeploy(args: UndeployArgs) -> Result<()> {
    spawn_blocking(move || {
        let mut deployer = Deployer::new();
        deployer.undeploy(args.alias.as_deref(), &args.local_dir)
    })
    .await
}

/// Run blocking deployment work off the async runtime.
async fn spawn_blocking<F>(f: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Transport(format!("blocking task failed: {e}")))?
}
