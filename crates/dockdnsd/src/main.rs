// # dockdnsd - Container DNS Daemon
//
// Answers A-record queries for short container names with the current
// address of the matching container, kept in sync with the Docker
// engine. The daemon is a thin integration layer: it reads
// configuration, wires the dockdns-core components to the Docker
// backend, and supervises shutdown. All resolution logic lives in
// dockdns-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `DOCKDNS_CONFIG_FILE`: optional JSON config file; env vars below
//   override its values
// - `DOCKDNS_LISTEN_ADDR`: UDP listen address (default 0.0.0.0:53)
// - `DOCKDNS_TTL`: answer TTL in seconds (default 60)
// - `DOCKDNS_ALIAS_FILE`: path to the alias file (default data/alias)
// - `DOCKDNS_ALIAS_RELOAD_SECS`: alias reload interval (default 10)
// - `DOCKDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// The Docker connection itself honors `DOCKER_HOST`.
//
// ## Example
//
// ```bash
// export DOCKDNS_LISTEN_ADDR=0.0.0.0:53
// export DOCKDNS_ALIAS_FILE=/etc/dockdns/alias
//
// dockdnsd
// ```

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use dockdns_core::config::Config;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Load configuration from the optional file, then apply env overrides
fn load_config() -> Result<Config> {
    let mut config = match env::var("DOCKDNS_CONFIG_FILE") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("could not read config file {path}"))?;
            Config::from_json(&json).with_context(|| format!("invalid config file {path}"))?
        }
        Err(_) => Config::default(),
    };

    if let Ok(addr) = env::var("DOCKDNS_LISTEN_ADDR") {
        config.dns.listen_addr = addr
            .parse()
            .with_context(|| format!("DOCKDNS_LISTEN_ADDR '{addr}' is not a socket address"))?;
    }
    if let Ok(ttl) = env::var("DOCKDNS_TTL") {
        config.dns.ttl = ttl
            .parse()
            .with_context(|| format!("DOCKDNS_TTL '{ttl}' is not a number"))?;
    }
    if let Ok(path) = env::var("DOCKDNS_ALIAS_FILE") {
        config.alias.path = path.into();
    }
    if let Ok(secs) = env::var("DOCKDNS_ALIAS_RELOAD_SECS") {
        config.alias.reload_interval_secs = secs
            .parse()
            .with_context(|| format!("DOCKDNS_ALIAS_RELOAD_SECS '{secs}' is not a number"))?;
    }

    config.validate()?;
    Ok(config)
}

fn log_level_from_env() -> Result<Level> {
    let level = env::var("DOCKDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => anyhow::bail!(
            "DOCKDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            other
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return DaemonExitCode::ConfigError.into();
        }
    };

    let log_level = match log_level_from_env() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return DaemonExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting dockdnsd daemon");
    info!(
        listen_addr = %config.dns.listen_addr,
        ttl = config.dns.ttl,
        alias_file = %config.alias.path.display(),
        "Configuration loaded"
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {e:#}");
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

#[cfg(feature = "docker")]
async fn run_daemon(config: Config) -> Result<()> {
    use dockdns_core::alias::AliasFileLoader;
    use dockdns_core::network::NetworkMembership;
    use dockdns_core::registry::{ComposeNaming, DnsRegistry, WorkloadRegistrar};
    use dockdns_core::server::DnsServer;
    use dockdns_core::survey::Survey;
    use dockdns_core::traits::WorkloadInventory;
    use dockdns_core::updater::Updater;
    use dockdns_docker::DockerInventory;

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone())?;

    let inventory: Arc<dyn WorkloadInventory> =
        Arc::new(DockerInventory::connect().context("could not connect to the Docker engine")?);

    let aliases = AliasFileLoader::new(
        &config.alias.path,
        Duration::from_secs(config.alias.reload_interval_secs),
    );
    tokio::spawn({
        let aliases = aliases.clone();
        let cancel = cancel.clone();
        async move { aliases.run(cancel).await }
    });

    let registry = DnsRegistry::new(aliases);
    let registrar = WorkloadRegistrar::new(registry.clone(), Arc::new(ComposeNaming));
    let membership = NetworkMembership::new(inventory.clone());

    // The survey must finish before the socket exists; queries never
    // see a partially built registry. A failed survey is fatal.
    let survey = Survey::new(inventory.clone(), membership.clone(), registrar.clone());
    survey
        .run_once()
        .await
        .context("initial workload survey failed")?;

    let server = DnsServer::bind(&config.dns, registry)
        .await
        .context("could not bind the dns listener")?;

    let updater = Updater::new(inventory, membership, registrar);
    tokio::spawn({
        let cancel = cancel.clone();
        async move { updater.run(cancel).await }
    });

    server.serve(cancel).await?;

    info!("Shutdown complete");
    Ok(())
}

#[cfg(not(feature = "docker"))]
async fn run_daemon(_config: Config) -> Result<()> {
    anyhow::bail!("dockdnsd was built without a workload inventory backend (enable the 'docker' feature)")
}

/// Cancel the token on SIGTERM or SIGINT
#[cfg(unix)]
fn spawn_signal_handler(cancel: CancellationToken) -> Result<()> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    tokio::spawn(async move {
        let received = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {received}");
        cancel.cancel();
    });

    Ok(())
}

/// Cancel the token on CTRL-C (non-Unix fallback)
#[cfg(not(unix))]
fn spawn_signal_handler(cancel: CancellationToken) -> Result<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {e}");
            return;
        }
        info!("Received shutdown signal: SIGINT");
        cancel.cancel();
    });
    Ok(())
}
