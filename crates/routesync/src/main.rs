// # routesync
//
// Keeps `/ip/route` entries on a MikroTik router in sync with what a domain
// currently resolves to.
//
// This binary is the integration layer:
// 1. Parse flags, set up logging
// 2. Merge flags with the settings file and the OS credential store
// 3. Connect to the router
// 4. Run the reconciler from `routesync-core`, print its report
// 5. Remember address, username and gateway for the next run
//
// Route logic lives in `routesync-core`; the router session lives in
// `routesync-routeros`.
//
// ## Configuration
//
// - Flags (see `--help`)
// - `ROUTESYNC_PASSWORD`: password, instead of `--password`
// - `ROUTESYNC_LOG_LEVEL`: trace, debug, info, warn (default), error
// - `<config dir>/routesync/config.yaml`: remembered address, username, gateway
//
// ## Example
//
// ```bash
// routesync --address 192.168.88.1 --username admin --password secret \
//           --gateway 192.168.1.1 --domain example.com
//
// # Later runs reuse address, username, gateway and password
// routesync --domain example.org
// routesync --update
// ```

mod cli;
mod keychain;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use routesync_core::traits::CredentialStore;
use routesync_core::{Action, Reconciler, RouterApi, RunConfig, Settings, SettingsFile, SystemResolver};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;
use crate::keychain::KeyringCredentialStore;

/// Exit codes
#[derive(Debug, Clone, Copy)]
enum RouteSyncExitCode {
    /// Finished (including `--help` and `--version`)
    Success = 0,
    /// Bad arguments, connection failure, or any other fatal error
    Failure = 1,
}

impl From<RouteSyncExitCode> for ExitCode {
    fn from(code: RouteSyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                eprintln!("{}", e);
            }
            return parse_error_code(&e).into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RouteSyncExitCode::Failure.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RouteSyncExitCode::Failure.into();
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => RouteSyncExitCode::Success.into(),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            RouteSyncExitCode::Failure.into()
        }
    }
}

/// `--help` and `--version` end the run successfully; real parse errors do not
fn parse_error_code(err: &clap::Error) -> RouteSyncExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => RouteSyncExitCode::Success,
        _ => RouteSyncExitCode::Failure,
    }
}

/// One invocation, from merged configuration to saved settings
async fn run(cli: Cli) -> Result<()> {
    let settings_file = settings_file(&cli);
    let settings = match &settings_file {
        Some(file) => load_settings(file).await,
        None => Settings::default(),
    };

    let store = KeyringCredentialStore;
    let config = cli
        .options()
        .with_settings(&settings)
        .with_stored_password(&store)?
        .into_config()?;
    debug!("Run configuration: {:?}", config);

    let mut session =
        routesync_routeros::connect(&config.address, &config.username, &config.password)
            .await
            .context("Failed to connect to RouterOS")?;

    if let Err(e) = store.set(&config.address, &config.username, &config.password) {
        warn!("Failed to save password to credential store: {}", e);
    }

    let result = execute(&mut session, &config, cli.json).await;
    session.close();

    if result? && let Some(file) = &settings_file {
        file.save(&config.settings())
            .await
            .with_context(|| format!("Failed to save settings to {}", file.path().display()))?;
    }

    Ok(())
}

/// Run the configured action and print its report
///
/// Returns true if the action was a reconcile, whose settings are worth
/// remembering.
async fn execute<A: RouterApi>(api: A, config: &RunConfig, as_json: bool) -> Result<bool> {
    let mut reconciler = Reconciler::new(api, SystemResolver::new());

    match &config.action {
        Action::Reconcile { domain } => {
            let report = reconciler
                .reconcile(domain, &config.gateway, config.dry_run)
                .await
                .with_context(|| format!("Failed to update routes for {}", domain))?;

            let failures = report.failures().count();
            if failures > 0 {
                warn!("{} of {} route change(s) failed", failures, report.outcomes.len());
            }
            info!("Reconciled {} via {}", domain, config.gateway);

            output::write_reconcile(&mut std::io::stdout(), &report, config.dry_run)?;
            Ok(true)
        }
        Action::List { refresh } => {
            let report = reconciler
                .list(&config.gateway, *refresh, config.dry_run)
                .await
                .context("Failed to list routes")?;

            output::write_list(&mut std::io::stdout(), &report, as_json)?;
            Ok(false)
        }
    }
}

/// `--config`, or `<config dir>/routesync/config.yaml`
fn settings_file(cli: &Cli) -> Option<SettingsFile> {
    if let Some(path) = &cli.config {
        return Some(SettingsFile::new(path));
    }

    match dirs::config_dir() {
        Some(dir) => Some(SettingsFile::new(default_settings_path(dir))),
        None => {
            warn!("No user config directory; settings will not be remembered");
            None
        }
    }
}

fn default_settings_path(config_dir: PathBuf) -> PathBuf {
    config_dir.join("routesync").join("config.yaml")
}

/// Settings from `file`; problems are logged and yield defaults
async fn load_settings(file: &SettingsFile) -> Settings {
    match file.load().await {
        Ok(settings) => {
            debug!("Using settings from {}", file.path().display());
            settings
        }
        Err(e) => {
            warn!("Ignoring settings file: {}", e);
            Settings::default()
        }
    }
}
