//! Command-line interface

use clap::{Parser, ValueEnum};
use routesync_core::RunOptions;
use std::path::PathBuf;
use tracing::Level;

/// Route a domain's current addresses through a gateway on a MikroTik router
///
/// Every run replaces the routes commented with the domain by one /32 route
/// per address the domain resolves to. Address, username and gateway are
/// remembered between runs; the password is kept in the OS credential store.
#[derive(Parser)]
#[command(name = "routesync", version)]
pub struct Cli {
    /// Domain name to resolve and route
    #[arg(long)]
    pub domain: Option<String>,

    /// Router API address, host[:port] (default port 8728)
    #[arg(long)]
    pub address: Option<String>,

    /// Router API username
    #[arg(long)]
    pub username: Option<String>,

    /// Router API password
    #[arg(long, env = "ROUTESYNC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Gateway for the new routes (IP address or interface)
    #[arg(long)]
    pub gateway: Option<String>,

    /// List the routes managed behind the gateway
    #[arg(long)]
    pub list: bool,

    /// Re-resolve every listed route and update it (implies --list)
    #[arg(long)]
    pub update: bool,

    /// Show what would change without changing anything
    #[arg(long)]
    pub dry: bool,

    /// Print listed routes as JSON
    #[arg(long)]
    pub json: bool,

    /// Settings file to use instead of the per-user default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Diagnostics written to stderr
    #[arg(long, env = "ROUTESYNC_LOG_LEVEL", value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

impl Cli {
    /// Flag values as unvalidated run options
    pub fn options(&self) -> RunOptions {
        RunOptions {
            domain: self.domain.clone(),
            address: self.address.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            gateway: self.gateway.clone(),
            list: self.list,
            update: self.update,
            dry_run: self.dry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_to_run_options() {
        let cli = Cli::try_parse_from([
            "routesync",
            "--domain",
            "example.com",
            "--address",
            "192.168.88.1:8729",
            "--username",
            "admin",
            "--password",
            "secret",
            "--gateway",
            "192.168.1.1",
            "--dry",
        ])
        .unwrap();

        let options = cli.options();
        assert_eq!(options.domain.as_deref(), Some("example.com"));
        assert_eq!(options.address.as_deref(), Some("192.168.88.1:8729"));
        assert_eq!(options.password.as_deref(), Some("secret"));
        assert!(options.dry_run);
        assert!(!options.list);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn update_is_accepted_without_list() {
        let cli = Cli::try_parse_from(["routesync", "--update"]).unwrap();
        let options = cli.options();
        assert!(options.update);
        assert!(!options.list);
    }

    #[test]
    fn version_and_help_are_not_failures() {
        let err = Cli::try_parse_from(["routesync", "--version"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);

        let err = Cli::try_parse_from(["routesync", "--help"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = Cli::try_parse_from(["routesync", "--log-level", "loud"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn log_levels_map_to_tracing() {
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
    }
}
