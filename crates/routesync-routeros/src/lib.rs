// # RouterOS API Client
//
// This crate implements [`RouterApi`](routesync_core::RouterApi) for a
// MikroTik router reached over the RouterOS API (plain TCP, port 8728 by
// default). Framing and login are handled by `mikrotik-rs`; this crate
// translates routesync commands and folds the responses into rows.
//
// ## Scope
//
// - One command at a time, replies collected until done
// - No TLS (API-SSL, port 8729), no retries, no timeouts beyond the OS
//   defaults
//
// ## Security
//
// - The password is handed to the device for login and never stored or logged
// - `RouterSession` has no Debug output beyond its name
//
// ## API Reference
//
// - https://help.mikrotik.com/docs/display/ROS/API

mod session;

pub use session::RouterSession;

use mikrotik_rs::MikrotikDevice;
use routesync_core::{Error, Result, RouterAddress};
use tracing::{debug, info};

/// Open an authenticated session to the router at `address`
///
/// `address` is `host[:port]`; bracket IPv6 literals (`[fe80::1]:8728`).
/// Without a port, 8728 is used.
///
/// # Errors
///
/// [`Error::Connection`] if the address is malformed, the TCP connection
/// cannot be established, or the router refuses the login.
pub async fn connect(address: &str, username: &str, password: &str) -> Result<RouterSession> {
    let address = RouterAddress::parse(address)?;
    let target = address.to_string();

    debug!("Connecting to router at {}", target);
    let device = MikrotikDevice::connect(target.as_str(), username, Some(password))
        .await
        .map_err(|e| Error::connection(format!("failed to connect to {}: {}", target, e)))?;

    info!("Connected to {} as {}", target, username);
    Ok(RouterSession::new(device))
}
