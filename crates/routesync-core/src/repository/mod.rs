//! Route repository
//!
//! Typed `/ip/route` operations on top of a [`RouterApi`] session:
//!
//! | Operation        | Command                                                   |
//! |------------------|-----------------------------------------------------------|
//! | `list_routes`    | `/ip/route/print [?comment=<domain>]`                     |
//! | `add_route`      | `/ip/route/add =dst-address=<ip>/32 =gateway= =comment=`  |
//! | `remove_route`   | `/ip/route/remove =numbers=<id>`                          |
//!
//! ## Dry Run
//!
//! Mutating operations accept `dry_run`. In dry-run mode the command is built
//! and validated exactly as in live mode but never sent; the caller gets
//! [`Applied::Simulated`] carrying the command that would have run.
//! `list_routes` only reads and always talks to the router.

use std::fmt;
use std::net::IpAddr;

use tracing::{debug, info};

use crate::route::{RouteRecord, sanitize_domain};
use crate::traits::{Command, RouterApi};
use crate::{Error, Result};

const PRINT: &str = "/ip/route/print";
const ADD: &str = "/ip/route/add";
const REMOVE: &str = "/ip/route/remove";

/// What happened to a mutating command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The router accepted the command
    Executed(Command),
    /// Dry run: the command was not sent
    Simulated(Command),
}

impl Applied {
    /// The command that was (or would have been) sent
    pub fn command(&self) -> &Command {
        match self {
            Applied::Executed(cmd) | Applied::Simulated(cmd) => cmd,
        }
    }

    /// True if nothing was sent to the router
    pub fn is_simulated(&self) -> bool {
        matches!(self, Applied::Simulated(_))
    }
}

impl fmt::Display for Applied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applied::Executed(cmd) => write!(f, "{}", cmd),
            Applied::Simulated(cmd) => write!(f, "would run: {}", cmd),
        }
    }
}

/// Route operations against one router session
pub struct RouteRepository<A> {
    api: A,
}

impl<A: RouterApi> RouteRepository<A> {
    /// Wrap a router session
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Give the session back
    pub fn into_inner(self) -> A {
        self.api
    }

    /// Fetch routes, optionally only those whose comment equals `comment`
    ///
    /// The filter is applied by the router. Rows missing any of the mapped
    /// fields yield empty strings for them.
    ///
    /// # Errors
    ///
    /// [`Error::Query`] if the print command fails.
    pub async fn list_routes(&mut self, comment: Option<&str>) -> Result<Vec<RouteRecord>> {
        let mut command = Command::new(PRINT);
        if let Some(comment) = comment {
            command = command.query("comment", comment);
        }

        debug!("Listing routes: {}", command);
        let rows = self.api.run(&command).await?;
        debug!("Router returned {} route(s)", rows.len());

        Ok(rows.iter().map(RouteRecord::from_reply).collect())
    }

    /// Add a host route to `destination` via `gateway`, tagged with `comment`
    ///
    /// The comment is escaped with [`sanitize_domain`]. When `gateway` is an
    /// IP literal the route also gets `check-gateway=arp`; interface names and
    /// other symbolic gateways do not, since ARP probing needs an address.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `gateway` is empty (also in dry-run mode)
    /// - [`Error::Query`] if the router rejects the route
    pub async fn add_route(
        &mut self,
        destination: IpAddr,
        gateway: &str,
        comment: &str,
        dry_run: bool,
    ) -> Result<Applied> {
        if gateway.trim().is_empty() {
            return Err(Error::invalid_argument("gateway is required"));
        }

        let mut command = Command::new(ADD)
            .attr("dst-address", format!("{}/32", destination))
            .attr("gateway", gateway)
            .attr("comment", sanitize_domain(comment));

        if gateway.parse::<IpAddr>().is_ok() {
            command = command.attr("check-gateway", "arp");
        }

        self.apply(command, dry_run).await
    }

    /// Remove the route with router id `id`
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `id` is empty
    /// - [`Error::Query`] if the router refuses the removal
    pub async fn remove_route(&mut self, id: &str, dry_run: bool) -> Result<Applied> {
        if id.is_empty() {
            return Err(Error::invalid_argument("route id is required"));
        }

        let command = Command::new(REMOVE).attr("numbers", id);
        self.apply(command, dry_run).await
    }

    async fn apply(&mut self, command: Command, dry_run: bool) -> Result<Applied> {
        if dry_run {
            info!("Dry run, not sending: {}", command);
            return Ok(Applied::Simulated(command));
        }

        debug!("Sending: {}", command);
        self.api.run(&command).await?;
        info!("Applied: {}", command);
        Ok(Applied::Executed(command))
    }
}
