//! Route reconciler
//!
//! The Reconciler is responsible for:
//! - Replacing the routes tagged with a domain by one host route per
//!   currently resolved address
//! - Listing the routes routesync manages behind a gateway, and optionally
//!   refreshing each of them
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────┐
//!                  │  Reconciler  │
//!                  └──────────────┘
//!                          │
//!          ┌───────────────┴───────────────┐
//!          │                               │
//!          ▼                               ▼
//! ┌─────────────────┐             ┌──────────────┐
//! │ RouteRepository │             │   Resolver   │
//! │ (print/add/rm)  │             │ (DNS lookup) │
//! └─────────────────┘             └──────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    RouterApi    │
//! └─────────────────┘
//! ```
//!
//! ## Reconcile Flow
//!
//! 1. Remove every route whose comment equals the domain
//! 2. Resolve the domain (failure aborts; removals are not rolled back)
//! 3. Add one `/32` route per address, comment = domain
//!
//! Steps 1 and 3 are best-effort: each item gets its own [`RouteOutcome`]
//! and one failure never stops its siblings.

use std::fmt;
use std::net::IpAddr;

use tracing::{debug, info, warn};

use crate::repository::{Applied, RouteRepository};
use crate::route::RouteRecord;
use crate::traits::{Resolver, RouterApi};
use crate::{Error, Result};

/// Which half of a reconcile an outcome belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Removing stale routes for the domain
    Remove,
    /// Adding routes for resolved addresses
    Add,
}

/// Result of one best-effort step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Sent (or simulated in dry-run mode)
    Applied(Applied),
    /// The step failed; siblings still ran
    Failed(String),
}

/// One item of a reconcile batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Remove or add
    pub phase: Phase,
    /// Route id for removals, address for additions, domain if the
    /// removal listing itself failed
    pub target: String,
    /// What happened
    pub status: OutcomeStatus,
}

impl RouteOutcome {
    /// True if this step failed
    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }
}

impl fmt::Display for RouteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, self.phase) {
            (OutcomeStatus::Applied(applied @ Applied::Simulated(_)), _) => write!(f, "{}", applied),
            (OutcomeStatus::Applied(_), Phase::Remove) => write!(f, "removed route {}", self.target),
            (OutcomeStatus::Applied(_), Phase::Add) => write!(f, "added route for {}", self.target),
            (OutcomeStatus::Failed(e), Phase::Remove) => {
                write!(f, "failed to remove route {}: {}", self.target, e)
            }
            (OutcomeStatus::Failed(e), Phase::Add) => {
                write!(f, "failed to add route for {}: {}", self.target, e)
            }
        }
    }
}

/// Everything a reconcile did, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Domain that was reconciled
    pub domain: String,
    /// Gateway the new routes point at
    pub gateway: String,
    /// Addresses the domain resolved to
    pub addresses: Vec<IpAddr>,
    /// Per-item outcomes: removals first, then additions
    pub outcomes: Vec<RouteOutcome>,
}

impl ReconcileReport {
    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &RouteOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Outcomes of one phase
    pub fn phase(&self, phase: Phase) -> impl Iterator<Item = &RouteOutcome> {
        self.outcomes.iter().filter(move |o| o.phase == phase)
    }
}

/// A refresh attempt for one listed route
#[derive(Debug)]
pub struct RefreshOutcome {
    /// The route as it was listed before any refresh ran
    pub route: RouteRecord,
    /// The reconcile of `route.comment`, or why it could not run
    pub result: Result<ReconcileReport>,
}

/// Result of [`Reconciler::list`]
#[derive(Debug)]
pub struct ListReport {
    /// Managed routes behind the gateway, as fetched before any refresh
    pub routes: Vec<RouteRecord>,
    /// One entry per listed route when a refresh ran, otherwise empty
    pub refreshed: Vec<RefreshOutcome>,
}

/// Keep routes that point at `gateway` and carry a hostname comment
pub fn filter_managed(routes: Vec<RouteRecord>, gateway: &str) -> Vec<RouteRecord> {
    routes
        .into_iter()
        .filter(|route| route.gateway == gateway && route.is_managed())
        .collect()
}

/// Converges router routes with DNS
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`] from a router session and a resolver
/// 2. Call [`Reconciler::reconcile()`] or [`Reconciler::list()`]
/// 3. Take the session back with [`Reconciler::into_inner()`] to close it
///
/// Pass `&mut session` instead of the session itself to keep ownership.
pub struct Reconciler<A, R> {
    repo: RouteRepository<A>,
    resolver: R,
}

impl<A: RouterApi, R: Resolver> Reconciler<A, R> {
    /// Create a reconciler over a router session
    pub fn new(api: A, resolver: R) -> Self {
        Self {
            repo: RouteRepository::new(api),
            resolver,
        }
    }

    /// Give the router session back
    pub fn into_inner(self) -> A {
        self.repo.into_inner()
    }

    /// Replace the routes for `domain` with one route per resolved address
    ///
    /// # Parameters
    ///
    /// - `domain`: Name to resolve; also the comment on every route
    /// - `gateway`: Next hop for the new routes
    /// - `dry_run`: Describe removals and additions without sending them
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: Per-item outcomes (individual items may have failed)
    /// - `Err(Error::Resolution)`: The domain did not resolve; removals already ran
    pub async fn reconcile(
        &mut self,
        domain: &str,
        gateway: &str,
        dry_run: bool,
    ) -> Result<ReconcileReport> {
        let mut outcomes = self.remove_existing(domain, dry_run).await;

        let addresses = match self.resolver.resolve(domain).await {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!("Failed to resolve {}: {}", domain, e);
                return Err(Error::Resolution(e));
            }
        };
        info!("{} resolved to {} address(es)", domain, addresses.len());

        for address in &addresses {
            let status = match self.repo.add_route(*address, gateway, domain, dry_run).await {
                Ok(applied) => OutcomeStatus::Applied(applied),
                Err(e) => {
                    warn!("Failed to add route for {} ({}): {}", address, domain, e);
                    OutcomeStatus::Failed(e.to_string())
                }
            };
            outcomes.push(RouteOutcome {
                phase: Phase::Add,
                target: address.to_string(),
                status,
            });
        }

        Ok(ReconcileReport {
            domain: domain.to_string(),
            gateway: gateway.to_string(),
            addresses,
            outcomes,
        })
    }

    /// List managed routes behind `gateway`, optionally refreshing each one
    ///
    /// Routes are kept when their gateway equals `gateway` and their comment
    /// is hostname-shaped. With `refresh` (ignored in dry-run mode) every kept
    /// route is reconciled against its comment. The sweep walks the list
    /// fetched up front, so a later entry does not see routes added while
    /// refreshing an earlier one.
    ///
    /// # Returns
    ///
    /// - `Ok(ListReport)`: The listed routes and per-route refresh results
    /// - `Err(Error::Query)`: The initial route listing failed
    pub async fn list(&mut self, gateway: &str, refresh: bool, dry_run: bool) -> Result<ListReport> {
        let routes = filter_managed(self.repo.list_routes(None).await?, gateway);
        debug!("{} managed route(s) behind {}", routes.len(), gateway);

        let mut refreshed = Vec::new();
        if refresh && !dry_run {
            for route in &routes {
                let result = self.reconcile(&route.comment, &route.gateway, false).await;
                if let Err(e) = &result {
                    warn!("Failed to refresh route {} ({}): {}", route.id, route.comment, e);
                }
                refreshed.push(RefreshOutcome {
                    route: route.clone(),
                    result,
                });
            }
        }

        Ok(ListReport { routes, refreshed })
    }

    /// Remove-phase of a reconcile; never fails as a whole
    async fn remove_existing(&mut self, domain: &str, dry_run: bool) -> Vec<RouteOutcome> {
        let existing = match self.repo.list_routes(Some(domain)).await {
            Ok(routes) => routes,
            Err(e) => {
                warn!("Failed to list existing routes for {}: {}", domain, e);
                return vec![RouteOutcome {
                    phase: Phase::Remove,
                    target: domain.to_string(),
                    status: OutcomeStatus::Failed(e.to_string()),
                }];
            }
        };

        let mut outcomes = Vec::with_capacity(existing.len());
        for route in existing {
            let status = match self.repo.remove_route(&route.id, dry_run).await {
                Ok(applied) => OutcomeStatus::Applied(applied),
                Err(e) => {
                    warn!("Failed to remove route {}: {}", route.id, e);
                    OutcomeStatus::Failed(e.to_string())
                }
            };
            outcomes.push(RouteOutcome {
                phase: Phase::Remove,
                target: route.id,
                status,
            });
        }
        outcomes
    }
}
