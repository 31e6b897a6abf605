//! Configuration types for routesync
//!
//! Two layers:
//! - [`Settings`]: what is remembered between runs (YAML file, no secrets)
//! - [`RunConfig`]: the validated configuration of one invocation, built
//!   once from flags, [`Settings`] and a [`CredentialStore`] via
//!   [`RunOptions`]

use serde::{Deserialize, Serialize};

use crate::traits::CredentialStore;
use crate::{Error, Result};

/// Values remembered between runs
///
/// The password is never part of this struct; it lives in the credential
/// store keyed by (`address`, `username`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Next hop for new routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,

    /// Router address, `host[:port]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Router API username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// What one invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the routes of one domain
    Reconcile {
        /// Domain to resolve and route
        domain: String,
    },
    /// List managed routes behind the gateway
    List {
        /// Re-resolve and reconcile every listed route
        refresh: bool,
    },
}

/// Validated configuration for one run
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Router address, `host[:port]`
    pub address: String,
    /// Router API username
    pub username: String,
    /// Router API password
    pub password: String,
    /// Gateway for new routes / filter for listing
    pub gateway: String,
    /// Reconcile or list
    pub action: Action,
    /// Describe mutations instead of sending them
    pub dry_run: bool,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("gateway", &self.gateway)
            .field("action", &self.action)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl RunConfig {
    /// The values worth remembering for the next run
    pub fn settings(&self) -> Settings {
        Settings {
            gateway: Some(self.gateway.clone()).filter(|g| !g.is_empty()),
            address: Some(self.address.clone()),
            username: Some(self.username.clone()),
        }
    }
}

/// Unvalidated inputs for a run, as they come off the command line
///
/// Empty strings count as absent.
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Domain to reconcile
    pub domain: Option<String>,
    /// Router address
    pub address: Option<String>,
    /// Router username
    pub username: Option<String>,
    /// Router password
    pub password: Option<String>,
    /// Gateway
    pub gateway: Option<String>,
    /// List instead of reconciling
    pub list: bool,
    /// Refresh listed routes (implies `list`)
    pub update: bool,
    /// Dry-run mode
    pub dry_run: bool,
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("domain", &self.domain)
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .field("gateway", &self.gateway)
            .field("list", &self.list)
            .field("update", &self.update)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl RunOptions {
    /// Fill address, username and gateway from saved settings where unset
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        fill(&mut self.address, &settings.address);
        fill(&mut self.username, &settings.username);
        fill(&mut self.gateway, &settings.gateway);
        self
    }

    /// Look the password up in `store` when none was given
    ///
    /// The lookup key is (address, username); without both there is nothing
    /// to look up. A missing entry is fine and leaves the password unset; a
    /// failing backend is an error.
    pub fn with_stored_password(mut self, store: &dyn CredentialStore) -> Result<Self> {
        if present(&self.password).is_some() {
            return Ok(self);
        }

        let (Some(address), Some(username)) = (present(&self.address), present(&self.username))
        else {
            return Ok(self);
        };
        self.password = store.get(address, username).map_err(|e| {
            Error::credential(format!("failed to load password from credential store: {}", e))
        })?;
        Ok(self)
    }

    /// Validate and produce the run configuration
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming every missing parameter, in the order
    /// domain, address, username, password, gateway. Domain and gateway are
    /// only required when reconciling.
    pub fn into_config(self) -> Result<RunConfig> {
        let list = self.list || self.update;

        let mut missing = Vec::new();
        if !list && present(&self.domain).is_none() {
            missing.push("domain");
        }
        if present(&self.address).is_none() {
            missing.push("address");
        }
        if present(&self.username).is_none() {
            missing.push("username");
        }
        if present(&self.password).is_none() {
            missing.push("password");
        }
        if !list && present(&self.gateway).is_none() {
            missing.push("gateway");
        }
        if !missing.is_empty() {
            return Err(Error::config(format!(
                "Missing required parameters: {}",
                missing.join(", ")
            )));
        }

        let action = if list {
            Action::List {
                refresh: self.update,
            }
        } else {
            Action::Reconcile {
                domain: self.domain.unwrap_or_default(),
            }
        };

        Ok(RunConfig {
            address: self.address.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            gateway: self.gateway.unwrap_or_default(),
            action,
            dry_run: self.dry_run,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn fill(slot: &mut Option<String>, saved: &Option<String>) {
    if present(slot).is_none()
        && let Some(saved) = present(saved)
    {
        *slot = Some(saved.to_string());
    }
}
