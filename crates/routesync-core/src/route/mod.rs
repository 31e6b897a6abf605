//! Route records and the rule that decides which routes routesync owns
//!
//! RouterOS route entries carry no free metadata besides `comment`, so a
//! managed route is recognised by its comment holding a hostname: the domain
//! the route was created for.

mod sanitize;

pub use sanitize::sanitize_domain;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::traits::Reply;

/// Labels of letters, digits and interior hyphens, joined by dots
static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("hostname pattern is valid")
});

/// Returns true if `comment` is shaped like a hostname
pub fn is_hostname(comment: &str) -> bool {
    HOSTNAME.is_match(comment)
}

/// One `/ip/route` entry as routesync sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Router-assigned identifier (`.id`, e.g. `*1A`)
    pub id: String,
    /// Destination prefix (`dst-address`)
    pub destination: String,
    /// Next hop address or interface name
    pub gateway: String,
    /// Domain the route was created for, if managed
    pub comment: String,
}

impl RouteRecord {
    /// Map a print reply row; missing fields become empty strings
    pub fn from_reply(row: &Reply) -> Self {
        let field = |key: &str| row.get(key).cloned().unwrap_or_default();
        Self {
            id: field(".id"),
            destination: field("dst-address"),
            gateway: field("gateway"),
            comment: field("comment"),
        }
    }

    /// True if the comment names a domain, i.e. routesync created this route
    pub fn is_managed(&self) -> bool {
        is_hostname(&self.comment)
    }
}

impl fmt::Display for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Route ID: {}, Dst Address: {}, Gateway: {}, Comment: {}",
            self.id, self.destination, self.gateway, self.comment
        )
    }
}
