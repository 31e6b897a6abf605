//! Test doubles shared by the reconciler contract tests
//!
//! `MockRouter` behaves like a tiny `/ip/route` table: print honours
//! `?comment=` filters, add assigns ids, remove deletes by `numbers`. Every
//! command is recorded so tests can assert on exactly what was sent.

#![allow(dead_code)]

use async_trait::async_trait;
use routesync_core::error::ResolveError;
use routesync_core::traits::{Command, Reply, Resolver, RouterApi};
use routesync_core::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RouterState {
    routes: Vec<Reply>,
    next_id: u32,
    sent: Vec<Command>,
    fail_print: bool,
    fail_remove: HashSet<String>,
    fail_add: HashSet<String>,
}

/// In-memory router; clones share the same table
#[derive(Clone, Default)]
pub struct MockRouter {
    state: Arc<Mutex<RouterState>>,
}

impl MockRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a route as if someone had added it earlier; ids count up from `*1`
    pub fn with_route(self, dst: &str, gateway: &str, comment: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = format!("*{:X}", state.next_id);
            state.routes.push(row(&[
                (".id", id.as_str()),
                ("dst-address", dst),
                ("gateway", gateway),
                ("comment", comment),
            ]));
        }
        self
    }

    /// Every print fails
    pub fn failing_print(self) -> Self {
        self.state.lock().unwrap().fail_print = true;
        self
    }

    /// Removing `id` fails
    pub fn failing_remove(self, id: &str) -> Self {
        self.state.lock().unwrap().fail_remove.insert(id.to_string());
        self
    }

    /// Adding a route to `dst` (e.g. `1.2.3.4/32`) fails
    pub fn failing_add(self, dst: &str) -> Self {
        self.state.lock().unwrap().fail_add.insert(dst.to_string());
        self
    }

    /// All commands received, in order
    pub fn sent(&self) -> Vec<Command> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Commands that would change the table
    pub fn mutations(&self) -> Vec<Command> {
        self.sent()
            .into_iter()
            .filter(|c| c.path() != "/ip/route/print")
            .collect()
    }

    /// Current table
    pub fn routes(&self) -> Vec<Reply> {
        self.state.lock().unwrap().routes.clone()
    }

    /// Destinations of the routes carrying `comment`
    pub fn destinations_for(&self, comment: &str) -> Vec<String> {
        self.routes()
            .iter()
            .filter(|r| r.get("comment").map(String::as_str) == Some(comment))
            .filter_map(|r| r.get("dst-address").cloned())
            .collect()
    }
}

#[async_trait]
impl RouterApi for MockRouter {
    async fn run(&mut self, command: &Command) -> Result<Vec<Reply>> {
        let mut state = self.state.lock().unwrap();
        state.sent.push(command.clone());

        match command.path() {
            "/ip/route/print" => {
                if state.fail_print {
                    return Err(Error::query("!trap: interrupted"));
                }
                let filters: Vec<(String, String)> = command
                    .words()
                    .iter()
                    .filter_map(|w| w.strip_prefix('?'))
                    .filter_map(|w| w.split_once('='))
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                Ok(state
                    .routes
                    .iter()
                    .filter(|r| filters.iter().all(|(k, v)| r.get(k) == Some(v)))
                    .cloned()
                    .collect())
            }
            "/ip/route/add" => {
                let dst = command.attribute("dst-address").unwrap_or_default().to_string();
                if state.fail_add.contains(&dst) {
                    return Err(Error::query(format!("!trap: cannot add {}", dst)));
                }
                state.next_id += 1;
                let id = format!("*{:X}", state.next_id);
                let mut route: Reply = HashMap::new();
                route.insert(".id".to_string(), id);
                for word in command.words() {
                    if let Some((k, v)) = word.strip_prefix('=').and_then(|w| w.split_once('=')) {
                        route.insert(k.to_string(), v.to_string());
                    }
                }
                state.routes.push(route);
                Ok(Vec::new())
            }
            "/ip/route/remove" => {
                let id = command.attribute("numbers").unwrap_or_default().to_string();
                if state.fail_remove.contains(&id) {
                    return Err(Error::query(format!("!trap: cannot remove {}", id)));
                }
                let before = state.routes.len();
                state.routes.retain(|r| r.get(".id") != Some(&id));
                if state.routes.len() == before {
                    return Err(Error::query("!trap: no such item"));
                }
                Ok(Vec::new())
            }
            other => Err(Error::query(format!("!trap: no such command {}", other))),
        }
    }
}

/// Resolver answering from a fixed table; unknown names are NXDOMAIN
#[derive(Clone, Default)]
pub struct StaticResolver {
    answers: HashMap<String, Vec<IpAddr>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, addrs: &[&str]) -> Self {
        self.answers.insert(
            name.to_string(),
            addrs.iter().map(|a| a.parse().unwrap()).collect(),
        );
        self
    }

    /// Names looked up, in order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, name: &str) -> std::result::Result<Vec<IpAddr>, ResolveError> {
        self.lookups.lock().unwrap().push(name.to_string());
        match self.answers.get(name) {
            Some(addrs) if !addrs.is_empty() => Ok(addrs.clone()),
            _ => Err(ResolveError::NotFound(name.to_string())),
        }
    }
}

pub fn row(pairs: &[(&str, &str)]) -> Reply {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
