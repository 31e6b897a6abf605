// # Router API Trait
//
// Defines the command/response interface routesync needs from a router.
//
// ## Implementations
//
// - RouterOS API over TCP: `routesync-routeros` crate
//
// ## Wire Contract
//
// A command is a path such as `/ip/route/print` followed by words:
// - `=key=value` attribute arguments
// - `?key=value` query filters
//
// The router answers with zero or more rows, each a map of string keys to
// string values.
//
// ## Usage
//
// ```rust,ignore
// use routesync_core::traits::{Command, RouterApi};
//
// let rows = api
//     .run(&Command::new("/ip/route/print").query("comment", "example.com"))
//     .await?;
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

/// One reply row returned by the router (`!re` sentence attributes)
pub type Reply = HashMap<String, String>;

/// A router API command: a path plus attribute and query words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    path: String,
    words: Vec<String>,
}

impl Command {
    /// Start a command for the given menu path (e.g. `/ip/route/add`)
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            words: Vec::new(),
        }
    }

    /// Append an `=key=value` attribute word
    pub fn attr(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.words.push(format!("={}={}", key, value.as_ref()));
        self
    }

    /// Append a `?key=value` query word
    pub fn query(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.words.push(format!("?{}={}", key, value.as_ref()));
        self
    }

    /// The menu path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Argument and query words, in the order they were added
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Look up the value of an `=key=value` attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.words.iter().find_map(|word| {
            word.strip_prefix('=')
                .and_then(|rest| rest.split_once('='))
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v)
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        for word in &self.words {
            write!(f, " {}", word)?;
        }
        Ok(())
    }
}

/// Trait for router API clients
///
/// Implementations own one authenticated session and execute commands on it
/// one at a time. `&mut self` reflects that there is exactly one writer.
///
/// # Responsibilities
///
/// - Send the command and collect every reply row until the command completes
/// - Map router-side failures (`!trap`, `!fatal`) and transport failures to
///   [`crate::Error::Query`]
///
/// Implementations do not retry, filter rows, or interpret route semantics;
/// that belongs to [`crate::RouteRepository`].
#[async_trait]
pub trait RouterApi: Send {
    /// Run one command and return its reply rows
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Reply>)`: Rows in the order the router sent them (possibly empty)
    /// - `Err(Error)`: If the router refused the command or the transport failed
    async fn run(&mut self, command: &Command) -> Result<Vec<Reply>, crate::Error>;
}

/// Lets a caller lend its session to the reconciler and keep ownership
#[async_trait]
impl<T: RouterApi + ?Sized> RouterApi for &mut T {
    async fn run(&mut self, command: &Command) -> Result<Vec<Reply>, crate::Error> {
        (**self).run(command).await
    }
}
