//! Authenticated RouterOS API session
//!
//! Each command is answered by zero or more reply rows and a closing done.
//! A trap in between marks the command as failed; a fatal means the router
//! dropped the session.

use async_trait::async_trait;
use mikrotik_rs::MikrotikDevice;
use mikrotik_rs::protocol::CommandResponse;
use mikrotik_rs::protocol::command::CommandBuilder;
use routesync_core::traits::{Command, Reply, RouterApi};
use routesync_core::{Error, Result};
use std::fmt::Display;
use tracing::{debug, trace};

/// One response to a running command, reduced to what routesync uses
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Row(Reply),
    Trap(String),
    Fatal(String),
    /// The device reported a transport failure instead of a response
    Broken(String),
    Done,
    /// Anything else the device reports, such as `!empty`
    Ignored,
}

impl Event {
    fn ends_command(&self) -> bool {
        matches!(self, Event::Fatal(_) | Event::Broken(_) | Event::Done)
    }
}

impl From<CommandResponse> for Event {
    #[allow(unreachable_patterns)]
    fn from(response: CommandResponse) -> Self {
        match response {
            CommandResponse::Reply(reply) => Event::Row(
                reply
                    .attributes
                    .into_iter()
                    .map(|(key, value)| (key, Option::<String>::from(value).unwrap_or_default()))
                    .collect(),
            ),
            CommandResponse::Trap(trap) => Event::Trap(trap.message.to_string()),
            CommandResponse::Fatal(message) => Event::Fatal(message.to_string()),
            CommandResponse::Done(_) => Event::Done,
            other => {
                trace!("Ignoring response {:?}", other);
                Event::Ignored
            }
        }
    }
}

/// Items the device sends back on a command channel
trait IntoEvent {
    fn into_event(self) -> Event;
}

impl IntoEvent for CommandResponse {
    fn into_event(self) -> Event {
        Event::from(self)
    }
}

impl<E: Display> IntoEvent for std::result::Result<CommandResponse, E> {
    fn into_event(self) -> Event {
        match self {
            Ok(response) => Event::from(response),
            Err(e) => Event::Broken(e.to_string()),
        }
    }
}

/// Fold the responses to `command` into its rows
///
/// The first trap wins; rows that arrived before it are discarded.
fn collect(command: &Command, events: impl IntoIterator<Item = Event>) -> Result<Vec<Reply>> {
    let path = command.path();
    let mut rows = Vec::new();
    let mut trap = None;

    for event in events {
        match event {
            Event::Row(row) => rows.push(row),
            Event::Ignored => {}
            Event::Trap(message) => {
                trap.get_or_insert(message);
            }
            Event::Fatal(message) => {
                return Err(Error::query(format!(
                    "{}: router closed the session: {}",
                    path, message
                )));
            }
            Event::Broken(message) => {
                return Err(Error::query(format!("{}: {}", path, message)));
            }
            Event::Done => {
                return match trap {
                    Some(message) => Err(Error::query(format!(
                        "{}: router refused command: {}",
                        path, message
                    ))),
                    None => Ok(rows),
                };
            }
        }
    }

    Err(Error::query(format!(
        "{}: session ended before the command completed",
        path
    )))
}

/// Translate `=key=value` and `?key=value` words for the device
fn build(command: &Command) -> Result<mikrotik_rs::protocol::command::Command> {
    let mut builder = CommandBuilder::new()
        .command(command.path());

    for word in command.words() {
        if let Some((key, value)) = word.strip_prefix('=').and_then(|w| w.split_once('=')) {
            builder = builder.attribute(key, Some(value));
        } else if let Some((key, value)) = word.strip_prefix('?').and_then(|w| w.split_once('=')) {
            builder = builder.query_equal(key, value);
        } else {
            return Err(Error::invalid_argument(format!(
                "{}: unsupported word {:?}",
                command.path(),
                word
            )));
        }
    }

    Ok(builder.build())
}

/// A logged-in RouterOS API session
///
/// Obtained from [`crate::connect`]. Call [`RouterSession::close`] when done.
pub struct RouterSession {
    device: MikrotikDevice,
}

impl std::fmt::Debug for RouterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterSession").finish_non_exhaustive()
    }
}

impl RouterSession {
    pub(crate) fn new(device: MikrotikDevice) -> Self {
        Self { device }
    }

    /// Drop the connection
    pub fn close(self) {
        drop(self.device);
        debug!("Router session closed");
    }
}

#[async_trait]
impl RouterApi for RouterSession {
    async fn run(&mut self, command: &Command) -> Result<Vec<Reply>> {
        let request = build(command)?;

        debug!("Running {}", command);
        let mut responses = self
            .device
            .send_command(request)
            .await
            .map_err(|e| Error::query(format!("{}: {}", command.path(), e)))?;

        let mut events = Vec::new();
        while let Some(item) = responses.recv().await {
            let event = item.into_event();
            trace!("Received {:?}", event);
            let last = event.ends_command();
            events.push(event);
            if last {
                break;
            }
        }

        collect(command, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Event {
        Event::Row(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn print_collects_every_row() {
        let command = Command::new("/ip/route/print").query("comment", "example.com");
        let rows = collect(
            &command,
            [
                row(&[
                    (".id", "*1"),
                    ("dst-address", "93.184.216.34/32"),
                    ("gateway", "192.168.1.1"),
                    ("comment", "example.com"),
                ]),
                row(&[(".id", "*2"), ("dst-address", "93.184.216.35/32")]),
                Event::Done,
            ],
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(".id").map(String::as_str), Some("*1"));
        assert_eq!(rows[0].get("comment").map(String::as_str), Some("example.com"));
        assert_eq!(rows[1].get("gateway"), None);
    }

    #[test]
    fn done_without_rows_is_empty() {
        let rows = collect(
            &Command::new("/ip/route/add").attr("dst-address", "10.0.0.1/32"),
            [Event::Done],
        )
        .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn trap_is_a_query_error() {
        let command = Command::new("/ip/route/remove").attr("numbers", "*9");
        let err = collect(
            &command,
            [Event::Trap("no such item".to_string()), Event::Done],
        )
        .unwrap_err();

        assert!(matches!(err, Error::Query(_)));
        assert_eq!(
            err.to_string(),
            "Query error: /ip/route/remove: router refused command: no such item"
        );
    }

    #[test]
    fn first_trap_wins_over_later_ones() {
        let err = collect(
            &Command::new("/ip/route/print"),
            [
                row(&[(".id", "*1")]),
                Event::Trap("first".to_string()),
                Event::Trap("second".to_string()),
                Event::Done,
            ],
        )
        .unwrap_err();
        assert!(err.to_string().ends_with("router refused command: first"));
    }

    #[test]
    fn fatal_ends_the_command() {
        let err = collect(
            &Command::new("/ip/route/print"),
            [
                Event::Fatal("not logged in".to_string()),
                row(&[(".id", "*1")]),
                Event::Done,
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Query(_)));
        assert!(err.to_string().contains("router closed the session: not logged in"));
    }

    #[test]
    fn transport_failure_is_a_query_error() {
        let err = collect(
            &Command::new("/ip/route/print"),
            [Event::Broken("connection reset by peer".to_string())],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Query(_)));
        assert!(err.to_string().contains("connection reset by peer"));
    }

    #[test]
    fn channel_closing_early_is_a_query_error() {
        let err = collect(&Command::new("/ip/route/print"), [row(&[(".id", "*1")])]).unwrap_err();
        assert!(matches!(err, Error::Query(_)));
        assert!(err.to_string().contains("before the command completed"));
    }

    #[test]
    fn only_ending_events_stop_the_read_loop() {
        assert!(Event::Done.ends_command());
        assert!(Event::Fatal(String::new()).ends_command());
        assert!(Event::Broken(String::new()).ends_command());
        assert!(!Event::Trap(String::new()).ends_command());
        assert!(!row(&[(".id", "*1")]).ends_command());
    }

    #[test]
    fn device_errors_become_transport_failures() {
        let item: std::result::Result<CommandResponse, String> = Err("socket closed".to_string());
        assert_eq!(item.into_event(), Event::Broken("socket closed".to_string()));
    }

    #[test]
    fn ignored_responses_do_not_add_rows() {
        let rows = collect(
            &Command::new("/ip/route/print"),
            [Event::Ignored, row(&[(".id", "*1")]), Event::Done],
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn attribute_and_query_words_translate() {
        let command = Command::new("/ip/route/add")
            .query("comment", "example.com")
            .attr("dst-address", "93.184.216.34/32")
            .attr("comment", "a=b");
        assert!(build(&command).is_ok());
    }
}
