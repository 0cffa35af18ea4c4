//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use itertools::Itertools;
use tracing::{debug, debug_span};

use crate::transport::{Transport, TransportError};

/// Ordered, non-empty set of hosts that receive every command.
///
/// The first host is the primary one: its output is the one returned to the
/// caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostSet {
    hosts: Vec<String>,
}

/// Sends CLI commands to a set of hosts.
#[derive(Debug)]
pub struct CommandRunner {
    transport: Box<dyn Transport>,
}

// ===== impl HostSet =====

impl HostSet {
    pub fn new(hosts: Vec<String>) -> Option<HostSet> {
        if hosts.is_empty() {
            return None;
        }
        Some(HostSet { hosts })
    }

    pub fn single(host: impl Into<String>) -> HostSet {
        HostSet {
            hosts: vec![host.into()],
        }
    }

    pub fn primary(&self) -> &str {
        &self.hosts[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }
}

impl std::fmt::Display for HostSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hosts.iter().join(","))
    }
}

// ===== impl CommandRunner =====

impl CommandRunner {
    pub fn new(transport: Box<dyn Transport>) -> CommandRunner {
        CommandRunner { transport }
    }

    /// Runs a command, with an optional positional parameter, on every host
    /// of the set and returns the primary host's output verbatim.
    ///
    /// The parameter is appended after a single space and is not quoted, so a
    /// parameter containing spaces reaches the device as several arguments.
    /// Transport failures are returned as-is; there are no retries.
    pub fn run(
        &mut self,
        hosts: &HostSet,
        command: &str,
        param: Option<&str>,
    ) -> Result<String, TransportError> {
        let cmd_line = match param {
            Some(param) if !param.is_empty() => format!("{command} {param}"),
            _ => command.to_owned(),
        };

        let mut primary_output = None;
        for host in hosts.iter() {
            debug_span!("host", %host).in_scope(|| {
                debug!(command = %cmd_line, "running command");
                let output = self.transport.exec(host, &cmd_line)?;
                let text = output.text();
                debug!(success = %output.success, output = %text, "command finished");
                if primary_output.is_none() {
                    primary_output = Some(text);
                }
                Ok::<_, TransportError>(())
            })?;
        }

        // HostSet is never empty.
        Ok(primary_output.unwrap_or_default())
    }
}

// ===== unit tests =====
