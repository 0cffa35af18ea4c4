//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::process::Stdio;

use derive_new::new;
use tracing::warn;

use crate::with_source;

// Exit status used by the OpenSSH client to report its own errors, as opposed
// to the exit status of the remote command.
const SSH_CLIENT_FAILURE: i32 = 255;

/// Executes commands on a device under test.
pub trait Transport: Send + std::fmt::Debug {
    // Runs a single command on the given host and waits for it to finish.
    fn exec(
        &mut self,
        host: &str,
        command: &str,
    ) -> Result<CommandOutput, TransportError>;
}

/// Raw result of a command executed on a host.
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Parameters of the system SSH client.
#[derive(Clone, Debug, new)]
pub struct SshConfig {
    pub binary: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout: Option<u64>,
    pub options: Vec<String>,
}

/// Transport that reaches the hosts through the system SSH client.
//
// Every command is a blocking round trip: the process is spawned and awaited
// on a private current-thread runtime.
#[derive(Debug)]
pub struct SshTransport {
    config: SshConfig,
    runtime: tokio::runtime::Runtime,
}

// Transport errors.
#[derive(Debug)]
pub enum TransportError {
    RuntimeError(std::io::Error),
    ExecError(String, std::io::Error),
    ConnectionError(String, String),
}

// ===== impl CommandOutput =====

impl CommandOutput {
    /// Returns the text that represents this output to the test logic.
    ///
    /// Successful commands yield their standard output. Failed commands yield
    /// their standard output when present, or their standard error otherwise.
    /// Trailing newlines are dropped in both cases.
    pub fn text(&self) -> String {
        let text = if self.success || !self.stdout.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        text.trim_end_matches(['\n', '\r']).to_owned()
    }
}

// ===== impl SshConfig =====

impl Default for SshConfig {
    fn default() -> SshConfig {
        SshConfig {
            binary: "ssh".to_owned(),
            user: None,
            port: None,
            connect_timeout: Some(10),
            options: vec![],
        }
    }
}

// ===== impl SshTransport =====

impl SshTransport {
    pub fn new(config: SshConfig) -> Result<SshTransport, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TransportError::RuntimeError)?;

        Ok(SshTransport { config, runtime })
    }

    fn build_command(&self, host: &str, command: &str) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.config.binary);
        cmd.arg("-o").arg("BatchMode=yes");
        if let Some(timeout) = self.config.connect_timeout {
            cmd.arg("-o").arg(format!("ConnectTimeout={timeout}"));
        }
        if let Some(port) = self.config.port {
            cmd.arg("-p").arg(port.to_string());
        }
        if let Some(user) = &self.config.user {
            cmd.arg("-l").arg(user);
        }
        for option in &self.config.options {
            cmd.arg("-o").arg(option);
        }
        cmd.arg(host).arg("--").arg(command);
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }
}

impl Transport for SshTransport {
    fn exec(
        &mut self,
        host: &str,
        command: &str,
    ) -> Result<CommandOutput, TransportError> {
        let mut cmd = self.build_command(host, command);
        let output = self
            .runtime
            .block_on(cmd.output())
            .map_err(|error| TransportError::ExecError(host.to_owned(), error))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if output.status.code() == Some(SSH_CLIENT_FAILURE) {
            return Err(TransportError::ConnectionError(host.to_owned(), stderr));
        }

        Ok(CommandOutput::new(stdout, stderr, output.status.success()))
    }
}

// ===== impl TransportError =====

impl TransportError {
    pub fn log(&self) {
        match self {
            TransportError::RuntimeError(error) => {
                warn!(error = %with_source(error), "{}", self);
            }
            TransportError::ExecError(host, error) => {
                warn!(%host, error = %with_source(error), "{}", self);
            }
            TransportError::ConnectionError(host, stderr) => {
                warn!(%host, %stderr, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::RuntimeError(..) => {
                write!(f, "failed to create transport runtime")
            }
            TransportError::ExecError(host, ..) => {
                write!(f, "failed to execute command on {host}")
            }
            TransportError::ConnectionError(host, stderr) => {
                write!(f, "failed to reach {host}: {}", stderr.trim_end())
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::RuntimeError(error)
            | TransportError::ExecError(_, error) => Some(error),
            TransportError::ConnectionError(..) => None,
        }
    }
}

// ===== unit tests =====
