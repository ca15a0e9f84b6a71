//! Invocation of the node daemon binary (`nolusd`, `gaiad`, ...).
//!
//! Key management and transaction encoding belong to the node CLI; this
//! module only runs it and collects its output.

use crate::error::ClientError;
use std::{
    ffi::OsString,
    path::PathBuf,
    process::Stdio,
};
use tokio::process::Command;

pub const DEFAULT_KEYRING_BACKEND: &str = "test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCli {
    /// Program followed by its leading arguments, e.g. `["nolusd"]` or
    /// `["docker", "exec", "node-1", "nolusd"]`.
    command: Vec<String>,
    home: Option<PathBuf>,
    keyring_backend: String,
}

impl NodeCli {
    pub fn new(command: Vec<String>) -> Result<Self, ClientError> {
        if command.first().map_or(true, |program| program.is_empty()) {
            return Err(ClientError::MissingCommand("the command is empty"))
        }
        Ok(Self {
            command,
            home: None,
            keyring_backend: DEFAULT_KEYRING_BACKEND.to_string(),
        })
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_keyring_backend(mut self, backend: impl Into<String>) -> Self {
        self.keyring_backend = backend.into();
        self
    }

    /// Flags every keyring aware subcommand needs.
    pub(crate) fn keyring_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--keyring-backend".into(),
            self.keyring_backend.clone().into(),
        ];
        if let Some(home) = &self.home {
            args.push("--home".into());
            args.push(home.clone().into());
        }
        args
    }

    /// Runs the CLI with `args` and returns its standard output.
    pub(crate) async fn run<I, A>(&self, args: I) -> Result<String, ClientError>
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        let (program, leading) = self
            .command
            .split_first()
            .ok_or(ClientError::MissingCommand("the command is empty"))?;
        let args: Vec<OsString> = leading
            .iter()
            .map(OsString::from)
            .chain(args.into_iter().map(Into::into))
            .collect();
        let rendered = std::iter::once(program.as_str())
            .chain(args.iter().filter_map(|a| a.to_str()))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(command = %rendered, "running node CLI");

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ClientError::Command {
                command: rendered,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
