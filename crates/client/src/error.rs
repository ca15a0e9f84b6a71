use reqwest::StatusCode;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid node URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Node answered {status} for {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("The node CLI is not configured: {0}")]
    MissingCommand(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ClientError {
    /// Returns `true` if the node could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }
}
