use std::time::Duration;

use thiserror::Error;

/// Failure to read a task status from the remote system.
///
/// Only [`FetchError::Http`] carries a status code, so it is the only variant
/// that can ever be classified as transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("unreadable task body: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn is_transient(&self, transient_statuses: &[u16]) -> bool {
        match self {
            FetchError::Http { status, .. } => transient_statuses.contains(status),
            FetchError::Network { .. } | FetchError::Decode { .. } => false,
        }
    }
}

/// Why a wait on a remote operation ended without success.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("invalid operation handle: {reason}")]
    InvalidHandle { reason: String },

    /// Non-transient fetch failure; the wait was aborted immediately.
    #[error("fetching status of {handle} failed: {source}")]
    Fetch {
        handle: String,
        #[source]
        source: FetchError,
    },

    /// The remote system reported a terminal failure state.
    #[error("operation {handle} failed with state '{state}': {details}")]
    Failed {
        handle: String,
        state: String,
        details: String,
    },

    /// Still running when the budget ran out.
    #[error(
        "timeout after {timeout:?} waiting for operation {handle} (last state: {})",
        .last_state.as_deref().unwrap_or("none observed")
    )]
    Timeout {
        handle: String,
        timeout: Duration,
        last_state: Option<String>,
    },

    #[error("operation {handle} reported unexpected state '{state}'")]
    UnexpectedState { handle: String, state: String },

    #[error("wait for operation {handle} was cancelled")]
    Cancelled { handle: String },
}
