use thiserror::Error;

use crate::merge::MergeError;
use crate::poller::PollError;
use crate::providers::ProviderError;
use crate::providers::ovh::OvhError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Ovh(#[from] OvhError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
