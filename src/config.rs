use std::time::Duration;

use crate::error::Error;
use crate::poller::PollConfig;

pub const DEFAULT_ENDPOINT: &str = "ovh-eu";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint name (`ovh-eu`, ...) or explicit base URL.
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
        }
    }
}

/// User overrides layered on top of a kind's default [`PollConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollOverrides {
    pub timeout: Option<Duration>,
    pub initial_delay: Option<Duration>,
    pub min_poll_interval: Option<Duration>,
}

impl PollOverrides {
    /// Layers the overrides onto `config`. A zero poll interval is rejected.
    pub fn apply(&self, mut config: PollConfig) -> Result<PollConfig, Error> {
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(delay) = self.initial_delay {
            config.initial_delay = delay;
        }
        if let Some(interval) = self.min_poll_interval {
            if interval.is_zero() {
                return Err(Error::Config(
                    "minimum poll interval must be greater than zero".to_string(),
                ));
            }
            config.min_poll_interval = interval;
            config.max_poll_interval = config.max_poll_interval.max(interval);
        }
        Ok(config)
    }
}
