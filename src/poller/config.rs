use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};

use crate::task::{TaskKind, TaskPhase};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_MIN_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_TRANSIENT_STATUSES: &[u16] = &[404, 500];
/// Polls are never spaced closer than this, whatever the configuration says.
pub const POLL_INTERVAL_FLOOR: Duration = Duration::from_millis(100);

/// How to wait for one class of remote operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Total wall-clock budget, initial delay included.
    pub timeout: Duration,
    /// Gives the remote system time to register the task before the first poll.
    pub initial_delay: Duration,
    /// Floor on the spacing between two polls. Values below
    /// [`POLL_INTERVAL_FLOOR`] are raised to it.
    pub min_poll_interval: Duration,
    /// Ceiling the backoff grows towards.
    pub max_poll_interval: Duration,
    pub backoff_factor: f32,
    pub pending_states: Vec<String>,
    pub success_states: Vec<String>,
    /// When empty, any state that is neither pending nor success is a failure.
    pub failure_states: Vec<String>,
    /// HTTP statuses that are retried instead of aborting the wait.
    pub transient_statuses: Vec<u16>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            initial_delay: DEFAULT_INITIAL_DELAY,
            min_poll_interval: DEFAULT_MIN_POLL_INTERVAL,
            max_poll_interval: DEFAULT_MAX_POLL_INTERVAL,
            backoff_factor: 2.0,
            pending_states: Vec::new(),
            success_states: Vec::new(),
            failure_states: Vec::new(),
            transient_statuses: DEFAULT_TRANSIENT_STATUSES.to_vec(),
        }
    }
}

impl PollConfig {
    pub fn for_kind(kind: TaskKind) -> Self {
        Self {
            timeout: kind.default_timeout(),
            pending_states: owned(kind.pending_states()),
            success_states: owned(kind.success_states()),
            failure_states: owned(kind.failure_states()),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, min: Duration, max: Duration) -> Self {
        self.min_poll_interval = min;
        self.max_poll_interval = max;
        self
    }

    pub fn with_states(mut self, pending: &[&str], success: &[&str], failure: &[&str]) -> Self {
        self.pending_states = owned(pending);
        self.success_states = owned(success);
        self.failure_states = owned(failure);
        self
    }

    /// Maps a remote state onto its phase. `None` means the state belongs to
    /// none of the configured sets while explicit failure states exist.
    pub fn classify(&self, state: &str) -> Option<TaskPhase> {
        let contains = |set: &[String]| set.iter().any(|s| s == state);

        if contains(&self.pending_states) {
            Some(TaskPhase::Pending)
        } else if contains(&self.success_states) {
            Some(TaskPhase::Succeeded)
        } else if contains(&self.failure_states) || self.failure_states.is_empty() {
            Some(TaskPhase::Failed)
        } else {
            None
        }
    }

    /// Inter-poll delays: exponential from `min_poll_interval`, capped at
    /// `max_poll_interval`, never exhausted.
    pub(crate) fn backoff(&self) -> ExponentialBackoff {
        let min = self.min_poll_interval.max(POLL_INTERVAL_FLOOR);
        ExponentialBuilder::default()
            .with_min_delay(min)
            .with_max_delay(self.max_poll_interval.max(min))
            .with_factor(self.backoff_factor.max(1.0))
            .with_max_times(usize::MAX)
            .build()
    }
}

fn owned(states: &[&str]) -> Vec<String> {
    states.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_ovh_provider_behaviour() {
        let config = PollConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(1200));
        assert_eq!(config.initial_delay, Duration::from_secs(10));
        assert_eq!(config.min_poll_interval, Duration::from_secs(3));
        assert_eq!(config.transient_statuses, vec![404, 500]);
    }

    #[test]
    fn test_for_kind_uses_kind_timeout_and_states() {
        let config = PollConfig::for_kind(TaskKind::VrackTask);
        assert_eq!(config.timeout, Duration::from_secs(3600));
        assert_eq!(config.classify("todo"), Some(TaskPhase::Pending));
        assert_eq!(config.classify("done"), Some(TaskPhase::Succeeded));
        assert_eq!(config.classify("cancelled"), Some(TaskPhase::Failed));
    }

    #[test]
    fn test_classify_unlisted_state_with_explicit_failures() {
        let config = PollConfig::default().with_states(&["PENDING"], &["SUCCESS"], &["FAILURE"]);
        assert_eq!(config.classify("EXPLODED"), None);
    }

    #[test]
    fn test_classify_unlisted_state_without_failure_set() {
        let config = PollConfig::default().with_states(&["PENDING"], &["SUCCESS"], &[]);
        assert_eq!(config.classify("EXPLODED"), Some(TaskPhase::Failed));
        assert_eq!(config.classify("PENDING"), Some(TaskPhase::Pending));
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        let config = PollConfig::for_kind(TaskKind::DbaasLogsOperation);
        assert_eq!(config.classify("SUCCESS"), Some(TaskPhase::Succeeded));
        assert_eq!(config.classify("success"), None);
    }

    #[test]
    fn test_backoff_starts_at_floor_and_is_capped() {
        let config = PollConfig::default();
        let delays: Vec<Duration> = config.backoff().take(5).collect();

        assert_eq!(delays[0], Duration::from_secs(3));
        assert!(delays.iter().all(|d| *d >= Duration::from_secs(3)));
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(10)));
        assert_eq!(delays[4], Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_zero_interval_is_floored() {
        let config = PollConfig::default().with_poll_interval(Duration::ZERO, Duration::ZERO);
        let delays: Vec<Duration> = config.backoff().take(10).collect();

        assert!(delays.iter().all(|d| *d == POLL_INTERVAL_FLOOR));
    }

    #[test]
    fn test_backoff_is_not_exhausted() {
        let config = PollConfig::default();
        assert_eq!(config.backoff().take(1000).count(), 1000);
    }
}
