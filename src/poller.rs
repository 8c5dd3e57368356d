mod config;
mod error;

pub use config::{
    DEFAULT_INITIAL_DELAY, DEFAULT_MAX_POLL_INTERVAL, DEFAULT_MIN_POLL_INTERVAL, DEFAULT_TIMEOUT,
    DEFAULT_TRANSIENT_STATUSES, POLL_INTERVAL_FLOOR, PollConfig,
};
pub use error::{FetchError, PollError};

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::task::{OperationHandle, TaskPhase, TaskStatus};

/// Reads the current status of a remote task.
///
/// Implementations must report enough of the transport failure for the
/// poller to tell transient errors (see [`PollConfig::transient_statuses`])
/// from fatal ones.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, handle: &OperationHandle) -> Result<TaskStatus, FetchError>;
}

/// Blocks until the operation behind `handle` reaches a terminal state.
///
/// Transient fetch errors are retried silently inside the timeout budget.
/// Every sleep and every fetch races against `cancel`; a fetch still in
/// flight when the token fires or the budget runs out is dropped.
pub async fn await_completion<S>(
    source: &S,
    handle: &OperationHandle,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<TaskStatus, PollError>
where
    S: StatusSource + ?Sized,
{
    handle.validate()?;

    let label = handle.to_string();
    let deadline = after(config.timeout);
    let mut delays = config.backoff();
    let mut last_state: Option<String> = None;
    let mut attempt: u32 = 0;

    tracing::debug!(
        task = %label,
        timeout = ?config.timeout,
        "waiting for operation"
    );

    pause(config.initial_delay, deadline, cancel, &label).await?;

    loop {
        if Instant::now() >= deadline {
            tracing::warn!(task = %label, attempts = attempt, "operation wait timed out");
            return Err(PollError::Timeout {
                handle: label,
                timeout: config.timeout,
                last_state,
            });
        }

        attempt += 1;
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled { handle: label }),
            result = tokio::time::timeout_at(deadline, source.fetch_status(handle)) => result,
        };

        match fetched {
            Err(_elapsed) => {
                return Err(PollError::Timeout {
                    handle: label,
                    timeout: config.timeout,
                    last_state,
                });
            }
            Ok(Err(err)) if err.is_transient(&config.transient_statuses) => {
                tracing::debug!(task = %label, attempt, error = %err, "transient status error, retrying");
            }
            Ok(Err(err)) => {
                return Err(PollError::Fetch {
                    handle: label,
                    source: err,
                });
            }
            Ok(Ok(status)) => match config.classify(&status.state) {
                Some(TaskPhase::Pending) => {
                    tracing::debug!(task = %label, attempt, state = %status.state, "operation pending");
                    last_state = Some(status.state);
                }
                Some(TaskPhase::Succeeded) => {
                    tracing::info!(task = %label, attempts = attempt, state = %status.state, "operation completed");
                    return Ok(status);
                }
                Some(TaskPhase::Failed) => {
                    return Err(PollError::Failed {
                        handle: label,
                        state: status.state,
                        details: status.details.unwrap_or_default(),
                    });
                }
                None => {
                    return Err(PollError::UnexpectedState {
                        handle: label,
                        state: status.state,
                    });
                }
            },
        }

        let delay = delays
            .next()
            .unwrap_or(config.max_poll_interval.max(POLL_INTERVAL_FLOOR));
        pause(delay, deadline, cancel, &label).await?;
    }
}

// About 30 years; stands in for durations the clock cannot represent.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `now + delay`, saturating instead of overflowing the clock.
fn after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Sleeps for `delay`, never past `deadline`, returning early on cancellation.
async fn pause(
    delay: Duration,
    deadline: Instant,
    cancel: &CancellationToken,
    label: &str,
) -> Result<(), PollError> {
    let wake = after(delay).min(deadline);
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PollError::Cancelled {
            handle: label.to_string(),
        }),
        _ = tokio::time::sleep_until(wake) => Ok(()),
    }
}
