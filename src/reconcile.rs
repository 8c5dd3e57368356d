//! The create/update/delete flow: mutate, wait for the resulting task,
//! re-read and merge the read value with what was declared.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::merge::{Snapshot, merge};
use crate::poller::{PollConfig, StatusSource, await_completion};
use crate::task::{OperationHandle, TaskStatus};

pub struct Reconciler<'a, S: StatusSource + ?Sized> {
    source: &'a S,
    cancel: CancellationToken,
}

impl<'a, S: StatusSource + ?Sized> Reconciler<'a, S> {
    pub fn new(source: &'a S, cancel: CancellationToken) -> Self {
        Self { source, cancel }
    }

    /// Runs `mutate`, waits for the task it started, then reads the entity
    /// back and merges it over `declared`.
    pub async fn apply<T, M, MFut, R, RFut>(
        &self,
        declared: &T,
        config: &PollConfig,
        mutate: M,
        read: R,
    ) -> Result<T, Error>
    where
        T: Snapshot,
        M: FnOnce() -> MFut,
        MFut: Future<Output = Result<OperationHandle, Error>>,
        R: FnOnce() -> RFut,
        RFut: Future<Output = Result<T, Error>>,
    {
        let status = self.run(config, mutate).await?;
        tracing::debug!(state = %status.state, "re-reading entity after operation");

        let read_back = read().await?;
        Ok(merge(read_back, declared)?)
    }

    /// Runs `mutate` and waits for the task; nothing is read back.
    pub async fn apply_delete<M, MFut>(
        &self,
        config: &PollConfig,
        mutate: M,
    ) -> Result<TaskStatus, Error>
    where
        M: FnOnce() -> MFut,
        MFut: Future<Output = Result<OperationHandle, Error>>,
    {
        self.run(config, mutate).await
    }

    async fn run<M, MFut>(&self, config: &PollConfig, mutate: M) -> Result<TaskStatus, Error>
    where
        M: FnOnce() -> MFut,
        MFut: Future<Output = Result<OperationHandle, Error>>,
    {
        let handle = mutate().await?;
        tracing::info!(task = %handle, "operation started");

        Ok(await_completion(self.source, &handle, config, &self.cancel).await?)
    }
}
