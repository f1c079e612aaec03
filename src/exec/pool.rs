// src/exec/pool.rs

//! Bounded job pool for process-spawning work.
//!
//! At most `limit` jobs run at once; the rest wait for a permit. Each job
//! reports back through a [`JobHandle`]:
//!
//! - `Started` once it holds a permit,
//! - `StillRunning` repeatedly once it has been running for longer than the
//!   stall threshold (first after the threshold, then every half threshold),
//! - `Finished` with the job's outcome.
//!
//! Stall signals are advisory only. Nothing in the pool ever cancels a job.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::errors::ExecutionError;

/// Lifecycle of a pool job as seen through its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    Failed,
}

/// Notification sent from a running job to its handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSignal {
    Started,
    StillRunning { elapsed: Duration },
    Finished(Result<(), ExecutionError>),
}

#[derive(Debug, Clone)]
pub struct Pool {
    permits: Arc<Semaphore>,
    limit: usize,
    stall_after: Option<Duration>,
}

impl Pool {
    /// Create a pool running at most `limit` jobs at once (minimum 1).
    ///
    /// `stall_after = None` disables stall signals.
    pub fn new(limit: usize, stall_after: Option<Duration>) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
            stall_after,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn stall_after(&self) -> Option<Duration> {
        self.stall_after
    }

    /// Number of jobs currently holding a permit.
    pub fn running(&self) -> usize {
        self.limit - self.permits.available_permits()
    }

    /// Queue `job` for execution.
    ///
    /// The job is spawned onto the Tokio runtime immediately but does not
    /// start running until a permit is free.
    pub fn submit<F>(&self, label: impl Into<String>, job: F) -> JobHandle
    where
        F: Future<Output = Result<(), ExecutionError>> + Send + 'static,
    {
        let label = label.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let permits = Arc::clone(&self.permits);
        let stall_after = self.stall_after;
        let job_label = label.clone();

        tokio::spawn(async move {
            let permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = tx.send(JobSignal::Finished(Err(ExecutionError::Abandoned)));
                    return;
                }
            };

            let started = Instant::now();
            debug!(job = %job_label, "job acquired a pool slot");
            let _ = tx.send(JobSignal::Started);

            let outcome = match stall_after {
                None => job.await,
                Some(after) => {
                    tokio::pin!(job);
                    let period = (after / 2).max(Duration::from_millis(1));
                    let mut ticker = time::interval_at(started + after, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                    loop {
                        tokio::select! {
                            outcome = &mut job => break outcome,
                            _ = ticker.tick() => {
                                let elapsed = started.elapsed();
                                debug!(job = %job_label, elapsed_secs = elapsed.as_secs(), "job still running");
                                let _ = tx.send(JobSignal::StillRunning { elapsed });
                            }
                        }
                    }
                }
            };

            drop(permit);
            debug!(job = %job_label, ok = outcome.is_ok(), "job finished");
            let _ = tx.send(JobSignal::Finished(outcome));
        });

        JobHandle {
            label,
            state: JobState::Queued,
            signals: rx,
        }
    }
}

/// Receiving end of a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    label: String,
    state: JobState,
    signals: mpsc::UnboundedReceiver<JobSignal>,
}

impl JobHandle {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Wait for the next signal from the job.
    ///
    /// Returns `None` once `Finished` has been delivered.
    pub async fn next_signal(&mut self) -> Option<JobSignal> {
        if matches!(self.state, JobState::Succeeded | JobState::Failed) {
            return None;
        }

        let signal = self
            .signals
            .recv()
            .await
            .unwrap_or(JobSignal::Finished(Err(ExecutionError::Abandoned)));

        self.state = match &signal {
            JobSignal::Started | JobSignal::StillRunning { .. } => JobState::Running,
            JobSignal::Finished(Ok(())) => JobState::Succeeded,
            JobSignal::Finished(Err(_)) => JobState::Failed,
        };

        Some(signal)
    }

    /// Ignore progress signals and wait for the outcome.
    pub async fn wait(mut self) -> Result<(), ExecutionError> {
        while let Some(signal) = self.next_signal().await {
            if let JobSignal::Finished(outcome) = signal {
                return outcome;
            }
        }
        Err(ExecutionError::Abandoned)
    }
}
