//! The bounded job dispatcher.
//!
//! Each job runs one scanner command for one host. Admission is capped by a
//! counting semaphore: [`Dispatcher::submit`] waits for a permit *before*
//! spawning, so the decode loop feeding it never runs ahead of the limit.
//! The permit travels into the job and is released only after the command's
//! output has been drained and the process reaped.
//!
//! How a job's command actually runs is behind [`JobRunner`]; the shell
//! implementation lives in [`runner`].

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use vulntechx_common::error::JobError;

use crate::sink::LineSender;

pub mod runner;

pub use runner::ShellRunner;

/// One host, one resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub host: String,
    pub command: String,
}

impl Job {
    pub fn new(host: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            command: command.into(),
        }
    }
}

/// Runs a job's command to completion, forwarding every output line.
///
/// Implementations must not return before the command's output is fully
/// drained and the process has exited.
#[async_trait]
pub trait JobRunner: Send + Sync + 'static {
    async fn run(&self, job: &Job, lines: &LineSender) -> Result<(), JobError>;
}

/// Live counters, shared with every job task.
#[derive(Debug, Default)]
struct DispatchStats {
    admitted: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl DispatchStats {
    fn enter(&self) -> ActiveGuard<'_> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        ActiveGuard { stats: self }
    }

    fn snapshot(&self) -> DispatchReport {
        DispatchReport {
            admitted: self.admitted.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            peak: self.peak.load(Ordering::SeqCst),
        }
    }
}

struct ActiveGuard<'a> {
    stats: &'a DispatchStats,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.stats.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Final tally of a dispatch, taken after every job has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Jobs that got a permit and were started.
    pub admitted: usize,
    /// Jobs that ran to the end, successfully or not.
    pub completed: usize,
    /// Completed jobs whose command failed to start, read, or exit cleanly.
    pub failed: usize,
    /// Highest number of jobs holding a permit at the same time.
    pub peak: usize,
}

pub struct Dispatcher<R: JobRunner> {
    permits: Arc<Semaphore>,
    jobs: JoinSet<()>,
    runner: Arc<R>,
    lines: LineSender,
    stats: Arc<DispatchStats>,
    verbose: bool,
    process: bool,
}

impl<R: JobRunner> Dispatcher<R> {
    pub fn new(limit: NonZeroUsize, runner: Arc<R>, lines: LineSender) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.get())),
            jobs: JoinSet::new(),
            runner,
            lines,
            stats: Arc::new(DispatchStats::default()),
            verbose: false,
            process: false,
        }
    }

    /// Log job failures.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Log every command as its job starts.
    pub fn process(mut self, process: bool) -> Self {
        self.process = process;
        self
    }

    /// Waits for a free slot, then starts `job` in the background.
    pub async fn submit(&mut self, job: Job) {
        let permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                error!("Admission closed, dropping job for {}: {}", job.host, e);
                return;
            }
        };
        self.stats.admitted.fetch_add(1, Ordering::SeqCst);

        // Finished tasks stay in the set until joined; drop them as we go.
        while let Some(result) = self.jobs.try_join_next() {
            self.settle(result);
        }

        let runner = self.runner.clone();
        let lines = self.lines.clone();
        let stats = self.stats.clone();
        let (verbose, process) = (self.verbose, self.process);

        self.jobs.spawn(async move {
            let active = stats.enter();

            if process {
                info!("Running: [echo \"{}\" | {}]", job.host, job.command);
            }

            match runner.run(&job, &lines).await {
                Ok(()) => debug!("Finished {}", job.host),
                Err(e) => {
                    stats.failed.fetch_add(1, Ordering::SeqCst);
                    if verbose {
                        warn!("{}: {}", job.host, e);
                    }
                }
            }
            stats.completed.fetch_add(1, Ordering::SeqCst);

            drop(active);
            drop(permit);
        });
    }

    /// Jobs admitted and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.jobs.len()
    }

    /// Blocks until every admitted job has finished.
    pub async fn join(mut self) -> DispatchReport {
        while let Some(result) = self.jobs.join_next().await {
            self.settle(result);
        }
        self.stats.snapshot()
    }

    fn settle(&self, result: Result<(), JoinError>) {
        if let Err(e) = result {
            self.stats.completed.fetch_add(1, Ordering::SeqCst);
            self.stats.failed.fetch_add(1, Ordering::SeqCst);
            error!("Job task ended abnormally: {}", e);
        }
    }

    /// Cancels every outstanding job and waits for the tasks to unwind.
    ///
    /// Runners that set `kill_on_drop` take their processes down with them.
    pub async fn abort(mut self) -> DispatchReport {
        self.jobs.shutdown().await;
        self.stats.snapshot()
    }
}

/// One-shot form: runs every job under `limit` and waits for all of them.
pub async fn dispatch<R, I>(
    jobs: I,
    limit: NonZeroUsize,
    runner: Arc<R>,
    lines: LineSender,
) -> DispatchReport
where
    R: JobRunner,
    I: IntoIterator<Item = Job>,
{
    let mut dispatcher = Dispatcher::new(limit, runner, lines);
    for job in jobs {
        dispatcher.submit(job).await;
    }
    dispatcher.join().await
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
