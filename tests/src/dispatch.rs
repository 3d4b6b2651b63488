#![cfg(test)]
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use vulntechx_common::error::JobError;
use vulntechx_core::dispatcher::{self, Job, JobRunner, ShellRunner};
use vulntechx_core::sink::{LineSender, OutputSink};

/// Wraps the shell runner and gauges how many subprocesses are alive at once.
struct GaugedShell {
    inner: ShellRunner,
    running: AtomicUsize,
    max_running: AtomicUsize,
    exited: AtomicUsize,
}

impl GaugedShell {
    fn new() -> Self {
        Self {
            inner: ShellRunner::default(),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
            exited: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl JobRunner for GaugedShell {
    async fn run(&self, job: &Job, lines: &LineSender) -> Result<(), JobError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);

        let result = self.inner.run(job, lines).await;

        self.running.fetch_sub(1, Ordering::SeqCst);
        self.exited.fetch_add(1, Ordering::SeqCst);
        result
    }
}

fn sleepy_jobs(count: usize) -> Vec<Job> {
    (0..count)
        .map(|n| Job::new(format!("host-{n}"), "sleep 0.05; read -r h; echo \"[x] [y] [z] $h\""))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subprocesses_stay_within_the_limit() {
    for limit in [1, 2, 5] {
        let sink = OutputSink::spawn(tokio::io::sink(), Some(Vec::new()), false);
        let runner = Arc::new(GaugedShell::new());

        let report = dispatcher::dispatch(
            sleepy_jobs(12),
            NonZeroUsize::new(limit).unwrap(),
            runner.clone(),
            sink.sender(),
        )
        .await;

        assert!(runner.max_running.load(Ordering::SeqCst) <= limit);
        assert!(report.peak <= limit);
        assert_eq!(report.admitted, 12);

        // The barrier returned only after every subprocess exited.
        assert_eq!(report.completed, 12);
        assert_eq!(runner.exited.load(Ordering::SeqCst), 12);
        assert_eq!(runner.running.load(Ordering::SeqCst), 0);

        let closed = sink.close().await.unwrap();
        let written = String::from_utf8(closed.destination.unwrap()).unwrap();
        assert_eq!(written.lines().count(), 12);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_jobs_actually_overlap() {
    let sink = OutputSink::spawn(tokio::io::sink(), None::<Vec<u8>>, false);
    let runner = Arc::new(GaugedShell::new());
    let jobs: Vec<Job> = (0..4).map(|n| Job::new(format!("h{n}"), "sleep 0.3")).collect();

    let start = std::time::Instant::now();
    let report = dispatcher::dispatch(jobs, NonZeroUsize::new(4).unwrap(), runner, sink.sender()).await;

    assert_eq!(report.completed, 4);
    assert!(start.elapsed() < Duration::from_millis(1100));
}
