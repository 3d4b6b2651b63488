//! Output classification and persistence.
//!
//! Every line any job produces passes through one writer task. The task
//! echoes the line to the live feed, and appends it to the destination file
//! when it looks like a finding. One task owning both writers means lines
//! from concurrent jobs never interleave mid-line.
//!
//! The queue between jobs and the writer is bounded. When it is full, jobs
//! wait in [`LineSender::send`], stop reading their pipes, and the scanner
//! processes block on their own output.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::warn;
use vulntechx_common::error::RunError;

/// Lines queued for the writer before senders start waiting.
pub const LINE_BUFFER: usize = 1024;

/// Whether a scanner output line is a finding worth keeping.
///
/// Findings look like `[template-id] [protocol] [severity] target ...`: at
/// least three whitespace-separated fields, the first three each starting
/// with `[`.
pub fn is_structured(line: &str) -> bool {
    let mut fields = line.split_whitespace();
    (0..3).all(|_| fields.next().is_some_and(|field| field.starts_with('[')))
}

/// Cheap handle jobs use to feed lines into the sink.
#[derive(Debug, Clone)]
pub struct LineSender {
    tx: Sender<String>,
}

impl LineSender {
    /// Waits for room in the queue. Returns `false` once the sink has stopped.
    pub async fn send(&self, line: String) -> bool {
        self.tx.send(line).await.is_ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub echoed: usize,
    pub persisted: usize,
    pub write_errors: usize,
}

/// What the writer task hands back once every sender is gone.
pub struct SinkClosed<W, D> {
    pub report: SinkReport,
    pub echo: W,
    pub destination: Option<D>,
}

pub struct OutputSink<W, D> {
    tx: Sender<String>,
    task: JoinHandle<SinkClosed<W, D>>,
}

impl<W, D> OutputSink<W, D>
where
    W: AsyncWrite + Unpin + Send + 'static,
    D: AsyncWrite + Unpin + Send + 'static,
{
    pub fn spawn(echo: W, destination: Option<D>, verbose: bool) -> Self {
        Self::with_capacity(echo, destination, verbose, LINE_BUFFER)
    }

    pub fn with_capacity(
        echo: W,
        destination: Option<D>,
        verbose: bool,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(write_lines(rx, echo, destination, verbose));
        Self { tx, task }
    }

    pub fn sender(&self) -> LineSender {
        LineSender {
            tx: self.tx.clone(),
        }
    }

    /// Waits until every line already sent has been written, then flushes.
    ///
    /// Only returns once all [`LineSender`] clones have been dropped.
    pub async fn close(self) -> Result<SinkClosed<W, D>, RunError> {
        drop(self.tx);
        self.task.await.map_err(|e| RunError::Sink(io::Error::other(e)))
    }
}

async fn write_lines<W, D>(
    mut rx: Receiver<String>,
    mut echo: W,
    mut destination: Option<D>,
    verbose: bool,
) -> SinkClosed<W, D>
where
    W: AsyncWrite + Unpin,
    D: AsyncWrite + Unpin,
{
    let mut report = SinkReport::default();

    while let Some(mut line) = rx.recv().await {
        let structured = is_structured(&line);
        line.push('\n');

        match echo_line(&mut echo, &line).await {
            Ok(()) => report.echoed += 1,
            Err(e) => {
                if verbose {
                    warn!("Error writing to standard output: {}", e);
                }
            }
        }

        if !structured {
            continue;
        }
        if let Some(dest) = destination.as_mut() {
            match dest.write_all(line.as_bytes()).await {
                Ok(()) => report.persisted += 1,
                Err(e) => {
                    report.write_errors += 1;
                    if verbose {
                        warn!("Error writing to output file: {}", e);
                    }
                }
            }
        }
    }

    if let Some(dest) = destination.as_mut() {
        if let Err(e) = dest.flush().await {
            report.write_errors += 1;
            if verbose {
                warn!("Error flushing output file: {}", e);
            }
        }
    }

    SinkClosed {
        report,
        echo,
        destination,
    }
}

async fn echo_line<W: AsyncWrite + Unpin>(echo: &mut W, line: &str) -> io::Result<()> {
    echo.write_all(line.as_bytes()).await?;
    echo.flush().await
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
