//! One pass over the input: decode, filter, synthesize, dispatch.
//!
//! Records are decoded strictly one after another on the calling task. The
//! dispatcher's admission wait is the only thing that paces the loop, so at
//! most `parallel` records are ever in flight. The output file is opened
//! before the first job and only released after the last one has been
//! joined and the sink drained.

use std::path::Path;
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWrite;
use tracing::{error, info};
use vulntechx_common::config::ScanConfig;
use vulntechx_common::error::RunError;

use crate::dispatcher::{DispatchReport, Dispatcher, Job, JobRunner, ShellRunner};
use crate::filter::{Filtered, filter_tech};
use crate::sink::{OutputSink, SinkReport};
use crate::source::RecordSource;
use crate::synthesize::synthesize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records decoded from the input.
    pub records: usize,
    /// Records dropped for a null or empty tech list.
    pub skipped: usize,
    pub dispatch: DispatchReport,
    pub sink: SinkReport,
}

pub struct RunOutput<W> {
    pub summary: RunSummary,
    pub echo: W,
}

/// Runs a scan with the shell runner, echoing to standard output.
pub async fn run(cfg: &ScanConfig) -> Result<RunSummary, RunError> {
    let runner = Arc::new(ShellRunner::default());
    let output = run_with(cfg, runner, tokio::io::stdout()).await?;
    Ok(output.summary)
}

/// Runs a scan with a custom runner and live-feed writer.
pub async fn run_with<R, W>(
    cfg: &ScanConfig,
    runner: Arc<R>,
    echo: W,
) -> Result<RunOutput<W>, RunError>
where
    R: JobRunner,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let destination = match &cfg.append_output {
        Some(path) => Some(open_append(path).await?),
        None => None,
    };
    let source = RecordSource::open(&cfg.input)?;

    let sink = OutputSink::spawn(echo, destination, cfg.verbose);
    let mut dispatcher = Dispatcher::new(cfg.parallel, runner, sink.sender())
        .verbose(cfg.verbose)
        .process(cfg.process);

    let mut summary = RunSummary::default();

    for next in source {
        let record = match next {
            Ok(record) => record,
            Err(e) => {
                error!("{}", e);
                dispatcher.abort().await;
                if let Err(e) = sink.close().await {
                    error!("{}", e);
                }
                return Err(e);
            }
        };
        summary.records += 1;

        match filter_tech(record.tags.as_deref(), &cfg.exclusions) {
            Filtered::Skip(reason) => {
                summary.skipped += 1;
                if cfg.verbose {
                    info!("Skipped {}: {}", record.host, reason);
                }
            }
            Filtered::Tags(tags) => {
                let command = synthesize(&cfg.template, &tags);
                dispatcher.submit(Job::new(record.host, command)).await;
            }
        }
    }

    summary.dispatch = dispatcher.join().await;
    let closed = sink.close().await?;
    summary.sink = closed.report;

    Ok(RunOutput {
        summary,
        echo: closed.echo,
    })
}

async fn open_append(path: &Path) -> Result<File, RunError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|source| RunError::OpenOutput {
            path: path.display().to_string(),
            source,
        })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
