use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use vulntechx_common::error::JobError;

use super::{Job, JobRunner};
use crate::sink::LineSender;

const DEFAULT_SHELL: &str = "sh";

/// Runs each job as `sh -c <command>` with the host piped on stdin.
///
/// Standard output and standard error are read concurrently and forwarded
/// line by line, so the sink sees one combined stream. Order is kept within
/// each stream, not across the two.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::with_shell(DEFAULT_SHELL)
    }
}

impl ShellRunner {
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

#[async_trait]
impl JobRunner for ShellRunner {
    async fn run(&self, job: &Job, lines: &LineSender) -> Result<(), JobError> {
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(&job.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(JobError::Spawn)?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (fed, out, err) = tokio::join!(
            feed_host(stdin, &job.host),
            forward_lines(stdout, lines),
            forward_lines(stderr, lines),
        );

        // A reader that bailed early can leave the process blocked on a full pipe.
        if out.is_err() || err.is_err() {
            let _ = child.start_kill();
        }

        let status = child.wait().await.map_err(JobError::Wait)?;

        fed.map_err(JobError::Stdin)?;
        out.map_err(JobError::Output)?;
        err.map_err(JobError::Output)?;

        if !status.success() {
            return Err(JobError::Exit(status));
        }
        Ok(())
    }
}

/// Writes the host and closes stdin. Commands that never read it are fine.
async fn feed_host(stdin: Option<ChildStdin>, host: &str) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };

    let input = format!("{host}\n");
    match stdin.write_all(input.as_bytes()).await {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

async fn forward_lines<R>(reader: Option<R>, lines: &LineSender) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(());
    };

    let mut reader = BufReader::new(reader);
    let mut buf: Vec<u8> = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        // Sink gone: keep draining so the process can still exit.
        let _ = lines.send(String::from_utf8_lossy(&buf).into_owned()).await;
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
