use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Problems with the run configuration. Always fatal, raised before any job starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no input file given, pass one with --file")]
    MissingInput,

    #[error("no command template given, pass one with --cmd")]
    MissingCommand,

    #[error("command template has no {{tech}} placeholder: {0}")]
    MissingPlaceholder(String),

    #[error("command template uses neither -tc nor -tags: {0}")]
    UnknownTemplateMode(String),

    #[error("parallelism must be a positive integer")]
    ZeroParallel,
}

/// Errors that abort a whole run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to open input file {path}: {source}")]
    OpenInput {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to open output file {path}: {source}")]
    OpenOutput {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode record #{index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("output sink stopped unexpectedly: {0}")]
    Sink(#[source] io::Error),
}

/// Failure of a single job. Never aborts sibling jobs or the run.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("failed to start command: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed to write host to stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("failed to read command output: {0}")]
    Output(#[source] io::Error),

    #[error("failed to wait for command: {0}")]
    Wait(#[source] io::Error),

    #[error("command exited with {0}")]
    Exit(ExitStatus),
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
