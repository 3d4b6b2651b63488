use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use colored::*;
use tracing::info;
use vulntechx_common::config::{DEFAULT_PARALLEL, ScanConfig, ScanOptions};
use vulntechx_core::orchestrator::{self, RunSummary};

use crate::terminal::print;

#[derive(Args, Debug)]
pub struct NucleiArgs {
    /// Path to the JSON file of host records
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// The scanner command template, containing {tech} and -tags or -tc
    #[arg(long)]
    pub cmd: Option<String>,

    /// Enable verbose output for debugging purposes
    #[arg(long)]
    pub verbose: bool,

    /// Show which host each command is running against
    #[arg(long)]
    pub process: bool,

    /// Number of parallel processes
    #[arg(long, default_value_t = DEFAULT_PARALLEL)]
    pub parallel: usize,

    /// File path to append findings to
    #[arg(long)]
    pub append_output: Option<PathBuf>,

    /// Comma-separated list of technologies to exclude
    #[arg(long)]
    pub exclude_tech: Option<String>,
}

impl From<NucleiArgs> for ScanOptions {
    fn from(args: NucleiArgs) -> Self {
        ScanOptions {
            input: args.file,
            command: args.cmd,
            parallel: args.parallel,
            append_output: args.append_output,
            exclude_tech: args.exclude_tech,
            verbose: args.verbose,
            process: args.process,
        }
    }
}

pub async fn nuclei(args: NucleiArgs) -> anyhow::Result<()> {
    let cfg: ScanConfig = ScanOptions::from(args).validate()?;
    describe(&cfg);

    let start_time: Instant = Instant::now();
    let summary: RunSummary = orchestrator::run(&cfg).await?;

    print_summary(&summary, start_time.elapsed());
    Ok(())
}

fn describe(cfg: &ScanConfig) {
    if !cfg.verbose {
        return;
    }
    info!("Reading hosts from {}", cfg.input.display());
    info!("Template mode: {}", cfg.template.mode());
    info!("Running up to {} commands at once", cfg.parallel);
    if !cfg.exclusions.is_empty() {
        info!("Excluding {} technologies", cfg.exclusions.len());
    }
    if let Some(path) = &cfg.append_output {
        info!("Appending findings to {}", path.display());
    }
}

fn print_summary(summary: &RunSummary, total_time: Duration) {
    let dispatch = &summary.dispatch;
    let scanned: ColoredString = format!("{} hosts scanned", dispatch.completed).bold().green();
    let findings: ColoredString = format!("{} findings saved", summary.sink.persisted).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();

    print::fat_separator();
    print::centerln(&format!("Scan Complete: {scanned}, {findings} in {total_time}"));

    let mut details: Vec<(&str, String)> = vec![
        ("Records", summary.records.to_string()),
        ("Skipped", summary.skipped.to_string()),
        ("Failed", dispatch.failed.to_string()),
    ];
    if summary.sink.write_errors > 0 {
        details.push(("Write errors", summary.sink.write_errors.to_string()));
    }
    for (key, value) in details {
        print::aligned_line(key, &value);
    }
}
