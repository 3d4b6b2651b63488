#![cfg(test)]
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use vulntechx_common::config::{ScanConfig, ScanOptions};
use vulntechx_common::error::{ConfigError, RunError};
use vulntechx_core::dispatcher::ShellRunner;
use vulntechx_core::orchestrator::{self, RunOutput};

const HOSTS: &str = r#"
{"host": "https://a.example", "count": 2, "tech": ["React:18", "Nginx"]}
{"host": "https://b.example", "count": 0, "tech": null}
{"host": "https://c.example", "count": 2, "tech": ["HSTS", "Google Font API"]}
{"host": "https://d.example", "count": 1, "tech": ["PHP:8.1"]}
"#;

/// Fake scanner: echoes one finding built from stdin and the tech value,
/// plus one line of noise on stderr. `true -tags` selects the tags mode.
const TAGS_SCANNER: &str =
    r#"read -r host; echo "[hit] [{tech}] [info] $host"; echo "progress for $host" >&2; true -tags"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(hosts: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hosts.json"), hosts).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn options(&self, command: &str) -> ScanOptions {
        ScanOptions {
            input: Some(self.path("hosts.json")),
            command: Some(command.to_string()),
            append_output: Some(self.path("findings.txt")),
            parallel: 3,
            ..ScanOptions::default()
        }
    }

    fn findings(&self) -> Vec<String> {
        read_sorted(&self.path("findings.txt"))
    }
}

fn read_sorted(path: &Path) -> Vec<String> {
    let mut lines: Vec<String> = std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

async fn run(cfg: &ScanConfig) -> Result<RunOutput<Vec<u8>>, RunError> {
    orchestrator::run_with(cfg, Arc::new(ShellRunner::default()), Vec::new()).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tags_mode_persists_only_findings() {
    let ws = Workspace::new(HOSTS);
    let cfg = ScanOptions {
        exclude_tech: Some("hsts".to_string()),
        ..ws.options(TAGS_SCANNER)
    }
    .validate()
    .unwrap();

    let output = run(&cfg).await.unwrap();

    assert_eq!(
        ws.findings(),
        vec![
            "[hit] [php] [info] https://d.example",
            "[hit] [react,nginx] [info] https://a.example",
        ]
    );

    let echoed = String::from_utf8(output.echo).unwrap();
    assert!(echoed.contains("progress for https://a.example"));
    assert!(echoed.contains("progress for https://d.example"));
    assert_eq!(echoed.lines().count(), 4);

    let summary = output.summary;
    assert_eq!(summary.records, 4);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.dispatch.admitted, 2);
    assert_eq!(summary.dispatch.completed, 2);
    assert_eq!(summary.dispatch.failed, 0);
    assert_eq!(summary.sink.persisted, 2);
}

#[tokio::test]
async fn condition_mode_builds_one_quoted_expression() {
    let ws = Workspace::new(r#"{"host": "https://a.example", "tech": ["React", "Vue.js:3"]}"#);
    let scanner = r#"echo '[hit] [x] [y]' {tech} -tc"#;
    let cfg = ws.options(scanner).validate().unwrap();

    run(&cfg).await.unwrap();

    assert_eq!(
        ws.findings(),
        vec!["[hit] [x] [y] contains(to_lower(name),'react') || contains(to_lower(name),'vue.js') -tc"]
    );
}

#[tokio::test]
async fn append_output_is_never_truncated() {
    let ws = Workspace::new(r#"{"host": "https://a.example", "tech": ["Nginx"]}"#);
    std::fs::write(ws.path("findings.txt"), "[old] [run] [kept]\n").unwrap();
    let cfg = ws.options(TAGS_SCANNER).validate().unwrap();

    run(&cfg).await.unwrap();
    run(&cfg).await.unwrap();

    assert_eq!(
        ws.findings(),
        vec![
            "[hit] [nginx] [info] https://a.example",
            "[hit] [nginx] [info] https://a.example",
            "[old] [run] [kept]",
        ]
    );
}

#[tokio::test]
async fn failing_commands_do_not_stop_the_run() {
    let hosts = r#"
        {"host": "ok-1", "tech": ["a"]}
        {"host": "bad", "tech": ["b"]}
        {"host": "ok-2", "tech": ["c"]}
    "#;
    let ws = Workspace::new(hosts);
    let scanner = r#"read -r host; echo "[hit] [{tech}] [x] $host"; [ "$host" != bad ] # -tags"#;
    let cfg = ws.options(scanner).validate().unwrap();

    let output = run(&cfg).await.unwrap();

    assert_eq!(output.summary.dispatch.admitted, 3);
    assert_eq!(output.summary.dispatch.completed, 3);
    assert_eq!(output.summary.dispatch.failed, 1);
    assert_eq!(ws.findings().len(), 3);
}

#[tokio::test]
async fn unknown_shell_is_a_per_job_failure() {
    let ws = Workspace::new(r#"{"host": "a", "tech": ["x"]} {"host": "b", "tech": ["y"]}"#);
    let cfg = ws.options("scan -tags {tech}").validate().unwrap();
    let runner = Arc::new(ShellRunner::with_shell("/nonexistent/vulntechx-shell"));

    let output = orchestrator::run_with(&cfg, runner, Vec::new()).await.unwrap();

    assert_eq!(output.summary.dispatch.admitted, 2);
    assert_eq!(output.summary.dispatch.failed, 2);
    assert!(ws.findings().is_empty());
}

#[tokio::test]
async fn malformed_input_is_fatal() {
    let ws = Workspace::new(r#"{"host": "a", "tech": ["x"]} not-json"#);
    let cfg = ws.options(TAGS_SCANNER).validate().unwrap();

    let result = run(&cfg).await;
    assert!(matches!(result, Err(RunError::Decode { index: 1, .. })));
}

#[tokio::test]
async fn missing_input_file_is_fatal() {
    let ws = Workspace::new("");
    let cfg = ScanOptions {
        input: Some(ws.path("nope.json")),
        ..ws.options(TAGS_SCANNER)
    }
    .validate()
    .unwrap();

    assert!(matches!(run(&cfg).await, Err(RunError::OpenInput { .. })));
}

#[test]
fn template_without_mode_fails_validation() {
    let ws = Workspace::new(HOSTS);
    let result = ws.options("ffuf -u {tech}").validate();
    assert!(matches!(result, Err(ConfigError::UnknownTemplateMode(_))));
}
