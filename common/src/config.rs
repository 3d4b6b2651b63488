use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::template::CommandTemplate;

pub const DEFAULT_PARALLEL: usize = 50;

/// Everything a scan run needs, validated once at start-up.
///
/// Nothing below the orchestrator reads flags or globals; this struct is
/// the only source of run settings.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Stream of JSON host records.
    pub input: PathBuf,
    /// Scanner command with a `{tech}` placeholder.
    pub template: CommandTemplate,
    /// Upper bound on jobs running at the same time.
    pub parallel: NonZeroUsize,
    /// Structured output lines are appended here when set.
    ///
    /// The file is opened in append mode and never truncated.
    pub append_output: Option<PathBuf>,
    /// Technologies never passed to the scanner.
    pub exclusions: ExclusionSet,
    /// Log skipped hosts and job failures.
    pub verbose: bool,
    /// Log each command as it starts.
    pub process: bool,
}

/// Raw, unvalidated settings as they come off the command line.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub input: Option<PathBuf>,
    pub command: Option<String>,
    pub parallel: usize,
    pub append_output: Option<PathBuf>,
    pub exclude_tech: Option<String>,
    pub verbose: bool,
    pub process: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            input: None,
            command: None,
            parallel: DEFAULT_PARALLEL,
            append_output: None,
            exclude_tech: None,
            verbose: false,
            process: false,
        }
    }
}

impl ScanOptions {
    pub fn validate(self) -> Result<ScanConfig, ConfigError> {
        let input = self
            .input
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingInput)?;

        let command = self
            .command
            .filter(|cmd| !cmd.trim().is_empty())
            .ok_or(ConfigError::MissingCommand)?;
        let template = CommandTemplate::parse(&command)?;

        let parallel = NonZeroUsize::new(self.parallel).ok_or(ConfigError::ZeroParallel)?;

        let exclusions = self
            .exclude_tech
            .as_deref()
            .map(ExclusionSet::parse)
            .unwrap_or_default();

        let append_output = self
            .append_output
            .filter(|path| !path.as_os_str().is_empty());

        Ok(ScanConfig {
            input,
            template,
            parallel,
            append_output,
            exclusions,
            verbose: self.verbose,
            process: self.process,
        })
    }
}

/// Lower-cased technology names to leave out of every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: Vec<String>,
}

impl ExclusionSet {
    /// Parses a comma-separated list like `"hsts, Bootstrap"`.
    pub fn parse(list: &str) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in list.split(',') {
            let name = name.trim().to_lowercase();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        Self { names }
    }

    pub fn contains(&self, tech: &str) -> bool {
        let tech = tech.to_lowercase();
        self.names.iter().any(|name| *name == tech)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
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
