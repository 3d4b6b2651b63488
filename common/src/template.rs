//! # Command Template Model
//!
//! The user-supplied scanner command, with a `{tech}` placeholder that each job
//! fills in from the host's technologies.
//!
//! The expansion strategy is inferred from the template text itself:
//! * **Condition** (`-tc`): a nuclei template-condition expression.
//! * **Tags** (`-tags`): a plain comma-separated tag list.
//!
//! `-tc` is checked first, so a template carrying both flags is a condition
//! template. The inference is textual, the same for every job of a run.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub const PLACEHOLDER: &str = "{tech}";

const CONDITION_FLAG: &str = "-tc";
const TAGS_FLAG: &str = "-tags";

/// How the filtered tags are rendered into the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMode {
    /// `react,nginx`
    Tags,
    /// `"contains(to_lower(name),'react') || contains(to_lower(name),'nginx')"`
    Condition,
}

impl TemplateMode {
    /// Infers the mode from flag substrings. `None` when neither flag is present.
    pub fn infer(raw: &str) -> Option<Self> {
        if raw.contains(CONDITION_FLAG) {
            Some(TemplateMode::Condition)
        } else if raw.contains(TAGS_FLAG) {
            Some(TemplateMode::Tags)
        } else {
            None
        }
    }
}

impl fmt::Display for TemplateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateMode::Tags => write!(f, "tags"),
            TemplateMode::Condition => write!(f, "condition"),
        }
    }
}

/// A validated command template. Immutable for the life of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    raw: String,
    mode: TemplateMode,
}

impl CommandTemplate {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Err(ConfigError::MissingCommand);
        }
        if !raw.contains(PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(raw.to_string()));
        }
        let mode = TemplateMode::infer(raw)
            .ok_or_else(|| ConfigError::UnknownTemplateMode(raw.to_string()))?;

        Ok(Self {
            raw: raw.to_string(),
            mode,
        })
    }

    pub fn mode(&self) -> TemplateMode {
        self.mode
    }

    /// Substitutes every placeholder occurrence with `value`, verbatim.
    ///
    /// No shell escaping happens here: whatever `value` contains ends up in
    /// the command line.
    pub fn render(&self, value: &str) -> String {
        self.raw.replace(PLACEHOLDER, value)
    }
}

impl FromStr for CommandTemplate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
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
