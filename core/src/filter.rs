//! Technology tag normalization.
//!
//! Turns the raw tags detected on a host (`"PHP:8.1"`, `"Google Font API"`,
//! `"Nginx"`) into the list handed to the command synthesizer, or a reason
//! to skip the host altogether.

use std::fmt;

use vulntechx_common::config::ExclusionSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filtered {
    /// Non-empty, in source order.
    Tags(Vec<String>),
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NullTech,
    EmptyTech,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NullTech => write!(f, "null tech field"),
            SkipReason::EmptyTech => write!(f, "tech is empty"),
        }
    }
}

/// Filters a host's raw tags.
///
/// Each tag keeps only the part before its first `:`, trimmed. Tags that end
/// up empty, contain whitespace, or are excluded are dropped.
pub fn filter_tech(tags: Option<&[String]>, exclusions: &ExclusionSet) -> Filtered {
    let Some(tags) = tags else {
        return Filtered::Skip(SkipReason::NullTech);
    };

    let kept: Vec<String> = tags
        .iter()
        .filter_map(|raw| normalize_tag(raw))
        .filter(|tech| !exclusions.contains(tech))
        .map(str::to_string)
        .collect();

    if kept.is_empty() {
        Filtered::Skip(SkipReason::EmptyTech)
    } else {
        Filtered::Tags(kept)
    }
}

/// `" PHP:8.1 "` -> `Some("PHP")`, `"Google Font API"` -> `None`.
pub fn normalize_tag(raw: &str) -> Option<&str> {
    let name = raw.split(':').next().unwrap_or(raw).trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some(name)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
