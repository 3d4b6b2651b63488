//! Converts httpx's `-td` text output into the JSON records the scanner reads.
//!
//! Input lines look like `https://example.com [Nginx,PHP:8.1,Bootstrap]`.

use std::io::{BufRead, Write};

use anyhow::Context;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechInfo {
    pub host: String,
    pub count: usize,
    pub tech: Option<Vec<String>>,
}

/// Splits one httpx line into host and technologies.
///
/// Lines without a ` [` separator are not httpx results and yield `None`.
/// Technologies are taken verbatim; the scanner does the cleanup later.
pub fn parse_line(line: &str) -> Option<TechInfo> {
    let (host, techs) = line.split_once(" [")?;
    let techs = techs.strip_suffix(']').unwrap_or(techs);

    let tech: Option<Vec<String>> = if techs.is_empty() {
        None
    } else {
        Some(techs.split(',').map(str::to_string).collect())
    };

    Some(TechInfo {
        host: host.trim().to_string(),
        count: tech.as_ref().map_or(0, Vec::len),
        tech,
    })
}

/// Reformats every line of `input`, printing each record to `echo` and, when
/// given, writing it to `output` as well. Returns the number of records.
pub fn reformat<R, W>(
    input: R,
    mut echo: W,
    mut output: Option<&mut dyn Write>,
) -> anyhow::Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut records = 0;

    for line in input.lines() {
        let line = line.context("failed to read httpx output")?;
        let Some(info) = parse_line(&line) else {
            continue;
        };

        let json = serde_json::to_string_pretty(&info).context("failed to encode record")?;
        writeln!(echo, "{json}").context("failed to write to standard output")?;

        if let Some(out) = output.as_mut() {
            writeln!(out, "{json}").context("failed to write to output file")?;
        }
        records += 1;
    }

    if let Some(out) = output.as_mut() {
        out.flush().context("failed to flush output file")?;
    }
    Ok(records)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RecordSource;

    #[test]
    fn parses_host_and_techs() {
        let info = parse_line("https://a.com [Nginx,PHP:8.1,Google Font API]").unwrap();
        assert_eq!(info.host, "https://a.com");
        assert_eq!(info.count, 3);
        assert_eq!(
            info.tech,
            Some(vec![
                "Nginx".to_string(),
                "PHP:8.1".to_string(),
                "Google Font API".to_string()
            ])
        );
    }

    #[test]
    fn empty_tech_list_is_null() {
        let info = parse_line("https://a.com []").unwrap();
        assert_eq!(info.count, 0);
        assert_eq!(info.tech, None);
    }

    #[test]
    fn skips_lines_without_tech_block() {
        assert!(parse_line("https://a.com").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn pretty_prints_in_field_order() {
        let info = parse_line("https://a.com [IIS:10]").unwrap();
        let json = serde_json::to_string_pretty(&info).unwrap();
        assert_eq!(
            json,
            "{\n  \"host\": \"https://a.com\",\n  \"count\": 1,\n  \"tech\": [\n    \"IIS:10\"\n  ]\n}"
        );
    }

    #[test]
    fn reformat_output_feeds_the_record_source() {
        let input = "https://a.com [Nginx,React:18]\nnoise\nhttps://b.com []\n";
        let mut echo: Vec<u8> = Vec::new();
        let mut file: Vec<u8> = Vec::new();

        let out: &mut dyn Write = &mut file;
        let count = reformat(input.as_bytes(), &mut echo, Some(out)).unwrap();
        assert_eq!(count, 2);
        assert_eq!(echo, file);

        let records: Vec<_> = RecordSource::from_reader(file.as_slice())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].host, "https://a.com");
        assert_eq!(records[1].tags, None);
    }
}
