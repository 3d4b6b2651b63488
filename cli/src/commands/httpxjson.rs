use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;
use vulntechx_core::httpx;

pub fn httpxjson(output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut file: Option<BufWriter<File>> = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let out = file.as_mut().map(|f| f as &mut dyn Write);

    let records = httpx::reformat(stdin, stdout, out)?;
    debug!("Converted {} httpx results", records);
    Ok(())
}
