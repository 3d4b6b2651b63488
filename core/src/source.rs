//! Lazily decodes host records from a stream of concatenated JSON objects.
//!
//! Records are pulled one at a time; the input is never buffered whole. A
//! decode failure ends the stream: the input is expected to be well formed,
//! so the caller treats it as fatal instead of skipping ahead.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer};
use vulntechx_common::error::RunError;
use vulntechx_common::record::HostRecord;

pub struct RecordSource<R: Read> {
    records: StreamDeserializer<'static, IoRead<R>, HostRecord>,
    index: usize,
    failed: bool,
}

impl RecordSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, RunError> {
        let file = File::open(path).map_err(|source| RunError::OpenInput {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: Read> RecordSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            records: Deserializer::from_reader(reader).into_iter::<HostRecord>(),
            index: 0,
            failed: false,
        }
    }

    /// Number of records decoded so far.
    pub fn decoded(&self) -> usize {
        self.index
    }
}

impl<R: Read> Iterator for RecordSource<R> {
    type Item = Result<HostRecord, RunError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.records.next()? {
            Ok(record) => {
                self.index += 1;
                Some(Ok(record))
            }
            Err(source) => {
                self.failed = true;
                Some(Err(RunError::Decode {
                    index: self.index,
                    source,
                }))
            }
        }
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
